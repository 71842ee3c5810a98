//! In-memory `CareStore` backed by concurrent maps.
//!
//! The working store for tests and embedders. Production deployments put
//! a real database behind the same trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::error::{CareError, CareResult};
use crate::store::CareStore;
use crate::types::{
    AccidentFollowupStage, BirthdayCompletion, FinancialAidSchedule, GriefStage, Member,
};

#[derive(Default)]
pub struct MemoryStore {
    members: DashMap<String, Member>,
    grief_stages: DashMap<String, GriefStage>,
    accident_stages: DashMap<String, AccidentFollowupStage>,
    aid_schedules: DashMap<String, FinancialAidSchedule>,
    birthday_completions: DashMap<String, BirthdayCompletion>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a member directly; the CRUD layer owns members in production.
    pub fn upsert_member(&self, member: Member) {
        self.members.insert(member.id.clone(), member);
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

#[async_trait]
impl CareStore for MemoryStore {
    async fn member(&self, id: &str) -> CareResult<Option<Member>> {
        Ok(self.members.get(id).map(|m| m.value().clone()))
    }

    async fn members_for_campus(&self, campus_id: &str) -> CareResult<Vec<Member>> {
        Ok(self
            .members
            .iter()
            .filter(|m| m.campus_id == campus_id)
            .map(|m| m.value().clone())
            .collect())
    }

    async fn update_member_last_contact(
        &self,
        member_id: &str,
        at: DateTime<Utc>,
    ) -> CareResult<()> {
        let mut member = self
            .members
            .get_mut(member_id)
            .ok_or_else(|| CareError::not_found("member", member_id))?;
        member.last_contact_date = Some(at);
        Ok(())
    }

    async fn grief_stage(&self, id: &str) -> CareResult<Option<GriefStage>> {
        Ok(self.grief_stages.get(id).map(|s| s.value().clone()))
    }

    async fn open_grief_stages(&self, campus_id: &str) -> CareResult<Vec<GriefStage>> {
        Ok(self
            .grief_stages
            .iter()
            .filter(|s| s.campus_id == campus_id && !s.completed && !s.ignored)
            .map(|s| s.value().clone())
            .collect())
    }

    async fn grief_stages_for_event(&self, care_event_id: &str) -> CareResult<Vec<GriefStage>> {
        let mut stages: Vec<GriefStage> = self
            .grief_stages
            .iter()
            .filter(|s| s.care_event_id == care_event_id)
            .map(|s| s.value().clone())
            .collect();
        stages.sort_by_key(|s| s.scheduled_date);
        Ok(stages)
    }

    async fn insert_grief_stages(&self, stages: Vec<GriefStage>) -> CareResult<()> {
        for stage in stages {
            self.grief_stages.insert(stage.id.clone(), stage);
        }
        Ok(())
    }

    async fn update_grief_stage(&self, stage: GriefStage) -> CareResult<()> {
        if !self.grief_stages.contains_key(&stage.id) {
            return Err(CareError::not_found("grief stage", &stage.id));
        }
        self.grief_stages.insert(stage.id.clone(), stage);
        Ok(())
    }

    async fn delete_grief_stages_for_event(&self, care_event_id: &str) -> CareResult<usize> {
        let ids: Vec<String> = self
            .grief_stages
            .iter()
            .filter(|s| s.care_event_id == care_event_id)
            .map(|s| s.id.clone())
            .collect();
        for id in &ids {
            self.grief_stages.remove(id);
        }
        Ok(ids.len())
    }

    async fn accident_stage(&self, id: &str) -> CareResult<Option<AccidentFollowupStage>> {
        Ok(self.accident_stages.get(id).map(|s| s.value().clone()))
    }

    async fn open_accident_stages(
        &self,
        campus_id: &str,
    ) -> CareResult<Vec<AccidentFollowupStage>> {
        Ok(self
            .accident_stages
            .iter()
            .filter(|s| s.campus_id == campus_id && !s.completed && !s.ignored)
            .map(|s| s.value().clone())
            .collect())
    }

    async fn accident_stages_for_event(
        &self,
        care_event_id: &str,
    ) -> CareResult<Vec<AccidentFollowupStage>> {
        let mut stages: Vec<AccidentFollowupStage> = self
            .accident_stages
            .iter()
            .filter(|s| s.care_event_id == care_event_id)
            .map(|s| s.value().clone())
            .collect();
        stages.sort_by_key(|s| s.scheduled_date);
        Ok(stages)
    }

    async fn insert_accident_stages(
        &self,
        stages: Vec<AccidentFollowupStage>,
    ) -> CareResult<()> {
        for stage in stages {
            self.accident_stages.insert(stage.id.clone(), stage);
        }
        Ok(())
    }

    async fn update_accident_stage(&self, stage: AccidentFollowupStage) -> CareResult<()> {
        if !self.accident_stages.contains_key(&stage.id) {
            return Err(CareError::not_found("accident stage", &stage.id));
        }
        self.accident_stages.insert(stage.id.clone(), stage);
        Ok(())
    }

    async fn delete_accident_stages_for_event(&self, care_event_id: &str) -> CareResult<usize> {
        let ids: Vec<String> = self
            .accident_stages
            .iter()
            .filter(|s| s.care_event_id == care_event_id)
            .map(|s| s.id.clone())
            .collect();
        for id in &ids {
            self.accident_stages.remove(id);
        }
        Ok(ids.len())
    }

    async fn aid_schedule(&self, id: &str) -> CareResult<Option<FinancialAidSchedule>> {
        Ok(self.aid_schedules.get(id).map(|s| s.value().clone()))
    }

    async fn active_aid_schedules(
        &self,
        campus_id: &str,
    ) -> CareResult<Vec<FinancialAidSchedule>> {
        Ok(self
            .aid_schedules
            .iter()
            .filter(|s| s.campus_id == campus_id && s.is_active)
            .map(|s| s.value().clone())
            .collect())
    }

    async fn insert_aid_schedule(&self, schedule: FinancialAidSchedule) -> CareResult<()> {
        self.aid_schedules.insert(schedule.id.clone(), schedule);
        Ok(())
    }

    async fn update_aid_schedule(&self, schedule: FinancialAidSchedule) -> CareResult<()> {
        if !self.aid_schedules.contains_key(&schedule.id) {
            return Err(CareError::not_found("aid schedule", &schedule.id));
        }
        self.aid_schedules.insert(schedule.id.clone(), schedule);
        Ok(())
    }

    async fn birthday_completions(
        &self,
        campus_id: &str,
        year: i32,
    ) -> CareResult<Vec<BirthdayCompletion>> {
        Ok(self
            .birthday_completions
            .iter()
            .filter(|c| c.campus_id == campus_id && c.year == year)
            .map(|c| c.value().clone())
            .collect())
    }

    async fn insert_birthday_completion(
        &self,
        completion: BirthdayCompletion,
    ) -> CareResult<()> {
        self.birthday_completions
            .insert(completion.id.clone(), completion);
        Ok(())
    }
}
