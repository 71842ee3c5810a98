//! The abstract keyed-collection contract over the persistence layer.
//!
//! The production datastore is an external collaborator; the core only
//! relies on the find/insert/update/delete primitives below. Implementors
//! parse stored dates at this boundary (see `dates`) and skip-and-log rows
//! whose dates fail to parse, so business logic never sees a malformed
//! date. The campus-scoped stage reads are pre-filtered to open items
//! (not completed, not ignored); members come back unfiltered.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::CareResult;
use crate::types::{
    AccidentFollowupStage, BirthdayCompletion, FinancialAidSchedule, GriefStage, Member,
};

pub mod memory;

pub use memory::MemoryStore;

#[async_trait]
pub trait CareStore: Send + Sync {
    // Members
    async fn member(&self, id: &str) -> CareResult<Option<Member>>;
    async fn members_for_campus(&self, campus_id: &str) -> CareResult<Vec<Member>>;
    async fn update_member_last_contact(
        &self,
        member_id: &str,
        at: DateTime<Utc>,
    ) -> CareResult<()>;

    // Grief support stages
    async fn grief_stage(&self, id: &str) -> CareResult<Option<GriefStage>>;
    async fn open_grief_stages(&self, campus_id: &str) -> CareResult<Vec<GriefStage>>;
    async fn grief_stages_for_event(&self, care_event_id: &str) -> CareResult<Vec<GriefStage>>;
    /// Atomic: all stages land or none do.
    async fn insert_grief_stages(&self, stages: Vec<GriefStage>) -> CareResult<()>;
    async fn update_grief_stage(&self, stage: GriefStage) -> CareResult<()>;
    async fn delete_grief_stages_for_event(&self, care_event_id: &str) -> CareResult<usize>;

    // Accident / illness follow-up stages
    async fn accident_stage(&self, id: &str) -> CareResult<Option<AccidentFollowupStage>>;
    async fn open_accident_stages(
        &self,
        campus_id: &str,
    ) -> CareResult<Vec<AccidentFollowupStage>>;
    async fn accident_stages_for_event(
        &self,
        care_event_id: &str,
    ) -> CareResult<Vec<AccidentFollowupStage>>;
    /// Atomic: all stages land or none do.
    async fn insert_accident_stages(
        &self,
        stages: Vec<AccidentFollowupStage>,
    ) -> CareResult<()>;
    async fn update_accident_stage(&self, stage: AccidentFollowupStage) -> CareResult<()>;
    async fn delete_accident_stages_for_event(&self, care_event_id: &str) -> CareResult<usize>;

    // Financial aid schedules
    async fn aid_schedule(&self, id: &str) -> CareResult<Option<FinancialAidSchedule>>;
    async fn active_aid_schedules(
        &self,
        campus_id: &str,
    ) -> CareResult<Vec<FinancialAidSchedule>>;
    async fn insert_aid_schedule(&self, schedule: FinancialAidSchedule) -> CareResult<()>;
    async fn update_aid_schedule(&self, schedule: FinancialAidSchedule) -> CareResult<()>;

    // Birthday completion records, keyed (member_id, year)
    async fn birthday_completions(
        &self,
        campus_id: &str,
        year: i32,
    ) -> CareResult<Vec<BirthdayCompletion>>;
    async fn insert_birthday_completion(
        &self,
        completion: BirthdayCompletion,
    ) -> CareResult<()>;
}
