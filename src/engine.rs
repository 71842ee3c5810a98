//! `CareEngine` wires the store, the snapshot cache, and configuration
//! together once at startup; callers (HTTP handlers, the nightly batch)
//! hold a reference and go through it for every read and write.
//!
//! Every mutating call invalidates the owning campus's cache entry before
//! returning, so a caller that saw its write succeed can never read a
//! snapshot that predates it. Invalidation resolves the campus's local
//! date at invalidation time; near midnight the stale entry being removed
//! is whatever "today" currently means in that campus's timezone.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;

use crate::cache::SnapshotCache;
use crate::config::Config;
use crate::dates;
use crate::engagement::{self, Classification};
use crate::error::CareResult;
use crate::services::{care_events, dashboard, financial_aid};
use crate::store::CareStore;
use crate::types::{
    AccidentFollowupStage, BirthdayCompletion, DashboardSnapshot, FinancialAidSchedule,
    GriefStage,
};

pub use crate::services::financial_aid::NewAidSchedule;

pub struct CareEngine {
    store: Arc<dyn CareStore>,
    cache: Arc<dyn SnapshotCache>,
    config: RwLock<Config>,
}

impl CareEngine {
    pub fn new(store: Arc<dyn CareStore>, cache: Arc<dyn SnapshotCache>, config: Config) -> Self {
        Self {
            store,
            cache,
            config: RwLock::new(config),
        }
    }

    pub fn config(&self) -> Config {
        self.config.read().clone()
    }

    /// Swap configuration in place (thresholds, campus registry).
    pub fn set_config(&self, config: Config) {
        *self.config.write() = config;
    }

    /// Today's calendar date in the campus's timezone.
    pub fn local_today(&self, campus_id: &str) -> NaiveDate {
        let tz = self.config.read().campus_timezone(campus_id);
        dates::local_today(&tz)
    }

    /// Classify a member's engagement with the configured thresholds.
    pub fn classify_engagement(&self, last_contact: Option<DateTime<Utc>>) -> Classification {
        engagement::classify(last_contact, &self.config.read().engagement)
    }

    // -------------------------------------------------------------------
    // Read path
    // -------------------------------------------------------------------

    /// Cache-first dashboard read. A miss recomputes from the store and
    /// fills the cache; the cache never feeds a recomputation.
    pub async fn compute_dashboard(&self, campus_id: &str) -> CareResult<DashboardSnapshot> {
        let today = self.local_today(campus_id);

        if let Some(hit) = self.cache.get(campus_id, today) {
            log::debug!("Dashboard cache hit for {campus_id}/{today}");
            return Ok(hit);
        }

        let config = self.config.read().clone();
        let snapshot =
            dashboard::compute_dashboard(self.store.as_ref(), &config, campus_id, today).await?;
        self.cache.put(snapshot.clone());
        Ok(snapshot)
    }

    /// Drop the campus's snapshot for its current local date. Called by
    /// every mutating operation; safe to call redundantly.
    pub fn invalidate_cache(&self, campus_id: &str) {
        let today = self.local_today(campus_id);
        self.cache.invalidate(campus_id, today);
    }

    // -------------------------------------------------------------------
    // Write path: care event timelines
    // -------------------------------------------------------------------

    pub async fn create_grief_timeline(
        &self,
        anchor: NaiveDate,
        care_event_id: &str,
        member_id: &str,
    ) -> CareResult<Vec<GriefStage>> {
        let stages =
            care_events::create_grief_timeline(self.store.as_ref(), anchor, care_event_id, member_id)
                .await?;
        if let Some(stage) = stages.first() {
            self.invalidate_cache(&stage.campus_id);
        }
        Ok(stages)
    }

    pub async fn create_accident_timeline(
        &self,
        anchor: NaiveDate,
        care_event_id: &str,
        member_id: &str,
        campus_id: &str,
    ) -> CareResult<Vec<AccidentFollowupStage>> {
        let stages = care_events::create_accident_timeline(
            self.store.as_ref(),
            anchor,
            care_event_id,
            member_id,
            campus_id,
        )
        .await?;
        self.invalidate_cache(campus_id);
        Ok(stages)
    }

    pub async fn complete_grief_stage(
        &self,
        stage_id: &str,
        completed_by: &str,
        notes: Option<String>,
    ) -> CareResult<GriefStage> {
        let stage =
            care_events::complete_grief_stage(self.store.as_ref(), stage_id, completed_by, notes)
                .await?;
        self.invalidate_cache(&stage.campus_id);
        Ok(stage)
    }

    pub async fn ignore_grief_stage(
        &self,
        stage_id: &str,
        ignored_by: &str,
        notes: Option<String>,
    ) -> CareResult<GriefStage> {
        let stage =
            care_events::ignore_grief_stage(self.store.as_ref(), stage_id, ignored_by, notes)
                .await?;
        self.invalidate_cache(&stage.campus_id);
        Ok(stage)
    }

    pub async fn complete_accident_stage(
        &self,
        stage_id: &str,
        completed_by: &str,
        notes: Option<String>,
    ) -> CareResult<AccidentFollowupStage> {
        let stage = care_events::complete_accident_stage(
            self.store.as_ref(),
            stage_id,
            completed_by,
            notes,
        )
        .await?;
        self.invalidate_cache(&stage.campus_id);
        Ok(stage)
    }

    pub async fn ignore_accident_stage(
        &self,
        stage_id: &str,
        ignored_by: &str,
        notes: Option<String>,
    ) -> CareResult<AccidentFollowupStage> {
        let stage =
            care_events::ignore_accident_stage(self.store.as_ref(), stage_id, ignored_by, notes)
                .await?;
        self.invalidate_cache(&stage.campus_id);
        Ok(stage)
    }

    /// Delete every stage of a care event (both timeline types) and
    /// invalidate the campuses they lived on.
    pub async fn delete_care_event(&self, care_event_id: &str) -> CareResult<usize> {
        let mut campuses: Vec<String> = Vec::new();
        for stage in self
            .store
            .grief_stages_for_event(care_event_id)
            .await?
        {
            if !campuses.contains(&stage.campus_id) {
                campuses.push(stage.campus_id);
            }
        }
        for stage in self
            .store
            .accident_stages_for_event(care_event_id)
            .await?
        {
            if !campuses.contains(&stage.campus_id) {
                campuses.push(stage.campus_id);
            }
        }

        let removed = care_events::delete_event_timelines(self.store.as_ref(), care_event_id).await?;
        for campus_id in campuses {
            self.invalidate_cache(&campus_id);
        }
        Ok(removed)
    }

    // -------------------------------------------------------------------
    // Write path: birthdays
    // -------------------------------------------------------------------

    pub async fn complete_birthday(
        &self,
        member_id: &str,
        year: i32,
        completed_by: &str,
    ) -> CareResult<BirthdayCompletion> {
        let completion =
            care_events::complete_birthday(self.store.as_ref(), member_id, year, completed_by)
                .await?;
        self.invalidate_cache(&completion.campus_id);
        Ok(completion)
    }

    pub async fn ignore_birthday(
        &self,
        member_id: &str,
        year: i32,
        ignored_by: &str,
    ) -> CareResult<BirthdayCompletion> {
        let completion =
            care_events::ignore_birthday(self.store.as_ref(), member_id, year, ignored_by).await?;
        self.invalidate_cache(&completion.campus_id);
        Ok(completion)
    }

    // -------------------------------------------------------------------
    // Write path: financial aid
    // -------------------------------------------------------------------

    pub async fn create_aid_schedule(
        &self,
        request: NewAidSchedule,
    ) -> CareResult<FinancialAidSchedule> {
        // "Today" for the initial occurrence is the member's campus day.
        let member = self
            .store
            .member(&request.member_id)
            .await?
            .ok_or_else(|| crate::error::CareError::not_found("member", &request.member_id))?;
        let today = self.local_today(&member.campus_id);

        let schedule = financial_aid::create_schedule(self.store.as_ref(), request, today).await?;
        self.invalidate_cache(&schedule.campus_id);
        Ok(schedule)
    }

    /// Record a distribution: the current occurrence was fulfilled.
    pub async fn record_distribution(
        &self,
        schedule_id: &str,
    ) -> CareResult<FinancialAidSchedule> {
        let schedule =
            financial_aid::advance_schedule(self.store.as_ref(), schedule_id, true).await?;
        self.invalidate_cache(&schedule.campus_id);
        Ok(schedule)
    }

    /// Skip the current occurrence without distributing.
    pub async fn skip_occurrence(&self, schedule_id: &str) -> CareResult<FinancialAidSchedule> {
        let schedule =
            financial_aid::advance_schedule(self.store.as_ref(), schedule_id, false).await?;
        self.invalidate_cache(&schedule.campus_id);
        Ok(schedule)
    }

    pub async fn deactivate_aid_schedule(
        &self,
        schedule_id: &str,
    ) -> CareResult<FinancialAidSchedule> {
        let schedule =
            financial_aid::deactivate_schedule(self.store.as_ref(), schedule_id).await?;
        self.invalidate_cache(&schedule.campus_id);
        Ok(schedule)
    }
}
