//! Write path for recurring financial-aid schedules.
//!
//! Creation is the only place a schedule can be rejected (the monthly
//! initial date must be calendar-valid as given). Distribution and skip
//! both advance the cursor through `recurrence`; they differ only in
//! which side record grows: fulfilment bumps `occurrences_completed`,
//! skipping appends the passed-over date to `ignored_occurrences`.

use chrono::{NaiveDate, Weekday};

use crate::error::{CareError, CareResult};
use crate::recurrence::{self, ScheduleAnchor};
use crate::store::CareStore;
use crate::types::{AidFrequency, FinancialAidSchedule};

/// Creation request for a new schedule. Exactly one anchor group is
/// expected for the frequency; the rest stay `None`.
#[derive(Debug, Clone)]
pub struct NewAidSchedule {
    pub member_id: String,
    pub aid_type: String,
    pub aid_amount: f64,
    pub frequency: AidFrequency,
    pub day_of_week: Option<Weekday>,
    pub day_of_month: Option<u32>,
    pub month_of_year: Option<u32>,
    pub start_date: NaiveDate,
}

/// Validate and persist a new schedule with its first occurrence
/// computed. Validation failures persist nothing.
pub async fn create_schedule(
    store: &dyn CareStore,
    request: NewAidSchedule,
    today: NaiveDate,
) -> CareResult<FinancialAidSchedule> {
    let member = store
        .member(&request.member_id)
        .await?
        .ok_or_else(|| CareError::not_found("member", &request.member_id))?;

    if request.aid_amount <= 0.0 {
        return Err(CareError::Validation(format!(
            "Aid amount must be positive, got {}",
            request.aid_amount
        )));
    }

    let anchor = ScheduleAnchor {
        day_of_week: request.day_of_week,
        day_of_month: request.day_of_month,
        month_of_year: request.month_of_year,
    };
    let next_occurrence =
        recurrence::initial_occurrence(request.frequency, &anchor, request.start_date, today)?;

    let schedule = FinancialAidSchedule {
        id: uuid::Uuid::new_v4().to_string(),
        member_id: request.member_id,
        campus_id: member.campus_id,
        aid_type: request.aid_type,
        aid_amount: request.aid_amount,
        frequency: request.frequency,
        day_of_week: request.day_of_week,
        day_of_month: request.day_of_month,
        month_of_year: request.month_of_year,
        next_occurrence,
        ignored_occurrences: Vec::new(),
        is_active: true,
        occurrences_completed: 0,
    };
    store.insert_aid_schedule(schedule.clone()).await?;
    log::info!(
        "Created {} aid schedule {} (first occurrence {next_occurrence})",
        schedule.frequency.as_str(),
        schedule.id
    );
    Ok(schedule)
}

/// Resolve the current occurrence and move the cursor.
///
/// `fulfilled` distinguishes a distribution from an explicit skip.
/// Inactive schedules never advance and come back unchanged. One-time
/// (and unrecognized-frequency) schedules keep their cursor where it is,
/// matching the historical disbursement behavior.
pub async fn advance_schedule(
    store: &dyn CareStore,
    schedule_id: &str,
    fulfilled: bool,
) -> CareResult<FinancialAidSchedule> {
    let mut schedule = store
        .aid_schedule(schedule_id)
        .await?
        .ok_or_else(|| CareError::not_found("aid schedule", schedule_id))?;

    if !schedule.is_active {
        log::debug!("Aid schedule {schedule_id} is inactive; not advancing");
        return Ok(schedule);
    }

    let current = schedule.next_occurrence;
    let next =
        recurrence::advance_occurrence(schedule.frequency, &ScheduleAnchor::of(&schedule), current);

    if fulfilled {
        schedule.occurrences_completed += 1;
    } else {
        schedule.ignored_occurrences.push(current);
    }

    if next == current && schedule.frequency == AidFrequency::OneTime {
        log::debug!("Aid schedule {schedule_id} is one-time; occurrence stays {current}");
    }
    schedule.next_occurrence = next;

    store.update_aid_schedule(schedule.clone()).await?;
    Ok(schedule)
}

/// Stop a schedule. Its `next_occurrence` freezes where it is.
pub async fn deactivate_schedule(
    store: &dyn CareStore,
    schedule_id: &str,
) -> CareResult<FinancialAidSchedule> {
    let mut schedule = store
        .aid_schedule(schedule_id)
        .await?
        .ok_or_else(|| CareError::not_found("aid schedule", schedule_id))?;
    schedule.is_active = false;
    store.update_aid_schedule(schedule.clone()).await?;
    log::info!("Deactivated aid schedule {schedule_id}");
    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::Member;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn member(id: &str, campus_id: &str) -> Member {
        Member {
            id: id.to_string(),
            campus_id: campus_id.to_string(),
            name: format!("Member {id}"),
            phone: None,
            photo_url: None,
            birth_date: None,
            last_contact_date: None,
            is_archived: false,
        }
    }

    fn weekly_request(member_id: &str, target: Weekday) -> NewAidSchedule {
        NewAidSchedule {
            member_id: member_id.to_string(),
            aid_type: "groceries".to_string(),
            aid_amount: 150.0,
            frequency: AidFrequency::Weekly,
            day_of_week: Some(target),
            day_of_month: None,
            month_of_year: None,
            start_date: date(2025, 6, 1),
        }
    }

    #[tokio::test]
    async fn weekly_created_on_target_weekday_starts_today() {
        let store = MemoryStore::new();
        store.upsert_member(member("m1", "main"));

        // 2025-06-04 is a Wednesday.
        let today = date(2025, 6, 4);
        let schedule = create_schedule(&store, weekly_request("m1", Weekday::Wed), today)
            .await
            .unwrap();
        assert_eq!(schedule.next_occurrence, today);
        assert_eq!(schedule.campus_id, "main");
        assert!(schedule.is_active);
    }

    #[tokio::test]
    async fn invalid_monthly_start_persists_nothing() {
        let store = MemoryStore::new();
        store.upsert_member(member("m1", "main"));

        let request = NewAidSchedule {
            member_id: "m1".to_string(),
            aid_type: "rent".to_string(),
            aid_amount: 500.0,
            frequency: AidFrequency::Monthly,
            day_of_week: None,
            day_of_month: Some(31),
            month_of_year: None,
            start_date: date(2025, 2, 1),
        };
        let err = create_schedule(&store, request, date(2025, 2, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, CareError::InvalidScheduleDate { .. }));
        assert!(store.active_aid_schedules("main").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_positive_amount_is_rejected() {
        let store = MemoryStore::new();
        store.upsert_member(member("m1", "main"));

        let mut request = weekly_request("m1", Weekday::Wed);
        request.aid_amount = 0.0;
        let err = create_schedule(&store, request, date(2025, 6, 4))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn distribution_advances_and_counts() {
        let store = MemoryStore::new();
        store.upsert_member(member("m1", "main"));
        let schedule = create_schedule(&store, weekly_request("m1", Weekday::Wed), date(2025, 6, 4))
            .await
            .unwrap();

        let advanced = advance_schedule(&store, &schedule.id, true).await.unwrap();
        assert_eq!(advanced.next_occurrence, date(2025, 6, 11));
        assert_eq!(advanced.occurrences_completed, 1);
        assert!(advanced.ignored_occurrences.is_empty());
    }

    #[tokio::test]
    async fn skip_records_the_ignored_date() {
        let store = MemoryStore::new();
        store.upsert_member(member("m1", "main"));
        let schedule = create_schedule(&store, weekly_request("m1", Weekday::Wed), date(2025, 6, 4))
            .await
            .unwrap();

        let advanced = advance_schedule(&store, &schedule.id, false).await.unwrap();
        assert_eq!(advanced.next_occurrence, date(2025, 6, 11));
        assert_eq!(advanced.occurrences_completed, 0);
        assert_eq!(advanced.ignored_occurrences, vec![date(2025, 6, 4)]);
    }

    #[tokio::test]
    async fn inactive_schedule_never_advances() {
        let store = MemoryStore::new();
        store.upsert_member(member("m1", "main"));
        let schedule = create_schedule(&store, weekly_request("m1", Weekday::Wed), date(2025, 6, 4))
            .await
            .unwrap();

        deactivate_schedule(&store, &schedule.id).await.unwrap();
        let after = advance_schedule(&store, &schedule.id, true).await.unwrap();
        assert_eq!(after.next_occurrence, date(2025, 6, 4));
        assert_eq!(after.occurrences_completed, 0);
        assert!(!after.is_active);
    }

    #[tokio::test]
    async fn one_time_cursor_stays_put() {
        let store = MemoryStore::new();
        store.upsert_member(member("m1", "main"));
        let request = NewAidSchedule {
            member_id: "m1".to_string(),
            aid_type: "deposit".to_string(),
            aid_amount: 900.0,
            frequency: AidFrequency::OneTime,
            day_of_week: None,
            day_of_month: None,
            month_of_year: None,
            start_date: date(2025, 6, 10),
        };
        let schedule = create_schedule(&store, request, date(2025, 6, 4)).await.unwrap();
        assert_eq!(schedule.next_occurrence, date(2025, 6, 10));

        let after = advance_schedule(&store, &schedule.id, true).await.unwrap();
        assert_eq!(after.next_occurrence, date(2025, 6, 10));
        assert_eq!(after.occurrences_completed, 1);
    }

    #[tokio::test]
    async fn monthly_clamp_round_trip_through_service() {
        let store = MemoryStore::new();
        store.upsert_member(member("m1", "main"));
        let request = NewAidSchedule {
            member_id: "m1".to_string(),
            aid_type: "rent".to_string(),
            aid_amount: 650.0,
            frequency: AidFrequency::Monthly,
            day_of_week: None,
            day_of_month: Some(31),
            month_of_year: None,
            start_date: date(2025, 1, 31),
        };
        let schedule = create_schedule(&store, request, date(2025, 1, 31)).await.unwrap();
        assert_eq!(schedule.next_occurrence, date(2025, 1, 31));

        let feb = advance_schedule(&store, &schedule.id, true).await.unwrap();
        assert_eq!(feb.next_occurrence, date(2025, 2, 28));
        let mar = advance_schedule(&store, &schedule.id, true).await.unwrap();
        assert_eq!(mar.next_occurrence, date(2025, 3, 31));
    }
}
