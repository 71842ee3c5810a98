//! Occurrence calculation for recurring financial-aid schedules.
//!
//! Two entry points: [`initial_occurrence`] runs once at schedule creation
//! and is the only place that can reject a schedule; [`advance_occurrence`]
//! runs on every distribution or skip and always succeeds. The advance
//! path re-derives the day from the schedule's anchor, so a January 31
//! schedule clamped to February 28 lands back on March 31.
//!
//! One-time schedules (and unrecognized legacy frequencies, which
//! deserialize to the same variant) never advance; `next_occurrence`
//! stays where it is until the schedule is deactivated. That matches the
//! historical disbursement behavior and is deliberately not "fixed".

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::dates::clamp_day;
use crate::error::{CareError, CareResult};
use crate::types::{AidFrequency, FinancialAidSchedule};

/// The frequency-specific anchor fields of a schedule, separated from the
/// record so the calculator can run before anything is persisted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleAnchor {
    pub day_of_week: Option<Weekday>,
    pub day_of_month: Option<u32>,
    pub month_of_year: Option<u32>,
}

impl ScheduleAnchor {
    pub fn of(schedule: &FinancialAidSchedule) -> Self {
        Self {
            day_of_week: schedule.day_of_week,
            day_of_month: schedule.day_of_month,
            month_of_year: schedule.month_of_year,
        }
    }
}

/// First occurrence of a new schedule.
///
/// - Weekly: the next date on or after `today` falling on the anchor
///   weekday. If today already is that weekday, the occurrence is today.
/// - Monthly: `(start.year, start.month, day_of_month)` taken literally.
///   A day that does not exist in the start month is a hard error: the
///   initial date supports intentional back-dating and must be
///   calendar-valid as given.
/// - Annual: this year's `(month_of_year, day_of_month)`, clamped if the
///   day does not exist (Feb 29), rolled to next year if already past.
/// - One-time: the start date.
pub fn initial_occurrence(
    frequency: AidFrequency,
    anchor: &ScheduleAnchor,
    start: NaiveDate,
    today: NaiveDate,
) -> CareResult<NaiveDate> {
    match frequency {
        AidFrequency::Weekly => {
            let target = anchor.day_of_week.ok_or_else(|| {
                CareError::Validation("Weekly schedule requires day_of_week".to_string())
            })?;
            let ahead = (target.num_days_from_monday() as i64
                - today.weekday().num_days_from_monday() as i64)
                .rem_euclid(7);
            Ok(today + Duration::days(ahead))
        }
        AidFrequency::Monthly => {
            let day = required_day(anchor)?;
            NaiveDate::from_ymd_opt(start.year(), start.month(), day).ok_or(
                CareError::InvalidScheduleDate {
                    year: start.year(),
                    month: start.month(),
                    day,
                },
            )
        }
        AidFrequency::Annually => {
            let month = required_month(anchor)?;
            let day = required_day(anchor)?;
            let candidate = clamp_day(today.year(), month, day);
            if candidate < today {
                Ok(clamp_day(today.year() + 1, month, day))
            } else {
                Ok(candidate)
            }
        }
        AidFrequency::OneTime => Ok(start),
    }
}

/// The occurrence after `current`, following a distribution or skip.
///
/// Never fails: monthly and annual advances clamp to the end of short
/// months, re-deriving the day from the anchor so clamping in one month
/// does not stick in later ones. One-time schedules return `current`
/// unchanged.
pub fn advance_occurrence(
    frequency: AidFrequency,
    anchor: &ScheduleAnchor,
    current: NaiveDate,
) -> NaiveDate {
    match frequency {
        AidFrequency::Weekly => current + Duration::days(7),
        AidFrequency::Monthly => {
            let (year, month) = next_month(current.year(), current.month());
            let day = anchor.day_of_month.unwrap_or_else(|| current.day());
            clamp_day(year, month, day)
        }
        AidFrequency::Annually => {
            let month = anchor.month_of_year.unwrap_or_else(|| current.month());
            let day = anchor.day_of_month.unwrap_or_else(|| current.day());
            clamp_day(current.year() + 1, month, day)
        }
        AidFrequency::OneTime => current,
    }
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

fn required_day(anchor: &ScheduleAnchor) -> CareResult<u32> {
    let day = anchor.day_of_month.ok_or_else(|| {
        CareError::Validation("Schedule requires day_of_month".to_string())
    })?;
    if !(1..=31).contains(&day) {
        return Err(CareError::Validation(format!(
            "day_of_month out of range: {day}"
        )));
    }
    Ok(day)
}

fn required_month(anchor: &ScheduleAnchor) -> CareResult<u32> {
    let month = anchor.month_of_year.ok_or_else(|| {
        CareError::Validation("Annual schedule requires month_of_year".to_string())
    })?;
    if !(1..=12).contains(&month) {
        return Err(CareError::Validation(format!(
            "month_of_year out of range: {month}"
        )));
    }
    Ok(month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn weekly(target: Weekday) -> ScheduleAnchor {
        ScheduleAnchor {
            day_of_week: Some(target),
            ..Default::default()
        }
    }

    fn monthly(day: u32) -> ScheduleAnchor {
        ScheduleAnchor {
            day_of_month: Some(day),
            ..Default::default()
        }
    }

    fn annual(month: u32, day: u32) -> ScheduleAnchor {
        ScheduleAnchor {
            month_of_year: Some(month),
            day_of_month: Some(day),
            ..Default::default()
        }
    }

    #[test]
    fn weekly_same_day_is_zero_lookahead() {
        // 2025-06-04 is a Wednesday.
        let today = date(2025, 6, 4);
        let first = initial_occurrence(
            AidFrequency::Weekly,
            &weekly(Weekday::Wed),
            today,
            today,
        )
        .unwrap();
        assert_eq!(first, today);
    }

    #[test]
    fn weekly_finds_next_target_weekday() {
        // Thursday looking for Monday: four days ahead.
        let today = date(2025, 6, 5);
        let first = initial_occurrence(
            AidFrequency::Weekly,
            &weekly(Weekday::Mon),
            today,
            today,
        )
        .unwrap();
        assert_eq!(first, date(2025, 6, 9));
    }

    #[test]
    fn weekly_advance_adds_seven_days() {
        let next = advance_occurrence(
            AidFrequency::Weekly,
            &weekly(Weekday::Wed),
            date(2025, 6, 4),
        );
        assert_eq!(next, date(2025, 6, 11));
    }

    #[test]
    fn monthly_initial_is_literal_start_month() {
        let first = initial_occurrence(
            AidFrequency::Monthly,
            &monthly(31),
            date(2025, 1, 31),
            date(2025, 3, 15),
        )
        .unwrap();
        assert_eq!(first, date(2025, 1, 31));
    }

    #[test]
    fn monthly_initial_rejects_nonexistent_day() {
        let err = initial_occurrence(
            AidFrequency::Monthly,
            &monthly(30),
            date(2025, 2, 1),
            date(2025, 2, 1),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CareError::InvalidScheduleDate {
                year: 2025,
                month: 2,
                day: 30
            }
        ));
    }

    #[test]
    fn monthly_advance_clamps_to_short_months() {
        let next = advance_occurrence(AidFrequency::Monthly, &monthly(31), date(2025, 1, 31));
        assert_eq!(next, date(2025, 2, 28));

        let leap = advance_occurrence(AidFrequency::Monthly, &monthly(31), date(2024, 1, 31));
        assert_eq!(leap, date(2024, 2, 29));
    }

    #[test]
    fn monthly_advance_recovers_anchor_day_after_clamp() {
        // Clamped to Feb 28, March should be back on the 31st.
        let next = advance_occurrence(AidFrequency::Monthly, &monthly(31), date(2025, 2, 28));
        assert_eq!(next, date(2025, 3, 31));
    }

    #[test]
    fn monthly_advance_crosses_year_boundary() {
        let next = advance_occurrence(AidFrequency::Monthly, &monthly(15), date(2025, 12, 15));
        assert_eq!(next, date(2026, 1, 15));
    }

    #[test]
    fn annual_initial_uses_current_year_when_not_passed() {
        let first = initial_occurrence(
            AidFrequency::Annually,
            &annual(9, 10),
            date(2025, 1, 1),
            date(2025, 6, 1),
        )
        .unwrap();
        assert_eq!(first, date(2025, 9, 10));
    }

    #[test]
    fn annual_initial_rolls_to_next_year_when_passed() {
        let first = initial_occurrence(
            AidFrequency::Annually,
            &annual(3, 5),
            date(2025, 1, 1),
            date(2025, 6, 1),
        )
        .unwrap();
        assert_eq!(first, date(2026, 3, 5));
    }

    #[test]
    fn annual_feb_29_clamps_then_rolls() {
        // Non-leap year, Feb 28 already passed: next year, still clamped.
        let first = initial_occurrence(
            AidFrequency::Annually,
            &annual(2, 29),
            date(2025, 1, 1),
            date(2025, 6, 1),
        )
        .unwrap();
        assert_eq!(first, date(2026, 2, 28));

        // Before the clamped date: this year's Feb 28.
        let early = initial_occurrence(
            AidFrequency::Annually,
            &annual(2, 29),
            date(2025, 1, 1),
            date(2025, 2, 1),
        )
        .unwrap();
        assert_eq!(early, date(2025, 2, 28));
    }

    #[test]
    fn annual_advance_restores_feb_29_in_leap_years() {
        // 2027 (clamped to 28) advances into leap year 2028: back to the 29th.
        let next = advance_occurrence(AidFrequency::Annually, &annual(2, 29), date(2027, 2, 28));
        assert_eq!(next, date(2028, 2, 29));
    }

    #[test]
    fn annual_advance_same_month_day() {
        let next = advance_occurrence(AidFrequency::Annually, &annual(9, 10), date(2025, 9, 10));
        assert_eq!(next, date(2026, 9, 10));
    }

    #[test]
    fn one_time_never_advances() {
        let current = date(2025, 4, 1);
        let next = advance_occurrence(AidFrequency::OneTime, &ScheduleAnchor::default(), current);
        assert_eq!(next, current);
    }

    #[test]
    fn one_time_initial_is_start_date() {
        let first = initial_occurrence(
            AidFrequency::OneTime,
            &ScheduleAnchor::default(),
            date(2025, 4, 1),
            date(2025, 6, 1),
        )
        .unwrap();
        assert_eq!(first, date(2025, 4, 1));
    }

    #[test]
    fn weekly_without_anchor_is_rejected() {
        let err = initial_occurrence(
            AidFrequency::Weekly,
            &ScheduleAnchor::default(),
            date(2025, 6, 1),
            date(2025, 6, 1),
        )
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn annual_month_out_of_range_is_rejected() {
        let err = initial_occurrence(
            AidFrequency::Annually,
            &annual(13, 1),
            date(2025, 6, 1),
            date(2025, 6, 1),
        )
        .unwrap_err();
        assert!(err.is_validation());
    }
}
