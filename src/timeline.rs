//! Follow-up timeline expansion for triggering care events.
//!
//! A death or an accident/illness expands into a fixed sequence of
//! follow-up stages at fixed day offsets from the anchor date. Expansion
//! is pure: the caller persists the batch atomically and guarantees it
//! runs once per event (the service layer guards that).

use chrono::{Duration, NaiveDate};

use crate::types::{AccidentFollowupStage, AccidentStageLabel, GriefStage, GriefStageLabel};

/// Grief follow-up offsets in days from the date of loss.
pub const GRIEF_TIMELINE: [(GriefStageLabel, i64); 6] = [
    (GriefStageLabel::OneWeek, 7),
    (GriefStageLabel::TwoWeeks, 14),
    (GriefStageLabel::OneMonth, 30),
    (GriefStageLabel::ThreeMonths, 90),
    (GriefStageLabel::SixMonths, 180),
    (GriefStageLabel::OneYear, 365),
];

/// Accident/illness follow-up offsets in days from the event date.
pub const ACCIDENT_TIMELINE: [(AccidentStageLabel, i64); 3] = [
    (AccidentStageLabel::FirstFollowup, 3),
    (AccidentStageLabel::SecondFollowup, 7),
    (AccidentStageLabel::FinalFollowup, 14),
];

/// Expand a grief event into its six follow-up stages, in timeline order.
pub fn generate_grief_timeline(
    anchor: NaiveDate,
    care_event_id: &str,
    member_id: &str,
    campus_id: &str,
) -> Vec<GriefStage> {
    GRIEF_TIMELINE
        .iter()
        .map(|(stage, offset)| GriefStage {
            id: uuid::Uuid::new_v4().to_string(),
            care_event_id: care_event_id.to_string(),
            member_id: member_id.to_string(),
            campus_id: campus_id.to_string(),
            stage: *stage,
            scheduled_date: anchor + Duration::days(*offset),
            completed: false,
            completed_by: None,
            completed_at: None,
            ignored: false,
            ignored_by: None,
            ignored_at: None,
            reminder_sent: false,
            notes: None,
        })
        .collect()
}

/// Expand an accident/illness event into its three follow-up stages.
pub fn generate_accident_timeline(
    anchor: NaiveDate,
    care_event_id: &str,
    member_id: &str,
    campus_id: &str,
) -> Vec<AccidentFollowupStage> {
    ACCIDENT_TIMELINE
        .iter()
        .map(|(stage, offset)| AccidentFollowupStage {
            id: uuid::Uuid::new_v4().to_string(),
            care_event_id: care_event_id.to_string(),
            member_id: member_id.to_string(),
            campus_id: campus_id.to_string(),
            stage: *stage,
            scheduled_date: anchor + Duration::days(*offset),
            completed: false,
            completed_by: None,
            completed_at: None,
            ignored: false,
            ignored_by: None,
            ignored_at: None,
            reminder_sent: false,
            notes: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn grief_timeline_has_six_stages_at_fixed_offsets() {
        let stages = generate_grief_timeline(date(2025, 1, 1), "evt-1", "mem-1", "main");
        assert_eq!(stages.len(), 6);

        let expected = [
            (GriefStageLabel::OneWeek, date(2025, 1, 8)),
            (GriefStageLabel::TwoWeeks, date(2025, 1, 15)),
            (GriefStageLabel::OneMonth, date(2025, 1, 31)),
            (GriefStageLabel::ThreeMonths, date(2025, 4, 1)),
            (GriefStageLabel::SixMonths, date(2025, 6, 30)),
            (GriefStageLabel::OneYear, date(2026, 1, 1)),
        ];
        for (stage, (label, scheduled)) in stages.iter().zip(expected) {
            assert_eq!(stage.stage, label);
            assert_eq!(stage.scheduled_date, scheduled);
            assert!(!stage.completed);
            assert!(!stage.ignored);
            assert!(!stage.reminder_sent);
            assert_eq!(stage.care_event_id, "evt-1");
            assert_eq!(stage.member_id, "mem-1");
            assert_eq!(stage.campus_id, "main");
        }
    }

    #[test]
    fn accident_timeline_has_three_stages_at_fixed_offsets() {
        let stages = generate_accident_timeline(date(2025, 6, 1), "evt-2", "mem-2", "north");
        assert_eq!(stages.len(), 3);

        let expected = [
            (AccidentStageLabel::FirstFollowup, date(2025, 6, 4)),
            (AccidentStageLabel::SecondFollowup, date(2025, 6, 8)),
            (AccidentStageLabel::FinalFollowup, date(2025, 6, 15)),
        ];
        for (stage, (label, scheduled)) in stages.iter().zip(expected) {
            assert_eq!(stage.stage, label);
            assert_eq!(stage.scheduled_date, scheduled);
            assert!(!stage.completed && !stage.ignored);
        }
    }

    #[test]
    fn stage_ids_are_unique() {
        let stages = generate_grief_timeline(date(2025, 1, 1), "evt-1", "mem-1", "main");
        let mut ids: Vec<&str> = stages.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }
}
