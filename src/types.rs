//! Domain records and dashboard payload types.
//!
//! Records mirror the persistence collections (members, grief stages,
//! accident follow-ups, aid schedules, birthday completions) with dates
//! already parsed to chrono values at the store boundary. Payload types at
//! the bottom are the serialized dashboard surface and use camelCase for
//! the frontend.

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

// =============================================================================
// Members
// =============================================================================

/// A church member under pastoral care. Owned by the CRUD layer; the core
/// reads it and, on task completion, advances `last_contact_date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub campus_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_contact_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_archived: bool,
}

/// Engagement classification derived from recency of last pastoral contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementStatus {
    Active,
    AtRisk,
    Disconnected,
}

impl EngagementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngagementStatus::Active => "active",
            EngagementStatus::AtRisk => "at_risk",
            EngagementStatus::Disconnected => "disconnected",
        }
    }
}

// =============================================================================
// Grief support timeline
// =============================================================================

/// The six fixed grief follow-up stages, in timeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GriefStageLabel {
    OneWeek,
    TwoWeeks,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
}

impl GriefStageLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            GriefStageLabel::OneWeek => "1_week",
            GriefStageLabel::TwoWeeks => "2_weeks",
            GriefStageLabel::OneMonth => "1_month",
            GriefStageLabel::ThreeMonths => "3_months",
            GriefStageLabel::SixMonths => "6_months",
            GriefStageLabel::OneYear => "1_year",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GriefStageLabel::OneWeek => "1 week",
            GriefStageLabel::TwoWeeks => "2 weeks",
            GriefStageLabel::OneMonth => "1 month",
            GriefStageLabel::ThreeMonths => "3 months",
            GriefStageLabel::SixMonths => "6 months",
            GriefStageLabel::OneYear => "1 year",
        }
    }
}

/// One scheduled grief follow-up. Exactly six exist per triggering care
/// event; created as a batch, deleted as a batch with the event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GriefStage {
    pub id: String,
    pub care_event_id: String,
    pub member_id: String,
    pub campus_id: String,
    pub stage: GriefStageLabel,
    pub scheduled_date: NaiveDate,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ignored: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignored_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignored_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reminder_sent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// =============================================================================
// Accident / illness follow-up timeline
// =============================================================================

/// The three fixed accident/illness follow-up stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccidentStageLabel {
    FirstFollowup,
    SecondFollowup,
    FinalFollowup,
}

impl AccidentStageLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccidentStageLabel::FirstFollowup => "first_followup",
            AccidentStageLabel::SecondFollowup => "second_followup",
            AccidentStageLabel::FinalFollowup => "final_followup",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AccidentStageLabel::FirstFollowup => "first follow-up",
            AccidentStageLabel::SecondFollowup => "second follow-up",
            AccidentStageLabel::FinalFollowup => "final follow-up",
        }
    }
}

/// One scheduled accident/illness follow-up. Same lifecycle as grief
/// stages, three per triggering event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccidentFollowupStage {
    pub id: String,
    pub care_event_id: String,
    pub member_id: String,
    pub campus_id: String,
    pub stage: AccidentStageLabel,
    pub scheduled_date: NaiveDate,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ignored: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignored_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignored_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reminder_sent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// =============================================================================
// Financial aid schedules
// =============================================================================

/// Disbursement frequency. Unrecognized labels from older data parse as
/// `OneTime`; such schedules never advance (see `recurrence`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum AidFrequency {
    Weekly,
    Monthly,
    Annually,
    OneTime,
}

impl AidFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            AidFrequency::Weekly => "weekly",
            AidFrequency::Monthly => "monthly",
            AidFrequency::Annually => "annually",
            AidFrequency::OneTime => "one_time",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "weekly" => AidFrequency::Weekly,
            "monthly" => AidFrequency::Monthly,
            "annually" => AidFrequency::Annually,
            _ => AidFrequency::OneTime,
        }
    }
}

impl From<String> for AidFrequency {
    fn from(label: String) -> Self {
        AidFrequency::from_label(&label)
    }
}

/// A recurring financial-aid disbursement schedule.
///
/// Exactly one of the anchor fields is meaningful for the frequency:
/// `day_of_week` (weekly), `day_of_month` (monthly), or
/// `month_of_year` + `day_of_month` (annual). `next_occurrence` is the
/// earliest unresolved date and is advanced on each distribution or skip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialAidSchedule {
    pub id: String,
    pub member_id: String,
    pub campus_id: String,
    pub aid_type: String,
    pub aid_amount: f64,
    pub frequency: AidFrequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<Weekday>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month_of_year: Option<u32>,
    pub next_occurrence: NaiveDate,
    #[serde(default)]
    pub ignored_occurrences: Vec<NaiveDate>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub occurrences_completed: u32,
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Birthday completion records
// =============================================================================

/// First-class per-member-per-year birthday resolution, keyed by
/// `(member_id, year)`. Replaces the side-table scan of generic care
/// events the source system used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BirthdayCompletion {
    pub id: String,
    pub member_id: String,
    pub campus_id: String,
    pub year: i32,
    /// true when the birthday was dismissed rather than acted on.
    #[serde(default)]
    pub ignored: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<String>,
    pub completed_at: DateTime<Utc>,
}

// =============================================================================
// Dashboard payloads (serialized surface)
// =============================================================================

/// Task type, also the key space of the write-off threshold config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    GriefSupport,
    AccidentIllness,
    FinancialAid,
    Birthday,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::GriefSupport => "grief_support",
            TaskKind::AccidentIllness => "accident_illness",
            TaskKind::FinancialAid => "financial_aid",
            TaskKind::Birthday => "birthday",
        }
    }
}

/// One task as rendered on the dashboard, regardless of its source
/// collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskItem {
    pub kind: TaskKind,
    /// Source record id (stage id, schedule id, or member id for birthdays).
    pub id: String,
    pub member_id: String,
    pub member_name: String,
    pub campus_id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_overdue: Option<i64>,
    /// Only meaningful for birthdays in `today_tasks`: someone already
    /// acted on this one.
    #[serde(default)]
    pub completed: bool,
}

/// A member annotated with engagement classification, for the at-risk and
/// disconnected dashboard buckets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberEngagement {
    pub member_id: String,
    pub name: String,
    pub campus_id: String,
    pub status: EngagementStatus,
    pub days_since_contact: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_contact_date: Option<DateTime<Utc>>,
}

/// The per-campus, per-local-day aggregate the cache stores.
///
/// Bucket routing is mutually exclusive by construction: a task lands in
/// `today_tasks` (exact date), one type-specific overdue list (strictly
/// past, within write-off), or `upcoming_tasks` (within the next seven
/// days), never more than one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub campus_id: String,
    pub date: NaiveDate,
    pub today_tasks: Vec<TaskItem>,
    pub grief_today: Vec<TaskItem>,
    pub accident_followup: Vec<TaskItem>,
    pub financial_aid_due: Vec<TaskItem>,
    pub overdue_birthdays: Vec<TaskItem>,
    pub upcoming_tasks: Vec<TaskItem>,
    pub at_risk_members: Vec<MemberEngagement>,
    pub disconnected_members: Vec<MemberEngagement>,
    pub total_tasks: usize,
    pub total_members: usize,
    pub computed_at: DateTime<Utc>,
}
