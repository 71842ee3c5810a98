//! Dashboard aggregation service: the read path.
//!
//! Pulls every open task stream for one campus, routes each item into
//! exactly one of {today, type-specific overdue, upcoming}, and buckets
//! members by engagement. "Today" is the campus-local calendar date the
//! caller resolved from the campus timezone; all comparisons are whole
//! calendar days against it.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Utc};

use crate::config::Config;
use crate::dates;
use crate::engagement;
use crate::error::CareResult;
use crate::store::CareStore;
use crate::types::{
    BirthdayCompletion, DashboardSnapshot, EngagementStatus, Member, MemberEngagement, TaskItem,
    TaskKind,
};

/// p95 latency budget for a full aggregation run.
const DASHBOARD_LATENCY_BUDGET_MS: u128 = 300;

/// Upcoming window: (today, today + 7] in days.
const UPCOMING_WINDOW_DAYS: i64 = 7;

/// Where a dated item lands relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Today,
    Overdue { days: i64 },
    /// Past the write-off threshold; silently excluded.
    WrittenOff,
    Upcoming,
    /// More than a week out; not shown at all.
    Future,
}

/// Route a date into its bucket. `write_off_days == 0` means overdue items
/// are never written off.
fn route(date: NaiveDate, today: NaiveDate, write_off_days: i64) -> Bucket {
    if date == today {
        return Bucket::Today;
    }
    if date < today {
        let days = (today - date).num_days();
        if write_off_days == 0 || days <= write_off_days {
            return Bucket::Overdue { days };
        }
        return Bucket::WrittenOff;
    }
    if (date - today).num_days() <= UPCOMING_WINDOW_DAYS {
        Bucket::Upcoming
    } else {
        Bucket::Future
    }
}

/// Push an item into the bucket `route` picked. The today bucket ignores
/// write-off limits by construction (routing only applies them to
/// strictly-past dates).
fn place(
    mut item: TaskItem,
    bucket: Bucket,
    today_tasks: &mut Vec<TaskItem>,
    overdue: &mut Vec<TaskItem>,
    upcoming: &mut Vec<TaskItem>,
) {
    match bucket {
        Bucket::Today => today_tasks.push(item),
        Bucket::Overdue { days } => {
            item.days_overdue = Some(days);
            overdue.push(item);
        }
        Bucket::Upcoming => upcoming.push(item),
        Bucket::WrittenOff | Bucket::Future => {}
    }
}

/// Compute the full snapshot for one campus and one local calendar date.
///
/// The five source collections have no data dependency on each other, so
/// they are fetched concurrently; only the merge is sequential.
pub async fn compute_dashboard(
    store: &dyn CareStore,
    config: &Config,
    campus_id: &str,
    today: NaiveDate,
) -> CareResult<DashboardSnapshot> {
    let started = std::time::Instant::now();

    let (members, grief, accident, aid, completions) = tokio::join!(
        store.members_for_campus(campus_id),
        store.open_grief_stages(campus_id),
        store.open_accident_stages(campus_id),
        store.active_aid_schedules(campus_id),
        store.birthday_completions(campus_id, today.year()),
    );
    let members = members?;
    let grief = grief?;
    let accident = accident?;
    let aid = aid?;
    let completions = completions?;

    let by_id: HashMap<&str, &Member> = members.iter().map(|m| (m.id.as_str(), m)).collect();
    let resolved_birthdays: HashMap<&str, &BirthdayCompletion> = completions
        .iter()
        .map(|c| (c.member_id.as_str(), c))
        .collect();

    let mut today_tasks: Vec<TaskItem> = Vec::new();
    let mut grief_today: Vec<TaskItem> = Vec::new();
    let mut accident_followup: Vec<TaskItem> = Vec::new();
    let mut financial_aid_due: Vec<TaskItem> = Vec::new();
    let mut overdue_birthdays: Vec<TaskItem> = Vec::new();
    let mut upcoming_tasks: Vec<TaskItem> = Vec::new();

    for stage in &grief {
        let Some(member) = by_id.get(stage.member_id.as_str()) else {
            log::warn!(
                "Grief stage {} references unknown member {}; skipping",
                stage.id,
                stage.member_id
            );
            continue;
        };
        let item = TaskItem {
            kind: TaskKind::GriefSupport,
            id: stage.id.clone(),
            member_id: stage.member_id.clone(),
            member_name: member.name.clone(),
            campus_id: campus_id.to_string(),
            title: format!("Grief follow-up ({})", stage.stage.display_name()),
            date: stage.scheduled_date,
            stage: Some(stage.stage.as_str().to_string()),
            amount: None,
            days_overdue: None,
            completed: false,
        };
        let bucket = route(
            stage.scheduled_date,
            today,
            config.write_off.for_kind(TaskKind::GriefSupport),
        );
        place(item, bucket, &mut today_tasks, &mut grief_today, &mut upcoming_tasks);
    }

    for stage in &accident {
        let Some(member) = by_id.get(stage.member_id.as_str()) else {
            log::warn!(
                "Accident stage {} references unknown member {}; skipping",
                stage.id,
                stage.member_id
            );
            continue;
        };
        let item = TaskItem {
            kind: TaskKind::AccidentIllness,
            id: stage.id.clone(),
            member_id: stage.member_id.clone(),
            member_name: member.name.clone(),
            campus_id: campus_id.to_string(),
            title: format!("Accident/illness {}", stage.stage.display_name()),
            date: stage.scheduled_date,
            stage: Some(stage.stage.as_str().to_string()),
            amount: None,
            days_overdue: None,
            completed: false,
        };
        let bucket = route(
            stage.scheduled_date,
            today,
            config.write_off.for_kind(TaskKind::AccidentIllness),
        );
        place(
            item,
            bucket,
            &mut today_tasks,
            &mut accident_followup,
            &mut upcoming_tasks,
        );
    }

    for schedule in &aid {
        let Some(member) = by_id.get(schedule.member_id.as_str()) else {
            log::warn!(
                "Aid schedule {} references unknown member {}; skipping",
                schedule.id,
                schedule.member_id
            );
            continue;
        };
        let item = TaskItem {
            kind: TaskKind::FinancialAid,
            id: schedule.id.clone(),
            member_id: schedule.member_id.clone(),
            member_name: member.name.clone(),
            campus_id: campus_id.to_string(),
            title: schedule.aid_type.clone(),
            date: schedule.next_occurrence,
            stage: None,
            amount: Some(schedule.aid_amount),
            days_overdue: None,
            completed: false,
        };
        let bucket = route(
            schedule.next_occurrence,
            today,
            config.write_off.for_kind(TaskKind::FinancialAid),
        );
        place(
            item,
            bucket,
            &mut today_tasks,
            &mut financial_aid_due,
            &mut upcoming_tasks,
        );
    }

    // Birthdays: derived from members, not stored as tasks. The calendar
    // birthday is the member's birth date with this year substituted.
    for member in &members {
        if member.is_archived {
            continue;
        }
        let Some(birth_date) = member.birth_date else {
            continue;
        };
        let occurrence = dates::birthday_in_year(birth_date, today.year());
        let resolution = resolved_birthdays.get(member.id.as_str());

        let item = TaskItem {
            kind: TaskKind::Birthday,
            id: member.id.clone(),
            member_id: member.id.clone(),
            member_name: member.name.clone(),
            campus_id: campus_id.to_string(),
            title: "Birthday".to_string(),
            date: occurrence,
            stage: None,
            amount: None,
            days_overdue: None,
            completed: resolution.map(|c| !c.ignored).unwrap_or(false),
        };
        match route(occurrence, today, config.write_off.for_kind(TaskKind::Birthday)) {
            // Today shows the birthday even once acted on, so staff can
            // see who already called.
            Bucket::Today => today_tasks.push(item),
            Bucket::Overdue { days } => {
                // A completion or dismissal for this year retires it.
                if resolution.is_none() {
                    let mut item = item;
                    item.days_overdue = Some(days);
                    overdue_birthdays.push(item);
                }
            }
            Bucket::Upcoming => upcoming_tasks.push(item),
            Bucket::WrittenOff | Bucket::Future => {}
        }
    }

    // Engagement buckets. Archived members are out of active care and are
    // not classified; the total still counts every fetched member.
    let mut at_risk_members: Vec<MemberEngagement> = Vec::new();
    let mut disconnected_members: Vec<MemberEngagement> = Vec::new();
    for member in &members {
        if member.is_archived {
            continue;
        }
        let classification = engagement::classify(member.last_contact_date, &config.engagement);
        let annotated = MemberEngagement {
            member_id: member.id.clone(),
            name: member.name.clone(),
            campus_id: campus_id.to_string(),
            status: classification.status,
            days_since_contact: classification.days_since_contact,
            last_contact_date: member.last_contact_date,
        };
        match classification.status {
            EngagementStatus::AtRisk => at_risk_members.push(annotated),
            EngagementStatus::Disconnected => disconnected_members.push(annotated),
            EngagementStatus::Active => {}
        }
    }

    // Deterministic ordering: upcoming ascending by date (the view sorts
    // nothing else), the rest stable for display and tests.
    upcoming_tasks.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
    for list in [&mut grief_today, &mut accident_followup, &mut financial_aid_due, &mut overdue_birthdays] {
        list.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
    }
    today_tasks.sort_by(|a, b| a.member_name.cmp(&b.member_name).then_with(|| a.id.cmp(&b.id)));
    at_risk_members.sort_by(|a, b| b.days_since_contact.cmp(&a.days_since_contact));
    disconnected_members.sort_by(|a, b| b.days_since_contact.cmp(&a.days_since_contact));

    let total_tasks = today_tasks.len()
        + grief_today.len()
        + accident_followup.len()
        + financial_aid_due.len()
        + overdue_birthdays.len()
        + upcoming_tasks.len();

    let snapshot = DashboardSnapshot {
        campus_id: campus_id.to_string(),
        date: today,
        today_tasks,
        grief_today,
        accident_followup,
        financial_aid_due,
        overdue_birthdays,
        upcoming_tasks,
        at_risk_members,
        disconnected_members,
        total_tasks,
        total_members: members.len(),
        computed_at: Utc::now(),
    };

    let elapsed_ms = started.elapsed().as_millis();
    if elapsed_ms > DASHBOARD_LATENCY_BUDGET_MS {
        log::warn!(
            "compute_dashboard({campus_id}) exceeded latency budget: {elapsed_ms}ms > {DASHBOARD_LATENCY_BUDGET_MS}ms"
        );
    } else {
        log::debug!("compute_dashboard({campus_id}) completed in {elapsed_ms}ms");
    }

    Ok(snapshot)
}
