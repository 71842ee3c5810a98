//! Write path for care events: grief and accident/illness timelines,
//! stage resolution, and birthday completion records.
//!
//! Every mutation here changes what the dashboard should show; callers go
//! through `CareEngine`, which invalidates the campus cache after each of
//! these returns.

use chrono::{NaiveDate, Utc};

use crate::error::{CareError, CareResult};
use crate::store::CareStore;
use crate::timeline;
use crate::types::{AccidentFollowupStage, BirthdayCompletion, GriefStage, Member};

async fn require_member(store: &dyn CareStore, member_id: &str) -> CareResult<Member> {
    store
        .member(member_id)
        .await?
        .ok_or_else(|| CareError::not_found("member", member_id))
}

/// Materialize the six grief follow-up stages for a loss.
///
/// One timeline per care event: a second call for the same event id is
/// rejected rather than silently duplicating follow-ups.
pub async fn create_grief_timeline(
    store: &dyn CareStore,
    anchor: NaiveDate,
    care_event_id: &str,
    member_id: &str,
) -> CareResult<Vec<GriefStage>> {
    let member = require_member(store, member_id).await?;

    let existing = store.grief_stages_for_event(care_event_id).await?;
    if !existing.is_empty() {
        return Err(CareError::Validation(format!(
            "Grief timeline already exists for event {care_event_id}"
        )));
    }

    let stages =
        timeline::generate_grief_timeline(anchor, care_event_id, member_id, &member.campus_id);
    store.insert_grief_stages(stages.clone()).await?;
    log::info!(
        "Created grief timeline for member {member_id} (event {care_event_id}, anchor {anchor})"
    );
    Ok(stages)
}

/// Materialize the three accident/illness follow-up stages.
pub async fn create_accident_timeline(
    store: &dyn CareStore,
    anchor: NaiveDate,
    care_event_id: &str,
    member_id: &str,
    campus_id: &str,
) -> CareResult<Vec<AccidentFollowupStage>> {
    require_member(store, member_id).await?;

    let existing = store.accident_stages_for_event(care_event_id).await?;
    if !existing.is_empty() {
        return Err(CareError::Validation(format!(
            "Accident timeline already exists for event {care_event_id}"
        )));
    }

    let stages =
        timeline::generate_accident_timeline(anchor, care_event_id, member_id, campus_id);
    store.insert_accident_stages(stages.clone()).await?;
    log::info!(
        "Created accident timeline for member {member_id} (event {care_event_id}, anchor {anchor})"
    );
    Ok(stages)
}

/// Mark a grief stage done. Completing a follow-up is a pastoral contact,
/// so the member's last-contact date advances too (best effort: a missing
/// member record downgrades to a log line, the completion still lands).
pub async fn complete_grief_stage(
    store: &dyn CareStore,
    stage_id: &str,
    completed_by: &str,
    notes: Option<String>,
) -> CareResult<GriefStage> {
    let mut stage = store
        .grief_stage(stage_id)
        .await?
        .ok_or_else(|| CareError::not_found("grief stage", stage_id))?;
    if stage.completed || stage.ignored {
        return Err(CareError::Validation(format!(
            "Grief stage {stage_id} is already resolved"
        )));
    }

    let now = Utc::now();
    stage.completed = true;
    stage.completed_by = Some(completed_by.to_string());
    stage.completed_at = Some(now);
    if notes.is_some() {
        stage.notes = notes;
    }
    store.update_grief_stage(stage.clone()).await?;

    if let Err(e) = store.update_member_last_contact(&stage.member_id, now).await {
        log::warn!(
            "Completed grief stage {stage_id} but could not update last contact for {}: {e}",
            stage.member_id
        );
    }
    Ok(stage)
}

/// Dismiss a grief stage without contact.
pub async fn ignore_grief_stage(
    store: &dyn CareStore,
    stage_id: &str,
    ignored_by: &str,
    notes: Option<String>,
) -> CareResult<GriefStage> {
    let mut stage = store
        .grief_stage(stage_id)
        .await?
        .ok_or_else(|| CareError::not_found("grief stage", stage_id))?;
    if stage.completed || stage.ignored {
        return Err(CareError::Validation(format!(
            "Grief stage {stage_id} is already resolved"
        )));
    }

    stage.ignored = true;
    stage.ignored_by = Some(ignored_by.to_string());
    stage.ignored_at = Some(Utc::now());
    if notes.is_some() {
        stage.notes = notes;
    }
    store.update_grief_stage(stage.clone()).await?;
    Ok(stage)
}

/// Mark an accident/illness stage done; advances last contact like grief.
pub async fn complete_accident_stage(
    store: &dyn CareStore,
    stage_id: &str,
    completed_by: &str,
    notes: Option<String>,
) -> CareResult<AccidentFollowupStage> {
    let mut stage = store
        .accident_stage(stage_id)
        .await?
        .ok_or_else(|| CareError::not_found("accident stage", stage_id))?;
    if stage.completed || stage.ignored {
        return Err(CareError::Validation(format!(
            "Accident stage {stage_id} is already resolved"
        )));
    }

    let now = Utc::now();
    stage.completed = true;
    stage.completed_by = Some(completed_by.to_string());
    stage.completed_at = Some(now);
    if notes.is_some() {
        stage.notes = notes;
    }
    store.update_accident_stage(stage.clone()).await?;

    if let Err(e) = store.update_member_last_contact(&stage.member_id, now).await {
        log::warn!(
            "Completed accident stage {stage_id} but could not update last contact for {}: {e}",
            stage.member_id
        );
    }
    Ok(stage)
}

/// Dismiss an accident/illness stage without contact.
pub async fn ignore_accident_stage(
    store: &dyn CareStore,
    stage_id: &str,
    ignored_by: &str,
    notes: Option<String>,
) -> CareResult<AccidentFollowupStage> {
    let mut stage = store
        .accident_stage(stage_id)
        .await?
        .ok_or_else(|| CareError::not_found("accident stage", stage_id))?;
    if stage.completed || stage.ignored {
        return Err(CareError::Validation(format!(
            "Accident stage {stage_id} is already resolved"
        )));
    }

    stage.ignored = true;
    stage.ignored_by = Some(ignored_by.to_string());
    stage.ignored_at = Some(Utc::now());
    if notes.is_some() {
        stage.notes = notes;
    }
    store.update_accident_stage(stage.clone()).await?;
    Ok(stage)
}

/// Remove every follow-up stage belonging to a deleted care event, across
/// both timeline types. Returns how many stages went away.
pub async fn delete_event_timelines(
    store: &dyn CareStore,
    care_event_id: &str,
) -> CareResult<usize> {
    let grief = store.delete_grief_stages_for_event(care_event_id).await?;
    let accident = store
        .delete_accident_stages_for_event(care_event_id)
        .await?;
    if grief + accident > 0 {
        log::info!(
            "Deleted {} stages for care event {care_event_id}",
            grief + accident
        );
    }
    Ok(grief + accident)
}

async fn record_birthday(
    store: &dyn CareStore,
    member_id: &str,
    year: i32,
    actor: &str,
    ignored: bool,
) -> CareResult<BirthdayCompletion> {
    let member = require_member(store, member_id).await?;

    let already = store
        .birthday_completions(&member.campus_id, year)
        .await?
        .into_iter()
        .any(|c| c.member_id == member_id);
    if already {
        return Err(CareError::Validation(format!(
            "Birthday for {member_id} already resolved for {year}"
        )));
    }

    let now = Utc::now();
    let completion = BirthdayCompletion {
        id: uuid::Uuid::new_v4().to_string(),
        member_id: member_id.to_string(),
        campus_id: member.campus_id.clone(),
        year,
        ignored,
        completed_by: Some(actor.to_string()),
        completed_at: now,
    };
    store.insert_birthday_completion(completion.clone()).await?;

    if !ignored {
        if let Err(e) = store.update_member_last_contact(member_id, now).await {
            log::warn!("Could not update last contact for {member_id}: {e}");
        }
    }
    Ok(completion)
}

/// Record that a member's birthday was acted on this year.
pub async fn complete_birthday(
    store: &dyn CareStore,
    member_id: &str,
    year: i32,
    completed_by: &str,
) -> CareResult<BirthdayCompletion> {
    record_birthday(store, member_id, year, completed_by, false).await
}

/// Dismiss a member's birthday for this year without contact.
pub async fn ignore_birthday(
    store: &dyn CareStore,
    member_id: &str,
    year: i32,
    ignored_by: &str,
) -> CareResult<BirthdayCompletion> {
    record_birthday(store, member_id, year, ignored_by, true).await
}
