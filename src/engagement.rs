//! Engagement classification from recency of last pastoral contact.
//!
//! Pure calculation, no I/O. The dashboard and the member list both route
//! through here so the buckets and the detail view can never disagree.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::EngagementThresholds;
use crate::dates;
use crate::types::EngagementStatus;

/// Days-since-contact reported for members who were never contacted (or
/// whose stored timestamp is unparseable).
pub const NEVER_CONTACTED_DAYS: i64 = 999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub status: EngagementStatus,
    pub days_since_contact: i64,
}

/// Classify a member's engagement as of `now`.
///
/// Thresholds are strict lower bounds: `days < at_risk_days` is active,
/// `at_risk_days <= days < disconnected_days` is at risk, everything else
/// disconnected. No contact at all is disconnected with the sentinel day
/// count.
pub fn classify_at(
    last_contact: Option<DateTime<Utc>>,
    thresholds: &EngagementThresholds,
    now: DateTime<Utc>,
) -> Classification {
    let Some(last) = last_contact else {
        return Classification {
            status: EngagementStatus::Disconnected,
            days_since_contact: NEVER_CONTACTED_DAYS,
        };
    };

    let days = (now - last).num_days().max(0);
    let status = if days < thresholds.at_risk_days {
        EngagementStatus::Active
    } else if days < thresholds.disconnected_days {
        EngagementStatus::AtRisk
    } else {
        EngagementStatus::Disconnected
    };

    Classification {
        status,
        days_since_contact: days,
    }
}

/// Classify as of the current instant.
pub fn classify(
    last_contact: Option<DateTime<Utc>>,
    thresholds: &EngagementThresholds,
) -> Classification {
    classify_at(last_contact, thresholds, Utc::now())
}

/// Classify from a raw stored timestamp string, for callers sitting at the
/// persistence boundary. An unparseable timestamp fails open to the most
/// conservative status, identical to no contact at all.
pub fn classify_raw(
    last_contact: Option<&str>,
    thresholds: &EngagementThresholds,
) -> Classification {
    let parsed = last_contact.and_then(dates::parse_datetime_utc);
    if last_contact.is_some() && parsed.is_none() {
        log::warn!(
            "Unparseable last-contact timestamp {:?}; treating as never contacted",
            last_contact
        );
    }
    classify(parsed, thresholds)
}
