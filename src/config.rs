//! Deployment configuration: campus registry, write-off thresholds, and
//! engagement thresholds.
//!
//! Stored in `~/.shepherd/config.json`. Every field has a serde default so
//! a missing file, a missing section, or a missing key falls back to the
//! documented defaults rather than erroring. The dashboard must keep
//! working on a blank install.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::types::TaskKind;

/// Timezone used when a campus is unknown or its IANA name fails to parse.
pub const FALLBACK_TIMEZONE: Tz = chrono_tz::America::New_York;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Campus id -> campus settings (timezone, display name).
    #[serde(default)]
    pub campuses: HashMap<String, CampusSettings>,
    #[serde(default)]
    pub write_off: WriteOffThresholds,
    #[serde(default)]
    pub engagement: EngagementThresholds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampusSettings {
    /// IANA timezone name, e.g. "America/Chicago".
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Days a task may stay overdue before it drops off the needs-attention
/// view. 0 means never written off.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteOffThresholds {
    #[serde(default = "default_birthday_writeoff")]
    pub birthday: i64,
    #[serde(default)]
    pub financial_aid: i64,
    #[serde(default = "default_followup_writeoff")]
    pub accident_illness: i64,
    #[serde(default = "default_followup_writeoff")]
    pub grief_support: i64,
}

fn default_birthday_writeoff() -> i64 {
    7
}

fn default_followup_writeoff() -> i64 {
    14
}

impl Default for WriteOffThresholds {
    fn default() -> Self {
        Self {
            birthday: default_birthday_writeoff(),
            financial_aid: 0,
            accident_illness: default_followup_writeoff(),
            grief_support: default_followup_writeoff(),
        }
    }
}

impl WriteOffThresholds {
    pub fn for_kind(&self, kind: TaskKind) -> i64 {
        match kind {
            TaskKind::Birthday => self.birthday,
            TaskKind::FinancialAid => self.financial_aid,
            TaskKind::AccidentIllness => self.accident_illness,
            TaskKind::GriefSupport => self.grief_support,
        }
    }
}

/// Day counts separating active / at_risk / disconnected members.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementThresholds {
    #[serde(default = "default_at_risk_days")]
    pub at_risk_days: i64,
    #[serde(default = "default_disconnected_days")]
    pub disconnected_days: i64,
}

fn default_at_risk_days() -> i64 {
    60
}

fn default_disconnected_days() -> i64 {
    90
}

impl Default for EngagementThresholds {
    fn default() -> Self {
        Self {
            at_risk_days: default_at_risk_days(),
            disconnected_days: default_disconnected_days(),
        }
    }
}

impl Config {
    /// Resolve a campus's timezone. Unknown campuses and unparseable IANA
    /// names fall back to [`FALLBACK_TIMEZONE`], logged once per call.
    pub fn campus_timezone(&self, campus_id: &str) -> Tz {
        let Some(settings) = self.campuses.get(campus_id) else {
            log::warn!(
                "No campus settings for {campus_id}; using {FALLBACK_TIMEZONE}"
            );
            return FALLBACK_TIMEZONE;
        };
        settings.timezone.parse().unwrap_or_else(|_| {
            log::warn!(
                "Campus {campus_id} has invalid timezone {:?}; using {FALLBACK_TIMEZONE}",
                settings.timezone
            );
            FALLBACK_TIMEZONE
        })
    }
}

/// Get the canonical config file path (~/.shepherd/config.json)
pub fn config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".shepherd").join("config.json"))
}

/// Load configuration from the canonical path, or defaults if absent.
pub fn load_config() -> Config {
    match config_path() {
        Ok(path) => load_config_from(&path),
        Err(e) => {
            log::warn!("Config path unavailable ({e}); using defaults");
            Config::default()
        }
    }
}

/// Load configuration from an explicit path. A missing or unreadable file
/// yields defaults; a file that parses partially fills the rest from serde
/// defaults.
pub fn load_config_from(path: &Path) -> Config {
    if !path.exists() {
        log::info!("No config at {}; using defaults", path.display());
        return Config::default();
    }

    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Failed to read config {}: {e}; using defaults", path.display());
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Failed to parse config {}: {e}; using defaults", path.display());
            Config::default()
        }
    }
}
