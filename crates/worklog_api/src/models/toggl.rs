use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Toggl Track time entry as returned by the v9 API.
///
/// `duration` is in seconds and negative while the entry is a running timer.
/// `at` is the server modification stamp and is never sent back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TogglWorklog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub workspace_id: u64,
    #[serde(default)]
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub stop: Option<DateTime<Utc>>,
    pub duration: i64,
    #[serde(default)]
    pub project_id: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub billable: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing)]
    pub at: Option<DateTime<Utc>>,
}

impl TogglWorklog {
    pub fn is_running(&self) -> bool {
        self.duration < 0
    }
}
