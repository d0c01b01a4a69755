//! Toggl Track v9 time entry endpoints.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;

use crate::client::ApiClient;
use crate::config::{ClientConfig, DEFAULT_USER_AGENT};
use crate::error::{ApiError, Result};
use crate::models::TogglWorklog;
use crate::rate_limiter::RateLimiter;

#[derive(Clone)]
pub struct TogglClient {
    api: ApiClient,
}

impl TogglClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(config)?,
        })
    }

    pub fn new_with_limiter(config: ClientConfig, limiter: RateLimiter) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new_with_limiter(config, limiter)?,
        })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Lists the current user's time entries started between `start` and `end`, both inclusive.
    pub async fn time_entries(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<TogglWorklog>> {
        // Toggl treats end_date as exclusive.
        let end_exclusive = end
            .checked_add_days(Days::new(1))
            .ok_or_else(|| ApiError::Validation(format!("end date {} out of range", end)))?;
        let query = [
            ("start_date", start.format("%Y-%m-%d").to_string()),
            ("end_date", end_exclusive.format("%Y-%m-%d").to_string()),
        ];
        self.api.get_with_query("me/time_entries", &query).await
    }

    pub async fn create_time_entry(&self, entry: &TogglWorklog) -> Result<TogglWorklog> {
        let path = format!("workspaces/{}/time_entries", workspace_of(entry)?);
        self.api.post(&path, &TimeEntryRequest::from(entry)).await
    }

    pub async fn update_time_entry(&self, entry: &TogglWorklog) -> Result<TogglWorklog> {
        let id = entry
            .id
            .ok_or_else(|| ApiError::Validation("time entry has no id to update".to_string()))?;
        let path = format!("workspaces/{}/time_entries/{}", workspace_of(entry)?, id);
        self.api.put(&path, &TimeEntryRequest::from(entry)).await
    }

    pub async fn delete_time_entry(&self, workspace_id: u64, id: u64) -> Result<()> {
        let path = format!("workspaces/{}/time_entries/{}", workspace_id, id);
        self.api.delete(&path).await
    }
}

fn workspace_of(entry: &TogglWorklog) -> Result<u64> {
    if entry.workspace_id == 0 {
        Err(ApiError::Validation(
            "time entry has no workspace id".to_string(),
        ))
    } else {
        Ok(entry.workspace_id)
    }
}

#[derive(Debug, Serialize)]
struct TimeEntryRequest<'a> {
    created_with: &'a str,
    workspace_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    start: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<DateTime<Utc>>,
    duration: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<u64>,
    billable: bool,
    tags: &'a [String],
}

impl<'a> From<&'a TogglWorklog> for TimeEntryRequest<'a> {
    fn from(entry: &'a TogglWorklog) -> Self {
        Self {
            created_with: DEFAULT_USER_AGENT,
            workspace_id: entry.workspace_id,
            description: entry.description.as_deref(),
            start: entry.start,
            stop: entry.stop,
            duration: entry.duration,
            project_id: entry.project_id,
            billable: entry.billable,
            tags: &entry.tags,
        }
    }
}
