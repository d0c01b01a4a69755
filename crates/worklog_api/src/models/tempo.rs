use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Tempo worklog flattened to the fields a sync cares about.
///
/// `start_date`/`start_time` are the author's local wall clock. `updated_at`
/// is maintained by Tempo and ignored when writing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TempoWorklog {
    pub id: Option<u64>,
    pub issue_key: String,
    pub time_spent_seconds: i64,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub description: String,
    pub author_account_id: String,
    pub updated_at: Option<String>,
}

/// Worklog shape returned by Tempo Core v3.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TempoWorklogPayload {
    pub tempo_worklog_id: u64,
    pub issue: TempoIssueRef,
    pub time_spent_seconds: i64,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    #[serde(default)]
    pub description: Option<String>,
    pub author: TempoAuthorRef,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TempoIssueRef {
    pub key: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TempoAuthorRef {
    pub account_id: String,
}

impl From<TempoWorklogPayload> for TempoWorklog {
    fn from(payload: TempoWorklogPayload) -> Self {
        Self {
            id: Some(payload.tempo_worklog_id),
            issue_key: payload.issue.key,
            time_spent_seconds: payload.time_spent_seconds,
            start_date: payload.start_date,
            start_time: payload.start_time,
            description: payload.description.unwrap_or_default(),
            author_account_id: payload.author.account_id,
            updated_at: payload.updated_at,
        }
    }
}

/// One page of a Tempo list endpoint.
#[derive(Debug, Deserialize, Clone)]
pub struct TempoPage<T> {
    #[serde(default)]
    pub metadata: TempoPageMetadata,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TempoPageMetadata {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub next: Option<String>,
}

/// Body accepted by the Tempo create and update endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TempoWorklogRequest<'a> {
    pub issue_key: &'a str,
    pub time_spent_seconds: i64,
    pub start_date: String,
    pub start_time: String,
    pub description: &'a str,
    pub author_account_id: &'a str,
}

impl<'a> From<&'a TempoWorklog> for TempoWorklogRequest<'a> {
    fn from(worklog: &'a TempoWorklog) -> Self {
        Self {
            issue_key: &worklog.issue_key,
            time_spent_seconds: worklog.time_spent_seconds,
            start_date: worklog.start_date.format("%Y-%m-%d").to_string(),
            start_time: worklog.start_time.format("%H:%M:%S").to_string(),
            description: &worklog.description,
            author_account_id: &worklog.author_account_id,
        }
    }
}
