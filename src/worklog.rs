//! Unified worklog aggregate shared by both backends.

use chrono::{DateTime, Duration, Timelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use worklog_api::{TempoWorklog, TogglWorklog};

static ISSUE_KEY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][A-Z0-9]*-\d+\b").expect("invalid issue key regex"));

/// One logged time entry as seen by both backends.
///
/// `toggl` and `tempo` are back-references to the last record known to be
/// persisted in each backend. `None` means the entry is not present there.
#[derive(Debug, Clone, PartialEq)]
pub struct Worklog {
    start: DateTime<Utc>,
    pub duration: Duration,
    pub description: String,
    pub toggl: Option<TogglWorklog>,
    pub tempo: Option<TempoWorklog>,
}

impl Worklog {
    /// Creates a local, never synchronized worklog.
    pub fn new(start: DateTime<Utc>, duration: Duration, description: impl Into<String>) -> Self {
        Self {
            start: truncate_to_minute(start),
            duration,
            description: description.into(),
            toggl: None,
            tempo: None,
        }
    }

    /// Placeholder for a Tempo entry that has no Toggl counterpart.
    pub fn tempo_only(start: DateTime<Utc>, tempo: TempoWorklog) -> Self {
        Self {
            start: truncate_to_minute(start),
            duration: Duration::seconds(tempo.time_spent_seconds),
            description: tempo.description.clone(),
            toggl: None,
            tempo: Some(tempo),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn set_start(&mut self, start: DateTime<Utc>) {
        self.start = truncate_to_minute(start);
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.start + self.duration
    }

    /// First Jira-style issue key mentioned in the description.
    pub fn issue_key(&self) -> Option<&str> {
        ISSUE_KEY_REGEX
            .find(&self.description)
            .map(|found| found.as_str())
    }

    /// Description with a leading issue key and its separator removed.
    pub fn summary(&self) -> &str {
        let trimmed = self.description.trim();
        match ISSUE_KEY_REGEX.find(trimmed) {
            Some(found) if found.start() == 0 => trimmed[found.end()..]
                .trim_start_matches(|c: char| c.is_whitespace() || c == ':' || c == '-')
                .trim_end(),
            _ => trimmed,
        }
    }

    pub fn is_local_only(&self) -> bool {
        self.toggl.is_none() && self.tempo.is_none()
    }
}

pub fn truncate_to_minute(value: DateTime<Utc>) -> DateTime<Utc> {
    value
        .with_second(0)
        .and_then(|dt| dt.with_nanosecond(0))
        .unwrap_or(value)
}
