//! Mapping between the unified worklog and each backend's record.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Timelike, Utc};
use worklog_api::{TempoWorklog, TogglWorklog};

use crate::worklog::{truncate_to_minute, Worklog};

/// Pure converter. Holds the per-account values the backends need that a
/// worklog does not carry itself.
#[derive(Debug, Clone)]
pub struct WorklogConverter {
    workspace_id: u64,
    author_account_id: String,
    offset: FixedOffset,
}

impl WorklogConverter {
    /// `offset` is the wall-clock offset Tempo dates and times are expressed in.
    pub fn new(workspace_id: u64, author_account_id: impl Into<String>, offset: FixedOffset) -> Self {
        Self {
            workspace_id,
            author_account_id: author_account_id.into(),
            offset,
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn from_toggl(&self, record: &TogglWorklog) -> Worklog {
        let mut worklog = Worklog::new(
            record.start,
            Duration::seconds(record.duration.max(0)),
            record.description.clone().unwrap_or_default(),
        );
        worklog.toggl = Some(record.clone());
        worklog
    }

    /// Writes the worklog's fields into `record`. Values the record already
    /// matches at minute precision are left as stored, so a loaded entry with
    /// seconds in its start or a null description compares unchanged.
    pub fn update_toggl(&self, record: &mut TogglWorklog, worklog: &Worklog) {
        if record.workspace_id == 0 {
            record.workspace_id = self.workspace_id;
        }
        let duration = worklog.duration.num_seconds();
        let start_kept = truncate_to_minute(record.start) == worklog.start();
        if !start_kept {
            record.start = worklog.start();
        }
        let stop = record.start + worklog.duration;
        if !(start_kept && record.duration == duration && record.stop.is_none()) {
            record.stop = Some(stop);
        }
        record.duration = duration;
        if record.description.as_deref().unwrap_or_default() != worklog.description {
            record.description = Some(worklog.description.clone());
        }
    }

    pub fn update_tempo(&self, record: &mut TempoWorklog, worklog: &Worklog) {
        let local = worklog.start().with_timezone(&self.offset).naive_local();
        record.issue_key = worklog.issue_key().unwrap_or_default().to_string();
        record.time_spent_seconds = worklog.duration.num_seconds();
        let stored = NaiveDateTime::new(record.start_date, record.start_time);
        if stored.with_second(0).and_then(|at| at.with_nanosecond(0)) != Some(local) {
            record.start_date = local.date();
            record.start_time = local.time();
        }
        record.description = worklog.summary().to_string();
        if record.author_account_id.is_empty() {
            record.author_account_id = self.author_account_id.clone();
        }
    }

    /// Start of a Tempo record as an instant, interpreting its wall clock in
    /// the configured offset.
    pub fn tempo_start(&self, record: &TempoWorklog) -> DateTime<Utc> {
        let naive = NaiveDateTime::new(record.start_date, record.start_time);
        DateTime::<Utc>::from_naive_utc_and_offset(naive - self.offset, Utc)
    }
}
