//! Per-backend record identity and equality rules.

use std::fmt;

use worklog_api::{TempoWorklog, TogglWorklog};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Toggl,
    Tempo,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Toggl => f.write_str("toggl"),
            Backend::Tempo => f.write_str("tempo"),
        }
    }
}

/// A backend's native worklog representation.
///
/// `is_equivalent` is the equality strategy used to decide whether a write is
/// needed. It compares the fields a sync can change and ignores stamps the
/// backend maintains on its own.
pub trait BackendRecord: Clone + Default + fmt::Debug + Send + Sync + 'static {
    const BACKEND: Backend;

    fn id(&self) -> Option<u64>;

    fn is_equivalent(&self, other: &Self) -> bool;

    /// A record with an identifier exists remotely.
    fn exists_remotely(&self) -> bool {
        self.id().is_some()
    }
}

impl BackendRecord for TogglWorklog {
    const BACKEND: Backend = Backend::Toggl;

    fn id(&self) -> Option<u64> {
        self.id
    }

    fn is_equivalent(&self, other: &Self) -> bool {
        self.id == other.id
            && self.workspace_id == other.workspace_id
            && self.description == other.description
            && self.start == other.start
            && self.stop == other.stop
            && self.duration == other.duration
            && self.project_id == other.project_id
            && self.billable == other.billable
            && self.tags == other.tags
    }
}

impl BackendRecord for TempoWorklog {
    const BACKEND: Backend = Backend::Tempo;

    fn id(&self) -> Option<u64> {
        self.id
    }

    fn is_equivalent(&self, other: &Self) -> bool {
        self.id == other.id
            && self.issue_key == other.issue_key
            && self.time_spent_seconds == other.time_spent_seconds
            && self.start_date == other.start_date
            && self.start_time == other.start_time
            && self.description == other.description
            && self.author_account_id == other.author_account_id
    }
}

/// Whether `target` differs from the currently known record. A missing
/// record always needs a write.
pub fn needs_write<R: BackendRecord>(current: Option<&R>, target: &R) -> bool {
    match current {
        Some(current) => !current.is_equivalent(target),
        None => true,
    }
}
