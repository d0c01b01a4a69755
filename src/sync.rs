//! Synchronization engine: change detection, dual write and compensation.
//!
//! A synchronization computes the record each backend would need, writes only
//! the backends whose record changed (concurrently) and, if any write fails,
//! compensates every write it attempted:
//!
//! | save attempted | prior record has id | compensation                              |
//! |----------------|---------------------|-------------------------------------------|
//! | no             | -                   | none                                      |
//! | yes            | yes                 | re-save the prior record                  |
//! | yes            | no                  | delete the sent record, clear back-ref    |

use chrono::NaiveDate;
use log::{debug, error, info, warn};
use worklog_api::{TempoWorklog, TogglWorklog};

use crate::converter::WorklogConverter;
use crate::error::{BackendError, SyncError};
use crate::record::{needs_write, BackendRecord};
use crate::repository::WorklogRepository;
use crate::worklog::{truncate_to_minute, Worklog};

/// Which backends a successful synchronization wrote to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub toggl_written: bool,
    pub tempo_written: bool,
    /// The description names no issue, so Tempo was left untouched.
    pub tempo_skipped: bool,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        !self.toggl_written && !self.tempo_written
    }
}

/// Result of a range load.
#[derive(Debug, Default)]
pub struct LoadedWorklogs {
    /// One worklog per Toggl entry, with the matching Tempo entry attached.
    pub worklogs: Vec<Worklog>,
    /// Tempo entries no Toggl entry matched, carrying only the Tempo side.
    pub unmatched: Vec<Worklog>,
}

/// Compensating action for one backend after a failed synchronization.
#[derive(Debug, Clone, PartialEq)]
pub enum Compensation<R> {
    /// No save was issued; nothing to undo.
    Nothing,
    /// The record existed before; put the prior version back.
    Restore(R),
    /// The save was a creation; remove whatever may have landed.
    Remove(R),
}

impl<R: BackendRecord> Compensation<R> {
    pub fn plan(original: Option<&R>, sent: Option<&R>) -> Self {
        match (sent, original) {
            (None, _) => Compensation::Nothing,
            (Some(_), Some(original)) if original.exists_remotely() => {
                Compensation::Restore(original.clone())
            }
            (Some(sent), _) => Compensation::Remove(sent.clone()),
        }
    }

    /// The worklog's back-reference must be cleared once this succeeds.
    pub fn clears_back_reference(&self) -> bool {
        matches!(self, Compensation::Remove(_))
    }

    async fn run<Rp>(self, repo: &Rp) -> Result<(), BackendError>
    where
        Rp: WorklogRepository<Record = R>,
    {
        match self {
            Compensation::Nothing => Ok(()),
            Compensation::Restore(mut original) => {
                info!("restoring {} record {:?}", R::BACKEND, original.id());
                repo.save_worklogs(std::slice::from_mut(&mut original)).await
            }
            Compensation::Remove(sent) => {
                info!("removing {} record {:?} created by the failed sync", R::BACKEND, sent.id());
                repo.delete_worklogs(std::slice::from_ref(&sent)).await
            }
        }
    }
}

pub struct SyncEngine<T, P> {
    toggl: T,
    tempo: P,
    converter: WorklogConverter,
}

impl<T, P> SyncEngine<T, P>
where
    T: WorklogRepository<Record = TogglWorklog>,
    P: WorklogRepository<Record = TempoWorklog>,
{
    pub fn new(toggl: T, tempo: P, converter: WorklogConverter) -> Self {
        Self {
            toggl,
            tempo,
            converter,
        }
    }

    pub fn converter(&self) -> &WorklogConverter {
        &self.converter
    }

    /// Pushes the worklog's current fields to every backend whose record would
    /// change. On failure every attempted write is compensated before the error
    /// is returned; back-references only change on paths that end in a known state.
    /// A worklog whose description names no issue is only written to Toggl.
    pub async fn synchronize(&self, worklog: &mut Worklog) -> Result<SyncReport, SyncError> {
        let current: &Worklog = worklog;
        let mut toggl_target = changed_target(current.toggl.as_ref(), |record| {
            self.converter.update_toggl(record, current)
        });
        let tempo_skipped = current.issue_key().is_none();
        let mut tempo_target = if tempo_skipped {
            warn!(
                "worklog at {} names no issue, not sending it to tempo",
                current.start()
            );
            None
        } else {
            changed_target(current.tempo.as_ref(), |record| {
                self.converter.update_tempo(record, current)
            })
        };

        if toggl_target.is_none() && tempo_target.is_none() {
            debug!("worklog at {} unchanged, nothing to write", current.start());
            return Ok(SyncReport {
                tempo_skipped,
                ..SyncReport::default()
            });
        }

        let (toggl_result, tempo_result) = tokio::join!(
            save_single(&self.toggl, toggl_target.as_mut()),
            save_single(&self.tempo, tempo_target.as_mut()),
        );

        let Some(cause) = first_error(toggl_result, tempo_result) else {
            let report = SyncReport {
                toggl_written: toggl_target.is_some(),
                tempo_written: tempo_target.is_some(),
                tempo_skipped,
            };
            if let Some(record) = toggl_target {
                worklog.toggl = Some(record);
            }
            if let Some(record) = tempo_target {
                worklog.tempo = Some(record);
            }
            info!("synchronized worklog at {} ({:?})", worklog.start(), report);
            return Ok(report);
        };

        warn!("synchronization failed, rolling back: {}", cause);
        match self
            .rollback_synchronization(worklog, toggl_target.as_ref(), tempo_target.as_ref())
            .await
        {
            Ok(()) => Err(SyncError::Synchronization { cause }),
            Err(rollback_cause) => {
                error!(
                    "rollback failed, backends need manual reconciliation: {}",
                    rollback_cause
                );
                Err(SyncError::RollbackFailure {
                    sync_cause: cause,
                    rollback_cause,
                })
            }
        }
    }

    /// Undoes the writes of a failed synchronization. `sent_*` are the records
    /// that were sent, `None` when no save was issued to that backend. The
    /// worklog's back-references still hold the pre-synchronization records.
    pub async fn rollback_synchronization(
        &self,
        worklog: &mut Worklog,
        sent_toggl: Option<&TogglWorklog>,
        sent_tempo: Option<&TempoWorklog>,
    ) -> Result<(), BackendError> {
        let toggl_plan = Compensation::plan(worklog.toggl.as_ref(), sent_toggl);
        let tempo_plan = Compensation::plan(worklog.tempo.as_ref(), sent_tempo);
        let clear_toggl = toggl_plan.clears_back_reference();
        let clear_tempo = tempo_plan.clears_back_reference();

        let (toggl_result, tempo_result) =
            tokio::join!(toggl_plan.run(&self.toggl), tempo_plan.run(&self.tempo));

        if clear_toggl && toggl_result.is_ok() {
            worklog.toggl = None;
        }
        if clear_tempo && tempo_result.is_ok() {
            worklog.tempo = None;
        }

        match first_error(toggl_result, tempo_result) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Loads both backends for the inclusive range and merges Tempo entries
    /// into Toggl-derived worklogs by exact start time.
    pub async fn load(&self, start: NaiveDate, end: NaiveDate) -> Result<LoadedWorklogs, BackendError> {
        let (toggl_records, tempo_records) = tokio::try_join!(
            self.toggl.get_worklogs(start, end),
            self.tempo.get_worklogs(start, end),
        )?;

        let mut worklogs: Vec<Worklog> = toggl_records
            .iter()
            .filter(|record| {
                if record.is_running() {
                    debug!("skipping running toggl entry {:?}", record.id);
                }
                !record.is_running()
            })
            .map(|record| self.converter.from_toggl(record))
            .collect();

        let mut unmatched = Vec::new();
        for record in tempo_records {
            let started = truncate_to_minute(self.converter.tempo_start(&record));
            match worklogs
                .iter_mut()
                .find(|worklog| worklog.tempo.is_none() && worklog.start() == started)
            {
                Some(worklog) => worklog.tempo = Some(record),
                None => unmatched.push(Worklog::tempo_only(started, record)),
            }
        }

        info!(
            "loaded {} worklogs and {} unmatched tempo entries for {}..={}",
            worklogs.len(),
            unmatched.len(),
            start,
            end
        );
        Ok(LoadedWorklogs {
            worklogs,
            unmatched,
        })
    }

    /// Deletes the worklog from Tempo, then from Toggl, clearing each
    /// back-reference right after its own delete. Not atomic across backends.
    pub async fn delete(&self, worklog: &mut Worklog) -> Result<(), BackendError> {
        if let Some(record) = worklog.tempo.as_ref() {
            self.tempo
                .delete_worklogs(std::slice::from_ref(record))
                .await?;
            worklog.tempo = None;
        }
        if let Some(record) = worklog.toggl.as_ref() {
            self.toggl
                .delete_worklogs(std::slice::from_ref(record))
                .await?;
            worklog.toggl = None;
        }
        info!("deleted worklog at {}", worklog.start());
        Ok(())
    }
}

/// Clone of the current record (or a default one) updated by `apply`, kept
/// only when it differs from the current record.
fn changed_target<R, F>(current: Option<&R>, apply: F) -> Option<R>
where
    R: BackendRecord,
    F: FnOnce(&mut R),
{
    let mut target = current.cloned().unwrap_or_default();
    apply(&mut target);
    needs_write(current, &target).then_some(target)
}

async fn save_single<Rp>(repo: &Rp, record: Option<&mut Rp::Record>) -> Result<(), BackendError>
where
    Rp: WorklogRepository,
{
    match record {
        Some(record) => repo.save_worklogs(std::slice::from_mut(record)).await,
        None => Ok(()),
    }
}

/// Keeps the Toggl error when both calls failed; the other one is logged.
fn first_error(
    toggl: Result<(), BackendError>,
    tempo: Result<(), BackendError>,
) -> Option<BackendError> {
    match (toggl, tempo) {
        (Ok(()), Ok(())) => None,
        (Err(err), Ok(())) | (Ok(()), Err(err)) => Some(err),
        (Err(first), Err(second)) => {
            warn!("{} also failed: {}", second.backend(), second);
            Some(first)
        }
    }
}
