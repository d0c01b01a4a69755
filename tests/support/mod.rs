//! In-memory backends with call recording and scripted failures.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use worklog_api::{TempoWorklog, TogglWorklog};
use worklog_sync::{
    BackendError, BackendRecord, SyncEngine, Worklog, WorklogConverter, WorklogRepository,
};

pub const WORKSPACE_ID: u64 = 77;
pub const ACCOUNT_ID: &str = "acc-1";

/// What the next call of a kind does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeed,
    /// Fails without touching the store.
    Reject,
    /// Applies the change, then reports an error (e.g. a lost response).
    CommitThenFail,
}

pub trait Identified: BackendRecord {
    fn set_id(&mut self, id: u64);
}

impl Identified for TogglWorklog {
    fn set_id(&mut self, id: u64) {
        self.id = Some(id);
    }
}

impl Identified for TempoWorklog {
    fn set_id(&mut self, id: u64) {
        self.id = Some(id);
    }
}

pub type Journal = Arc<Mutex<Vec<String>>>;

pub struct MemoryRepository<R> {
    store: Mutex<Vec<R>>,
    next_id: AtomicU64,
    saves: Mutex<Vec<R>>,
    deletes: Mutex<Vec<R>>,
    save_outcomes: Mutex<VecDeque<Outcome>>,
    delete_outcomes: Mutex<VecDeque<Outcome>>,
    get_outcomes: Mutex<VecDeque<Outcome>>,
    journal: Journal,
}

impl<R: Identified> MemoryRepository<R> {
    pub fn new(first_id: u64, journal: Journal) -> Arc<Self> {
        Arc::new(Self {
            store: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(first_id),
            saves: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
            save_outcomes: Mutex::new(VecDeque::new()),
            delete_outcomes: Mutex::new(VecDeque::new()),
            get_outcomes: Mutex::new(VecDeque::new()),
            journal,
        })
    }

    pub fn seed(&self, records: Vec<R>) {
        *self.store.lock().unwrap() = records;
    }

    pub fn stored(&self) -> Vec<R> {
        self.store.lock().unwrap().clone()
    }

    /// Records passed to save, in call order, as they were received.
    pub fn saves(&self) -> Vec<R> {
        self.saves.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<R> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn script_saves(&self, outcomes: &[Outcome]) {
        self.save_outcomes.lock().unwrap().extend(outcomes.iter().copied());
    }

    pub fn script_deletes(&self, outcomes: &[Outcome]) {
        self.delete_outcomes.lock().unwrap().extend(outcomes.iter().copied());
    }

    pub fn script_gets(&self, outcomes: &[Outcome]) {
        self.get_outcomes.lock().unwrap().extend(outcomes.iter().copied());
    }

    fn next(queue: &Mutex<VecDeque<Outcome>>) -> Outcome {
        queue.lock().unwrap().pop_front().unwrap_or(Outcome::Succeed)
    }

    fn log(&self, action: &str) {
        self.journal
            .lock()
            .unwrap()
            .push(format!("{}:{}", R::BACKEND, action));
    }

    fn failure(&self, action: &str) -> BackendError {
        BackendError::rejected(R::BACKEND, format!("scripted {} failure", action))
    }
}

#[async_trait]
impl<R: Identified> WorklogRepository for MemoryRepository<R> {
    type Record = R;

    async fn save_worklogs(&self, records: &mut [R]) -> Result<(), BackendError> {
        self.log("save");
        self.saves.lock().unwrap().extend(records.iter().cloned());
        let outcome = Self::next(&self.save_outcomes);
        if outcome == Outcome::Reject {
            return Err(self.failure("save"));
        }
        let mut store = self.store.lock().unwrap();
        for record in records.iter_mut() {
            match record.id() {
                Some(id) => {
                    store.retain(|stored| stored.id() != Some(id));
                }
                None => record.set_id(self.next_id.fetch_add(1, Ordering::SeqCst)),
            }
            store.push(record.clone());
        }
        match outcome {
            Outcome::CommitThenFail => Err(self.failure("save")),
            _ => Ok(()),
        }
    }

    async fn get_worklogs(&self, _start: NaiveDate, _end: NaiveDate) -> Result<Vec<R>, BackendError> {
        self.log("get");
        match Self::next(&self.get_outcomes) {
            Outcome::Succeed => Ok(self.stored()),
            _ => Err(self.failure("get")),
        }
    }

    async fn delete_worklogs(&self, records: &[R]) -> Result<(), BackendError> {
        self.log("delete");
        self.deletes.lock().unwrap().extend(records.iter().cloned());
        let outcome = Self::next(&self.delete_outcomes);
        if outcome == Outcome::Reject {
            return Err(self.failure("delete"));
        }
        let mut store = self.store.lock().unwrap();
        for record in records {
            if let Some(id) = record.id() {
                store.retain(|stored| stored.id() != Some(id));
            }
        }
        match outcome {
            Outcome::CommitThenFail => Err(self.failure("delete")),
            _ => Ok(()),
        }
    }
}

pub type MemoryEngine =
    SyncEngine<Arc<MemoryRepository<TogglWorklog>>, Arc<MemoryRepository<TempoWorklog>>>;

pub struct Harness {
    pub engine: MemoryEngine,
    pub toggl: Arc<MemoryRepository<TogglWorklog>>,
    pub tempo: Arc<MemoryRepository<TempoWorklog>>,
    pub journal: Journal,
}

pub fn harness() -> Harness {
    let journal: Journal = Arc::new(Mutex::new(Vec::new()));
    let toggl = MemoryRepository::new(1000, journal.clone());
    let tempo = MemoryRepository::new(5000, journal.clone());
    let converter = WorklogConverter::new(WORKSPACE_ID, ACCOUNT_ID, utc());
    Harness {
        engine: SyncEngine::new(toggl.clone(), tempo.clone(), converter),
        toggl,
        tempo,
        journal,
    }
}

pub fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, hour, minute, 0).unwrap()
}

pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
}

pub fn local_worklog() -> Worklog {
    Worklog::new(at(9, 0), Duration::minutes(90), "OPS-7 deploy release")
}

impl Harness {
    /// A worklog already present in both backends, with calls reset.
    pub async fn synchronized_worklog(&self) -> Worklog {
        let mut worklog = local_worklog();
        self.engine
            .synchronize(&mut worklog)
            .await
            .expect("initial synchronization");
        self.reset_calls();
        worklog
    }

    fn reset_calls(&self) {
        self.toggl.saves.lock().unwrap().clear();
        self.tempo.saves.lock().unwrap().clear();
        self.toggl.deletes.lock().unwrap().clear();
        self.tempo.deletes.lock().unwrap().clear();
        self.journal.lock().unwrap().clear();
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().unwrap().clone()
    }
}
