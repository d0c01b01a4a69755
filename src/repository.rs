//! Backend repositories: save, fetch-by-range and delete over one record type.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use worklog_api::{TempoClient, TempoWorklog, TogglClient, TogglWorklog};

use crate::error::BackendError;
use crate::record::{Backend, BackendRecord};

#[async_trait]
pub trait WorklogRepository: Send + Sync {
    type Record: BackendRecord;

    /// Creates records without an id and updates the others. Identifiers
    /// assigned by the backend are written back into `records`.
    async fn save_worklogs(&self, records: &mut [Self::Record]) -> Result<(), BackendError>;

    /// Records whose start falls between `start` and `end`, both inclusive.
    async fn get_worklogs(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Self::Record>, BackendError>;

    /// Deletes records. Records without an id were never created and are skipped.
    async fn delete_worklogs(&self, records: &[Self::Record]) -> Result<(), BackendError>;
}

#[async_trait]
impl<Rp> WorklogRepository for Arc<Rp>
where
    Rp: WorklogRepository + ?Sized,
{
    type Record = Rp::Record;

    async fn save_worklogs(&self, records: &mut [Self::Record]) -> Result<(), BackendError> {
        (**self).save_worklogs(records).await
    }

    async fn get_worklogs(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Self::Record>, BackendError> {
        (**self).get_worklogs(start, end).await
    }

    async fn delete_worklogs(&self, records: &[Self::Record]) -> Result<(), BackendError> {
        (**self).delete_worklogs(records).await
    }
}

pub struct TogglRepository {
    client: TogglClient,
}

impl TogglRepository {
    pub fn new(client: TogglClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WorklogRepository for TogglRepository {
    type Record = TogglWorklog;

    async fn save_worklogs(&self, records: &mut [TogglWorklog]) -> Result<(), BackendError> {
        for record in records.iter_mut() {
            let saved = if record.id.is_some() {
                self.client.update_time_entry(record).await
            } else {
                self.client.create_time_entry(record).await
            }
            .map_err(|err| BackendError::api(Backend::Toggl, err))?;
            debug!("saved toggl time entry {:?}", saved.id);
            *record = saved;
        }
        Ok(())
    }

    async fn get_worklogs(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TogglWorklog>, BackendError> {
        self.client
            .time_entries(start, end)
            .await
            .map_err(|err| BackendError::api(Backend::Toggl, err))
    }

    async fn delete_worklogs(&self, records: &[TogglWorklog]) -> Result<(), BackendError> {
        for record in records {
            let Some(id) = record.id else {
                debug!("skipping delete of uncreated toggl time entry");
                continue;
            };
            self.client
                .delete_time_entry(record.workspace_id, id)
                .await
                .map_err(|err| BackendError::api(Backend::Toggl, err))?;
            debug!("deleted toggl time entry {}", id);
        }
        Ok(())
    }
}

pub struct TempoRepository {
    client: TempoClient,
    account_id: String,
}

impl TempoRepository {
    /// `account_id` is the Atlassian account whose worklogs are listed.
    pub fn new(client: TempoClient, account_id: impl Into<String>) -> Self {
        Self {
            client,
            account_id: account_id.into(),
        }
    }
}

#[async_trait]
impl WorklogRepository for TempoRepository {
    type Record = TempoWorklog;

    async fn save_worklogs(&self, records: &mut [TempoWorklog]) -> Result<(), BackendError> {
        for record in records.iter_mut() {
            let saved = if record.id.is_some() {
                self.client.update_worklog(record).await
            } else {
                self.client.create_worklog(record).await
            }
            .map_err(|err| BackendError::api(Backend::Tempo, err))?;
            debug!("saved tempo worklog {:?}", saved.id);
            *record = saved;
        }
        Ok(())
    }

    async fn get_worklogs(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TempoWorklog>, BackendError> {
        self.client
            .worklogs_for_user(&self.account_id, start, end)
            .await
            .map_err(|err| BackendError::api(Backend::Tempo, err))
    }

    async fn delete_worklogs(&self, records: &[TempoWorklog]) -> Result<(), BackendError> {
        for record in records {
            let Some(id) = record.id else {
                debug!("skipping delete of uncreated tempo worklog");
                continue;
            };
            self.client
                .delete_worklog(id)
                .await
                .map_err(|err| BackendError::api(Backend::Tempo, err))?;
            debug!("deleted tempo worklog {}", id);
        }
        Ok(())
    }
}
