//! Keeps one worklog consistent between Toggl Track and Tempo.
//!
//! [`SyncEngine`] is the entry point: it loads and merges both backends,
//! pushes local edits to whichever backend needs them and compensates
//! partial writes when a synchronization fails.

pub mod config;
pub mod converter;
pub mod error;
pub mod record;
pub mod repository;
pub mod secrets;
pub mod sync;
pub mod worklog;

pub use config::{Config, ConfigManager};
pub use converter::WorklogConverter;
pub use error::{BackendError, ConfigError, SecretsError, SetupError, SyncError};
pub use record::{Backend, BackendRecord};
pub use repository::{TempoRepository, TogglRepository, WorklogRepository};
pub use secrets::SecretsManager;
pub use sync::{Compensation, LoadedWorklogs, SyncEngine, SyncReport};
pub use worklog::Worklog;

use worklog_api::{ClientConfig, TempoClient, TogglClient};

pub type HttpSyncEngine = SyncEngine<TogglRepository, TempoRepository>;

/// Wires an engine talking to the real APIs from persisted settings and
/// stored tokens.
pub fn build_engine(config: &Config, secrets: &SecretsManager) -> Result<HttpSyncEngine, SetupError> {
    let workspace_id = config.workspace_id()?;
    let account_id = config.account_id()?.to_string();
    let offset = config.offset()?;

    let mut toggl_config = ClientConfig::toggl(secrets.require_token(Backend::Toggl)?)
        .with_cooldown(config.request_cooldown());
    if let Some(base_url) = &config.toggl_base_url {
        toggl_config = toggl_config.with_base_url(base_url.clone());
    }
    let mut tempo_config = ClientConfig::tempo(secrets.require_token(Backend::Tempo)?)
        .with_cooldown(config.request_cooldown());
    if let Some(base_url) = &config.tempo_base_url {
        tempo_config = tempo_config.with_base_url(base_url.clone());
    }

    let toggl = TogglClient::new(toggl_config).map_err(|source| SetupError::Client {
        backend: Backend::Toggl,
        source,
    })?;
    let tempo = TempoClient::new(tempo_config).map_err(|source| SetupError::Client {
        backend: Backend::Tempo,
        source,
    })?;

    log::debug!(
        "building engine for workspace {} and tempo account {}",
        workspace_id,
        account_id
    );
    Ok(SyncEngine::new(
        TogglRepository::new(toggl),
        TempoRepository::new(tempo, account_id.clone()),
        WorklogConverter::new(workspace_id, account_id, offset),
    ))
}
