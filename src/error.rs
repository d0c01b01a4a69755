//! Error taxonomy of the synchronizer.

use thiserror::Error;
use worklog_api::ApiError;

use crate::record::Backend;

/// A single backend call failed. Opaque to the engine.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{backend} request failed: {source}")]
    Api {
        backend: Backend,
        #[source]
        source: ApiError,
    },
    #[error("{backend} rejected the request: {message}")]
    Rejected { backend: Backend, message: String },
}

impl BackendError {
    pub fn api(backend: Backend, source: ApiError) -> Self {
        BackendError::Api { backend, source }
    }

    pub fn rejected(backend: Backend, message: impl Into<String>) -> Self {
        BackendError::Rejected {
            backend,
            message: message.into(),
        }
    }

    pub fn backend(&self) -> Backend {
        match self {
            BackendError::Api { backend, .. } | BackendError::Rejected { backend, .. } => *backend,
        }
    }
}

/// Failed outcome of a synchronization.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A write failed and every attempted write was compensated.
    #[error("synchronization failed: {cause}")]
    Synchronization {
        #[source]
        cause: BackendError,
    },
    /// A write failed and compensating it failed too. Backends may disagree
    /// with each other and with the worklog's back-references.
    #[error("synchronization failed ({sync_cause}) and rollback failed: {rollback_cause}")]
    RollbackFailure {
        sync_cause: BackendError,
        #[source]
        rollback_cause: BackendError,
    },
}

impl SyncError {
    /// The write error that started the failure.
    pub fn sync_cause(&self) -> &BackendError {
        match self {
            SyncError::Synchronization { cause } => cause,
            SyncError::RollbackFailure { sync_cause, .. } => sync_cause,
        }
    }

    pub fn requires_manual_reconciliation(&self) -> bool {
        matches!(self, SyncError::RollbackFailure { .. })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot determine the platform config directory")]
    NoConfigDir,
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing setting `{0}`; run `worklog-sync configure`")]
    Missing(&'static str),
    #[error("invalid setting `{name}`: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum SecretsError {
    #[error("{backend} token must not be empty")]
    EmptyToken { backend: Backend },
    #[error("no {backend} token stored; run `worklog-sync set-token {backend} <token>`")]
    MissingToken { backend: Backend },
    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Failure wiring the engine from configuration and stored tokens.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Secrets(#[from] SecretsError),
    #[error("cannot build {backend} client: {source}")]
    Client {
        backend: Backend,
        #[source]
        source: ApiError,
    },
}
