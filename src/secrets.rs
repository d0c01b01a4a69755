//! Backend API tokens stored in the OS keyring.

use keyring::{Entry, Error as KeyringError};
use std::env;
use std::sync::{Arc, Mutex};

use crate::error::SecretsError;
use crate::record::Backend;

pub const KEYRING_SERVICE: &str = "io.worklog-sync";
pub const TOGGL_TOKEN_ENV: &str = "TOGGL_API_TOKEN";
pub const TEMPO_TOKEN_ENV: &str = "TEMPO_API_TOKEN";

fn keyring_account(backend: Backend) -> &'static str {
    match backend {
        Backend::Toggl => "toggl-api-token",
        Backend::Tempo => "tempo-api-token",
    }
}

fn token_env_var(backend: Backend) -> &'static str {
    match backend {
        Backend::Toggl => TOGGL_TOKEN_ENV,
        Backend::Tempo => TEMPO_TOKEN_ENV,
    }
}

#[derive(Clone)]
pub struct SecretsManager {
    inner: Arc<SecretsInner>,
}

struct SecretsInner {
    keyring_service: String,
    cache: Mutex<Vec<(Backend, String)>>,
}

impl SecretsManager {
    pub fn new(service: impl Into<String>) -> Self {
        let service = service.into();
        let service = if service.trim().is_empty() {
            KEYRING_SERVICE.to_string()
        } else {
            service
        };
        Self {
            inner: Arc::new(SecretsInner {
                keyring_service: service,
                cache: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Stores a token for `backend`, replacing any previous one.
    pub fn save_token(&self, backend: Backend, token: &str) -> Result<(), SecretsError> {
        let trimmed = normalize_token(token).ok_or(SecretsError::EmptyToken { backend })?;
        self.entry(backend)?.set_password(&trimmed)?;
        self.remember(backend, Some(trimmed));
        Ok(())
    }

    /// Token for `backend`; the environment variable wins over the keyring.
    pub fn get_token(&self, backend: Backend) -> Result<Option<String>, SecretsError> {
        if let Some(token) = env::var(token_env_var(backend))
            .ok()
            .and_then(|value| normalize_token(&value))
        {
            return Ok(Some(token));
        }

        if let Some(token) = self.cached(backend) {
            return Ok(Some(token));
        }

        let token = match self.entry(backend)?.get_password() {
            Ok(secret) => normalize_token(&secret),
            Err(KeyringError::NoEntry) => None,
            Err(err) => return Err(err.into()),
        };
        self.remember(backend, token.clone());
        Ok(token)
    }

    pub fn require_token(&self, backend: Backend) -> Result<String, SecretsError> {
        self.get_token(backend)?
            .ok_or(SecretsError::MissingToken { backend })
    }

    pub fn clear_token(&self, backend: Backend) -> Result<(), SecretsError> {
        match self.entry(backend)?.delete_credential() {
            Ok(()) | Err(KeyringError::NoEntry) => {}
            Err(err) => return Err(err.into()),
        }
        self.remember(backend, None);
        Ok(())
    }

    fn entry(&self, backend: Backend) -> Result<Entry, SecretsError> {
        Ok(Entry::new(
            &self.inner.keyring_service,
            keyring_account(backend),
        )?)
    }

    fn cached(&self, backend: Backend) -> Option<String> {
        let cache = self.inner.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        cache
            .iter()
            .find(|(cached, _)| *cached == backend)
            .map(|(_, token)| token.clone())
    }

    fn remember(&self, backend: Backend, token: Option<String>) {
        let mut cache = self.inner.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        cache.retain(|(cached, _)| *cached != backend);
        if let Some(token) = token {
            cache.push((backend, token));
        }
    }
}

fn normalize_token(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_trimmed_and_blank_rejected() {
        assert_eq!(normalize_token("  abc \n").as_deref(), Some("abc"));
        assert_eq!(normalize_token("   "), None);
    }

    #[test]
    fn each_backend_has_its_own_slot() {
        assert_ne!(keyring_account(Backend::Toggl), keyring_account(Backend::Tempo));
        assert_eq!(token_env_var(Backend::Tempo), TEMPO_TOKEN_ENV);
    }

    #[test]
    fn empty_token_is_rejected_before_touching_the_keyring() {
        let manager = SecretsManager::new("io.worklog-sync.tests");
        let err = manager.save_token(Backend::Toggl, "  ").expect_err("empty");
        assert!(matches!(err, SecretsError::EmptyToken { backend: Backend::Toggl }));
    }

    #[test]
    fn cache_replaces_previous_value() {
        let manager = SecretsManager::new("");
        manager.remember(Backend::Tempo, Some("one".to_string()));
        manager.remember(Backend::Tempo, Some("two".to_string()));
        assert_eq!(manager.cached(Backend::Tempo).as_deref(), Some("two"));
        manager.remember(Backend::Tempo, None);
        assert!(manager.cached(Backend::Tempo).is_none());
        assert_eq!(manager.inner.keyring_service, KEYRING_SERVICE);
    }
}
