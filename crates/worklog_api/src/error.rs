//! Failures of Toggl and Tempo requests.

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-success response. `code` is the API's own error code when the
    /// body carried one (Tempo's `errors[0].code`, Toggl's `code`).
    #[error("http {status}: {message}")]
    Http {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },
    /// 401 or 403: the token is missing, revoked or lacks access.
    #[error("authentication error: {0}")]
    Authentication(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Refused locally, no request was sent.
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Other(String),
}

impl ApiError {
    pub fn http(status: StatusCode, code: Option<String>, message: impl Into<String>) -> Self {
        ApiError::Http {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Http { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// The backend asked us to slow down.
    pub fn is_throttled(&self) -> bool {
        self.status() == Some(StatusCode::TOO_MANY_REQUESTS)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            _ if err.is_timeout() => ApiError::Timeout(err.to_string()),
            Some(status) => ApiError::http(status, None, err.to_string()),
            None if err.is_connect() => ApiError::Network(err.to_string()),
            None if err.is_decode() => ApiError::Serialization(err.to_string()),
            None => ApiError::Other(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_exposes_status_and_code() {
        let err = ApiError::http(
            StatusCode::NOT_FOUND,
            Some("error.worklog.notfound".to_string()),
            "missing",
        );
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.code(), Some("error.worklog.notfound"));
        assert!(!err.is_throttled());
        assert_eq!(err.to_string(), "http 404 Not Found: missing");
    }

    #[test]
    fn local_failures_carry_no_status() {
        let err = ApiError::Validation("no issue key".to_string());
        assert_eq!(err.status(), None);
        assert_eq!(err.code(), None);
        assert!(ApiError::http(StatusCode::TOO_MANY_REQUESTS, None, "").is_throttled());
    }
}
