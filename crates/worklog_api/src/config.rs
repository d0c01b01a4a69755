use std::time::Duration;

use crate::auth::Credentials;

pub const DEFAULT_TOGGL_API_BASE: &str = "https://api.track.toggl.com/api/v9";
pub const DEFAULT_TEMPO_API_BASE: &str = "https://api.tempo.io/core/3";
pub const DEFAULT_USER_AGENT: &str = "worklog-sync";
pub const DEFAULT_COOLDOWN_MS: u64 = 250;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_TEMPO_PAGE_SIZE: u32 = 500;
/// Wait applied after a `429` that carries no usable `Retry-After`.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(2);

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub credentials: Credentials,
    pub user_agent: String,
    pub cooldown: Duration,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cooldown: Duration::from_millis(DEFAULT_COOLDOWN_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Config for Toggl Track; the API token is sent as the basic-auth user.
    pub fn toggl(token: impl Into<String>) -> Self {
        Self::new(DEFAULT_TOGGL_API_BASE, Credentials::toggl_token(token))
    }

    /// Config for Tempo Core; the API token is sent as a bearer token.
    pub fn tempo(token: impl Into<String>) -> Self {
        Self::new(DEFAULT_TEMPO_API_BASE, Credentials::bearer(token))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    pub fn with_cooldown(mut self, duration: Duration) -> Self {
        self.cooldown = duration;
        self
    }

    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout = duration;
        self
    }

    pub fn with_connect_timeout(mut self, duration: Duration) -> Self {
        self.connect_timeout = duration;
        self
    }

    /// Base URL normalised to end with a single slash.
    pub fn api_root(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }
}
