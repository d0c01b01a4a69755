//! Authorization header construction for the supported worklog backends.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

/// Password Toggl expects when an API token is used as the basic-auth user.
pub const TOGGL_TOKEN_PASSWORD: &str = "api_token";

/// Credentials attached to every request as the `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// HTTP basic auth, used by Toggl Track (`<token>:api_token`).
    Basic { username: String, password: String },
    /// Bearer token, used by Tempo.
    Bearer(String),
}

impl Credentials {
    pub fn toggl_token(token: impl Into<String>) -> Self {
        Credentials::Basic {
            username: token.into(),
            password: TOGGL_TOKEN_PASSWORD.to_string(),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Credentials::Bearer(token.into())
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            Credentials::Basic { .. } => "Basic",
            Credentials::Bearer(_) => "Bearer",
        }
    }

    /// Renders the full `Authorization` header value.
    pub fn header_value(&self) -> String {
        match self {
            Credentials::Basic { username, password } => {
                let encoded = BASE64_STANDARD.encode(format!("{}:{}", username, password));
                format!("{} {}", self.scheme(), encoded)
            }
            Credentials::Bearer(token) => format!("{} {}", self.scheme(), token.trim()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credentials({} <redacted>)", self.scheme())
    }
}
