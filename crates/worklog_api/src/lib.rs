//! Typed Toggl Track and Tempo API clients used by the worklog synchronizer.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod rate_limiter;
pub mod tempo;
pub mod toggl;

pub use auth::Credentials;
pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use models::{TempoWorklog, TogglWorklog};
pub use rate_limiter::RateLimiter;
pub use tempo::TempoClient;
pub use toggl::TogglClient;
