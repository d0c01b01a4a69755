mod tempo;
mod toggl;

pub use tempo::{
    TempoAuthorRef, TempoIssueRef, TempoPage, TempoPageMetadata, TempoWorklog, TempoWorklogPayload,
};
pub(crate) use tempo::TempoWorklogRequest;
pub use toggl::TogglWorklog;

use serde::de::Deserializer;
use serde::Deserialize;

/// Treats an explicit JSON `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
