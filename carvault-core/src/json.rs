use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, warn};

/// Text produced by [`to_json_text`] when a value cannot be encoded.
pub const ENCODE_FAILURE_MARKER: &str = "nil";

#[derive(Debug, Error)]
#[error("unable to decode {target}: {source}")]
pub struct DecodeError {
    pub target: &'static str,
    #[source]
    pub source: serde_json::Error,
}

/// Encodes `value` as JSON text.
pub fn try_to_json_text<T>(value: &T) -> Result<String, serde_json::Error>
where
    T: Serialize + ?Sized,
{
    serde_json::to_string(value)
}

/// Encodes `value` as JSON text for display, falling back to
/// [`ENCODE_FAILURE_MARKER`] when encoding fails.
pub fn to_json_text<T>(value: &T) -> String
where
    T: Serialize + ?Sized,
{
    match try_to_json_text(value) {
        Ok(text) => text,
        Err(e) => encode_fallback(e),
    }
}

fn encode_fallback(error: serde_json::Error) -> String {
    warn!(error = %error, marker = ENCODE_FAILURE_MARKER, "json encoding failed");
    ENCODE_FAILURE_MARKER.to_string()
}

pub fn from_json_text<T>(text: &str) -> Result<T, DecodeError>
where
    T: DeserializeOwned,
{
    serde_json::from_str(text).map_err(|source| {
        let err = DecodeError {
            target: short_type_name::<T>(),
            source,
        };
        debug!(error = %err, "json decoding failed");
        err
    })
}

/// Last path segment of `T`'s name, generic arguments dropped.
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
