pub mod attributes;
pub mod json;
pub mod sample;
pub mod status;
pub mod timestamp;

use std::fmt;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

pub use attributes::AttributesPayload;
pub use json::DecodeError;
pub use status::StatusPayload;
pub use timestamp::{TimestampError, TimestampMode};

type BoxStr = Box<str>;

/// Opaque identity of one vehicle. Used as the natural key when storing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub BoxStr);

impl VehicleId {
    pub fn new(id: impl Into<BoxStr>) -> Self {
        Self(id.into())
    }

    /// A fresh identity for a vehicle that has not been seen before.
    pub fn generate() -> Self {
        Self(Ulid::new().to_string().into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VehicleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for VehicleId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// One vehicle's status and attributes at a point in time.
///
/// The JSON text of both payloads is computed once at construction and kept
/// alongside them; a snapshot is never mutated, so the cached text always
/// matches the payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    identity: VehicleId,
    status: StatusPayload,
    attributes: AttributesPayload,
    status_text: String,
    attributes_text: String,
    timestamp: jiff::Timestamp,
}

impl Snapshot {
    pub fn new(identity: VehicleId, status: StatusPayload, attributes: AttributesPayload) -> Self {
        Self::with_timestamp(identity, status, attributes, jiff::Timestamp::now())
    }

    pub fn with_timestamp(
        identity: VehicleId,
        status: StatusPayload,
        attributes: AttributesPayload,
        timestamp: jiff::Timestamp,
    ) -> Self {
        let status_text = json::to_json_text(&status);
        let attributes_text = json::to_json_text(&attributes);

        Self {
            identity,
            status,
            attributes,
            status_text,
            attributes_text,
            timestamp,
        }
    }

    /// A snapshot of the bundled sample payloads under a fresh identity.
    pub fn sample() -> Result<Self, DecodeError> {
        Ok(Self::new(
            VehicleId::generate(),
            sample::status()?,
            sample::attributes()?,
        ))
    }

    pub fn identity(&self) -> &VehicleId {
        &self.identity
    }

    pub fn status(&self) -> &StatusPayload {
        &self.status
    }

    pub fn attributes(&self) -> &AttributesPayload {
        &self.attributes
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn attributes_text(&self) -> &str {
        &self.attributes_text
    }

    pub fn timestamp(&self) -> jiff::Timestamp {
        self.timestamp
    }
}
