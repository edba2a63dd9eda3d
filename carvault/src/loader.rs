//! Builds snapshots from payload files, falling back to the bundled samples.

use std::path::{Path, PathBuf};

use carvault_core::{AttributesPayload, DecodeError, Snapshot, StatusPayload, VehicleId, sample};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
    #[error("bundled sample payload is invalid: {0}")]
    Sample(#[source] DecodeError),
}

/// Where a new vehicle's payloads come from.
#[derive(Debug, Clone, Default)]
pub struct VehicleSource {
    pub status: Option<PathBuf>,
    pub attributes: Option<PathBuf>,
}

impl VehicleSource {
    pub fn snapshot(&self, identity: VehicleId) -> Result<Snapshot, LoadError> {
        let status = match &self.status {
            Some(path) => read_payload(path, StatusPayload::from_json)?,
            None => sample::status().map_err(LoadError::Sample)?,
        };
        let attributes = match &self.attributes {
            Some(path) => read_payload(path, AttributesPayload::from_json)?,
            None => sample::attributes().map_err(LoadError::Sample)?,
        };

        Ok(Snapshot::new(identity, status, attributes))
    }
}

fn read_payload<T>(
    path: &Path,
    decode: fn(&str) -> Result<T, DecodeError>,
) -> Result<T, LoadError> {
    debug!(path = %path.display(), "reading payload");

    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    decode(&text).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })
}
