use carvault_core::{DecodeError, TimestampError, VehicleId};
use carvault_crypto::CryptoError;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The commit was rejected; nothing from the operation is visible.
    #[error("commit failed: {0}")]
    Commit(#[source] BoxError),
    #[error("table error: {0}")]
    Table(#[source] BoxError),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("snapshot timestamp cannot be stored: {0}")]
    Timestamp(#[from] TimestampError),
    #[error("snapshot for vehicle {0} has no encodable payload text")]
    Unencodable(VehicleId),
    #[error("store task did not complete: {0}")]
    Interrupted(#[from] tokio::task::JoinError),
}

impl StoreError {
    pub(crate) fn table<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Table(Box::new(error))
    }

    pub(crate) fn commit<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Commit(Box::new(error))
    }
}
