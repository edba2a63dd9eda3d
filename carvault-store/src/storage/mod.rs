pub mod memory;
pub mod models;
pub mod sqlite;

use async_trait::async_trait;

pub use memory::{MemoryRowTable, MemoryTableError};
pub use models::PersistedRow;
pub use sqlite::{SqliteRowTable, SqliteTableError};

/// A table of persisted vehicle rows, keyed by `identity_ciphertext`.
///
/// Implementations only move opaque rows around; encryption and decoding
/// happen in [`crate::SnapshotStore`].
#[async_trait]
pub trait RowTable: Clone + Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;
    type Transaction: RowTransaction<Error = Self::Error>;

    async fn begin(&self) -> Result<Self::Transaction, Self::Error>;

    /// Every committed row, in insertion order.
    async fn fetch_all(&self) -> Result<Vec<PersistedRow>, Self::Error>;
}

/// A unit of work against a [`RowTable`]. Nothing is visible to other
/// readers until [`RowTransaction::commit`] succeeds; dropping the
/// transaction discards it.
#[async_trait]
pub trait RowTransaction: Send + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Removes every row, returning how many were removed.
    async fn delete_all(&mut self) -> Result<u64, Self::Error>;

    /// Inserts `row`, replacing any row with the same identity.
    async fn upsert(&mut self, row: PersistedRow) -> Result<(), Self::Error>;

    async fn commit(self) -> Result<(), Self::Error>;

    async fn rollback(self) -> Result<(), Self::Error>;
}
