pub mod context;
pub mod error;
pub mod snapshot_store;
pub mod storage;

pub use context::{ContextKind, ExecutionContext};
pub use error::StoreError;
pub use snapshot_store::SnapshotStore;
pub use storage::{MemoryRowTable, PersistedRow, RowTable, RowTransaction, SqliteRowTable};
