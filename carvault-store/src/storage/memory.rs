use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;

use crate::storage::{PersistedRow, RowTable, RowTransaction};

/// In memory row table.
/// This is primarily intended for testing and as a reference
/// implementation of the RowTable trait.
#[derive(Clone, Default)]
pub struct MemoryRowTable {
    rows: Arc<Mutex<Vec<PersistedRow>>>,
    reject_next_commit: Arc<AtomicBool>,
}

#[derive(Debug, Error)]
pub enum MemoryTableError {
    #[error("internal error: {0}")]
    Internal(String),
    #[error("commit rejected")]
    CommitRejected,
}

impl MemoryRowTable {
    /// Makes the next transaction begun on this table fail at commit.
    pub fn reject_next_commit(&self) {
        self.reject_next_commit.store(true, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<PersistedRow>>, MemoryTableError> {
        lock_rows(&self.rows)
    }
}

fn lock_rows(
    rows: &Mutex<Vec<PersistedRow>>,
) -> Result<std::sync::MutexGuard<'_, Vec<PersistedRow>>, MemoryTableError> {
    rows.lock()
        .map_err(|_| MemoryTableError::Internal("rows mutex poisoned".into()))
}

#[async_trait]
impl RowTable for MemoryRowTable {
    type Error = MemoryTableError;
    type Transaction = MemoryRowTransaction;

    async fn begin(&self) -> Result<Self::Transaction, Self::Error> {
        let staged = self.lock()?.clone();

        Ok(MemoryRowTransaction {
            rows: Arc::clone(&self.rows),
            staged,
            reject_commit: self.reject_next_commit.swap(false, Ordering::SeqCst),
        })
    }

    async fn fetch_all(&self) -> Result<Vec<PersistedRow>, Self::Error> {
        Ok(self.lock()?.clone())
    }
}

/// Works on a private copy of the rows; commit swaps the copy in whole.
/// Transactions are not isolated from each other, callers serialize them.
pub struct MemoryRowTransaction {
    rows: Arc<Mutex<Vec<PersistedRow>>>,
    staged: Vec<PersistedRow>,
    reject_commit: bool,
}

#[async_trait]
impl RowTransaction for MemoryRowTransaction {
    type Error = MemoryTableError;

    async fn delete_all(&mut self) -> Result<u64, Self::Error> {
        let removed = self.staged.len() as u64;
        self.staged.clear();
        Ok(removed)
    }

    async fn upsert(&mut self, row: PersistedRow) -> Result<(), Self::Error> {
        match self
            .staged
            .iter_mut()
            .find(|existing| existing.identity_ciphertext == row.identity_ciphertext)
        {
            Some(existing) => *existing = row,
            None => self.staged.push(row),
        }
        Ok(())
    }

    async fn commit(self) -> Result<(), Self::Error> {
        if self.reject_commit {
            return Err(MemoryTableError::CommitRejected);
        }

        *lock_rows(&self.rows)? = self.staged;
        Ok(())
    }

    async fn rollback(self) -> Result<(), Self::Error> {
        Ok(())
    }
}
