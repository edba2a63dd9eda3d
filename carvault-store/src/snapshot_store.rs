use std::sync::Arc;

use carvault_core::json::ENCODE_FAILURE_MARKER;
use carvault_core::timestamp;
use carvault_core::{AttributesPayload, Snapshot, StatusPayload, VehicleId};
use carvault_crypto::{Crypto, TextCipherExt};
use tracing::{debug, info, warn};

use crate::context::ExecutionContext;
use crate::error::StoreError;
use crate::storage::{PersistedRow, RowTable, RowTransaction};

/// Encrypted persistence of vehicle snapshots over a [`RowTable`].
///
/// Every operation runs on the store's [`ExecutionContext`]. A write that
/// has started runs to its end even if the caller stops waiting.
pub struct SnapshotStore<T, C> {
    table: T,
    crypto: Arc<C>,
    context: ExecutionContext,
}

impl<T, C> SnapshotStore<T, C>
where
    T: RowTable,
    C: Crypto + 'static,
{
    pub fn new(table: T, crypto: C, context: ExecutionContext) -> Self {
        Self {
            table,
            crypto: Arc::new(crypto),
            context,
        }
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Makes `snapshots` the entire stored set.
    ///
    /// Existing rows are removed and the given snapshots written in one
    /// transaction: on any error the stored set is left as it was. Two
    /// snapshots with the same identity leave one row, the later one.
    pub async fn upsert_all(&self, snapshots: Vec<Snapshot>) -> Result<(), StoreError> {
        let lane = self.context.enter().await;
        let table = self.table.clone();
        let crypto = Arc::clone(&self.crypto);
        let context = self.context.clone();

        let task = tokio::spawn(async move {
            let _lane = lane;
            replace_all(&table, crypto.as_ref(), &snapshots).await?;
            info!(context = %context, vehicles = snapshots.len(), "saved snapshots");
            Ok::<_, StoreError>(())
        });

        task.await?
    }

    /// Every stored snapshot, decrypted. Any unreadable row fails the whole
    /// call.
    pub async fn fetch_all(&self) -> Result<Vec<Snapshot>, StoreError> {
        let _lane = self.context.enter().await;

        let rows = self.table.fetch_all().await.map_err(StoreError::table)?;
        let snapshots = rows
            .iter()
            .map(|row| open_row(self.crypto.as_ref(), row))
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|e| warn!(context = %self.context, error = %e, "unreadable row"))?;

        debug!(context = %self.context, vehicles = snapshots.len(), "fetched snapshots");
        Ok(snapshots)
    }

    /// Removes every stored snapshot.
    pub async fn clear_all(&self) -> Result<u64, StoreError> {
        let lane = self.context.enter().await;
        let table = self.table.clone();
        let context = self.context.clone();

        let task = tokio::spawn(async move {
            let _lane = lane;
            let mut tx = table.begin().await.map_err(StoreError::table)?;
            let removed = tx.delete_all().await.map_err(StoreError::table)?;
            tx.commit().await.map_err(StoreError::commit)?;
            info!(context = %context, removed, "cleared snapshots");
            Ok::<_, StoreError>(removed)
        });

        task.await?
    }
}

async fn replace_all<T, C>(table: &T, crypto: &C, snapshots: &[Snapshot]) -> Result<(), StoreError>
where
    T: RowTable,
    C: Crypto + ?Sized,
{
    let mut tx = table.begin().await.map_err(StoreError::table)?;

    if let Err(e) = write_rows(&mut tx, crypto, snapshots).await {
        if let Err(rollback) = tx.rollback().await {
            warn!(error = %rollback, "rollback failed");
        }
        return Err(e);
    }

    tx.commit().await.map_err(StoreError::commit)
}

async fn write_rows<X, C>(tx: &mut X, crypto: &C, snapshots: &[Snapshot]) -> Result<(), StoreError>
where
    X: RowTransaction,
    C: Crypto + ?Sized,
{
    let removed = tx.delete_all().await.map_err(StoreError::table)?;
    debug!(removed, "cleared rows before write");

    for snapshot in snapshots {
        let row = seal_row(crypto, snapshot)?;
        tx.upsert(row).await.map_err(StoreError::table)?;
    }

    Ok(())
}

fn seal_row<C>(crypto: &C, snapshot: &Snapshot) -> Result<PersistedRow, StoreError>
where
    C: Crypto + ?Sized,
{
    if snapshot.status_text() == ENCODE_FAILURE_MARKER
        || snapshot.attributes_text() == ENCODE_FAILURE_MARKER
    {
        return Err(StoreError::Unencodable(snapshot.identity().clone()));
    }
    // stored timestamps must parse back
    timestamp::format_lossless(snapshot.timestamp())?;

    Ok(PersistedRow {
        identity_ciphertext: snapshot.identity().as_str().encrypted(crypto)?,
        status_ciphertext: snapshot.status_text().encrypted(crypto)?,
        attributes_ciphertext: snapshot.attributes_text().encrypted(crypto)?,
        timestamp: snapshot.timestamp(),
    })
}

fn open_row<C>(crypto: &C, row: &PersistedRow) -> Result<Snapshot, StoreError>
where
    C: Crypto + ?Sized,
{
    let identity = VehicleId::from(row.identity_ciphertext.decrypted(crypto)?);
    let status = StatusPayload::from_json(&row.status_ciphertext.decrypted(crypto)?)?;
    let attributes = AttributesPayload::from_json(&row.attributes_ciphertext.decrypted(crypto)?)?;

    Ok(Snapshot::with_timestamp(
        identity,
        status,
        attributes,
        row.timestamp,
    ))
}
