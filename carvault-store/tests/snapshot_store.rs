use std::sync::Arc;
use std::time::Duration;

use carvault_core::{Snapshot, VehicleId, sample};
use carvault_crypto::{AesEcbCodec, Crypto, CryptoError, StaticKey};
use carvault_store::storage::{MemoryRowTable, PersistedRow, RowTable, RowTransaction, SqliteRowTable};
use carvault_store::{ExecutionContext, SnapshotStore, StoreError};
use jiff::Timestamp;
use tempfile::NamedTempFile;

fn codec() -> AesEcbCodec {
    AesEcbCodec::from_provider(&StaticKey::legacy()).unwrap()
}

fn snapshot(id: &str) -> Snapshot {
    Snapshot::new(
        VehicleId::from(id),
        sample::status().unwrap(),
        sample::attributes().unwrap(),
    )
}

fn snapshot_at(id: &str, second: i64) -> Snapshot {
    Snapshot::with_timestamp(
        VehicleId::from(id),
        sample::status().unwrap(),
        sample::attributes().unwrap(),
        Timestamp::from_second(second).unwrap(),
    )
}

fn identities(snapshots: &[Snapshot]) -> Vec<&str> {
    snapshots.iter().map(|s| s.identity().as_str()).collect()
}

/// Refuses to encrypt one particular plaintext.
struct RefusingCrypto {
    inner: AesEcbCodec,
    refuse: &'static str,
}

impl Crypto for RefusingCrypto {
    fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        if plaintext == self.refuse {
            return Err(CryptoError::Cipher(format!("refusing {plaintext}")));
        }
        self.inner.encrypt(plaintext)
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CryptoError> {
        self.inner.decrypt(ciphertext)
    }
}

async fn replaces_whole_set<T: RowTable>(table: T) -> Result<(), StoreError> {
    let store = SnapshotStore::new(table, codec(), ExecutionContext::own("test"));

    store.upsert_all(vec![snapshot("A"), snapshot("B")]).await?;
    assert_eq!(identities(&store.fetch_all().await?), ["A", "B"]);

    store.upsert_all(vec![snapshot("C")]).await?;
    assert_eq!(identities(&store.fetch_all().await?), ["C"]);

    store.upsert_all(vec![]).await?;
    assert!(store.fetch_all().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn memory_replaces_whole_set() -> Result<(), StoreError> {
    replaces_whole_set(MemoryRowTable::default()).await
}

#[tokio::test]
async fn sqlite_replaces_whole_set() -> Result<(), StoreError> {
    let temp_file = NamedTempFile::new().unwrap();
    replaces_whole_set(SqliteRowTable::new(temp_file.path()).await.unwrap()).await
}

async fn fetch_returns_what_was_saved<T: RowTable>(table: T) -> Result<(), StoreError> {
    let store = SnapshotStore::new(table, codec(), ExecutionContext::main());
    let saved = vec![snapshot("SAJAA12B3CD456789"), snapshot("VIN-2")];

    store.upsert_all(saved.clone()).await?;

    assert_eq!(store.fetch_all().await?, saved);
    Ok(())
}

#[tokio::test]
async fn memory_fetch_returns_what_was_saved() -> Result<(), StoreError> {
    fetch_returns_what_was_saved(MemoryRowTable::default()).await
}

#[tokio::test]
async fn sqlite_fetch_returns_what_was_saved() -> Result<(), StoreError> {
    fetch_returns_what_was_saved(SqliteRowTable::in_memory().await.unwrap()).await
}

async fn failed_write_changes_nothing<T: RowTable>(table: T) -> Result<(), StoreError> {
    let crypto = RefusingCrypto {
        inner: codec(),
        refuse: "C",
    };
    let store = SnapshotStore::new(table, crypto, ExecutionContext::background());
    store.upsert_all(vec![snapshot("A")]).await?;

    let err = store
        .upsert_all(vec![snapshot("B"), snapshot("C")])
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Crypto(_)), "{err}");

    assert_eq!(identities(&store.fetch_all().await?), ["A"]);
    Ok(())
}

#[tokio::test]
async fn memory_failed_write_changes_nothing() -> Result<(), StoreError> {
    failed_write_changes_nothing(MemoryRowTable::default()).await
}

#[tokio::test]
async fn sqlite_failed_write_changes_nothing() -> Result<(), StoreError> {
    let temp_file = NamedTempFile::new().unwrap();
    failed_write_changes_nothing(SqliteRowTable::new(temp_file.path()).await.unwrap()).await
}

async fn later_duplicate_wins<T: RowTable>(table: T) -> Result<(), StoreError> {
    let store = SnapshotStore::new(table, codec(), ExecutionContext::main());

    store
        .upsert_all(vec![snapshot_at("A", 1_700_000_000), snapshot_at("A", 1_700_000_500)])
        .await?;

    let stored = store.fetch_all().await?;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].timestamp(), Timestamp::from_second(1_700_000_500).unwrap());
    Ok(())
}

#[tokio::test]
async fn memory_later_duplicate_wins() -> Result<(), StoreError> {
    later_duplicate_wins(MemoryRowTable::default()).await
}

#[tokio::test]
async fn sqlite_later_duplicate_wins() -> Result<(), StoreError> {
    later_duplicate_wins(SqliteRowTable::in_memory().await.unwrap()).await
}

async fn unreadable_timestamps_are_refused<T: RowTable>(table: T) -> Result<(), StoreError> {
    let store = SnapshotStore::new(table, codec(), ExecutionContext::own("test"));
    store.upsert_all(vec![snapshot("A")]).await?;
    let before_year_zero: Timestamp = "-000001-06-01T00:00:00Z".parse().unwrap();

    let stale = Snapshot::with_timestamp(
        VehicleId::from("B"),
        sample::status().unwrap(),
        sample::attributes().unwrap(),
        before_year_zero,
    );
    let err = store.upsert_all(vec![stale]).await.unwrap_err();
    assert!(matches!(err, StoreError::Timestamp(_)), "{err}");

    let mut status = sample::status().unwrap();
    status.last_updated = before_year_zero;
    let unencodable = Snapshot::new(VehicleId::from("C"), status, sample::attributes().unwrap());
    let err = store.upsert_all(vec![unencodable]).await.unwrap_err();
    assert!(matches!(err, StoreError::Unencodable(_)), "{err}");

    assert_eq!(identities(&store.fetch_all().await?), ["A"]);
    Ok(())
}

#[tokio::test]
async fn memory_unreadable_timestamps_are_refused() -> Result<(), StoreError> {
    unreadable_timestamps_are_refused(MemoryRowTable::default()).await
}

#[tokio::test]
async fn sqlite_unreadable_timestamps_are_refused() -> Result<(), StoreError> {
    unreadable_timestamps_are_refused(SqliteRowTable::in_memory().await.unwrap()).await
}

#[tokio::test]
async fn rejected_commit_is_reported_and_changes_nothing() -> Result<(), StoreError> {
    let table = MemoryRowTable::default();
    let store = SnapshotStore::new(table.clone(), codec(), ExecutionContext::main());
    store.upsert_all(vec![snapshot("A")]).await?;

    table.reject_next_commit();
    let err = store.upsert_all(vec![snapshot("B")]).await.unwrap_err();
    assert!(matches!(err, StoreError::Commit(_)), "{err}");

    assert_eq!(identities(&store.fetch_all().await?), ["A"]);
    Ok(())
}

#[tokio::test]
async fn clear_all_empties_the_store() -> Result<(), StoreError> {
    let temp_file = NamedTempFile::new().unwrap();
    let table = SqliteRowTable::new(temp_file.path()).await.unwrap();
    let store = SnapshotStore::new(table, codec(), ExecutionContext::main());

    store.upsert_all(vec![snapshot("A"), snapshot("B")]).await?;
    assert_eq!(store.clear_all().await?, 2);
    assert!(store.fetch_all().await?.is_empty());
    assert_eq!(store.clear_all().await?, 0);

    Ok(())
}

#[tokio::test]
async fn one_unreadable_row_fails_the_fetch() -> Result<(), StoreError> {
    let table = MemoryRowTable::default();
    let store = SnapshotStore::new(table.clone(), codec(), ExecutionContext::main());
    store.upsert_all(vec![snapshot("A")]).await?;

    let mut tx = table.begin().await.unwrap();
    tx.upsert(PersistedRow {
        identity_ciphertext: "not ciphertext".to_string(),
        status_ciphertext: "x".to_string(),
        attributes_ciphertext: "y".to_string(),
        timestamp: Timestamp::now(),
    })
    .await
    .unwrap();
    tx.commit().await.unwrap();

    let err = store.fetch_all().await.unwrap_err();
    assert!(matches!(err, StoreError::Crypto(_)), "{err}");
    Ok(())
}

#[tokio::test]
async fn rows_written_under_another_key_are_unreadable() -> Result<(), StoreError> {
    let table = MemoryRowTable::default();
    let writer = SnapshotStore::new(table.clone(), codec(), ExecutionContext::main());
    writer.upsert_all(vec![snapshot("A")]).await?;

    let other = AesEcbCodec::new(b"0123456789abcdef").unwrap();
    let reader = SnapshotStore::new(table, other, ExecutionContext::main());

    assert!(reader.fetch_all().await.is_err());
    Ok(())
}

#[tokio::test]
async fn concurrent_saves_leave_one_whole_set() -> Result<(), StoreError> {
    let table = SqliteRowTable::in_memory().await.unwrap();
    let store = Arc::new(SnapshotStore::new(table, codec(), ExecutionContext::background()));

    let first = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.upsert_all(vec![snapshot("A"), snapshot("B")]).await }
    });
    let second = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.upsert_all(vec![snapshot("C")]).await }
    });
    first.await.unwrap()?;
    second.await.unwrap()?;

    let stored = store.fetch_all().await?;
    let ids = identities(&stored);
    assert!(ids == ["A", "B"] || ids == ["C"], "{ids:?}");
    Ok(())
}

#[tokio::test]
async fn abandoned_save_is_all_or_nothing() -> Result<(), StoreError> {
    let table = MemoryRowTable::default();
    let store = SnapshotStore::new(table, codec(), ExecutionContext::main());
    store.upsert_all(vec![snapshot("A")]).await?;

    let _ = tokio::time::timeout(
        Duration::ZERO,
        store.upsert_all(vec![snapshot("B"), snapshot("C")]),
    )
    .await;

    // waits behind the abandoned save if it got started
    let stored = store.fetch_all().await?;
    let ids = identities(&stored);
    assert!(ids == ["A"] || ids == ["B", "C"], "{ids:?}");
    Ok(())
}
