use std::collections::BTreeSet;

use carvault_core::{DecodeError, Snapshot};
use carvault_crypto::Crypto;
use carvault_store::{RowTable, SnapshotStore, StoreError};
use tracing::{error, info};

pub const SAVED_MESSAGE: &str = "Saved success";
pub const EMPTY_MESSAGE: &str = "Database is empty";

/// The working list of vehicles a front end edits, plus the save/load
/// state it shows.
pub struct Garage<T, C> {
    store: SnapshotStore<T, C>,
    vehicles: Vec<Snapshot>,
    loading: bool,
    message: Option<String>,
}

impl<T, C> Garage<T, C>
where
    T: RowTable,
    C: Crypto + 'static,
{
    pub fn new(store: SnapshotStore<T, C>) -> Self {
        Self {
            store,
            vehicles: Vec::new(),
            loading: false,
            message: None,
        }
    }

    pub fn store(&self) -> &SnapshotStore<T, C> {
        &self.store
    }

    pub fn vehicles(&self) -> &[Snapshot] {
        &self.vehicles
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn dismiss_message(&mut self) {
        self.message = None;
    }

    pub fn add_vehicle(&mut self, snapshot: Snapshot) {
        self.vehicles.push(snapshot);
    }

    /// Adds a vehicle built from the bundled sample payloads.
    pub fn add_sample_vehicle(&mut self) -> Result<&Snapshot, DecodeError> {
        self.vehicles.push(Snapshot::sample()?);
        Ok(&self.vehicles[self.vehicles.len() - 1])
    }

    /// Removes the vehicles at `offsets`. Offsets past the end are ignored.
    pub fn delete_vehicles(&mut self, offsets: impl IntoIterator<Item = usize>) {
        let offsets: BTreeSet<usize> = offsets.into_iter().collect();
        let mut index = 0;
        self.vehicles.retain(|_| {
            let keep = !offsets.contains(&index);
            index += 1;
            keep
        });
    }

    /// Empties the working list. The store is untouched.
    pub fn clear(&mut self) {
        self.vehicles.clear();
        self.message = None;
    }

    /// Replaces the stored set with the working list, then empties the list.
    /// On failure the list is kept and the error becomes the message.
    pub async fn save(&mut self) -> Result<(), StoreError> {
        self.loading = true;
        self.message = None;

        let result = self.store.upsert_all(self.vehicles.clone()).await;
        self.loading = false;

        match result {
            Ok(()) => {
                info!(vehicles = self.vehicles.len(), "garage saved");
                self.vehicles.clear();
                self.message = Some(SAVED_MESSAGE.to_string());
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Replaces the working list with the stored set.
    pub async fn load(&mut self) -> Result<(), StoreError> {
        self.loading = true;

        let result = self.store.fetch_all().await;
        self.loading = false;

        match result {
            Ok(vehicles) => {
                self.message = vehicles.is_empty().then(|| EMPTY_MESSAGE.to_string());
                self.vehicles = vehicles;
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&mut self, e: StoreError) -> StoreError {
        error!(error = %e, "garage store operation failed");
        self.message = Some(e.to_string());
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carvault_core::VehicleId;
    use carvault_crypto::{AesEcbCodec, StaticKey};
    use carvault_store::{ExecutionContext, MemoryRowTable};

    fn garage(table: MemoryRowTable) -> Garage<MemoryRowTable, AesEcbCodec> {
        let codec = AesEcbCodec::from_provider(&StaticKey::legacy()).unwrap();
        Garage::new(SnapshotStore::new(table, codec, ExecutionContext::main()))
    }

    fn identities<T: RowTable, C: Crypto + 'static>(garage: &Garage<T, C>) -> Vec<String> {
        garage
            .vehicles()
            .iter()
            .map(|s| s.identity().to_string())
            .collect()
    }

    fn vehicle(id: &str) -> Snapshot {
        Snapshot::new(
            VehicleId::from(id),
            carvault_core::sample::status().unwrap(),
            carvault_core::sample::attributes().unwrap(),
        )
    }

    #[test]
    fn delete_removes_only_listed_offsets() {
        let mut garage = garage(MemoryRowTable::default());
        for id in ["A", "B", "C", "D"] {
            garage.add_vehicle(vehicle(id));
        }

        garage.delete_vehicles([3, 1, 9]);
        assert_eq!(identities(&garage), ["A", "C"]);

        garage.clear();
        assert!(garage.vehicles().is_empty());
    }

    #[tokio::test]
    async fn save_empties_list_and_reports_success() -> Result<(), StoreError> {
        let mut garage = garage(MemoryRowTable::default());
        garage.add_sample_vehicle().unwrap();
        garage.add_vehicle(vehicle("B"));

        garage.save().await?;

        assert!(garage.vehicles().is_empty());
        assert!(!garage.is_loading());
        assert_eq!(garage.message(), Some(SAVED_MESSAGE));
        assert_eq!(garage.store().fetch_all().await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn load_restores_saved_vehicles() -> Result<(), StoreError> {
        let table = MemoryRowTable::default();
        let mut writer = garage(table.clone());
        writer.add_vehicle(vehicle("A"));
        writer.add_vehicle(vehicle("B"));
        let saved = writer.vehicles().to_vec();
        writer.save().await?;

        let mut reader = garage(table);
        reader.load().await?;

        assert_eq!(reader.vehicles(), saved.as_slice());
        assert_eq!(reader.message(), None);
        Ok(())
    }

    #[tokio::test]
    async fn load_of_empty_store_says_so() -> Result<(), StoreError> {
        let mut garage = garage(MemoryRowTable::default());
        garage.add_vehicle(vehicle("A"));

        garage.load().await?;

        assert!(garage.vehicles().is_empty());
        assert_eq!(garage.message(), Some(EMPTY_MESSAGE));
        garage.dismiss_message();
        assert_eq!(garage.message(), None);
        Ok(())
    }

    #[tokio::test]
    async fn failed_save_keeps_list_and_shows_error() {
        let table = MemoryRowTable::default();
        let mut garage = garage(table.clone());
        garage.add_vehicle(vehicle("A"));

        table.reject_next_commit();
        let err = garage.save().await.unwrap_err();

        assert_eq!(identities(&garage), ["A"]);
        assert!(!garage.is_loading());
        assert_eq!(garage.message(), Some(err.to_string().as_str()));
    }
}
