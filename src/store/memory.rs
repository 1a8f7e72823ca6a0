//! In-memory record store for tests
//!
//! Behaves like a fake API server: create stamps a creation timestamp if the
//! caller did not provide one, duplicate creates conflict, and reads of
//! absent names report not-found. Used anywhere a test wants real store
//! semantics instead of per-call mock expectations.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::ResourceExt;

use super::RecordStore;
use crate::crd::{AvailableCapacity, LogicalVolumeGroup, Volume};
use crate::Error;

/// In-memory implementation of [`RecordStore`]
#[derive(Default)]
pub struct MemoryStore {
    volumes: Mutex<BTreeMap<String, Volume>>,
    capacities: Mutex<BTreeMap<String, AvailableCapacity>>,
    lvgs: Mutex<BTreeMap<String, LogicalVolumeGroup>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a LogicalVolumeGroup record
    pub fn insert_lvg(&self, lvg: LogicalVolumeGroup) {
        self.lvgs.lock().unwrap().insert(lvg.name_any(), lvg);
    }

    fn conflict(name: &str) -> Error {
        Error::validation(format!("record {name} already exists"))
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create_volume(&self, volume: &Volume) -> Result<(), Error> {
        let mut volumes = self.volumes.lock().unwrap();
        let name = volume.name_any();
        if volumes.contains_key(&name) {
            return Err(Self::conflict(&name));
        }
        let mut volume = volume.clone();
        if volume.metadata.creation_timestamp.is_none() {
            volume.metadata.creation_timestamp = Some(Time(chrono::Utc::now()));
        }
        volumes.insert(name, volume);
        Ok(())
    }

    async fn read_volume(&self, name: &str) -> Result<Volume, Error> {
        self.volumes
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("volume {name}")))
    }

    async fn update_volume(&self, volume: &Volume) -> Result<(), Error> {
        let mut volumes = self.volumes.lock().unwrap();
        let name = volume.name_any();
        if !volumes.contains_key(&name) {
            return Err(Error::not_found(format!("volume {name}")));
        }
        volumes.insert(name, volume.clone());
        Ok(())
    }

    async fn delete_volume(&self, name: &str) -> Result<(), Error> {
        self.volumes
            .lock()
            .unwrap()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("volume {name}")))
    }

    async fn list_volumes(&self) -> Result<Vec<Volume>, Error> {
        Ok(self.volumes.lock().unwrap().values().cloned().collect())
    }

    async fn create_capacity(&self, capacity: &AvailableCapacity) -> Result<(), Error> {
        let mut capacities = self.capacities.lock().unwrap();
        let name = capacity.name_any();
        if capacities.contains_key(&name) {
            return Err(Self::conflict(&name));
        }
        capacities.insert(name, capacity.clone());
        Ok(())
    }

    async fn read_capacity(&self, name: &str) -> Result<AvailableCapacity, Error> {
        self.capacities
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("available capacity {name}")))
    }

    async fn update_capacity(&self, capacity: &AvailableCapacity) -> Result<(), Error> {
        let mut capacities = self.capacities.lock().unwrap();
        let name = capacity.name_any();
        if !capacities.contains_key(&name) {
            return Err(Error::not_found(format!("available capacity {name}")));
        }
        capacities.insert(name, capacity.clone());
        Ok(())
    }

    async fn delete_capacity(&self, name: &str) -> Result<(), Error> {
        self.capacities
            .lock()
            .unwrap()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("available capacity {name}")))
    }

    async fn list_capacity(&self) -> Result<Vec<AvailableCapacity>, Error> {
        Ok(self.capacities.lock().unwrap().values().cloned().collect())
    }

    async fn read_lvg(&self, name: &str) -> Result<LogicalVolumeGroup, Error> {
        self.lvgs
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("logical volume group {name}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::VolumeSpec;

    #[tokio::test]
    async fn test_create_stamps_creation_timestamp() {
        let store = MemoryStore::new();
        let volume = Volume::new("v1", VolumeSpec::default());
        store.create_volume(&volume).await.unwrap();

        let read = store.read_volume("v1").await.unwrap();
        assert!(read.metadata.creation_timestamp.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts() {
        let store = MemoryStore::new();
        let volume = Volume::new("v1", VolumeSpec::default());
        store.create_volume(&volume).await.unwrap();
        assert!(store.create_volume(&volume).await.is_err());
    }

    #[tokio::test]
    async fn test_read_absent_is_not_found() {
        let store = MemoryStore::new();
        let err = store.read_volume("ghost").await.unwrap_err();
        assert!(err.is_not_found());
        let err = store.read_capacity("ghost").await.unwrap_err();
        assert!(err.is_not_found());
        let err = store.read_lvg("ghost").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
