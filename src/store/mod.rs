//! Typed record store over the storage CRDs
//!
//! The store is the only channel between the operator and the node agent:
//! both sides read-modify-write the same records through the Kubernetes API.
//! The [`RecordStore`] trait abstracts that access so volume operations can
//! be exercised against an in-memory store in tests.

use async_trait::async_trait;
use kube::api::{Api, ListParams, PostParams};
use kube::Client;

#[cfg(test)]
use mockall::automock;

use crate::crd::{AvailableCapacity, LogicalVolumeGroup, Volume};
use crate::Error;

#[cfg(test)]
pub mod memory;

/// Strongly-typed CRUD + list over the three record kinds.
///
/// All records are keyed by name. Reads of absent records fail with a
/// not-found error (`Error::is_not_found` returns true); the store performs
/// no retries of its own.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a new Volume record
    async fn create_volume(&self, volume: &Volume) -> Result<(), Error>;

    /// Read a Volume record by name
    async fn read_volume(&self, name: &str) -> Result<Volume, Error>;

    /// Replace an existing Volume record
    async fn update_volume(&self, volume: &Volume) -> Result<(), Error>;

    /// Delete a Volume record by name
    async fn delete_volume(&self, name: &str) -> Result<(), Error>;

    /// List all Volume records
    async fn list_volumes(&self) -> Result<Vec<Volume>, Error>;

    /// Persist a new AvailableCapacity record
    async fn create_capacity(&self, capacity: &AvailableCapacity) -> Result<(), Error>;

    /// Read an AvailableCapacity record by name
    async fn read_capacity(&self, name: &str) -> Result<AvailableCapacity, Error>;

    /// Replace an existing AvailableCapacity record
    async fn update_capacity(&self, capacity: &AvailableCapacity) -> Result<(), Error>;

    /// Delete an AvailableCapacity record by name
    async fn delete_capacity(&self, name: &str) -> Result<(), Error>;

    /// List all AvailableCapacity records
    async fn list_capacity(&self) -> Result<Vec<AvailableCapacity>, Error>;

    /// Read a LogicalVolumeGroup record by name
    async fn read_lvg(&self, name: &str) -> Result<LogicalVolumeGroup, Error>;
}

/// Record store backed by the Kubernetes API.
///
/// All three CRDs are cluster-scoped, so every `Api` handle is `Api::all`.
pub struct KubeRecordStore {
    client: Client,
}

impl KubeRecordStore {
    /// Create a new KubeRecordStore wrapping the given kube Client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn volumes(&self) -> Api<Volume> {
        Api::all(self.client.clone())
    }

    fn capacities(&self) -> Api<AvailableCapacity> {
        Api::all(self.client.clone())
    }

    fn lvgs(&self) -> Api<LogicalVolumeGroup> {
        Api::all(self.client.clone())
    }

    /// Translate a kube 404 into our NotFound, naming the missing record
    fn map_read_err(err: kube::Error, what: String) -> Error {
        match err {
            kube::Error::Api(ae) if ae.code == 404 => Error::NotFound(what),
            other => Error::Kube(other),
        }
    }
}

#[async_trait]
impl RecordStore for KubeRecordStore {
    async fn create_volume(&self, volume: &Volume) -> Result<(), Error> {
        self.volumes()
            .create(&PostParams::default(), volume)
            .await?;
        Ok(())
    }

    async fn read_volume(&self, name: &str) -> Result<Volume, Error> {
        self.volumes()
            .get(name)
            .await
            .map_err(|e| Self::map_read_err(e, format!("volume {name}")))
    }

    async fn update_volume(&self, volume: &Volume) -> Result<(), Error> {
        let name = volume.metadata.name.as_deref().ok_or_else(|| {
            Error::validation("cannot update a volume record without a name")
        })?;
        self.volumes()
            .replace(name, &PostParams::default(), volume)
            .await?;
        Ok(())
    }

    async fn delete_volume(&self, name: &str) -> Result<(), Error> {
        self.volumes().delete(name, &Default::default()).await?;
        Ok(())
    }

    async fn list_volumes(&self) -> Result<Vec<Volume>, Error> {
        Ok(self.volumes().list(&ListParams::default()).await?.items)
    }

    async fn create_capacity(&self, capacity: &AvailableCapacity) -> Result<(), Error> {
        self.capacities()
            .create(&PostParams::default(), capacity)
            .await?;
        Ok(())
    }

    async fn read_capacity(&self, name: &str) -> Result<AvailableCapacity, Error> {
        self.capacities()
            .get(name)
            .await
            .map_err(|e| Self::map_read_err(e, format!("available capacity {name}")))
    }

    async fn update_capacity(&self, capacity: &AvailableCapacity) -> Result<(), Error> {
        let name = capacity.metadata.name.as_deref().ok_or_else(|| {
            Error::validation("cannot update a capacity record without a name")
        })?;
        self.capacities()
            .replace(name, &PostParams::default(), capacity)
            .await?;
        Ok(())
    }

    async fn delete_capacity(&self, name: &str) -> Result<(), Error> {
        self.capacities().delete(name, &Default::default()).await?;
        Ok(())
    }

    async fn list_capacity(&self) -> Result<Vec<AvailableCapacity>, Error> {
        Ok(self.capacities().list(&ListParams::default()).await?.items)
    }

    async fn read_lvg(&self, name: &str) -> Result<LogicalVolumeGroup, Error> {
        self.lvgs()
            .get(name)
            .await
            .map_err(|e| Self::map_read_err(e, format!("logical volume group {name}")))
    }
}
