//! Volume lifecycle operations
//!
//! This module implements the state machine governing Volume creation and
//! deletion. It allocates backing capacity, persists Volume records, and
//! synchronizes with the node agent purely by observing the record's phase:
//! the agent flips `Creating` to `Created`/`FailedToCreate` and `Removing`
//! to `Removed`/`FailToRemove`, and the operations here only ever poll for
//! those transitions.
//!
//! Deletion and reclamation are idempotent: re-running them after a crash
//! or a retried call converges to the same end state.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::capacity::CapacityProvider;
use crate::crd::{
    AvailableCapacity, AvailableCapacitySpec, StorageClass, Volume, VolumePhase, VolumeSpec,
};
use crate::store::RecordStore;
use crate::{Error, CREATION_ALLOWANCE, STATUS_POLL_INTERVAL};

/// A request to create a volume
#[derive(Clone, Debug, Default)]
pub struct CreateVolumeRequest {
    /// Volume id; generated when absent
    pub id: Option<String>,
    /// Node to allocate on; empty means any node
    pub node_id: String,
    /// Requested size in bytes
    pub size_bytes: i64,
    /// Requested storage class
    pub storage_class: StorageClass,
}

/// Volume lifecycle operations over a record store and a capacity oracle
pub struct VolumeOperations {
    store: Arc<dyn RecordStore>,
    capacity: Arc<dyn CapacityProvider>,
    creation_allowance: Duration,
    poll_interval: Duration,
}

impl VolumeOperations {
    /// Create operations with the default creation allowance and poll interval
    pub fn new(store: Arc<dyn RecordStore>, capacity: Arc<dyn CapacityProvider>) -> Self {
        Self::with_timing(store, capacity, CREATION_ALLOWANCE, STATUS_POLL_INTERVAL)
    }

    /// Create operations with explicit timing, for tests and tuning
    pub fn with_timing(
        store: Arc<dyn RecordStore>,
        capacity: Arc<dyn CapacityProvider>,
        creation_allowance: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store,
            capacity,
            creation_allowance,
            poll_interval,
        }
    }

    /// Create a volume, or converge on a creation already in flight.
    ///
    /// When no record exists, capacity is searched and a new Volume is
    /// persisted in phase `Creating`; provisioning completes asynchronously
    /// and callers that need it done block on [`wait_phase`](Self::wait_phase).
    /// When a record already exists the call is a retry: a `Created` record
    /// returns immediately, a recent one is waited on, and one older than
    /// the creation allowance is reported as stuck.
    ///
    /// A whole-drive match consumes the entire drive, so the resulting
    /// volume takes the drive's full size; a group-class match consumes only
    /// the requested bytes out of the group's pool.
    #[instrument(skip(self, cancel, request), fields(volume_id = tracing::field::Empty))]
    pub async fn create_volume(
        &self,
        cancel: &CancellationToken,
        request: CreateVolumeRequest,
    ) -> Result<VolumeSpec, Error> {
        let volume_id = request
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        tracing::Span::current().record("volume_id", volume_id.as_str());

        match self.store.read_volume(&volume_id).await {
            Ok(existing) => self.converge_existing(cancel, &volume_id, existing).await,
            Err(e) if e.is_not_found() => self.allocate_new(&volume_id, &request).await,
            Err(e) => Err(e),
        }
    }

    /// A record already exists: creation was started by a prior call
    async fn converge_existing(
        &self,
        cancel: &CancellationToken,
        volume_id: &str,
        existing: Volume,
    ) -> Result<VolumeSpec, Error> {
        if existing.spec.phase == VolumePhase::Created {
            debug!(volume = %volume_id, "volume already created, returning existing spec");
            return Ok(existing.spec);
        }

        let age = existing
            .metadata
            .creation_timestamp
            .as_ref()
            .map(|t| (Utc::now() - t.0).to_std().unwrap_or_default())
            .unwrap_or_default();
        if age > self.creation_allowance {
            warn!(volume = %volume_id, age_secs = age.as_secs(), "volume stuck past creation allowance");
            return Err(Error::internal("unable to create volume in allocated time"));
        }

        match self
            .wait_phase(
                cancel,
                volume_id,
                &[VolumePhase::Created, VolumePhase::FailedToCreate],
            )
            .await
        {
            Some(VolumePhase::Created) => {
                let volume = self.store.read_volume(volume_id).await?;
                Ok(volume.spec)
            }
            Some(_) | None => Err(Error::internal(format!(
                "volume {volume_id} was not created"
            ))),
        }
    }

    /// No record exists yet: pick capacity and persist the volume
    async fn allocate_new(
        &self,
        volume_id: &str,
        request: &CreateVolumeRequest,
    ) -> Result<VolumeSpec, Error> {
        let found = self
            .capacity
            .search_capacity(
                volume_id,
                &request.node_id,
                request.size_bytes,
                request.storage_class,
            )
            .await?;

        let Some(capacity) = found else {
            return Err(Error::resource_exhausted(format!(
                "no available capacity for {} bytes of {}",
                request.size_bytes, request.storage_class
            )));
        };

        // A raw drive cannot be subdivided outside a group: whole-drive
        // matches take the drive's entire size, group matches take only
        // what was asked for.
        let size_bytes = if capacity.spec.storage_class.is_lvg() {
            request.size_bytes
        } else {
            capacity.spec.size_bytes
        };

        let spec = VolumeSpec {
            id: volume_id.to_string(),
            node_id: capacity.spec.node_id.clone(),
            location: capacity.spec.location.clone(),
            storage_class: capacity.spec.storage_class,
            size_bytes,
            phase: VolumePhase::Creating,
        };

        self.store
            .create_volume(&Volume::new(volume_id, spec.clone()))
            .await?;

        info!(
            volume = %volume_id,
            location = %spec.location,
            class = %spec.storage_class,
            size_bytes,
            "volume record created"
        );
        Ok(spec)
    }

    /// Request removal of a named volume; idempotent.
    ///
    /// The physical removal is performed asynchronously by the node agent
    /// once the phase reaches `Removing`. A volume already `Removing` or
    /// `Removed` is left untouched; `FailToRemove` is non-retryable here
    /// and needs out-of-band remediation.
    #[instrument(skip(self))]
    pub async fn delete_volume(&self, name: &str) -> Result<(), Error> {
        let mut volume = self.store.read_volume(name).await?;

        match volume.spec.phase {
            VolumePhase::FailToRemove => {
                Err(Error::internal("volume has reached FailToRemove status"))
            }
            phase if phase.removal_in_progress() => {
                debug!(volume = %name, %phase, "removal already underway");
                Ok(())
            }
            _ => {
                volume.spec.phase = VolumePhase::Removing;
                self.store.update_volume(&volume).await?;
                info!(volume = %name, "removal requested");
                Ok(())
            }
        }
    }

    /// Poll the named volume until its phase reaches one of `targets`.
    ///
    /// Returns the reached phase, or `None` when the wait is inconclusive:
    /// the token was already cancelled, the record could not be read
    /// (absence included, which is not retried), or cancellation arrived
    /// mid-wait. Turning `None` into an error is the caller's business.
    pub async fn wait_phase(
        &self,
        cancel: &CancellationToken,
        name: &str,
        targets: &[VolumePhase],
    ) -> Option<VolumePhase> {
        loop {
            if cancel.is_cancelled() {
                return None;
            }

            match self.store.read_volume(name).await {
                Err(_) => return None,
                Ok(volume) if targets.contains(&volume.spec.phase) => {
                    return Some(volume.spec.phase)
                }
                Ok(_) => {}
            }

            tokio::select! {
                _ = cancel.cancelled() => return None,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }

    /// Reclaim capacity and erase the record of a physically removed volume.
    ///
    /// Invoked once the agent has confirmed removal. Group-class capacity is
    /// returned to the co-located AvailableCapacity record, which is created
    /// afresh when the pool had been fully exhausted; whole-drive capacity
    /// is re-announced by the agent itself, so no record is touched for it.
    /// The Volume record is deleted unconditionally. Tolerant of partial
    /// prior state: an absent volume is a no-op.
    #[instrument(skip(self))]
    pub async fn finalize_removed_volume(&self, name: &str) -> Result<(), Error> {
        let volume = match self.store.read_volume(name).await {
            Ok(volume) => volume,
            Err(e) if e.is_not_found() => {
                debug!(volume = %name, "already erased, nothing to finalize");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if volume.spec.storage_class.is_lvg() {
            self.return_capacity_to_group(&volume.spec).await?;
        }

        self.store.delete_volume(name).await?;
        info!(volume = %name, "volume record erased");
        Ok(())
    }

    /// Grow the AvailableCapacity record at the volume's location by the
    /// volume's size, materializing the record if the pool was exhausted
    async fn return_capacity_to_group(&self, volume: &VolumeSpec) -> Result<(), Error> {
        let existing = self
            .store
            .list_capacity()
            .await?
            .into_iter()
            .find(|ac| ac.spec.location == volume.location);

        match existing {
            Some(mut capacity) => {
                capacity.spec.size_bytes += volume.size_bytes;
                self.store.update_capacity(&capacity).await?;
                info!(
                    location = %volume.location,
                    returned_bytes = volume.size_bytes,
                    total_bytes = capacity.spec.size_bytes,
                    "capacity returned to group"
                );
            }
            None => {
                // The pool had been fully exhausted. The group itself should
                // still exist; a missing one means the agent tore it down
                // underneath us, which reclamation tolerates.
                if let Err(e) = self.store.read_lvg(&volume.location).await {
                    if e.is_not_found() {
                        warn!(location = %volume.location, "owning group record is gone");
                    } else {
                        return Err(e);
                    }
                }

                let name = uuid::Uuid::new_v4().to_string();
                let capacity = AvailableCapacity::new(
                    &name,
                    AvailableCapacitySpec {
                        location: volume.location.clone(),
                        node_id: volume.node_id.clone(),
                        storage_class: volume.storage_class,
                        size_bytes: volume.size_bytes,
                    },
                );
                self.store.create_capacity(&capacity).await?;
                info!(
                    location = %volume.location,
                    size_bytes = volume.size_bytes,
                    "capacity record re-materialized for exhausted group"
                );
            }
        }
        Ok(())
    }

    /// Read the named volume and persist it with a new phase.
    ///
    /// Used by the layers that relay agent results; no other field is
    /// touched. Fails with a not-found error when the record is absent.
    pub async fn read_volume_and_change_phase(
        &self,
        name: &str,
        new_phase: VolumePhase,
    ) -> Result<(), Error> {
        let mut volume = self.store.read_volume(name).await?;
        volume.spec.phase = new_phase;
        self.store.update_volume(&volume).await
    }
}
