//! Capacity search
//!
//! [`CapacityProvider`] is the allocation oracle consumed by volume
//! creation: given a node, a size and a storage class it answers with the
//! AvailableCapacity record the new volume should be carved from, or nothing
//! if the request cannot be satisfied. The selection policy is opaque to the
//! caller; [`BestFitSelector`] is the in-tree policy.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

#[cfg(test)]
use mockall::automock;

use crate::crd::{AvailableCapacity, StorageClass};
use crate::store::RecordStore;
use crate::Error;

/// Oracle selecting the AvailableCapacity a volume should be allocated from.
///
/// `request_id` is the id of the volume being created, carried explicitly so
/// provider-side logs correlate with the originating request. An empty
/// `node_id` means the search spans all nodes.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CapacityProvider: Send + Sync {
    /// Find capacity satisfying the request, or `None` if nothing fits
    async fn search_capacity(
        &self,
        request_id: &str,
        node_id: &str,
        required_bytes: i64,
        storage_class: StorageClass,
    ) -> Result<Option<AvailableCapacity>, Error>;
}

/// Best-fit capacity selector over the record store.
///
/// Candidates must sit on the requested node (any node when unspecified),
/// be large enough, and carry a compatible class: the requested class
/// itself, or its group variant when no whole drive of that class fits.
/// Among candidates the smallest wins, so large drives stay available for
/// large requests. Cross-node ranking beyond this is deliberately absent.
pub struct BestFitSelector {
    store: Arc<dyn RecordStore>,
}

impl BestFitSelector {
    /// Create a selector over the given record store
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    fn class_matches(requested: StorageClass, candidate: StorageClass) -> bool {
        requested == StorageClass::Any || candidate == requested
    }

    /// Smallest AC of a class acceptable per `matches`, if any
    fn best_fit<'a>(
        candidates: &'a [AvailableCapacity],
        required_bytes: i64,
        matches: impl Fn(StorageClass) -> bool,
    ) -> Option<&'a AvailableCapacity> {
        candidates
            .iter()
            .filter(|ac| matches(ac.spec.storage_class) && ac.spec.size_bytes >= required_bytes)
            .min_by_key(|ac| ac.spec.size_bytes)
    }
}

#[async_trait]
impl CapacityProvider for BestFitSelector {
    #[instrument(skip(self), fields(request_id = %request_id))]
    async fn search_capacity(
        &self,
        request_id: &str,
        node_id: &str,
        required_bytes: i64,
        storage_class: StorageClass,
    ) -> Result<Option<AvailableCapacity>, Error> {
        let all = self.store.list_capacity().await?;
        let candidates: Vec<AvailableCapacity> = all
            .into_iter()
            .filter(|ac| node_id.is_empty() || ac.spec.node_id == node_id)
            .collect();

        // Requested class first, group variant as fallback
        let chosen = Self::best_fit(&candidates, required_bytes, |c| {
            Self::class_matches(storage_class, c)
        })
        .or_else(|| {
            storage_class.lvg_variant().and_then(|lvg| {
                Self::best_fit(&candidates, required_bytes, |c| c == lvg)
            })
        });

        debug!(
            node = %node_id,
            required_bytes,
            class = %storage_class,
            found = chosen.is_some(),
            "capacity search finished"
        );

        Ok(chosen.cloned())
    }
}
