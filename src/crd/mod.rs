//! Custom Resource Definitions for strata
//!
//! This module contains all CRD definitions used by the strata operator.

mod capacity;
mod lvg;
mod types;
mod volume;

pub use capacity::{AvailableCapacity, AvailableCapacitySpec};
pub use lvg::{LogicalVolumeGroup, LogicalVolumeGroupSpec};
pub use types::{StorageClass, VolumePhase};
pub use volume::{Volume, VolumeSpec};
