//! AvailableCapacity Custom Resource Definition
//!
//! An AvailableCapacity record is one unit of allocatable storage: either an
//! entire unpartitioned drive (whole-drive classes) or the free space inside
//! a LogicalVolumeGroup (group classes). Allocation consumes these records;
//! reclamation after volume deletion grows or re-creates them.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::StorageClass;

/// Specification for an AvailableCapacity record
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "storage.strata.dev",
    version = "v1alpha1",
    kind = "AvailableCapacity",
    plural = "availablecapacities",
    shortname = "ac",
    namespaced = false,
    printcolumn = r#"{"name":"Node","type":"string","jsonPath":".spec.nodeId"}"#,
    printcolumn = r#"{"name":"Class","type":"string","jsonPath":".spec.storageClass"}"#,
    printcolumn = r#"{"name":"Size","type":"integer","jsonPath":".spec.sizeBytes"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct AvailableCapacitySpec {
    /// Drive UUID or LogicalVolumeGroup name this capacity sits at
    pub location: String,

    /// Node the capacity belongs to
    pub node_id: String,

    /// Class of the backing storage
    #[serde(default)]
    pub storage_class: StorageClass,

    /// Allocatable size in bytes; never negative
    #[serde(default)]
    pub size_bytes: i64,
}
