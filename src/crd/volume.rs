//! Volume Custom Resource Definition
//!
//! A Volume represents one logical node-local volume: the capacity it was
//! carved from, where it lives, and how far along its lifecycle it is. The
//! phase is part of the spec rather than a status subresource because both
//! the operator and the node agent read-modify-write the whole record; the
//! record is the single channel between them.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::{StorageClass, VolumePhase};

/// Specification for a Volume
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "storage.strata.dev",
    version = "v1alpha1",
    kind = "Volume",
    plural = "volumes",
    shortname = "vol",
    namespaced = false,
    printcolumn = r#"{"name":"Node","type":"string","jsonPath":".spec.nodeId"}"#,
    printcolumn = r#"{"name":"Class","type":"string","jsonPath":".spec.storageClass"}"#,
    printcolumn = r#"{"name":"Size","type":"integer","jsonPath":".spec.sizeBytes"}"#,
    printcolumn = r#"{"name":"Phase","type":"string","jsonPath":".spec.phase"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSpec {
    /// Unique volume identifier (also used as the record name)
    pub id: String,

    /// Node the volume lives on
    pub node_id: String,

    /// Backing location: a drive UUID for whole-drive classes, or the name
    /// of the owning LogicalVolumeGroup for group classes
    #[serde(default)]
    pub location: String,

    /// Storage class the volume was allocated from
    #[serde(default)]
    pub storage_class: StorageClass,

    /// Allocated size in bytes
    #[serde(default)]
    pub size_bytes: i64,

    /// Current lifecycle phase
    #[serde(default)]
    pub phase: VolumePhase,
}
