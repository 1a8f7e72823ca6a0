//! LogicalVolumeGroup Custom Resource Definition
//!
//! A LogicalVolumeGroup aggregates several drives on one node into a single
//! pool from which group-class volumes are carved. The operator reads these
//! records as lookup targets for a Volume's location; it never creates or
//! mutates them (the node agent owns them).

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Specification for a LogicalVolumeGroup
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "storage.strata.dev",
    version = "v1alpha1",
    kind = "LogicalVolumeGroup",
    plural = "logicalvolumegroups",
    shortname = "lvg",
    namespaced = false,
    printcolumn = r#"{"name":"Node","type":"string","jsonPath":".spec.nodeId"}"#,
    printcolumn = r#"{"name":"Size","type":"integer","jsonPath":".spec.sizeBytes"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct LogicalVolumeGroupSpec {
    /// Group name (mirrors the record name)
    pub name: String,

    /// Node the group's member drives live on
    pub node_id: String,

    /// UUIDs of the member drives
    #[serde(default)]
    pub locations: Vec<String>,

    /// Total capacity of the group in bytes
    #[serde(default)]
    pub size_bytes: i64,
}
