//! Strata - CRD-driven Kubernetes operator for node-local storage provisioning
//!
//! Strata orchestrates the lifecycle of node-local logical volumes. It never
//! touches physical storage itself: it allocates backing capacity, persists
//! strongly-typed records (Volume, AvailableCapacity, LogicalVolumeGroup)
//! through the Kubernetes API, and synchronizes with a node agent that
//! performs the actual formatting and removal and reports progress back
//! through the Volume record's phase.
//!
//! # Architecture
//!
//! - A caller (typically a CSI translation layer) asks for a volume; strata
//!   picks capacity, persists the Volume in phase `Creating`, and returns.
//! - The node agent drives the phase forward asynchronously
//!   (`Creating` -> `Created`/`FailedToCreate`, removal-requested ->
//!   `Removed`/`FailToRemove`). Strata only observes phases by polling.
//! - Once removal is confirmed, freed capacity is returned to the pool and
//!   the Volume record is erased.
//!
//! # Modules
//!
//! - [`crd`] - Custom Resource Definitions (Volume, AvailableCapacity, LogicalVolumeGroup)
//! - [`store`] - Typed record store over the CRDs
//! - [`capacity`] - Capacity search (the allocation oracle)
//! - [`volume`] - Volume lifecycle operations (the core state machine)
//! - [`controller`] - Kubernetes controller reconciliation logic
//! - [`error`] - Error types for the operator

#![deny(missing_docs)]

pub mod capacity;
pub mod controller;
pub mod crd;
pub mod error;
pub mod store;
pub mod volume;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Default Configuration Constants
// =============================================================================
// These constants define the default values used throughout strata.
// Centralizing them here ensures consistency across operations, controller
// requeue intervals, and test fixtures.

/// How long a Volume may sit in a non-`Created` phase before a retried
/// creation gives up on it.
///
/// The node agent is expected to move a volume out of `Creating` well within
/// this window; a record older than this is presumed stuck and is reported
/// as an internal failure rather than waited on further.
pub const CREATION_ALLOWANCE: std::time::Duration = std::time::Duration::from_secs(10 * 60);

/// Interval between consecutive phase reads in the polling wait.
pub const STATUS_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(500);

/// One gibibyte, the unit most size arithmetic in tests is written in.
pub const GIBIBYTE: i64 = 1024 * 1024 * 1024;
