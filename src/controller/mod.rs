//! Kubernetes controller reconciliation logic
//!
//! The controller owns the tail of the volume lifecycle: the node agent
//! flips a volume to `Removed` once physical removal is done, and the
//! reconciler here reacts by reclaiming capacity and erasing the record.
//! All coupling with the agent goes through the records; the agent is never
//! called directly.

mod volume;

pub use volume::{error_policy, reconcile, Context};
