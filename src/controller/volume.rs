//! Volume reconciler
//!
//! Observes Volume records and finishes deletions: a volume the agent has
//! marked `Removed` gets its capacity reclaimed and its record erased.
//! Phases the agent is still working on are requeued; terminal failure
//! phases are left alone until a human intervenes.

use std::sync::Arc;
use std::time::Duration;

use kube::runtime::controller::Action;
use kube::ResourceExt;
use tracing::{debug, error, info, instrument, warn};

use crate::crd::{Volume, VolumePhase};
use crate::volume::VolumeOperations;
use crate::Error;

/// How often to re-check a volume the agent is still working on
const AGENT_IN_FLIGHT_REQUEUE: Duration = Duration::from_secs(10);

/// Controller context containing shared state
///
/// Shared across all reconciliation calls; holds the volume operations the
/// reconciler delegates to.
pub struct Context {
    /// Volume lifecycle operations
    pub ops: Arc<VolumeOperations>,
}

impl Context {
    /// Create a new controller context
    pub fn new(ops: Arc<VolumeOperations>) -> Self {
        Self { ops }
    }
}

/// Reconcile a Volume resource
///
/// # Returns
///
/// Returns an `Action` indicating when to requeue the resource, or an error
/// if reconciliation failed.
#[instrument(skip(volume, ctx), fields(volume = %volume.name_any()))]
pub async fn reconcile(volume: Arc<Volume>, ctx: Arc<Context>) -> Result<Action, Error> {
    let name = volume.name_any();

    match volume.spec.phase {
        VolumePhase::Removed => {
            info!("removal confirmed, reclaiming capacity");
            ctx.ops.finalize_removed_volume(&name).await?;
            // The record is gone; nothing left to requeue
            Ok(Action::await_change())
        }
        VolumePhase::Creating | VolumePhase::Removing => {
            // The agent is at work; check back in case we miss its update
            debug!(phase = %volume.spec.phase, "agent in flight");
            Ok(Action::requeue(AGENT_IN_FLIGHT_REQUEUE))
        }
        VolumePhase::FailToRemove => {
            warn!("volume requires manual remediation, awaiting change");
            Ok(Action::await_change())
        }
        VolumePhase::FailedToCreate => {
            warn!("creation failed, awaiting delete request");
            Ok(Action::await_change())
        }
        VolumePhase::Created | VolumePhase::ReadyToRemove => {
            debug!(phase = %volume.spec.phase, "nothing to reconcile");
            Ok(Action::await_change())
        }
    }
}

/// Error policy for the controller
///
/// Called when reconciliation fails; requeues the resource after a short
/// delay.
pub fn error_policy(volume: Arc<Volume>, error: &Error, _ctx: Arc<Context>) -> Action {
    error!(
        ?error,
        volume = %volume.name_any(),
        "reconciliation failed"
    );
    Action::requeue(Duration::from_secs(5))
}
