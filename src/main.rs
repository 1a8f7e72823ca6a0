//! Strata Operator - node-local storage volume lifecycle management

use std::sync::Arc;

use clap::Parser;
use futures::StreamExt;
use kube::runtime::watcher::Config as WatcherConfig;
use kube::runtime::Controller;
use kube::{Api, Client, CustomResourceExt};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use strata::capacity::BestFitSelector;
use strata::controller::{error_policy, reconcile, Context};
use strata::crd::{AvailableCapacity, LogicalVolumeGroup, Volume};
use strata::store::KubeRecordStore;
use strata::volume::VolumeOperations;

/// Strata - CRD-driven Kubernetes operator for node-local storage provisioning
#[derive(Parser, Debug)]
#[command(name = "strata", version, about, long_about = None)]
struct Cli {
    /// Generate CRD manifests and exit
    #[arg(long)]
    crd: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install the default rustls crypto provider before any TLS use.
    // Failure here indicates a serious system configuration issue.
    if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
        eprintln!(
            "CRITICAL: Failed to install crypto provider: {:?}. \
             The operator cannot talk to the API server without a working \
             TLS implementation.",
            e
        );
        std::process::exit(1);
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.crd {
        // Generate CRD YAML for all three record kinds
        for crd in [
            serde_yaml::to_string(&Volume::crd()),
            serde_yaml::to_string(&AvailableCapacity::crd()),
            serde_yaml::to_string(&LogicalVolumeGroup::crd()),
        ] {
            let crd = crd.map_err(|e| anyhow::anyhow!("Failed to serialize CRD: {}", e))?;
            println!("---\n{crd}");
        }
        return Ok(());
    }

    run_controller().await
}

/// Run the volume controller until shutdown
async fn run_controller() -> anyhow::Result<()> {
    let client = Client::try_default().await?;

    let store = Arc::new(KubeRecordStore::new(client.clone()));
    let selector = Arc::new(BestFitSelector::new(store.clone()));
    let ops = Arc::new(VolumeOperations::new(store, selector));
    let ctx = Arc::new(Context::new(ops));

    let volumes: Api<Volume> = Api::all(client);

    info!("starting volume controller");
    Controller::new(volumes, WatcherConfig::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|result| async move {
            match result {
                Ok((volume, _)) => debug!(volume = %volume.name, "reconciled"),
                Err(e) => warn!(error = %e, "reconciliation error"),
            }
        })
        .await;

    info!("controller stopped");
    Ok(())
}
