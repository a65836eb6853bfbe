//! # Deployment Flipper
//!
//! A Kubernetes controller that restarts Deployments when the ConfigMaps or
//! Secrets they consume through environment variables change.
//!
//! ## Overview
//!
//! On every tick the controller:
//!
//! 1. **Lists watched Deployments** - those annotated `deployment-flipper.watch: "true"`
//! 2. **Skips unsettled rollouts** - only Deployments that are Available with a fully rolled out ReplicaSet are evaluated
//! 3. **Fingerprints referenced configuration** - from each object's last applied configuration
//! 4. **Restarts on drift** - if any referenced object changed after the Deployment became stable
//!
//! ## Configuration
//!
//! Settings come from environment variables (`WATCH_NAMESPACES`, `POLL_INTERVAL_SECS`,
//! `WATCH_ANNOTATION`, `METRICS_PORT`, `LOG_LEVEL`, `LOG_FORMAT`) and can be
//! overridden with command-line flags.

use anyhow::Result;
use clap::Parser;
use deployment_flipper::config::{ControllerConfig, ServerConfig};
use deployment_flipper::runtime::{initialize, run_poll_loop};

/// Restart Deployments when their referenced ConfigMaps or Secrets change
#[derive(Parser, Debug)]
#[command(name = "deployment-flipper", version, long_about = None)]
struct Cli {
    /// Namespace to reconcile (repeatable; overrides WATCH_NAMESPACES)
    #[arg(short, long = "namespace", value_name = "NAMESPACE")]
    namespaces: Vec<String>,

    /// Seconds between reconciliation ticks (overrides POLL_INTERVAL_SECS)
    #[arg(long, value_name = "SECONDS")]
    interval_secs: Option<u64>,

    /// Annotation that opts a Deployment in (overrides WATCH_ANNOTATION)
    #[arg(long, value_name = "KEY")]
    watch_annotation: Option<String>,

    /// Metrics and probe server port (overrides METRICS_PORT)
    #[arg(long, value_name = "PORT")]
    metrics_port: Option<u16>,

    /// Run a single reconciliation tick and exit
    #[arg(long)]
    once: bool,
}

impl Cli {
    fn apply(&self, controller: &mut ControllerConfig, server: &mut ServerConfig) {
        if !self.namespaces.is_empty() {
            controller.watch_namespaces =
                deployment_flipper::config::controller::parse_namespaces(&self.namespaces.join(","));
        }
        if let Some(interval) = self.interval_secs {
            controller.poll_interval_secs = interval;
        }
        if let Some(annotation) = &self.watch_annotation {
            controller.watch_annotation.clone_from(annotation);
        }
        if let Some(port) = self.metrics_port {
            server.metrics_port = port;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut controller_config = ControllerConfig::from_env();
    let mut server_config = ServerConfig::from_env();
    cli.apply(&mut controller_config, &mut server_config);

    let init = initialize(&controller_config, &server_config).await?;

    run_poll_loop(
        init.reconcilers,
        init.server_state,
        controller_config.poll_interval(),
        cli.once,
    )
    .await;

    Ok(())
}
