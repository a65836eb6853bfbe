//! # Controller
//!
//! Core controller modules.
//!
//! - `gateway`: cluster access contract and its Kubernetes implementation
//! - `reconciler`: drift detection and restart decisions
//! - `references`: ConfigMap/Secret references from container environments
//! - `server`: HTTP server for metrics and health checks
//! - `stability`: rollout stability classification
//! - `workload`: Deployment snapshots

pub mod gateway;
pub mod reconciler;
pub mod references;
pub mod server;
pub mod stability;
pub mod workload;
