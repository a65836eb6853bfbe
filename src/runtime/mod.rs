//! # Runtime
//!
//! - `initialization`: process bootstrap (logging, metrics, server, client)
//! - `poll_loop`: fixed-interval scheduler driving the reconcilers

pub mod initialization;
pub mod poll_loop;

pub use initialization::{build_reconcilers, initialize, InitializationResult};
pub use poll_loop::{run_poll_loop, run_tick};
