//! Deployment Flipper Library
//!
//! Rolls Kubernetes Deployments whose referenced ConfigMaps or Secrets changed
//! after the Deployment last became stable.
//! Tests are included in the module files and under `tests/`.
//!
//! ## Quick Start
//!
//! ```rust
//! use deployment_flipper::prelude::*;
//! ```
//!
//! This brings commonly used types and traits into scope. For more specific imports,
//! use the individual modules.

pub mod config;
pub mod constants;
pub mod controller;
pub mod observability;
pub mod prelude;
pub mod runtime;
pub mod store;
