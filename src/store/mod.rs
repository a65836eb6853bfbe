//! # Fingerprint Store
//!
//! Process-lifetime memory of the configuration content the controller has seen.
//!
//! - `clock`: time source injected into the store
//! - `fingerprint`: the store itself and fingerprint derivation

pub mod clock;
pub mod fingerprint;

pub use clock::{Clock, SystemClock};
pub use fingerprint::{fingerprint_of, ConfigKind, FingerprintRecord, FingerprintStore};
