//! Parsing and validation of router configuration and timing calibration files.
//!
//! Two TOML files feed the router: `weave.toml` with the negotiation knobs,
//! tie-off conventions, and log settings ([`RouterConfig`]), and a calibration
//! file with per-wire base delays ([`Calibration`]). Every field has a default,
//! so an empty file is a valid configuration.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_calibration, load_calibration_from_str, load_config, load_config_from_str};
pub use types::*;
