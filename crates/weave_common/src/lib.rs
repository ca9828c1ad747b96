//! Shared foundational types used across the Weave FPGA routing toolchain.
//!
//! This crate provides the tile-grid geometry shared by the device model and
//! the router (coordinates, bounding boxes, Manhattan distances), and the
//! internal-error type.

#![warn(missing_docs)]

pub mod geom;
pub mod result;

pub use geom::{TileCoord, TileRect};
pub use result::InternalError;
