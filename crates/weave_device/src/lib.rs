//! Device fabric model consumed by the router.
//!
//! A [`Device`] is a grid of tiles. Each tile lists the wires that have
//! outgoing connections, and every connection is either a hardwired link
//! (electrically the same node) or a switchable PIP. Primitive sites expose
//! named pins bound to tile wires, and [`PrimitiveDef`]s describe the internal
//! element graph of each primitive type.

#![warn(missing_docs)]

pub mod builder;
pub mod device;
pub mod error;
pub mod ids;
pub mod primitive;
pub mod types;

pub use builder::DeviceBuilder;
pub use device::Device;
pub use error::DeviceError;
pub use ids::{SiteId, TileId, WireId};
pub use primitive::{ConnDirection, ElementConn, PrimitiveDef, RoutingElement};
pub use types::{ConnectionKind, PinDirection, Site, SitePin, Tile, TileWire, WireConnection, WireDef};

use std::path::Path;

/// Loads a device from a JSON file, rebuilding lookup indices and validating it.
pub fn load_device(path: &Path) -> Result<Device, DeviceError> {
    let content = std::fs::read_to_string(path)?;
    device_from_str(&content)
}

/// Parses a device from JSON, rebuilding lookup indices and validating it.
pub fn device_from_str(content: &str) -> Result<Device, DeviceError> {
    let mut device: Device =
        serde_json::from_str(content).map_err(|e| DeviceError::ParseError(e.to_string()))?;
    device.rebuild_indices();
    device.validate()?;
    Ok(device)
}
