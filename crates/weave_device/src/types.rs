//! Tile, wire, and site records of the device fabric.

use crate::ids::{SiteId, TileId, WireId};
use serde::{Deserialize, Serialize};

/// Direction of a site pin as seen from the primitive.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum PinDirection {
    /// The pin drives into the primitive.
    Input,
    /// The primitive drives the pin.
    Output,
}

/// How two wires are joined.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ConnectionKind {
    /// A permanent link; both wires belong to the same electrical node.
    Hardwired,
    /// A switchable unidirectional PIP.
    Pip,
    /// A switchable PIP that may be driven from either end.
    BidirectionalPip,
}

impl ConnectionKind {
    /// Returns `true` for switchable connections.
    pub fn is_pip(self) -> bool {
        !matches!(self, ConnectionKind::Hardwired)
    }
}

/// A connection from one tile wire to another.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct WireConnection {
    /// Tile of the far end.
    pub tile: TileId,
    /// Wire of the far end.
    pub wire: WireId,
    /// Whether the link is hardwired or switchable.
    pub kind: ConnectionKind,
}

/// A wire inside a tile together with its outgoing connections.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TileWire {
    /// The wire.
    pub wire: WireId,
    /// Outgoing connections from this wire.
    pub connections: Vec<WireConnection>,
}

/// A tile of the device grid.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tile {
    /// Unique tile name, e.g. `INT_X3Y7`.
    pub name: String,
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
    /// Wires with outgoing connections.
    #[serde(default)]
    pub wires: Vec<TileWire>,
    /// Primitive sites located in this tile.
    #[serde(default)]
    pub sites: Vec<SiteId>,
}

/// An entry of the global wire-name table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WireDef {
    /// Wire name, unique across the device.
    pub name: String,
    /// Clock-carrying wires are costed with a zero distance estimate.
    #[serde(default)]
    pub clock: bool,
}

/// A named pin of a primitive site bound to a tile wire.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SitePin {
    /// Pin name, matching a pin element of the primitive definition.
    pub name: String,
    /// External wire of the pin in the site's tile.
    pub wire: WireId,
    /// Pin direction.
    pub direction: PinDirection,
}

/// A primitive site: a slot where one instance of a primitive type may be placed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Site {
    /// Unique site name, e.g. `SLICE_X0Y0`.
    pub name: String,
    /// Tile containing the site.
    pub tile: TileId,
    /// Primitive type, e.g. `SLICE` or `TIEOFF`.
    pub primitive_type: String,
    /// Site pins.
    pub pins: Vec<SitePin>,
}

impl Site {
    /// Looks up a pin by name.
    pub fn pin(&self, name: &str) -> Option<&SitePin> {
        self.pins.iter().find(|p| p.name == name)
    }
}
