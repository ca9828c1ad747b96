//! Programmatic device construction.

use crate::device::Device;
use crate::error::DeviceError;
use crate::ids::{SiteId, TileId, WireId};
use crate::primitive::PrimitiveDef;
use crate::types::{ConnectionKind, PinDirection, Site, SitePin, Tile, TileWire, WireConnection, WireDef};
use std::collections::HashMap;

/// Builds a [`Device`] tile by tile, interning wire names on first use.
///
/// ```
/// use weave_device::{DeviceBuilder, PinDirection};
///
/// let mut b = DeviceBuilder::new("demo", "demo-1");
/// let t = b.tile("INT_X0Y0", 0, 0);
/// b.pip(t, "OUT", "EBEG0");
/// b.site("SLICE_X0Y0", t, "SLICE", &[("O", "OUT", PinDirection::Output)]);
/// let device = b.build().unwrap();
/// assert_eq!(device.tiles.len(), 1);
/// ```
pub struct DeviceBuilder {
    device: Device,
    wire_ids: HashMap<String, WireId>,
}

impl DeviceBuilder {
    /// Starts an empty device.
    pub fn new(name: &str, part: &str) -> Self {
        let mut device = Device::default();
        device.name = name.to_string();
        device.part = part.to_string();
        Self {
            device,
            wire_ids: HashMap::new(),
        }
    }

    /// Adds a tile at grid position `(x, y)`.
    pub fn tile(&mut self, name: &str, x: u32, y: u32) -> TileId {
        let id = TileId::from_raw(self.device.tiles.len() as u32);
        self.device.tiles.push(Tile {
            name: name.to_string(),
            x,
            y,
            wires: Vec::new(),
            sites: Vec::new(),
        });
        id
    }

    /// Interns a wire name.
    pub fn wire(&mut self, name: &str) -> WireId {
        self.intern(name, false)
    }

    /// Interns a wire name and marks it clock-carrying.
    pub fn clock_wire(&mut self, name: &str) -> WireId {
        self.intern(name, true)
    }

    fn intern(&mut self, name: &str, clock: bool) -> WireId {
        if let Some(&id) = self.wire_ids.get(name) {
            if clock {
                self.device.wires[id.index()].clock = true;
            }
            return id;
        }
        let id = WireId::from_raw(self.device.wires.len() as u32);
        self.device.wires.push(WireDef {
            name: name.to_string(),
            clock,
        });
        self.wire_ids.insert(name.to_string(), id);
        id
    }

    fn connect(&mut self, tile: TileId, from: WireId, to_tile: TileId, to: WireId, kind: ConnectionKind) {
        let wires = &mut self.device.tiles[tile.index()].wires;
        let pos = match wires.iter().position(|tw| tw.wire == from) {
            Some(pos) => pos,
            None => {
                wires.push(TileWire {
                    wire: from,
                    connections: Vec::new(),
                });
                wires.len() - 1
            }
        };
        wires[pos].connections.push(WireConnection {
            tile: to_tile,
            wire: to,
            kind,
        });
    }

    /// Adds a unidirectional PIP `start -> end` inside `tile`.
    pub fn pip(&mut self, tile: TileId, start: &str, end: &str) {
        let (s, e) = (self.wire(start), self.wire(end));
        self.connect(tile, s, tile, e, ConnectionKind::Pip);
    }

    /// Adds a PIP that can be driven from either end.
    pub fn bidir_pip(&mut self, tile: TileId, a: &str, b: &str) {
        let (wa, wb) = (self.wire(a), self.wire(b));
        self.connect(tile, wa, tile, wb, ConnectionKind::BidirectionalPip);
        self.connect(tile, wb, tile, wa, ConnectionKind::BidirectionalPip);
    }

    /// Adds a hardwired link; both ends become one routing node.
    pub fn hardwire(&mut self, tile: TileId, wire: &str, to_tile: TileId, to_wire: &str) {
        let (a, b) = (self.wire(wire), self.wire(to_wire));
        self.connect(tile, a, to_tile, b, ConnectionKind::Hardwired);
    }

    /// Adds a site whose pins are given as `(pin name, tile wire, direction)`.
    pub fn site(
        &mut self,
        name: &str,
        tile: TileId,
        primitive_type: &str,
        pins: &[(&str, &str, PinDirection)],
    ) -> SiteId {
        let id = SiteId::from_raw(self.device.sites.len() as u32);
        let pins = pins
            .iter()
            .map(|&(pin, wire, direction)| SitePin {
                name: pin.to_string(),
                wire: self.wire(wire),
                direction,
            })
            .collect();
        self.device.sites.push(Site {
            name: name.to_string(),
            tile,
            primitive_type: primitive_type.to_string(),
            pins,
        });
        self.device.tiles[tile.index()].sites.push(id);
        id
    }

    /// Registers a primitive definition.
    pub fn primitive_def(&mut self, def: PrimitiveDef) {
        self.device.primitive_defs.push(def);
    }

    /// Finishes the device, building indices and validating it.
    pub fn build(self) -> Result<Device, DeviceError> {
        let mut device = self.device;
        device.rebuild_indices();
        device.validate()?;
        Ok(device)
    }
}
