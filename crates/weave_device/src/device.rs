//! The device container with its lookup indices.

use crate::error::DeviceError;
use crate::ids::{SiteId, TileId, WireId};
use crate::primitive::PrimitiveDef;
use crate::types::{ConnectionKind, Site, SitePin, Tile, WireConnection, WireDef};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A complete device: tiles, the wire-name table, primitive sites, and
/// primitive definitions.
///
/// Lookup indices are not serialized; call [`Device::rebuild_indices`] after
/// deserializing or mutating the tables directly.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Device {
    /// Device family or name.
    pub name: String,
    /// Part number designs are compiled against.
    pub part: String,
    /// All tiles, indexed by [`TileId`].
    pub tiles: Vec<Tile>,
    /// Wire-name table, indexed by [`WireId`].
    pub wires: Vec<WireDef>,
    /// All primitive sites, indexed by [`SiteId`].
    pub sites: Vec<Site>,
    /// Primitive definitions by type.
    #[serde(default)]
    pub primitive_defs: Vec<PrimitiveDef>,
    #[serde(skip)]
    index: DeviceIndex,
}

#[derive(Clone, Debug, Default)]
struct DeviceIndex {
    tiles: HashMap<String, TileId>,
    wires: HashMap<String, WireId>,
    sites: HashMap<String, SiteId>,
    defs: HashMap<String, usize>,
    sites_by_type: HashMap<String, Vec<SiteId>>,
    /// Position of each wire inside its tile's `wires` list.
    tile_wires: HashMap<(TileId, WireId), usize>,
    /// Reverse hardwired links, keyed by the link's far end.
    hardwire_back: HashMap<(TileId, WireId), Vec<(TileId, WireId)>>,
}

impl Device {
    /// Recomputes all name and connectivity indices from the tables.
    pub fn rebuild_indices(&mut self) {
        let mut index = DeviceIndex::default();
        for (i, tile) in self.tiles.iter().enumerate() {
            let tile_id = TileId::from_raw(i as u32);
            index.tiles.insert(tile.name.clone(), tile_id);
            for (pos, tw) in tile.wires.iter().enumerate() {
                index.tile_wires.insert((tile_id, tw.wire), pos);
                for conn in &tw.connections {
                    if conn.kind == ConnectionKind::Hardwired {
                        index
                            .hardwire_back
                            .entry((conn.tile, conn.wire))
                            .or_default()
                            .push((tile_id, tw.wire));
                    }
                }
            }
        }
        for (i, wire) in self.wires.iter().enumerate() {
            index.wires.insert(wire.name.clone(), WireId::from_raw(i as u32));
        }
        for (i, site) in self.sites.iter().enumerate() {
            let site_id = SiteId::from_raw(i as u32);
            index.sites.insert(site.name.clone(), site_id);
            index
                .sites_by_type
                .entry(site.primitive_type.clone())
                .or_default()
                .push(site_id);
        }
        for (i, def) in self.primitive_defs.iter().enumerate() {
            index.defs.insert(def.primitive_type.clone(), i);
        }
        self.index = index;
    }

    /// Checks that every id is in range, names are unique, and PIPs stay inside their tile.
    pub fn validate(&self) -> Result<(), DeviceError> {
        check_unique("tile", self.tiles.iter().map(|t| t.name.as_str()))?;
        check_unique("wire", self.wires.iter().map(|w| w.name.as_str()))?;
        check_unique("site", self.sites.iter().map(|s| s.name.as_str()))?;
        check_unique(
            "primitive definition",
            self.primitive_defs.iter().map(|d| d.primitive_type.as_str()),
        )?;

        for (i, tile) in self.tiles.iter().enumerate() {
            let tile_id = TileId::from_raw(i as u32);
            for tw in &tile.wires {
                self.check_wire(tw.wire, &tile.name)?;
                for conn in &tw.connections {
                    if conn.tile.index() >= self.tiles.len() {
                        return Err(DeviceError::Invalid(format!(
                            "connection from {}/{} targets unknown tile {}",
                            tile.name,
                            self.wire_name(tw.wire),
                            conn.tile
                        )));
                    }
                    self.check_wire(conn.wire, &tile.name)?;
                    if conn.kind.is_pip() && conn.tile != tile_id {
                        return Err(DeviceError::Invalid(format!(
                            "PIP {}/{} -> {} leaves its tile",
                            tile.name,
                            self.wire_name(tw.wire),
                            self.wire_name(conn.wire)
                        )));
                    }
                }
            }
            for &site in &tile.sites {
                if site.index() >= self.sites.len() {
                    return Err(DeviceError::Invalid(format!(
                        "tile {} lists unknown site {site}",
                        tile.name
                    )));
                }
            }
        }

        for site in &self.sites {
            if site.tile.index() >= self.tiles.len() {
                return Err(DeviceError::Invalid(format!(
                    "site {} is in unknown tile {}",
                    site.name, site.tile
                )));
            }
            for pin in &site.pins {
                self.check_wire(pin.wire, &site.name)?;
            }
        }
        Ok(())
    }

    fn check_wire(&self, wire: WireId, owner: &str) -> Result<(), DeviceError> {
        if wire.index() >= self.wires.len() {
            return Err(DeviceError::Invalid(format!(
                "{owner} references unknown wire {wire}"
            )));
        }
        Ok(())
    }

    /// Returns a tile by id.
    pub fn tile(&self, id: TileId) -> &Tile {
        &self.tiles[id.index()]
    }

    /// Returns a site by id.
    pub fn site(&self, id: SiteId) -> &Site {
        &self.sites[id.index()]
    }

    /// Returns a wire's name, or `"?"` for an unknown id.
    pub fn wire_name(&self, id: WireId) -> &str {
        self.wires.get(id.index()).map_or("?", |w| w.name.as_str())
    }

    /// Returns `true` if the wire carries a clock.
    pub fn is_clock_wire(&self, id: WireId) -> bool {
        self.wires.get(id.index()).is_some_and(|w| w.clock)
    }

    /// Looks up a tile by name.
    pub fn tile_by_name(&self, name: &str) -> Option<TileId> {
        self.index.tiles.get(name).copied()
    }

    /// Looks up a wire by name.
    pub fn wire_by_name(&self, name: &str) -> Option<WireId> {
        self.index.wires.get(name).copied()
    }

    /// Looks up a site by name.
    pub fn site_by_name(&self, name: &str) -> Option<SiteId> {
        self.index.sites.get(name).copied()
    }

    /// Outgoing connections of a tile wire. Empty for wires without any.
    pub fn connections(&self, tile: TileId, wire: WireId) -> &[WireConnection] {
        match self.index.tile_wires.get(&(tile, wire)) {
            Some(&pos) => &self.tiles[tile.index()].wires[pos].connections,
            None => &[],
        }
    }

    /// All tile wires joined to `(tile, wire)` by a hardwired link in either direction.
    pub fn hardwired_neighbours(&self, tile: TileId, wire: WireId) -> Vec<(TileId, WireId)> {
        let mut out: Vec<(TileId, WireId)> = self
            .connections(tile, wire)
            .iter()
            .filter(|c| c.kind == ConnectionKind::Hardwired)
            .map(|c| (c.tile, c.wire))
            .collect();
        if let Some(back) = self.index.hardwire_back.get(&(tile, wire)) {
            out.extend(back.iter().copied());
        }
        out
    }

    /// Returns a site pin record by site and pin name.
    pub fn site_pin(&self, site: SiteId, pin: &str) -> Option<&SitePin> {
        self.sites.get(site.index())?.pin(pin)
    }

    /// Resolves a site pin to its external `(tile, wire)`.
    pub fn site_pin_wire(&self, site: SiteId, pin: &str) -> Option<(TileId, WireId)> {
        let tile = self.sites.get(site.index())?.tile;
        self.site_pin(site, pin).map(|p| (tile, p.wire))
    }

    /// All sites of a primitive type, in id order.
    pub fn sites_of_type(&self, primitive_type: &str) -> &[SiteId] {
        self.index
            .sites_by_type
            .get(primitive_type)
            .map_or(&[], Vec::as_slice)
    }

    /// The primitive definition for a type, if the device has one.
    pub fn primitive_def(&self, primitive_type: &str) -> Option<&PrimitiveDef> {
        self.index
            .defs
            .get(primitive_type)
            .map(|&i| &self.primitive_defs[i])
    }
}

fn check_unique<'a>(
    what: &str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), DeviceError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(DeviceError::Invalid(format!("duplicate {what} name '{name}'")));
        }
    }
    Ok(())
}
