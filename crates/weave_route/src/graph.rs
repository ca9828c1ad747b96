//! Routing-resource graph and node factory.
//!
//! A routing node is a cluster of `(tile, wire)` pairs joined by hardwired
//! links, so every edge of the graph is a PIP choice. Nodes are created on
//! first request and memoized by every member wire. Neighbour lists are built
//! lazily per node and cached; once the first list exists the graph is frozen
//! and nodes can no longer be blocked.

use crate::delay::DelayModel;
use crate::error::RouteError;
use crate::ids::NodeIdx;
use std::collections::{HashMap, HashSet};
use weave_common::{TileCoord, TileRect};
use weave_design::{Design, Pin, Pip, PipDirection};
use weave_device::{ConnectionKind, Device, SiteId, TileId, WireId};

/// A PIP leaving a node and the node it drives.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    /// Driven node.
    pub node: NodeIdx,
    /// The PIP realizing this edge.
    pub pip: Pip,
}

/// One electrical node of the routing fabric.
#[derive(Clone, Debug)]
pub struct RoutingNode {
    /// Member wires in ascending order. The first one names the node.
    pub wires: Vec<(TileId, WireId)>,
    /// Tiles spanned by the member wires.
    pub bbox: TileRect,
    /// Clock-carrying node.
    pub clock: bool,
    /// Delay of entering this node.
    pub base_delay: f64,
    /// Reserved by a kept route; never offered as a neighbour.
    pub blocked: bool,
    /// May be reached but never expanded.
    pub sink_only: bool,
    neighbours: Option<Vec<Edge>>,
}

/// Arena of routing nodes over one device.
pub struct RoutingGraph<'d> {
    device: &'d Device,
    delays: DelayModel,
    nodes: Vec<RoutingNode>,
    index: HashMap<(TileId, WireId), NodeIdx>,
    frozen: bool,
}

impl<'d> RoutingGraph<'d> {
    /// Creates an empty graph over `device`.
    pub fn new(device: &'d Device, delays: DelayModel) -> Self {
        Self {
            device,
            delays,
            nodes: Vec::new(),
            index: HashMap::new(),
            frozen: false,
        }
    }

    /// The underlying device.
    pub fn device(&self) -> &'d Device {
        self.device
    }

    /// The delay model used for base delays.
    pub fn delays(&self) -> &DelayModel {
        &self.delays
    }

    /// Number of nodes created so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no node has been created yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns a node by index.
    pub fn node(&self, idx: NodeIdx) -> &RoutingNode {
        &self.nodes[idx.index()]
    }

    /// Returns `true` once a neighbour list has been built.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// The node containing `(tile, wire)`, created with its whole hardwired cluster on first use.
    pub fn node_at(&mut self, tile: TileId, wire: WireId) -> Result<NodeIdx, RouteError> {
        if let Some(&idx) = self.index.get(&(tile, wire)) {
            return Ok(idx);
        }
        if tile.index() >= self.device.tiles.len() || wire.index() >= self.device.wires.len() {
            return Err(RouteError::UnknownWire {
                tile: tile.as_raw(),
                wire: wire.as_raw(),
            });
        }

        let mut members = vec![(tile, wire)];
        let mut seen = HashSet::from([(tile, wire)]);
        let mut cursor = 0;
        while cursor < members.len() {
            let (t, w) = members[cursor];
            cursor += 1;
            for next in self.device.hardwired_neighbours(t, w) {
                if seen.insert(next) {
                    members.push(next);
                }
            }
        }
        members.sort();

        let device = self.device;
        let coords = members.iter().map(|&(t, _)| {
            let tile = device.tile(t);
            TileCoord::new(tile.x, tile.y)
        });
        let bbox = TileRect::enclosing(coords).unwrap_or(TileRect::point(TileCoord::new(0, 0)));
        let clock = members.iter().any(|&(_, w)| device.is_clock_wire(w));
        let base_delay = self.delays.node_delay(device, &members, &bbox);

        let idx = NodeIdx::from_raw(self.nodes.len() as u32);
        for &member in &members {
            self.index.insert(member, idx);
        }
        self.nodes.push(RoutingNode {
            wires: members,
            bbox,
            clock,
            base_delay,
            blocked: false,
            sink_only: false,
            neighbours: None,
        });
        Ok(idx)
    }

    /// The node behind a site pin.
    pub fn site_pin_node(&mut self, site: SiteId, pin: &str) -> Option<Result<NodeIdx, RouteError>> {
        let (tile, wire) = self.device.site_pin_wire(site, pin)?;
        Some(self.node_at(tile, wire))
    }

    /// The node behind a design pin. The instance must be placed on a site exposing the pin.
    pub fn pin_node(&mut self, design: &Design, pin: &Pin) -> Result<NodeIdx, RouteError> {
        let unmapped = || RouteError::UnmappedPin {
            instance: pin.instance.clone(),
            pin: pin.name.clone(),
        };
        let site = design
            .instance(&pin.instance)
            .and_then(|inst| inst.site)
            .ok_or_else(unmapped)?;
        self.site_pin_node(site, &pin.name).ok_or_else(unmapped)?
    }

    /// Reserves a node so no search can enter it.
    pub fn block(&mut self, idx: NodeIdx) -> Result<(), RouteError> {
        if self.frozen {
            return Err(RouteError::FrozenGraph(self.describe(idx)));
        }
        self.nodes[idx.index()].blocked = true;
        Ok(())
    }

    /// Marks a node as a dead end for expansion.
    pub fn set_sink_only(&mut self, idx: NodeIdx) {
        self.nodes[idx.index()].sink_only = true;
    }

    /// Builds and caches the neighbour list of a node.
    ///
    /// Fails if two PIPs lead to the same neighbour.
    pub fn ensure_neighbours(&mut self, idx: NodeIdx) -> Result<(), RouteError> {
        if self.nodes[idx.index()].neighbours.is_some() {
            return Ok(());
        }
        self.frozen = true;

        let device = self.device;
        let members = self.nodes[idx.index()].wires.clone();
        let mut edges: Vec<Edge> = Vec::new();
        for (tile, wire) in members {
            for conn in device.connections(tile, wire) {
                let direction = match conn.kind {
                    ConnectionKind::Hardwired => continue,
                    ConnectionKind::Pip => PipDirection::Unidirectional,
                    ConnectionKind::BidirectionalPip => PipDirection::Bidirectional,
                };
                let next = self.node_at(conn.tile, conn.wire)?;
                if next == idx || self.nodes[next.index()].blocked {
                    continue;
                }
                if edges.iter().any(|e| e.node == next) {
                    return Err(RouteError::ParallelConnection {
                        from: self.describe(idx),
                        to: self.describe(next),
                    });
                }
                edges.push(Edge {
                    node: next,
                    pip: Pip {
                        tile,
                        start: wire,
                        end: conn.wire,
                        direction,
                    },
                });
            }
        }
        self.nodes[idx.index()].neighbours = Some(edges);
        Ok(())
    }

    /// The cached neighbour list of a node, building it if needed.
    pub fn neighbours(&mut self, idx: NodeIdx) -> Result<&[Edge], RouteError> {
        self.ensure_neighbours(idx)?;
        Ok(self.edges(idx))
    }

    /// The neighbour list if already built, else empty.
    pub fn edges(&self, idx: NodeIdx) -> &[Edge] {
        self.nodes[idx.index()].neighbours.as_deref().unwrap_or(&[])
    }

    /// `tile/wire` name of the node's first member wire.
    pub fn describe(&self, idx: NodeIdx) -> String {
        match self.nodes.get(idx.index()).and_then(|n| n.wires.first()) {
            Some(&(tile, wire)) => format!(
                "{}/{}",
                self.device.tile(tile).name,
                self.device.wire_name(wire)
            ),
            None => format!("node {idx}"),
        }
    }
}
