//! Nets, pins, and PIPs.

use serde::{Deserialize, Serialize};
use weave_device::{PinDirection, TileId, WireId};

/// Logical kind of a net.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum NetKind {
    /// An ordinary signal net.
    #[default]
    Wire,
    /// A constant-0 net.
    Gnd,
    /// A constant-1 net.
    Vcc,
}

/// A pin of an instance attached to a net.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Pin {
    /// Owning instance name.
    pub instance: String,
    /// Pin name on the instance's primitive.
    pub name: String,
    /// Output pins drive the net; input pins are its sinks.
    pub direction: PinDirection,
}

impl Pin {
    /// Creates a driving pin.
    pub fn output(instance: &str, name: &str) -> Self {
        Self {
            instance: instance.to_string(),
            name: name.to_string(),
            direction: PinDirection::Output,
        }
    }

    /// Creates a sink pin.
    pub fn input(instance: &str, name: &str) -> Self {
        Self {
            instance: instance.to_string(),
            name: name.to_string(),
            direction: PinDirection::Input,
        }
    }

    /// Returns `true` if the pin drives its net.
    pub fn is_output(&self) -> bool {
        self.direction == PinDirection::Output
    }
}

/// Whether a PIP is used in its native direction only.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum PipDirection {
    /// `start` drives `end`.
    Unidirectional,
    /// A bidirectional PIP, here driven from `start`.
    Bidirectional,
}

/// A configured programmable interconnect point.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Pip {
    /// Tile containing the PIP.
    pub tile: TileId,
    /// Driving wire.
    pub start: WireId,
    /// Driven wire.
    pub end: WireId,
    /// PIP directionality.
    pub direction: PipDirection,
}

/// A net: a set of pins plus the PIPs that connect them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Net {
    /// Unique net name.
    pub name: String,
    /// Signal or constant net.
    #[serde(default)]
    pub kind: NetKind,
    /// Attached pins.
    pub pins: Vec<Pin>,
    /// Routing, empty when the net is unrouted.
    #[serde(default)]
    pub pips: Vec<Pip>,
}

impl Net {
    /// Creates an unrouted net.
    pub fn new(name: &str, kind: NetKind, pins: Vec<Pin>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            pins,
            pips: Vec::new(),
        }
    }

    /// Driving pins.
    pub fn sources(&self) -> impl Iterator<Item = &Pin> {
        self.pins.iter().filter(|p| p.is_output())
    }

    /// Sink pins.
    pub fn sinks(&self) -> impl Iterator<Item = &Pin> {
        self.pins.iter().filter(|p| !p.is_output())
    }

    /// Returns `true` for constant-0 and constant-1 nets.
    pub fn is_static(&self) -> bool {
        self.kind != NetKind::Wire
    }

    /// Returns `true` if the net carries any PIPs.
    pub fn is_routed(&self) -> bool {
        !self.pips.is_empty()
    }

    /// Clears all PIPs.
    pub fn unroute(&mut self) {
        self.pips.clear();
    }
}
