//! Primitive definitions and their internal routing elements.
//!
//! A primitive type is described as a graph of elements. Pin elements are the
//! site pins seen from the inside; internal elements are muxes, LUTs, and
//! other configurable logic. An instance enables an internal element by
//! carrying a non-empty attribute named after it.

use crate::types::PinDirection;
use serde::{Deserialize, Serialize};

/// Which way a signal flows across an element connection.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ConnDirection {
    /// From the owning element to the named element.
    Forward,
    /// From the named element into the owning element.
    Backward,
}

/// A connection from the owning element to another element of the same primitive.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ElementConn {
    /// Name of the other element.
    pub element: String,
    /// Signal flow relative to the owning element.
    pub direction: ConnDirection,
}

/// One element of a primitive's internal graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoutingElement {
    /// A site pin.
    Pin {
        /// Pin name.
        name: String,
        /// Pin direction.
        direction: PinDirection,
        /// Connections to other elements.
        #[serde(default)]
        conns: Vec<ElementConn>,
    },
    /// A configurable internal element.
    Internal {
        /// Element name; also the instance attribute that configures it.
        name: String,
        /// Connections to other elements.
        #[serde(default)]
        conns: Vec<ElementConn>,
    },
}

impl RoutingElement {
    /// Returns the element name.
    pub fn name(&self) -> &str {
        match self {
            RoutingElement::Pin { name, .. } | RoutingElement::Internal { name, .. } => name,
        }
    }

    fn conns(&self) -> &[ElementConn] {
        match self {
            RoutingElement::Pin { conns, .. } | RoutingElement::Internal { conns, .. } => conns,
        }
    }

    /// Names of the elements this element drives.
    pub fn connected_forward(&self) -> impl Iterator<Item = &str> {
        self.conns()
            .iter()
            .filter(|c| c.direction == ConnDirection::Forward)
            .map(|c| c.element.as_str())
    }

    /// Names of the elements driving this element.
    pub fn connected_backward(&self) -> impl Iterator<Item = &str> {
        self.conns()
            .iter()
            .filter(|c| c.direction == ConnDirection::Backward)
            .map(|c| c.element.as_str())
    }

    /// Returns `true` for an input pin element.
    pub fn is_input_pin(&self) -> bool {
        matches!(
            self,
            RoutingElement::Pin {
                direction: PinDirection::Input,
                ..
            }
        )
    }
}

/// The internal element graph of one primitive type.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrimitiveDef {
    /// Primitive type name.
    pub primitive_type: String,
    /// All elements, pins included.
    pub elements: Vec<RoutingElement>,
}

impl PrimitiveDef {
    /// Looks up an element by name.
    pub fn element(&self, name: &str) -> Option<&RoutingElement> {
        self.elements.iter().find(|e| e.name() == name)
    }

    /// Iterates the input pin elements.
    pub fn input_pins(&self) -> impl Iterator<Item = &RoutingElement> {
        self.elements.iter().filter(|e| e.is_input_pin())
    }
}
