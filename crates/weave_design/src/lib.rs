//! Placed netlist model: instances bound to device sites, and nets with their
//! pins and PIPs.
//!
//! Instances and nets live in name-ordered maps so that every traversal of a
//! design is deterministic.

#![warn(missing_docs)]

pub mod design;
pub mod error;
pub mod io;
pub mod net;

pub use design::{Design, Instance};
pub use error::DesignError;
pub use io::{design_from_str, load_design, save_design};
pub use net::{Net, NetKind, Pin, Pip, PipDirection};
