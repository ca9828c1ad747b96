//! Opaque ID newtypes for device entities.
//!
//! [`TileId`], [`WireId`], and [`SiteId`] are `u32` indices into the device's
//! tile, wire-name, and site tables. They are ordered so that containers keyed
//! by them iterate deterministically.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }

            /// Returns the ID as a `usize` table index.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Index of a tile in [`Device::tiles`](crate::Device::tiles).
    TileId
);

define_id!(
    /// Index of a wire name in [`Device::wires`](crate::Device::wires).
    WireId
);

define_id!(
    /// Index of a primitive site in [`Device::sites`](crate::Device::sites).
    SiteId
);
