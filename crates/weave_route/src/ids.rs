//! Index newtypes for router arenas.

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
        pub struct $name(u32);

        impl $name {
            /// Creates an index from a raw `u32`.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32`.
            pub fn as_raw(self) -> u32 {
                self.0
            }

            /// Returns the index as a `usize`.
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
    /// Index of a routing node in the [`RoutingGraph`](crate::RoutingGraph) arena.
    NodeIdx
);

define_id!(
    /// Index of a net in the router's [`NetData`](crate::NetData) list.
    NetIdx
);
