//! Fatal routing errors.

use weave_common::InternalError;
use weave_design::DesignError;

/// A sink the search could not reach.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnroutableSink {
    /// Net name.
    pub net: String,
    /// Sink pin as `instance/pin`.
    pub pin: String,
    /// Routing node of the sink as `tile/wire`.
    pub node: String,
}

/// Errors that abort a routing run. No partial result is produced.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// One or more sinks could not be reached during an iteration.
    #[error("design is not routable: {} unroutable sink(s)", failures.len())]
    Unroutable {
        /// Every failing sink of the iteration.
        failures: Vec<UnroutableSink>,
    },

    /// The iteration cap was reached with overused nodes left.
    #[error("routing did not converge after {iterations} iterations ({contended_nets} contended nets)")]
    IterationLimit {
        /// Iterations run.
        iterations: u32,
        /// Nets still touching an overused node.
        contended_nets: usize,
    },

    /// Two PIPs join the same pair of routing nodes.
    #[error("parallel connections from {from} to {to}")]
    ParallelConnection {
        /// Driving node.
        from: String,
        /// Driven node.
        to: String,
    },

    /// A pin has no device wire.
    #[error("pin {instance}/{pin} has no device wire")]
    UnmappedPin {
        /// Instance name.
        instance: String,
        /// Pin name.
        pin: String,
    },

    /// A tile or wire id is outside the device tables.
    #[error("unknown wire {wire} in tile {tile}")]
    UnknownWire {
        /// Tile id.
        tile: u32,
        /// Wire id.
        wire: u32,
    },

    /// A constant net could not be split back into single-driver nets.
    #[error("static net split failed: {0}")]
    StaticSplit(String),

    /// A net the router wants to create already exists.
    #[error("net name '{0}' is already in use")]
    NameConflict(String),

    /// A node was blocked after neighbour lists started being built.
    #[error("cannot block {0}: the routing graph is frozen")]
    FrozenGraph(String),

    /// Design edit failed.
    #[error(transparent)]
    Design(#[from] DesignError),

    /// Broken internal invariant.
    #[error(transparent)]
    Internal(#[from] InternalError),
}
