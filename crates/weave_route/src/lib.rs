//! PathFinder negotiated-congestion router for placed FPGA designs.
//!
//! The router works on a [`RoutingGraph`] whose nodes are clusters of
//! hardwired `(tile, wire)` pairs, so every edge is a PIP choice. Each net is
//! routed sink by sink with an A* search whose node cost grows with present
//! sharing and with the node's history of overuse. Nets are ripped up and
//! re-routed until no node carries more than one net.
//!
//! # Pipeline
//!
//! 1. **Select** nets with sinks and no PIPs (or all, when discarding routes)
//! 2. **Merge** constant nets into `GLOBAL_LOGIC0` / `GLOBAL_LOGIC1`
//! 3. **Resolve** every net's pins to routing nodes
//! 4. **Restrict** routethroughs over unused pins feeding live logic
//! 5. **Negotiate** until convergence or the iteration cap
//! 6. **Split** the merged constant nets back into single-driver nets
//!
//! # Usage
//!
//! ```ignore
//! use weave_route::route_design;
//!
//! let report = route_design(&mut design, &device, &config, &calibration, &sink)?;
//! println!("converged after {} iterations", report.iterations);
//! ```

#![warn(missing_docs)]

pub mod cost;
pub mod delay;
pub mod error;
pub mod flow;
pub mod graph;
pub mod ids;
pub mod net_data;
pub mod router;
pub mod routethrough;
pub mod search;
pub mod static_nets;
pub mod timing_log;

#[cfg(test)]
mod testutil;

pub use cost::{CongestionState, CostModel, HistoryClamp};
pub use delay::DelayModel;
pub use error::{RouteError, UnroutableSink};
pub use flow::{route_design, RouteReport};
pub use graph::{Edge, RoutingGraph, RoutingNode};
pub use ids::{NetIdx, NodeIdx};
pub use net_data::{NetData, SinkTerminal, SourceTerminal};
pub use router::{Convergence, Router};
pub use routethrough::{feeds_enabled_logic, restrict_routethroughs};
pub use search::{NodeCost, PathStep, SearchState, TreeLink};
pub use static_nets::{merge_static_nets, split_static_nets, GLOBAL_LOGIC0, GLOBAL_LOGIC1};
pub use timing_log::{RouteLog, RouteLogEntry};
