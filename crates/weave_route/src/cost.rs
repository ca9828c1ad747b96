//! Congestion bookkeeping and the negotiated-congestion cost function.
//!
//! Present congestion is the number of nets currently using a node. Historical
//! overuse grows by `history_factor * (usage - 1)` for every node still
//! overused at the end of an iteration and decays by `history_decay` per
//! elapsed iteration. Decay is applied lazily on read, so untouched nodes
//! cost nothing to age.

use crate::graph::RoutingGraph;
use crate::ids::{NetIdx, NodeIdx};
use std::collections::BTreeSet;
use weave_config::RouterSettings;

#[derive(Clone, Copy, Debug, Default)]
struct History {
    /// Value in effect for the iteration after `stamp`.
    value: f64,
    /// Iteration at whose end `value` was written.
    stamp: Option<u32>,
}

/// A historical-overuse update that tripped the sanity cap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HistoryClamp {
    /// Node whose history was clamped.
    pub node: NodeIdx,
    /// Value before clamping.
    pub raw: f64,
}

/// Per-node usage, users, and historical overuse.
///
/// Arrays grow on demand as the graph creates nodes.
#[derive(Clone, Debug)]
pub struct CongestionState {
    users: Vec<Vec<NetIdx>>,
    history: Vec<History>,
    overused: BTreeSet<NodeIdx>,
    history_factor: f64,
    history_decay: f64,
    max_history: f64,
}

impl CongestionState {
    /// Creates empty bookkeeping with the given history parameters.
    pub fn new(settings: &RouterSettings) -> Self {
        Self {
            users: Vec::new(),
            history: Vec::new(),
            overused: BTreeSet::new(),
            history_factor: settings.history_factor,
            history_decay: settings.history_decay,
            max_history: settings.max_history,
        }
    }

    fn fit(&mut self, node: NodeIdx) {
        if node.index() >= self.users.len() {
            self.users.resize_with(node.index() + 1, Vec::new);
            self.history.resize(node.index() + 1, History::default());
        }
    }

    /// Number of nets whose tree contains `node`.
    pub fn usage(&self, node: NodeIdx) -> usize {
        self.users.get(node.index()).map_or(0, Vec::len)
    }

    /// Nets whose tree contains `node`.
    pub fn users(&self, node: NodeIdx) -> &[NetIdx] {
        self.users.get(node.index()).map_or(&[], Vec::as_slice)
    }

    /// Records that `net` now uses `node`. Usage going from 1 to 2 marks the node overused.
    pub fn add_user(&mut self, node: NodeIdx, net: NetIdx) {
        self.fit(node);
        let users = &mut self.users[node.index()];
        if users.contains(&net) {
            return;
        }
        users.push(net);
        if users.len() == 2 {
            self.overused.insert(node);
        }
    }

    /// Records that `net` no longer uses `node`. Usage dropping to 1 clears the overuse mark.
    pub fn remove_user(&mut self, node: NodeIdx, net: NetIdx) {
        let Some(users) = self.users.get_mut(node.index()) else {
            return;
        };
        let Some(pos) = users.iter().position(|&n| n == net) else {
            return;
        };
        users.swap_remove(pos);
        if users.len() <= 1 {
            self.overused.remove(&node);
        }
    }

    /// Nodes used by more than one net, in index order.
    pub fn overused(&self) -> &BTreeSet<NodeIdx> {
        &self.overused
    }

    /// Historical overuse of `node` as seen during `iteration`.
    pub fn history(&self, node: NodeIdx, iteration: u32) -> f64 {
        match self.history.get(node.index()) {
            Some(&History {
                value,
                stamp: Some(stamp),
            }) if iteration > stamp => value * self.decay_over(iteration - stamp - 1),
            Some(h) => h.value,
            None => 0.0,
        }
    }

    fn decay_over(&self, iterations: u32) -> f64 {
        self.history_decay.powi(iterations.min(i32::MAX as u32) as i32)
    }

    /// Folds the end of `iteration` into the history of every overused node.
    ///
    /// Each node is updated at most once per iteration. Values that are not
    /// finite or exceed the cap are clamped and returned.
    pub fn update_history(&mut self, iteration: u32) -> Vec<HistoryClamp> {
        let mut clamps = Vec::new();
        let overused: Vec<NodeIdx> = self.overused.iter().copied().collect();
        for node in overused {
            let entry = self.history[node.index()];
            if entry.stamp == Some(iteration) {
                continue;
            }
            let decayed = match entry.stamp {
                Some(stamp) if iteration > stamp => entry.value * self.decay_over(iteration - stamp),
                _ => entry.value,
            };
            let overuse = (self.usage(node) - 1) as f64;
            let mut value = decayed + self.history_factor * overuse;
            if !value.is_finite() || value > self.max_history {
                clamps.push(HistoryClamp { node, raw: value });
                value = self.max_history;
            }
            self.history[node.index()] = History {
                value,
                stamp: Some(iteration),
            };
        }
        clamps
    }
}

/// The PathFinder cost function.
#[derive(Clone, Debug)]
pub struct CostModel {
    present_divisor: f64,
    per_tile: f64,
}

impl CostModel {
    /// Creates the cost function from router settings and the per-tile distance weight.
    pub fn new(settings: &RouterSettings, per_tile: f64) -> Self {
        Self {
            present_divisor: settings.present_divisor,
            per_tile,
        }
    }

    /// Weight of one sharing net during `iteration`: `(iteration + 1) / present_divisor`.
    ///
    /// The division is real, not integer, so sharing is already penalized in
    /// the first iterations.
    pub fn iteration_scale(&self, iteration: u32) -> f64 {
        f64::from(iteration + 1) / self.present_divisor
    }

    /// `usage * iteration_scale + 1`.
    pub fn present_congestion(&self, usage: usize, iteration: u32) -> f64 {
        usage as f64 * self.iteration_scale(iteration) + 1.0
    }

    /// Cost of entering `next`: `(base_delay + history) * present_congestion`.
    pub fn node_cost(
        &self,
        graph: &RoutingGraph<'_>,
        congestion: &CongestionState,
        next: NodeIdx,
        iteration: u32,
    ) -> f64 {
        let node = graph.node(next);
        let history = congestion.history(next, iteration);
        (node.base_delay + history) * self.present_congestion(congestion.usage(next), iteration)
    }

    /// Lower bound on the cost from `node` to `target`. Zero when the target is a clock node.
    pub fn estimate_remaining(&self, graph: &RoutingGraph<'_>, node: NodeIdx, target: NodeIdx) -> f64 {
        let to = graph.node(target);
        if to.clock {
            return 0.0;
        }
        self.per_tile * f64::from(graph.node(node).bbox.distance(&to.bbox))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delay::DelayModel;
    use crate::testutil::{grid_device, tile_wire};
    use weave_device::DeviceBuilder;

    fn settings() -> RouterSettings {
        RouterSettings::default()
    }

    fn node(i: u32) -> NodeIdx {
        NodeIdx::from_raw(i)
    }

    fn net(i: u32) -> NetIdx {
        NetIdx::from_raw(i)
    }

    #[test]
    fn overuse_tracks_transitions() {
        let mut c = CongestionState::new(&settings());
        c.add_user(node(4), net(0));
        assert!(c.overused().is_empty());
        c.add_user(node(4), net(1));
        assert!(c.overused().contains(&node(4)));
        c.add_user(node(4), net(2));
        c.remove_user(node(4), net(0));
        assert!(c.overused().contains(&node(4)));
        c.remove_user(node(4), net(1));
        assert!(c.overused().is_empty());
        assert_eq!(c.usage(node(4)), 1);
        assert_eq!(c.users(node(4)), &[net(2)]);
    }

    #[test]
    fn duplicate_user_ignored() {
        let mut c = CongestionState::new(&settings());
        c.add_user(node(0), net(0));
        c.add_user(node(0), net(0));
        assert_eq!(c.usage(node(0)), 1);
        assert!(c.overused().is_empty());
    }

    #[test]
    fn unknown_nodes_are_idle() {
        let mut c = CongestionState::new(&settings());
        c.remove_user(node(9), net(0));
        assert_eq!(c.usage(node(9)), 0);
        assert_eq!(c.history(node(9), 5), 0.0);
    }

    #[test]
    fn history_grows_then_decays_lazily() {
        let mut c = CongestionState::new(&settings());
        c.add_user(node(1), net(0));
        c.add_user(node(1), net(1));
        c.add_user(node(1), net(2));
        assert!(c.update_history(0).is_empty());
        assert_eq!(c.history(node(1), 0), 2.0);
        assert_eq!(c.history(node(1), 1), 2.0);
        assert!((c.history(node(1), 3) - 2.0 * 0.95 * 0.95).abs() < 1e-12);

        // A second update in the same iteration is ignored.
        c.update_history(0);
        assert_eq!(c.history(node(1), 1), 2.0);

        c.update_history(2);
        assert!((c.history(node(1), 3) - (2.0 * 0.95 * 0.95 + 2.0)).abs() < 1e-12);
    }

    #[test]
    fn history_is_clamped() {
        let mut s = settings();
        s.history_factor = 10.0;
        s.max_history = 5.0;
        let mut c = CongestionState::new(&s);
        c.add_user(node(0), net(0));
        c.add_user(node(0), net(1));
        let clamps = c.update_history(0);
        assert_eq!(clamps, vec![HistoryClamp { node: node(0), raw: 10.0 }]);
        assert_eq!(c.history(node(0), 1), 5.0);
    }

    #[test]
    fn cost_formula() {
        let mut b = DeviceBuilder::new("d", "p");
        let t = b.tile("T", 0, 0);
        b.pip(t, "A", "B");
        let device = b.build().unwrap();
        let mut graph = RoutingGraph::new(&device, DelayModel::default());
        let (t, a) = tile_wire(&device, "T", "A");
        let n = graph.node_at(t, a).unwrap();

        let model = CostModel::new(&settings(), 1.0);
        assert!((model.iteration_scale(0) - 1.0 / 6.0).abs() < 1e-12);
        assert_eq!(model.iteration_scale(5), 1.0);

        let mut c = CongestionState::new(&settings());
        assert_eq!(model.node_cost(&graph, &c, n, 0), 1.0);
        c.add_user(n, net(0));
        c.add_user(n, net(1));
        c.update_history(0);
        // (1 + 1) * (2 * 2/6 + 1)
        let expected = 2.0 * (2.0 * 2.0 / 6.0 + 1.0);
        assert!((model.node_cost(&graph, &c, n, 1) - expected).abs() < 1e-12);
    }

    #[test]
    fn estimate_uses_bbox_gap() {
        let device = grid_device(4, 4, 1);
        let mut graph = RoutingGraph::new(&device, DelayModel::default());
        let (t0, out) = tile_wire(&device, "INT_X0Y0", "OUT");
        let (t3, imux) = tile_wire(&device, "INT_X3Y2", "IMUX0");
        let a = graph.node_at(t0, out).unwrap();
        let b = graph.node_at(t3, imux).unwrap();
        let model = CostModel::new(&settings(), 1.0);
        assert_eq!(model.estimate_remaining(&graph, a, b), 5.0);
        assert_eq!(model.estimate_remaining(&graph, b, b), 0.0);
    }

    #[test]
    fn clock_target_has_zero_estimate() {
        let mut b = DeviceBuilder::new("d", "p");
        let t0 = b.tile("T0", 0, 0);
        let t9 = b.tile("T9", 9, 0);
        b.wire("A");
        b.clock_wire("GCLK");
        let device = b.build().unwrap();
        let mut graph = RoutingGraph::new(&device, DelayModel::default());
        let a = graph.node_at(t0, device.wire_by_name("A").unwrap()).unwrap();
        let clk = graph.node_at(t9, device.wire_by_name("GCLK").unwrap()).unwrap();
        let model = CostModel::new(&settings(), 1.0);
        assert_eq!(model.estimate_remaining(&graph, a, clk), 0.0);
        assert_eq!(model.estimate_remaining(&graph, clk, a), 9.0);
    }
}
