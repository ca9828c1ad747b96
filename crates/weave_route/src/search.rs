//! A* search from a partial routing tree to one sink node.
//!
//! Queue entries are never removed. When a cheaper path to a queued node is
//! found, the old [`NodeCost`] is flagged invalid and a new one is pushed;
//! invalid and already-expanded entries are dropped when popped. Per-node
//! scratch (expanded marker, best entry, parent link) is stamped with a
//! generation counter so starting a new search is O(1).

use crate::cost::{CongestionState, CostModel};
use crate::error::RouteError;
use crate::graph::RoutingGraph;
use crate::ids::NodeIdx;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use weave_design::Pip;

/// How a node joins the tree: its parent and the PIP driving it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeLink {
    /// Upstream node.
    pub parent: NodeIdx,
    /// PIP from `parent` into the node.
    pub pip: Pip,
}

/// A candidate produced during one search.
#[derive(Clone, Copy, Debug)]
pub struct NodeCost {
    /// Candidate node.
    pub node: NodeIdx,
    /// Proposed parent, `None` for a seed.
    pub link: Option<TreeLink>,
    /// Accumulated cost from the seed.
    pub path_cost: f64,
    /// Heuristic remaining cost.
    pub estimate: f64,
    /// `path_cost + estimate`.
    pub total: f64,
    /// Cleared when a cheaper candidate for the same node supersedes this one.
    pub valid: bool,
}

#[derive(Clone, Copy, Debug)]
struct QueueEntry {
    total: f64,
    seq: u64,
    entry: usize,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; ties go to the earlier insertion.
        other
            .total
            .total_cmp(&self.total)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Scratch {
    /// Generation in which the node was expanded.
    expanded: u32,
    /// Generation in which `best` and `parent` were written.
    touched: u32,
    best: usize,
    parent: Option<TreeLink>,
}

/// A node on a found path and the link that reaches it.
pub type PathStep = (NodeIdx, Option<TreeLink>);

/// Reusable search buffers.
#[derive(Debug, Default)]
pub struct SearchState {
    generation: u32,
    scratch: Vec<Scratch>,
    entries: Vec<NodeCost>,
    heap: BinaryHeap<QueueEntry>,
    seq: u64,
    expansions: u64,
}

impl SearchState {
    /// Creates empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total node expansions over all searches.
    pub fn expansions(&self) -> u64 {
        self.expansions
    }

    fn begin(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            // Stamps from 2^32 searches ago could alias; start over.
            self.scratch.iter_mut().for_each(|s| *s = Scratch::default());
            self.generation = 1;
        }
        self.entries.clear();
        self.heap.clear();
        self.seq = 0;
    }

    fn slot(&mut self, node: NodeIdx) -> &mut Scratch {
        if node.index() >= self.scratch.len() {
            self.scratch.resize(node.index() + 1, Scratch::default());
        }
        &mut self.scratch[node.index()]
    }

    fn offer(&mut self, candidate: NodeCost) {
        let generation = self.generation;
        let slot = *self.slot(candidate.node);
        if slot.expanded == generation {
            return;
        }
        if slot.touched == generation {
            let current = &mut self.entries[slot.best];
            if candidate.path_cost >= current.path_cost {
                return;
            }
            current.valid = false;
        }
        let entry = self.entries.len();
        self.entries.push(candidate);
        let slot = self.slot(candidate.node);
        slot.touched = generation;
        slot.best = entry;
        self.heap.push(QueueEntry {
            total: candidate.total,
            seq: self.seq,
            entry,
        });
        self.seq += 1;
    }

    /// Finds the cheapest path from any of `seeds` to `target`.
    ///
    /// Returns the path from a seed to `target`, seed first, or `None` if the
    /// frontier runs dry. Sink-only nodes are entered but not expanded unless
    /// they are seeds.
    pub fn find_path(
        &mut self,
        graph: &mut RoutingGraph<'_>,
        congestion: &CongestionState,
        cost: &CostModel,
        seeds: &[NodeIdx],
        target: NodeIdx,
        iteration: u32,
    ) -> Result<Option<Vec<PathStep>>, RouteError> {
        self.begin();
        for &seed in seeds {
            let estimate = cost.estimate_remaining(graph, seed, target);
            self.offer(NodeCost {
                node: seed,
                link: None,
                path_cost: 0.0,
                estimate,
                total: estimate,
                valid: true,
            });
        }

        while let Some(top) = self.heap.pop() {
            let current = self.entries[top.entry];
            if !current.valid {
                continue;
            }
            let generation = self.generation;
            let slot = self.slot(current.node);
            if slot.expanded == generation {
                continue;
            }
            slot.expanded = generation;
            slot.parent = current.link;

            if current.node == target {
                return Ok(Some(self.walk_back(target)));
            }
            let is_seed = current.link.is_none();
            if graph.node(current.node).sink_only && !is_seed {
                continue;
            }

            self.expansions += 1;
            graph.ensure_neighbours(current.node)?;
            let graph_ref: &RoutingGraph<'_> = graph;
            for edge in graph_ref.edges(current.node) {
                let path_cost =
                    current.path_cost + cost.node_cost(graph_ref, congestion, edge.node, iteration);
                let estimate = cost.estimate_remaining(graph_ref, edge.node, target);
                self.offer(NodeCost {
                    node: edge.node,
                    link: Some(TreeLink {
                        parent: current.node,
                        pip: edge.pip,
                    }),
                    path_cost,
                    estimate,
                    total: path_cost + estimate,
                    valid: true,
                });
            }
        }
        Ok(None)
    }

    fn walk_back(&self, target: NodeIdx) -> Vec<PathStep> {
        let mut path = Vec::new();
        let mut node = target;
        loop {
            let link = self.scratch[node.index()].parent;
            path.push((node, link));
            match link {
                Some(l) => node = l.parent,
                None => break,
            }
        }
        path.reverse();
        path
    }
}
