//! The negotiated-congestion convergence loop.
//!
//! Every iteration rips up and re-routes each selected net sink by sink, then
//! folds the overused nodes into their history. The next iteration routes
//! exactly the nets touching an overused node. Unroutable sinks are collected
//! for the whole iteration and reported together.

use crate::cost::{CongestionState, CostModel};
use crate::error::{RouteError, UnroutableSink};
use crate::graph::RoutingGraph;
use crate::ids::{NetIdx, NodeIdx};
use crate::net_data::NetData;
use crate::search::SearchState;
use crate::timing_log::RouteLog;
use std::collections::BTreeSet;
use std::time::Instant;
use weave_config::RouterSettings;
use weave_device::PinDirection;
use weave_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};

/// Outcome of a converged run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Convergence {
    /// Iterations run, the converging one included.
    pub iterations: u32,
    /// Single-net routings performed over all iterations.
    pub net_routings: usize,
}

/// PathFinder router state shared by all nets of a run.
pub struct Router {
    cost: CostModel,
    max_iterations: u32,
    congestion: CongestionState,
    search: SearchState,
    log: RouteLog,
}

impl Router {
    /// Creates a router with `per_tile` as the heuristic weight.
    pub fn new(settings: &RouterSettings, per_tile: f64) -> Self {
        Self {
            cost: CostModel::new(settings, per_tile),
            max_iterations: settings.max_iterations,
            congestion: CongestionState::new(settings),
            search: SearchState::new(),
            log: RouteLog::new(),
        }
    }

    /// Usage and history bookkeeping.
    pub fn congestion(&self) -> &CongestionState {
        &self.congestion
    }

    /// Per-net timing collected so far.
    pub fn log(&self) -> &RouteLog {
        &self.log
    }

    /// Consumes the router and returns its timing log.
    pub fn into_log(self) -> RouteLog {
        self.log
    }

    /// Routes every net until no node is shared.
    pub fn route(
        &mut self,
        graph: &mut RoutingGraph<'_>,
        nets: &mut [NetData],
        sink: &DiagnosticSink,
    ) -> Result<Convergence, RouteError> {
        let mut selected: BTreeSet<NetIdx> = (0..nets.len())
            .map(|i| NetIdx::from_raw(i as u32))
            .collect();
        let mut net_routings = 0;

        for iteration in 0..self.max_iterations {
            let mut failures = Vec::new();
            for &idx in &selected {
                let net = &mut nets[idx.index()];
                let start = Instant::now();
                self.unroute(idx, net);
                failures.extend(self.route_net(graph, idx, net, iteration)?);
                self.log.record(&net.name, iteration, start.elapsed());
                net_routings += 1;
            }

            if !failures.is_empty() {
                for failure in &failures {
                    sink.emit(self.unroutable_diagnostic(graph, nets, failure));
                }
                return Err(RouteError::Unroutable {
                    failures: failures.into_iter().map(|f| f.sink).collect(),
                });
            }

            for clamp in self.congestion.update_history(iteration) {
                sink.emit(
                    Diagnostic::warning(
                        DiagnosticCode::new(Category::Warning, 102),
                        format!(
                            "historical overuse {} clamped to the configured maximum",
                            clamp.raw
                        ),
                    )
                    .with_subject(graph.describe(clamp.node)),
                );
            }

            let overused = self.congestion.overused();
            if overused.is_empty() {
                sink.emit(Diagnostic::note(
                    DiagnosticCode::new(Category::Route, 302),
                    format!(
                        "routing converged after {} iteration(s), {net_routings} net routings, {} node expansions",
                        iteration + 1,
                        self.search.expansions()
                    ),
                ));
                return Ok(Convergence {
                    iterations: iteration + 1,
                    net_routings,
                });
            }

            selected = overused
                .iter()
                .flat_map(|&node| self.congestion.users(node).iter().copied())
                .collect();
            sink.emit(Diagnostic::note(
                DiagnosticCode::new(Category::Route, 301),
                format!(
                    "iteration {iteration}: {} overused node(s), {} net(s) to reroute",
                    overused.len(),
                    selected.len()
                ),
            ));
        }

        sink.emit(
            Diagnostic::error(
                DiagnosticCode::new(Category::Error, 202),
                format!(
                    "routing did not converge after {} iterations",
                    self.max_iterations
                ),
            )
            .with_note(format!(
                "{} overused node(s), {} contended net(s)",
                self.congestion.overused().len(),
                selected.len()
            )),
        );
        Err(RouteError::IterationLimit {
            iterations: self.max_iterations,
            contended_nets: selected.len(),
        })
    }

    fn unroute(&mut self, idx: NetIdx, net: &mut NetData) {
        for &node in net.routing.keys() {
            self.congestion.remove_user(node, idx);
        }
        net.routing.clear();
    }

    fn route_net(
        &mut self,
        graph: &mut RoutingGraph<'_>,
        idx: NetIdx,
        net: &mut NetData,
        iteration: u32,
    ) -> Result<Vec<Failure>, RouteError> {
        let mut failures = Vec::new();
        let sources = net.source_nodes();
        for (i, terminal) in net.sinks.iter().enumerate() {
            let seeds: Vec<NodeIdx> = if net.routing.is_empty() {
                sources.clone()
            } else {
                let mut seeds: Vec<NodeIdx> = net.routing.keys().copied().collect();
                seeds.extend(sources.iter().filter(|s| !net.routing.contains_key(*s)));
                seeds
            };
            let path = self.search.find_path(
                graph,
                &self.congestion,
                &self.cost,
                &seeds,
                terminal.node,
                iteration,
            )?;
            let Some(path) = path else {
                failures.push(Failure {
                    sink: UnroutableSink {
                        net: net.name.clone(),
                        pin: format!("{}/{}", terminal.pin.instance, terminal.pin.name),
                        node: graph.describe(terminal.node),
                    },
                    net: idx,
                    sink_index: i,
                });
                continue;
            };
            for (node, link) in path {
                if !net.routing.contains_key(&node) {
                    net.routing.insert(node, link);
                    self.congestion.add_user(node, idx);
                }
            }
        }
        Ok(failures)
    }

    fn unroutable_diagnostic(
        &self,
        graph: &RoutingGraph<'_>,
        nets: &[NetData],
        failure: &Failure,
    ) -> Diagnostic {
        let net = &nets[failure.net.index()];
        let target = net.sinks[failure.sink_index].node;
        let candidates: Vec<String> = net
            .sources
            .iter()
            .map(|s| graph.describe(s.node))
            .collect();
        let mut diag = Diagnostic::error(
            DiagnosticCode::new(Category::Error, 201),
            format!("cannot reach sink {} ({})", failure.sink.pin, failure.sink.node),
        )
        .with_subject(net.name.clone());
        diag = if candidates.is_empty() {
            diag.with_note("the net has no candidate sources")
        } else {
            diag.with_note(format!("candidate sources: {}", candidates.join(", ")))
        };
        let local = same_tile_sources(graph, target);
        if !local.is_empty() {
            diag = diag.with_note(format!("sources in the same tile: {}", local.join(", ")));
        }
        diag.with_help("check placement and blocked resources near the sink")
    }
}

struct Failure {
    sink: UnroutableSink,
    net: NetIdx,
    sink_index: usize,
}

/// Output site pins located in any tile of `node`.
fn same_tile_sources(graph: &RoutingGraph<'_>, node: NodeIdx) -> Vec<String> {
    let device = graph.device();
    let tiles: BTreeSet<_> = graph.node(node).wires.iter().map(|&(t, _)| t).collect();
    let mut out = Vec::new();
    for tile in tiles {
        for &site in &device.tile(tile).sites {
            let site = device.site(site);
            for pin in site.pins.iter().filter(|p| p.direction == PinDirection::Output) {
                out.push(format!("{}/{}", site.name, pin.name));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delay::DelayModel;
    use crate::testutil::{grid_device, place_slice, tile_wire};
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use std::collections::HashMap;
    use weave_config::{Calibration, StaticSourceConfig, WireDelay};
    use weave_design::{Design, Instance, Net, NetKind, Pin};
    use weave_device::{Device, DeviceBuilder};

    /// Two nets whose cheapest paths share node `M`; net `a` has a detour through `ALT`.
    fn contention_device() -> Device {
        let mut b = DeviceBuilder::new("d", "p");
        let t = b.tile("T", 0, 0);
        b.pip(t, "SA", "M");
        b.pip(t, "SB", "M");
        b.pip(t, "M", "TA");
        b.pip(t, "M", "TB");
        b.pip(t, "SA", "ALT");
        b.pip(t, "ALT", "TA");
        b.site("A", t, "SLICE", &[("O", "SA", PinDirection::Output)]);
        b.site("B", t, "SLICE", &[("O", "SB", PinDirection::Output)]);
        b.site("XA", t, "SLICE", &[("I", "TA", PinDirection::Input)]);
        b.site("XB", t, "SLICE", &[("I", "TB", PinDirection::Input)]);
        b.build().unwrap()
    }

    fn contention_design(device: &Device) -> Design {
        let mut design = Design::new("top", "p");
        for (inst, site) in [("a", "A"), ("b", "B"), ("xa", "XA"), ("xb", "XB")] {
            design
                .add_instance(Instance::placed(inst, "SLICE", device.site_by_name(site).unwrap()))
                .unwrap();
        }
        design
            .add_net(Net::new("a", NetKind::Wire, vec![Pin::output("a", "O"), Pin::input("xa", "I")]))
            .unwrap();
        design
            .add_net(Net::new("b", NetKind::Wire, vec![Pin::output("b", "O"), Pin::input("xb", "I")]))
            .unwrap();
        design
    }

    fn detour_delays() -> DelayModel {
        let mut cal = Calibration::default();
        cal.delay.wires.push(WireDelay {
            prefix: "ALT".into(),
            delay: 1.5,
        });
        DelayModel::from_calibration(&cal)
    }

    fn resolve_all(design: &Design, graph: &mut RoutingGraph<'_>) -> Vec<NetData> {
        let sink = DiagnosticSink::new();
        design
            .nets
            .values()
            .map(|net| {
                NetData::resolve(design, graph, net, &StaticSourceConfig::default(), &sink).unwrap()
            })
            .collect()
    }

    fn assert_usage_consistent(router: &Router, graph: &RoutingGraph<'_>, nets: &[NetData]) {
        let mut counts: HashMap<NodeIdx, usize> = HashMap::new();
        for net in nets {
            for &node in net.routing.keys() {
                *counts.entry(node).or_default() += 1;
            }
        }
        for i in 0..graph.len() {
            let node = NodeIdx::from_raw(i as u32);
            assert_eq!(
                router.congestion().usage(node),
                counts.get(&node).copied().unwrap_or(0),
                "usage of {}",
                graph.describe(node)
            );
        }
    }

    fn assert_valid_trees(graph: &RoutingGraph<'_>, nets: &[NetData]) {
        for net in nets {
            let roots: Vec<_> = net.roots().collect();
            assert!(!roots.is_empty() || net.sinks.is_empty(), "{} has no root", net.name);
            for root in &roots {
                assert!(net.sources.iter().any(|s| s.node == *root), "{} root is not a source", net.name);
            }
            // Every node walks back to a root without revisiting anything.
            for (&node, _) in &net.routing {
                let mut seen = BTreeSet::new();
                let mut cur = node;
                while let Some(Some(link)) = net.routing.get(&cur) {
                    assert!(seen.insert(cur), "cycle in {}", net.name);
                    let parent = graph.node(link.parent);
                    assert!(parent.wires.iter().any(|&(t, w)| t == link.pip.tile && w == link.pip.start));
                    assert!(graph.node(cur).wires.contains(&(link.pip.tile, link.pip.end)));
                    cur = link.parent;
                }
                assert!(net.routing.get(&cur) == Some(&None), "{} is detached", graph.describe(node));
            }
            for terminal in &net.sinks {
                assert!(net.routing.contains_key(&terminal.node), "{} misses a sink", net.name);
            }
        }
    }

    #[test]
    fn shared_node_is_negotiated_away() {
        let device = contention_device();
        let design = contention_design(&device);
        let mut graph = RoutingGraph::new(&device, detour_delays());
        let mut nets = resolve_all(&design, &mut graph);
        let mut router = Router::new(&RouterSettings::default(), 1.0);
        let sink = DiagnosticSink::new();

        let result = router.route(&mut graph, &mut nets, &sink).unwrap();
        assert_eq!(result.iterations, 2);
        assert_eq!(result.net_routings, 4);

        let (t, m) = tile_wire(&device, "T", "M");
        let m = graph.node_at(t, m).unwrap();
        assert_eq!(router.congestion().usage(m), 1);
        assert_eq!(router.congestion().users(m), &[NetIdx::from_raw(1)]);
        assert!(router.congestion().overused().is_empty());
        // One unit of overuse at the end of iteration 0, decayed once by iteration 2.
        assert!((router.congestion().history(m, 2) - 0.95).abs() < 1e-12);

        let a_nodes: Vec<String> = nets[0].routing.keys().map(|&n| graph.describe(n)).collect();
        assert_eq!(a_nodes.len(), 3);
        assert!(a_nodes.contains(&"T/ALT".to_string()));
        assert_usage_consistent(&router, &graph, &nets);
        assert_valid_trees(&graph, &nets);

        let codes: Vec<String> = sink.diagnostics().iter().map(|d| d.code.to_string()).collect();
        assert_eq!(codes, vec!["R301", "R302"]);
        assert_eq!(router.log().entries().len(), 4);
    }

    #[test]
    fn iteration_cap_is_fatal() {
        let device = contention_device();
        let design = contention_design(&device);
        let mut graph = RoutingGraph::new(&device, detour_delays());
        let mut nets = resolve_all(&design, &mut graph);
        let settings = RouterSettings {
            max_iterations: 1,
            ..RouterSettings::default()
        };
        let mut router = Router::new(&settings, 1.0);
        let sink = DiagnosticSink::new();

        let err = router.route(&mut graph, &mut nets, &sink).unwrap_err();
        assert!(matches!(
            err,
            RouteError::IterationLimit {
                iterations: 1,
                contended_nets: 2
            }
        ));
        assert!(sink.has_errors());
        assert_usage_consistent(&router, &graph, &nets);
    }

    #[test]
    fn unreachable_sink_is_fatal_after_the_iteration() {
        let mut b = DeviceBuilder::new("d", "p");
        let t = b.tile("T", 0, 0);
        b.pip(t, "S", "X");
        b.pip(t, "X", "IN1");
        b.site("D", t, "SLICE", &[("O", "S", PinDirection::Output)]);
        b.site("R", t, "SLICE", &[("I1", "IN1", PinDirection::Input), ("I2", "IN2", PinDirection::Input)]);
        let device = b.build().unwrap();

        let mut design = Design::new("top", "p");
        design.add_instance(Instance::placed("d", "SLICE", device.site_by_name("D").unwrap())).unwrap();
        design.add_instance(Instance::placed("r", "SLICE", device.site_by_name("R").unwrap())).unwrap();
        design
            .add_net(Net::new(
                "n",
                NetKind::Wire,
                vec![Pin::output("d", "O"), Pin::input("r", "I1"), Pin::input("r", "I2")],
            ))
            .unwrap();

        let mut graph = RoutingGraph::new(&device, DelayModel::default());
        let mut nets = resolve_all(&design, &mut graph);
        let mut router = Router::new(&RouterSettings::default(), 1.0);
        let sink = DiagnosticSink::new();
        let err = router.route(&mut graph, &mut nets, &sink).unwrap_err();

        let RouteError::Unroutable { failures } = err else {
            panic!("expected Unroutable, got {err:?}");
        };
        assert_eq!(
            failures,
            vec![UnroutableSink {
                net: "n".into(),
                pin: "r/I2".into(),
                node: "T/IN2".into(),
            }]
        );
        // The reachable sink was still routed in the same iteration.
        assert_eq!(nets[0].routing.len(), 3);

        let diags = sink.take_all();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code.to_string(), "E201");
        assert!(diags[0].notes.iter().any(|n| n.contains("candidate sources: T/S")));
        assert!(diags[0].notes.iter().any(|n| n.contains("D/O")));
    }

    #[test]
    fn later_sinks_branch_off_the_tree() {
        let device = grid_device(4, 1, 1);
        let mut design = Design::new("top", "grid-test");
        place_slice(&mut design, &device, "d", 0, 0);
        place_slice(&mut design, &device, "r2", 2, 0);
        place_slice(&mut design, &device, "r3", 3, 0);
        design
            .add_net(Net::new(
                "n",
                NetKind::Wire,
                vec![Pin::output("d", "O"), Pin::input("r3", "I0"), Pin::input("r2", "I1")],
            ))
            .unwrap();
        let mut graph = RoutingGraph::new(&device, DelayModel::default());
        let mut nets = resolve_all(&design, &mut graph);
        let mut router = Router::new(&RouterSettings::default(), 1.0);
        router.route(&mut graph, &mut nets, &DiagnosticSink::new()).unwrap();

        // d/O -> E(0->1) -> E(1->2) -> E(2->3) -> IMUX0 at x=3, then the tap
        // at x=2 branches off E(1->2) with a single IMUX1 hop.
        assert_eq!(nets[0].routing.len(), 6);
        assert_eq!(nets[0].roots().count(), 1);
        assert_valid_trees(&graph, &nets);
    }

    #[test]
    fn random_nets_converge_without_sharing() {
        let device = grid_device(5, 5, 2);
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut design = Design::new("top", "grid-test");
        let mut coords: Vec<(u32, u32)> = (0..5).flat_map(|y| (0..5).map(move |x| (x, y))).collect();
        coords.shuffle(&mut rng);
        for (i, &(x, y)) in coords.iter().enumerate() {
            place_slice(&mut design, &device, &format!("u{i}"), x, y);
        }

        let mut inputs: Vec<(usize, &str)> = (0..coords.len())
            .flat_map(|i| [(i, "I0"), (i, "I1")])
            .collect();
        inputs.shuffle(&mut rng);
        let mut inputs = inputs.into_iter();
        for driver in 0..12 {
            let mut pins = vec![Pin::output(&format!("u{driver}"), "O")];
            for _ in 0..3 {
                if let Some((i, pin)) = inputs.next() {
                    pins.push(Pin::input(&format!("u{i}"), pin));
                }
            }
            design
                .add_net(Net::new(&format!("net{driver:02}"), NetKind::Wire, pins))
                .unwrap();
        }

        let mut graph = RoutingGraph::new(&device, DelayModel::default());
        let mut nets = resolve_all(&design, &mut graph);
        let mut router = Router::new(&RouterSettings::default(), 1.0);
        let result = router.route(&mut graph, &mut nets, &DiagnosticSink::new()).unwrap();
        assert!(result.iterations <= 100);
        assert!(router.congestion().overused().is_empty());
        for i in 0..graph.len() {
            assert!(router.congestion().usage(NodeIdx::from_raw(i as u32)) <= 1);
        }
        assert_usage_consistent(&router, &graph, &nets);
        assert_valid_trees(&graph, &nets);
    }
}
