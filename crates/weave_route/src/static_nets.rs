//! Constant-net merging before routing and splitting after.
//!
//! All constant-0 nets are routed as one net with every tie-off as a
//! candidate source, likewise all constant-1 nets. After convergence each
//! source actually used by the tree becomes its own single-driver net.

use crate::error::RouteError;
use crate::graph::RoutingGraph;
use crate::net_data::NetData;
use std::collections::{BTreeSet, HashSet};
use weave_config::StaticSourceConfig;
use weave_design::{Design, Instance, Net, NetKind, Pin};
use weave_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};

/// Name of the merged constant-0 net.
pub const GLOBAL_LOGIC0: &str = "GLOBAL_LOGIC0";
/// Name of the merged constant-1 net.
pub const GLOBAL_LOGIC1: &str = "GLOBAL_LOGIC1";

fn merged_name(kind: NetKind) -> Option<&'static str> {
    match kind {
        NetKind::Wire => None,
        NetKind::Gnd => Some(GLOBAL_LOGIC0),
        NetKind::Vcc => Some(GLOBAL_LOGIC1),
    }
}

/// Whether a net is one of the merged constant nets.
pub(crate) fn is_merged(kind: NetKind, name: &str) -> bool {
    merged_name(kind) == Some(name)
}

fn note(message: String) -> Diagnostic {
    Diagnostic::note(DiagnosticCode::new(Category::Route, 303), message)
}

/// Replaces the selected constant nets with one merged net per polarity.
///
/// `selected` is updated to name the merged nets instead of the originals.
/// Returns the names of the merged nets created.
pub fn merge_static_nets(
    design: &mut Design,
    selected: &mut BTreeSet<String>,
    sink: &DiagnosticSink,
) -> Result<Vec<String>, RouteError> {
    let mut merged = Vec::new();
    for kind in [NetKind::Gnd, NetKind::Vcc] {
        let Some(target) = merged_name(kind) else {
            continue;
        };
        let members: Vec<String> = selected
            .iter()
            .filter(|name| design.net(name).is_some_and(|n| n.kind == kind))
            .cloned()
            .collect();
        if members.is_empty() {
            continue;
        }
        if design.net(target).is_some() && !members.iter().any(|m| m == target) {
            return Err(RouteError::NameConflict(target.to_string()));
        }

        let mut pins: Vec<Pin> = Vec::new();
        let mut seen: HashSet<Pin> = HashSet::new();
        for name in &members {
            selected.remove(name);
            if let Some(net) = design.remove_net(name) {
                for pin in net.pins {
                    if seen.insert(pin.clone()) {
                        pins.push(pin);
                    }
                }
            }
        }
        design.add_net(Net::new(target, kind, pins))?;
        selected.insert(target.to_string());
        sink.emit(note(format!(
            "merged {} constant net(s) into {target}",
            members.len()
        )));
        merged.push(target.to_string());
    }
    Ok(merged)
}

/// Splits each merged net into one net per used source.
///
/// New nets are named `<merged>_<k>`, skipping suffixes already taken by nets
/// kept from an earlier run. A used tie-off without an instance gets
/// a placeholder instance named `<prefix>_<tile>_<site>`. Explicit drivers the
/// tree does not use keep their pin on a net of their own. Returns the number
/// of nets created.
pub fn split_static_nets(
    design: &mut Design,
    graph: &RoutingGraph<'_>,
    nets: &[NetData],
    tieoffs: &StaticSourceConfig,
    sink: &DiagnosticSink,
) -> Result<usize, RouteError> {
    let device = graph.device();
    let mut created = 0;
    for data in nets {
        if !is_merged(data.kind, &data.name) {
            continue;
        }
        design.remove_net(&data.name);

        let mut reached = vec![false; data.sinks.len()];
        let mut k = 0;
        let mut split = 0;
        for source in &data.sources {
            let is_root = matches!(data.routing.get(&source.node), Some(None));
            if !is_root && source.instance.is_none() {
                continue;
            }

            let driver = match &source.instance {
                Some(inst) => inst.clone(),
                None => match design.instance_at(source.site) {
                    Some(inst) => inst.name.clone(),
                    None => {
                        let site = device.site(source.site);
                        let name = format!(
                            "{}_{}_{}",
                            tieoffs.placeholder_prefix,
                            device.tile(site.tile).name,
                            site.name
                        );
                        design.add_instance(Instance::placed(
                            &name,
                            &site.primitive_type,
                            source.site,
                        ))?;
                        name
                    }
                },
            };

            let mut net = Net::new("", data.kind, vec![Pin::output(&driver, &source.pin)]);
            if is_root {
                let (nodes, pips) = data.subtree(source.node);
                let nodes: HashSet<_> = nodes.into_iter().collect();
                for (i, terminal) in data.sinks.iter().enumerate() {
                    if !reached[i] && nodes.contains(&terminal.node) {
                        reached[i] = true;
                        net.pins.push(terminal.pin.clone());
                    }
                }
                net.pips = pips;
            }

            net.name = loop {
                let name = format!("{}_{k}", data.name);
                k += 1;
                if design.net(&name).is_none() {
                    break name;
                }
            };
            design.add_net(net)?;
            split += 1;
            created += 1;
        }

        if let Some(i) = reached.iter().position(|r| !r) {
            let pin = &data.sinks[i].pin;
            return Err(RouteError::StaticSplit(format!(
                "sink {}/{} of {} is not reached from any used source",
                pin.instance, pin.name, data.name
            )));
        }
        sink.emit(note(format!("split {} into {split} net(s)", data.name)));
    }
    Ok(created)
}
