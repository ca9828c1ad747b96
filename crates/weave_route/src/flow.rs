//! The complete routing run over one design.

use crate::delay::DelayModel;
use crate::error::RouteError;
use crate::graph::RoutingGraph;
use crate::net_data::NetData;
use crate::router::Router;
use crate::routethrough::restrict_routethroughs;
use crate::static_nets::{is_merged, merge_static_nets, split_static_nets};
use crate::timing_log::RouteLog;
use std::collections::BTreeSet;
use weave_common::InternalError;
use weave_config::{Calibration, RouterConfig};
use weave_design::Design;
use weave_device::Device;
use weave_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};

/// Summary of a successful routing run.
#[derive(Clone, Debug)]
pub struct RouteReport {
    /// Global iterations until convergence.
    pub iterations: u32,
    /// Nets routed, merged constant nets counted once.
    pub routed_nets: usize,
    /// PIPs written to the design.
    pub pip_count: usize,
    /// Nets produced by splitting the merged constant nets.
    pub static_nets: usize,
    /// Unused input pins restricted to sink-only.
    pub restricted_pins: usize,
    /// Per-net routing times.
    pub log: RouteLog,
}

/// Routes every selected net of `design` on `device`.
///
/// Nets with sinks and no PIPs are selected, or every net with sinks when
/// `discard_existing` is set. Unselected nets keep their PIPs and the nodes
/// they use are reserved. On success the design holds the routed nets; on
/// error it is left exactly as it was passed in.
pub fn route_design(
    design: &mut Design,
    device: &Device,
    config: &RouterConfig,
    calibration: &Calibration,
    sink: &DiagnosticSink,
) -> Result<RouteReport, RouteError> {
    if design.part != device.part {
        sink.emit(
            Diagnostic::warning(
                DiagnosticCode::new(Category::Warning, 103),
                format!(
                    "design targets part '{}' but the device is '{}'",
                    design.part, device.part
                ),
            )
            .with_subject(design.name.clone()),
        );
    }

    let mut work = design.clone();
    if config.router.discard_existing {
        work.unroute_all();
    }

    let mut selected: BTreeSet<String> = work
        .nets
        .values()
        .filter(|net| net.sinks().next().is_some() && !net.is_routed())
        .map(|net| net.name.clone())
        .collect();
    merge_static_nets(&mut work, &mut selected, sink)?;

    let delays = DelayModel::from_calibration(calibration);
    let per_tile = delays.per_tile();
    let mut graph = RoutingGraph::new(device, delays);

    for net in work.nets.values().filter(|n| !selected.contains(&n.name)) {
        for pip in &net.pips {
            let start = graph.node_at(pip.tile, pip.start)?;
            let end = graph.node_at(pip.tile, pip.end)?;
            graph.block(start)?;
            graph.block(end)?;
        }
    }

    let mut nets = Vec::with_capacity(selected.len());
    for name in &selected {
        let Some(net) = work.net(name) else {
            continue;
        };
        nets.push(NetData::resolve(
            &work,
            &mut graph,
            net,
            &config.static_sources,
            sink,
        )?);
    }

    let restricted_pins = restrict_routethroughs(&work, &mut graph, sink)?;

    let mut router = Router::new(&config.router, per_tile);
    let convergence = router.route(&mut graph, &mut nets, sink)?;

    let mut pip_count = 0;
    for data in &nets {
        let pips = data.pips();
        if pips.len() + data.roots().count() != data.routing.len() {
            return Err(InternalError::new(format!(
                "routing tree of {} is not connected to its roots",
                data.name
            ))
            .into());
        }
        pip_count += pips.len();
        if is_merged(data.kind, &data.name) {
            continue;
        }
        if let Some(net) = work.net_mut(&data.name) {
            net.pips = pips;
        }
    }
    let static_nets =
        split_static_nets(&mut work, &graph, &nets, &config.static_sources, sink)?;

    *design = work;
    Ok(RouteReport {
        iterations: convergence.iterations,
        routed_nets: nets.len(),
        pip_count,
        static_nets,
        restricted_pins,
        log: router.into_log(),
    })
}
