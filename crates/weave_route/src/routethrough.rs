//! Routethrough legality.
//!
//! An unused input pin of a placed instance still feeds the instance's
//! internal logic. If any enabled internal element lies downstream of the pin,
//! signals must not pass through that pin's node, so the node becomes
//! sink-only.

use crate::error::RouteError;
use crate::graph::RoutingGraph;
use std::collections::HashSet;
use weave_design::{Design, Instance};
use weave_device::{PrimitiveDef, RoutingElement};
use weave_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};

/// Marks the nodes of live unused input pins sink-only. Returns how many pins were restricted.
pub fn restrict_routethroughs(
    design: &Design,
    graph: &mut RoutingGraph<'_>,
    sink: &DiagnosticSink,
) -> Result<usize, RouteError> {
    let device = graph.device();
    let used = design.used_pins();
    let mut restricted = 0;
    for inst in design.instances.values() {
        let Some(site) = inst.site else {
            continue;
        };
        let Some(def) = device.primitive_def(&inst.primitive_type) else {
            continue;
        };
        for pin in def.input_pins() {
            let name = pin.name();
            if used.contains(&(inst.name.as_str(), name)) || !feeds_enabled_logic(def, name, inst) {
                continue;
            }
            let Some(node) = graph.site_pin_node(site, name).transpose()? else {
                continue;
            };
            graph.set_sink_only(node);
            restricted += 1;
        }
    }
    if restricted > 0 {
        sink.emit(Diagnostic::note(
            DiagnosticCode::new(Category::Route, 304),
            format!("{restricted} unused input pin(s) restricted to sink-only"),
        ));
    }
    Ok(restricted)
}

/// Walks forward from pin `start` and reports whether an enabled internal element is reached.
pub fn feeds_enabled_logic(def: &PrimitiveDef, start: &str, inst: &Instance) -> bool {
    let mut visited: HashSet<&str> = HashSet::from([start]);
    let mut worklist = vec![start];
    while let Some(name) = worklist.pop() {
        let Some(element) = def.element(name) else {
            continue;
        };
        if let RoutingElement::Internal { name, .. } = element {
            if inst.is_element_enabled(name) {
                return true;
            }
        }
        for next in element.connected_forward() {
            if visited.insert(next) {
                worklist.push(next);
            }
        }
    }
    false
}
