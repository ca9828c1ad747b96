//! Per-net routing state.

use crate::error::RouteError;
use crate::graph::RoutingGraph;
use crate::ids::NodeIdx;
use crate::search::TreeLink;
use std::collections::{BTreeMap, HashMap};
use weave_config::StaticSourceConfig;
use weave_design::{Design, Net, NetKind, Pin, Pip};
use weave_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use weave_device::SiteId;

/// A node that may drive the net.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceTerminal {
    /// Driving instance; `None` for a tie-off pin no design pin refers to yet.
    pub instance: Option<String>,
    /// Site of the driving pin.
    pub site: SiteId,
    /// Pin name on the site.
    pub pin: String,
    /// Routing node of the pin.
    pub node: NodeIdx,
}

/// A node the net must reach.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SinkTerminal {
    /// The design pin.
    pub pin: Pin,
    /// Routing node of the pin.
    pub node: NodeIdx,
}

/// Resolved terminals of one net and its committed routing tree.
#[derive(Clone, Debug)]
pub struct NetData {
    /// Net name.
    pub name: String,
    /// Net kind.
    pub kind: NetKind,
    /// Candidate drivers. Several for constant nets.
    pub sources: Vec<SourceTerminal>,
    /// Sinks in pin order.
    pub sinks: Vec<SinkTerminal>,
    /// Committed tree: every node with the link it was reached by, `None` for roots.
    pub routing: BTreeMap<NodeIdx, Option<TreeLink>>,
}

impl NetData {
    /// Resolves a net's pins to routing nodes.
    ///
    /// Constant nets also get every unblocked tie-off pin of their polarity as
    /// a candidate source. A net with sinks but no source is reported with W101
    /// and left for the search to fail.
    pub fn resolve(
        design: &Design,
        graph: &mut RoutingGraph<'_>,
        net: &Net,
        tieoffs: &StaticSourceConfig,
        sink: &DiagnosticSink,
    ) -> Result<Self, RouteError> {
        let mut sources = Vec::new();
        for pin in net.sources() {
            let node = graph.pin_node(design, pin)?;
            let site = design
                .instance(&pin.instance)
                .and_then(|inst| inst.site)
                .ok_or_else(|| RouteError::UnmappedPin {
                    instance: pin.instance.clone(),
                    pin: pin.name.clone(),
                })?;
            sources.push(SourceTerminal {
                instance: Some(pin.instance.clone()),
                site,
                pin: pin.name.clone(),
                node,
            });
        }

        let tie_pins = match net.kind {
            NetKind::Wire => &[][..],
            NetKind::Gnd => tieoffs.gnd_pins.as_slice(),
            NetKind::Vcc => tieoffs.vcc_pins.as_slice(),
        };
        if !tie_pins.is_empty() {
            let device = graph.device();
            for &site in device.sites_of_type(&tieoffs.tieoff_type) {
                for pin in tie_pins {
                    let Some(node) = graph.site_pin_node(site, pin).transpose()? else {
                        continue;
                    };
                    if graph.node(node).blocked || sources.iter().any(|s| s.node == node) {
                        continue;
                    }
                    sources.push(SourceTerminal {
                        instance: None,
                        site,
                        pin: pin.clone(),
                        node,
                    });
                }
            }
        }

        let mut sinks = Vec::new();
        for pin in net.sinks() {
            let node = graph.pin_node(design, pin)?;
            sinks.push(SinkTerminal {
                pin: pin.clone(),
                node,
            });
        }

        if sources.is_empty() && !sinks.is_empty() {
            sink.emit(
                Diagnostic::warning(
                    DiagnosticCode::new(Category::Warning, 101),
                    "net has sinks but no resolvable source",
                )
                .with_subject(net.name.clone())
                .with_note(format!("{} sink(s) will be reported unroutable", sinks.len())),
            );
        }

        Ok(Self {
            name: net.name.clone(),
            kind: net.kind,
            sources,
            sinks,
            routing: BTreeMap::new(),
        })
    }

    /// Source nodes in source order.
    pub fn source_nodes(&self) -> Vec<NodeIdx> {
        self.sources.iter().map(|s| s.node).collect()
    }

    /// Roots of the committed tree, in node order.
    pub fn roots(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        self.routing
            .iter()
            .filter(|(_, link)| link.is_none())
            .map(|(&n, _)| n)
    }

    fn children(&self) -> HashMap<NodeIdx, Vec<(NodeIdx, Pip)>> {
        let mut children: HashMap<NodeIdx, Vec<(NodeIdx, Pip)>> = HashMap::new();
        for (&node, link) in &self.routing {
            if let Some(link) = link {
                children.entry(link.parent).or_default().push((node, link.pip));
            }
        }
        children
    }

    /// Nodes and PIPs of the subtree under `root`, depth-first, root first.
    ///
    /// The PIP list has one entry per non-root node, in visiting order.
    pub fn subtree(&self, root: NodeIdx) -> (Vec<NodeIdx>, Vec<Pip>) {
        let children = self.children();
        let mut nodes = Vec::new();
        let mut pips = Vec::new();
        let mut stack = vec![(root, None)];
        while let Some((node, pip)) = stack.pop() {
            nodes.push(node);
            pips.extend(pip);
            if let Some(kids) = children.get(&node) {
                for &(child, pip) in kids.iter().rev() {
                    stack.push((child, Some(pip)));
                }
            }
        }
        (nodes, pips)
    }

    /// All PIPs of the committed tree, each root's subtree in turn.
    pub fn pips(&self) -> Vec<Pip> {
        self.roots().flat_map(|root| self.subtree(root).1).collect()
    }
}
