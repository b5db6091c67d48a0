//! The owning arena of nodes and links.

use crate::core::error::{GraphError, Result};
use crate::core::eval::Evaluator;
use crate::core::link::{Link, LinkId};
use crate::core::node::{Node, NodeId, NodeKind};
use crate::core::observer::{GraphObserver, NullObserver};
use crate::core::port::PortSlot;
use crate::core::propagate::Propagator;
use crate::core::validation::{self, ValidationResult};
use crate::core::value::Value;
use crate::imaging::{codec, Raster};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

/// A directed graph of typed nodes.
///
/// Nodes and links are addressed by id; neither holds a reference to the other. Every
/// link's endpoints are present in the graph, every input port is fed by at most one link,
/// and no chain of links leads from a node back to itself.
pub struct Graph {
    nodes: HashMap<NodeId, Node>,
    node_order: Vec<NodeId>,
    links: HashMap<LinkId, Link>,
    link_order: Vec<LinkId>,
    observer: Box<dyn GraphObserver>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.node_order)
            .field("links", &self.link_order)
            .finish_non_exhaustive()
    }
}

impl Graph {
    /// Creates an empty graph that reports refreshes nowhere.
    pub fn new() -> Self {
        Self::with_observer(NullObserver)
    }

    /// Creates an empty graph reporting every refresh to `observer`.
    pub fn with_observer(observer: impl GraphObserver + 'static) -> Self {
        Self {
            nodes: HashMap::new(),
            node_order: Vec::new(),
            links: HashMap::new(),
            link_order: Vec::new(),
            observer: Box::new(observer),
        }
    }

    pub fn set_observer(&mut self, observer: impl GraphObserver + 'static) {
        self.observer = Box::new(observer);
    }

    pub(crate) fn observer(&self) -> &dyn GraphObserver {
        self.observer.as_ref()
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Mutable access for layout edits. Parameters and wiring go through the graph so
    /// dependents are refreshed.
    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn link(&self, id: &LinkId) -> Option<&Link> {
        self.links.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Links in creation order.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.link_order.iter().filter_map(|id| self.links.get(id))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The node feeding input `slot` of `node`.
    pub fn upstream(&self, node: &NodeId, slot: PortSlot) -> Option<&NodeId> {
        let link = self.nodes.get(node)?.input(slot)?.link.as_ref()?;
        self.links.get(link).map(|l| &l.source)
    }

    /// Consumers of `node`'s output, in link order. A consumer linked twice appears twice.
    pub fn downstream(&self, node: &NodeId) -> Vec<NodeId> {
        self.links()
            .filter(|l| &l.source == node)
            .map(|l| l.target.clone())
            .collect()
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Adds a fresh node of `kind` and returns its id.
    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let node = Node::new(kind);
        let id = node.id().clone();
        self.insert(node);
        self.kick(&id);
        id
    }

    /// Adds a prepared node, keeping its id.
    pub fn insert_node(&mut self, node: Node) -> Result<NodeId> {
        let id = node.id().clone();
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateId(id.to_string()));
        }
        self.insert(node);
        self.kick(&id);
        Ok(id)
    }

    pub(crate) fn insert(&mut self, node: Node) {
        let id = node.id().clone();
        if self.nodes.insert(id.clone(), node).is_none() {
            self.node_order.push(id);
        }
    }

    /// Removes a node together with every link touching it. Consumers that lost an input
    /// are refreshed.
    pub fn remove_node(&mut self, id: &NodeId) -> Result<Node> {
        if !self.nodes.contains_key(id) {
            return Err(GraphError::UnknownNode(id.clone()));
        }
        let touching: Vec<LinkId> = self
            .links()
            .filter(|l| l.touches(id))
            .map(|l| l.id.clone())
            .collect();

        let mut orphaned = Vec::new();
        for link_id in touching {
            if let Some(link) = self.detach(&link_id) {
                if &link.target != id {
                    orphaned.push(link.target);
                }
            }
        }

        self.node_order.retain(|n| n != id);
        let node = self
            .nodes
            .remove(id)
            .ok_or_else(|| GraphError::UnknownNode(id.clone()))?;
        log::debug!("Removed node {} ({})", id, node.kind());

        for target in orphaned {
            self.kick(&target);
        }
        Ok(node)
    }

    /// Removes every node and link.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.node_order.clear();
        self.links.clear();
        self.link_order.clear();
    }

    /// Swaps in the nodes and links of `other`, keeping this graph's observer.
    pub(crate) fn replace_contents(&mut self, other: Graph) {
        self.nodes = other.nodes;
        self.node_order = other.node_order;
        self.links = other.links;
        self.link_order = other.link_order;
    }

    // ------------------------------------------------------------------
    // Links
    // ------------------------------------------------------------------

    /// Links `source`'s output to input `slot` of `target`.
    ///
    /// The port kinds must match exactly and the link must not close a cycle. A link
    /// already feeding that port is removed first. The target and everything downstream
    /// of it are refreshed.
    pub fn connect(&mut self, source: &NodeId, target: &NodeId, slot: PortSlot) -> Result<LinkId> {
        let link = self.check_link(source, target, slot)?;
        let id = link.id.clone();
        self.attach(link);
        self.kick(target);
        Ok(id)
    }

    /// Validates a prospective link and builds it with the target port's kind.
    pub(crate) fn check_link(&self, source: &NodeId, target: &NodeId, slot: PortSlot) -> Result<Link> {
        let src = self
            .nodes
            .get(source)
            .ok_or_else(|| GraphError::UnknownNode(source.clone()))?;
        let dst = self
            .nodes
            .get(target)
            .ok_or_else(|| GraphError::UnknownNode(target.clone()))?;
        let port = dst.input(slot).ok_or_else(|| GraphError::UnknownPort {
            node: target.clone(),
            slot,
        })?;
        let produced = src
            .output_kind()
            .ok_or_else(|| GraphError::NoOutput(source.clone()))?;
        if produced != port.kind {
            return Err(GraphError::TypeMismatch {
                expected: port.kind,
                found: produced,
            });
        }
        if self.reaches(target, source) {
            return Err(GraphError::CycleDetected {
                source_node: source.clone(),
                target: target.clone(),
            });
        }
        Ok(Link::new(source.clone(), target.clone(), slot, port.kind))
    }

    /// Stores a checked link, evicting whatever fed the same port.
    pub(crate) fn attach(&mut self, link: Link) {
        let previous = self
            .nodes
            .get_mut(&link.target)
            .and_then(|n| n.set_input_link(link.slot, link.id.clone()).ok().flatten());
        if let Some(old) = previous {
            log::warn!(
                "Input {} of {} was already linked; replacing link {}",
                link.slot,
                link.target,
                old
            );
            self.links.remove(&old);
            self.link_order.retain(|l| l != &old);
        }
        self.link_order.push(link.id.clone());
        self.links.insert(link.id.clone(), link);
    }

    /// Removes a link and refreshes the consumer it fed.
    pub fn disconnect(&mut self, id: &LinkId) -> Result<Link> {
        let link = self
            .detach(id)
            .ok_or_else(|| GraphError::UnknownLink(id.to_string()))?;
        self.kick(&link.target);
        Ok(link)
    }

    /// Detaches whatever feeds input `slot` of `target`.
    pub fn clear_input(&mut self, target: &NodeId, slot: PortSlot) -> Result<Option<Link>> {
        let node = self
            .nodes
            .get(target)
            .ok_or_else(|| GraphError::UnknownNode(target.clone()))?;
        let port = node.input(slot).ok_or_else(|| GraphError::UnknownPort {
            node: target.clone(),
            slot,
        })?;
        match port.link.clone() {
            Some(link) => self.disconnect(&link).map(Some),
            None => Ok(None),
        }
    }

    fn detach(&mut self, id: &LinkId) -> Option<Link> {
        let link = self.links.remove(id)?;
        self.link_order.retain(|l| l != id);
        if let Some(target) = self.nodes.get_mut(&link.target) {
            // the port may already point at a newer link
            if target.input(link.slot).and_then(|p| p.link.as_ref()) == Some(id) {
                let _ = target.clear_input_link(link.slot);
            }
        }
        Some(link)
    }

    /// True when following links forward from `from` arrives at `to` (or `from == to`).
    pub fn reaches(&self, from: &NodeId, to: &NodeId) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![from.clone()];
        while let Some(current) = stack.pop() {
            if &current == to {
                return true;
            }
            if seen.insert(current.clone()) {
                stack.extend(self.downstream(&current));
            }
        }
        false
    }

    // ------------------------------------------------------------------
    // Source mutators
    // ------------------------------------------------------------------

    /// Edits a literal's text and refreshes everything it feeds.
    pub fn set_literal(&mut self, id: &NodeId, text: impl Into<String>) -> Result<()> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| GraphError::UnknownNode(id.clone()))?
            .set_text(text)?;
        self.kick(id);
        Ok(())
    }

    /// Reads the image at `path` into a source node and refreshes everything it feeds.
    /// On a read failure the node keeps its previous image.
    pub fn load_image(&mut self, id: &NodeId, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if !self.nodes.contains_key(id) {
            return Err(GraphError::UnknownNode(id.clone()));
        }
        let raster = codec::decode_file(path)?;
        log::info!(
            "Loaded {} ({}x{}) into {}",
            path.display(),
            raster.width(),
            raster.height(),
            id
        );
        self.set_source(id, Some(path.to_path_buf()), Some(raster))
    }

    /// Puts an in-memory raster into a source node, with no backing file.
    pub fn set_image(&mut self, id: &NodeId, raster: Raster) -> Result<()> {
        self.set_source(id, None, Some(raster))
    }

    fn set_source(
        &mut self,
        id: &NodeId,
        path: Option<std::path::PathBuf>,
        raster: Option<Raster>,
    ) -> Result<()> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| GraphError::UnknownNode(id.clone()))?
            .set_image(path, raster)?;
        self.kick(id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------

    /// Pulls the current value of `id`.
    pub fn evaluate(&self, id: &NodeId) -> Value {
        Evaluator::new(self).evaluate(id)
    }

    pub fn is_resolvable(&self, id: &NodeId) -> bool {
        Evaluator::new(self).is_resolvable(id)
    }

    /// Refreshes `id` and everything downstream of it; returns how many nodes were refreshed.
    pub fn kick(&mut self, id: &NodeId) -> usize {
        Propagator::kick(self, id)
    }

    /// Refreshes every node.
    pub fn refresh_all(&mut self) -> usize {
        Propagator::refresh_all(self)
    }

    pub fn validate(&self) -> ValidationResult {
        validation::validate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::ValueKind;

    fn image_chain() -> (Graph, NodeId, NodeId, NodeId) {
        let mut g = Graph::new();
        let src = g.add_node(NodeKind::ImageSource);
        let invert = g.add_node(NodeKind::Invert);
        let sink = g.add_node(NodeKind::Sink);
        g.connect(&src, &invert, PortSlot::First).unwrap();
        g.connect(&invert, &sink, PortSlot::First).unwrap();
        (g, src, invert, sink)
    }

    #[test]
    fn test_connect_checks_kinds() {
        let mut g = Graph::new();
        let int = g.add_node(NodeKind::Int);
        let bright = g.add_node(NodeKind::Brightness);

        let err = g.connect(&int, &bright, PortSlot::Second).unwrap_err();
        assert!(matches!(
            err,
            GraphError::TypeMismatch {
                expected: ValueKind::Float,
                found: ValueKind::Int
            }
        ));
        assert_eq!(g.link_count(), 0);
    }

    #[test]
    fn test_connect_rejects_unknown_port_and_sink_source() {
        let mut g = Graph::new();
        let img = g.add_node(NodeKind::ImageSource);
        let grey = g.add_node(NodeKind::Grey);
        let sink = g.add_node(NodeKind::Sink);

        assert!(matches!(
            g.connect(&img, &grey, PortSlot::Second),
            Err(GraphError::UnknownPort { .. })
        ));
        assert!(matches!(
            g.connect(&sink, &grey, PortSlot::First),
            Err(GraphError::NoOutput(_))
        ));
        assert!(matches!(
            g.connect(&img, &NodeId::from("ghost"), PortSlot::First),
            Err(GraphError::UnknownNode(_))
        ));
    }

    #[test]
    fn test_connect_replaces_existing_link() {
        let mut g = Graph::new();
        let a = g.add_node(NodeKind::Float);
        let b = g.add_node(NodeKind::Float);
        let rot = g.add_node(NodeKind::Rotate);

        let first = g.connect(&a, &rot, PortSlot::Second).unwrap();
        let second = g.connect(&b, &rot, PortSlot::Second).unwrap();

        assert!(g.link(&first).is_none());
        assert_eq!(g.link_count(), 1);
        assert_eq!(g.upstream(&rot, PortSlot::Second), Some(&b));
        assert_eq!(
            g.node(&rot).unwrap().input(PortSlot::Second).unwrap().link,
            Some(second)
        );
        assert!(g.downstream(&a).is_empty());
    }

    #[test]
    fn test_connect_rejects_cycles() {
        let mut g = Graph::new();
        let a = g.add_node(NodeKind::Sepia);
        let b = g.add_node(NodeKind::Grey);
        g.connect(&a, &b, PortSlot::First).unwrap();

        assert!(matches!(
            g.connect(&b, &a, PortSlot::First),
            Err(GraphError::CycleDetected { .. })
        ));
        assert!(matches!(
            g.connect(&a, &a, PortSlot::First),
            Err(GraphError::CycleDetected { .. })
        ));
        assert_eq!(g.link_count(), 1);
    }

    #[test]
    fn test_remove_node_drops_touching_links() {
        let (mut g, _src, invert, sink) = image_chain();
        g.remove_node(&invert).unwrap();

        assert_eq!(g.link_count(), 0);
        assert_eq!(g.node_count(), 2);
        assert!(!g.node(&sink).unwrap().inputs()[0].is_linked());
        assert!(g.links().all(|l| g.contains(&l.source) && g.contains(&l.target)));
        assert!(matches!(
            g.remove_node(&invert),
            Err(GraphError::UnknownNode(_))
        ));
    }

    #[test]
    fn test_disconnect_and_clear_input() {
        let (mut g, src, invert, sink) = image_chain();
        let link = g.node(&invert).unwrap().inputs()[0].link.clone().unwrap();
        let removed = g.disconnect(&link).unwrap();
        assert_eq!(removed.source, src);
        assert!(g.disconnect(&link).is_err());

        let cleared = g.clear_input(&sink, PortSlot::First).unwrap();
        assert_eq!(cleared.map(|l| l.source), Some(invert.clone()));
        assert_eq!(g.clear_input(&sink, PortSlot::First).unwrap(), None);
        assert_eq!(g.link_count(), 0);
    }

    #[test]
    fn test_nodes_keep_insertion_order() {
        let mut g = Graph::new();
        let ids: Vec<NodeId> = [NodeKind::Int, NodeKind::Sepia, NodeKind::Sink]
            .into_iter()
            .map(|k| g.add_node(k))
            .collect();
        let listed: Vec<NodeId> = g.nodes().map(|n| n.id().clone()).collect();
        assert_eq!(listed, ids);
    }

    #[test]
    fn test_add_node_rejects_duplicate_ids() {
        let mut g = Graph::new();
        g.insert_node(Node::new(NodeKind::Int).with_id("n1")).unwrap();
        assert!(matches!(
            g.insert_node(Node::new(NodeKind::Float).with_id("n1")),
            Err(GraphError::DuplicateId(_))
        ));
    }

    #[test]
    fn test_set_literal_on_wrong_kind() {
        let mut g = Graph::new();
        let grey = g.add_node(NodeKind::Grey);
        assert!(matches!(
            g.set_literal(&grey, "3"),
            Err(GraphError::WrongKind(..))
        ));
    }

    #[test]
    fn test_load_image_failure_keeps_previous_image() {
        let mut g = Graph::new();
        let src = g.add_node(NodeKind::ImageSource);
        g.set_image(&src, Raster::filled(2, 2, [1, 2, 3])).unwrap();

        assert!(g.load_image(&src, "/definitely/not/here.png").is_err());
        assert!(g.evaluate(&src).as_image().is_some());
    }
}
