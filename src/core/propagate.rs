//! Change propagation.
//!
//! A kick re-evaluates the changed node and then walks its consumers depth first,
//! refreshing each node's displayed value and reporting it to the graph's observer. A node
//! reachable along several paths is refreshed once per kick.

use crate::core::graph::Graph;
use crate::core::node::NodeId;
use crate::core::observer::RefreshEvent;
use std::collections::HashSet;

pub struct Propagator;

impl Propagator {
    /// Refreshes `origin` and everything downstream of it. Returns the number of nodes
    /// refreshed; an unknown origin refreshes nothing.
    pub fn kick(graph: &mut Graph, origin: &NodeId) -> usize {
        if !graph.contains(origin) {
            log::warn!("Kick on unknown node {}", origin);
            return 0;
        }
        let mut visited = HashSet::new();
        Self::visit(graph, origin, 0, &mut visited);
        visited.len()
    }

    /// Refreshes every node once, in insertion order.
    pub fn refresh_all(graph: &mut Graph) -> usize {
        let ids: Vec<NodeId> = graph.nodes().map(|n| n.id().clone()).collect();
        for id in &ids {
            Self::refresh(graph, id, 0);
        }
        ids.len()
    }

    fn visit(graph: &mut Graph, id: &NodeId, depth: usize, visited: &mut HashSet<NodeId>) {
        if !visited.insert(id.clone()) {
            return;
        }
        Self::refresh(graph, id, depth);
        for next in graph.downstream(id) {
            Self::visit(graph, &next, depth + 1, visited);
        }
    }

    fn refresh(graph: &mut Graph, id: &NodeId, depth: usize) {
        let value = graph.evaluate(id);
        let resolved = value.kind();
        let Some(node) = graph.node_mut(id) else {
            return;
        };
        let kind = node.kind();
        node.set_displayed(value);
        log::trace!("Refreshed {} ({}) at depth {}", id, kind, depth);
        graph.observer().refreshed(RefreshEvent {
            node: id.clone(),
            kind,
            value: resolved,
            depth,
        });
    }
}
