use crate::core::node::NodeId;
use crate::core::port::PortSlot;
use crate::core::value::ValueKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a link, unique within a graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(String);

impl LinkId {
    /// A fresh random id.
    pub fn generate() -> Self {
        LinkId(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LinkId {
    fn from(id: &str) -> Self {
        LinkId(id.to_string())
    }
}

impl From<String> for LinkId {
    fn from(id: String) -> Self {
        LinkId(id)
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Layout of the two anchors a link is drawn between. Only the UI reads these; the
/// engine stores and persists them untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Anchors {
    pub input: [f64; 2],
    pub output: [f64; 2],
}

/// A directed edge from `source`'s output to input `slot` of `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub id: LinkId,
    pub source: NodeId,
    pub target: NodeId,
    pub slot: PortSlot,
    /// Copied from the target port when the link was made.
    pub kind: ValueKind,
    pub anchors: Anchors,
}

impl Link {
    pub fn new(source: NodeId, target: NodeId, slot: PortSlot, kind: ValueKind) -> Self {
        Self {
            id: LinkId::generate(),
            source,
            target,
            slot,
            kind,
            anchors: Anchors::default(),
        }
    }

    /// Replaces the generated id, used when restoring a saved graph.
    pub fn with_id(mut self, id: LinkId) -> Self {
        self.id = id;
        self
    }

    pub fn with_anchors(mut self, anchors: Anchors) -> Self {
        self.anchors = anchors;
        self
    }

    /// True when either endpoint is `node`.
    pub fn touches(&self, node: &NodeId) -> bool {
        &self.source == node || &self.target == node
    }
}
