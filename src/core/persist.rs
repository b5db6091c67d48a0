//! The saved graph document.
//!
//! A document is a JSON object with a `nodes` array and a `links` array:
//!
//! ```json
//! {
//!   "nodes": [{ "id": "a", "type": "INT", "x": 0.0, "y": 0.0, "data": "3" }],
//!   "links": [{ "id": "l", "inputNode": "b", "outputNode": "a",
//!               "inputAnchor": "secondLink", "outputAnchor": "outputLink",
//!               "inputAnchorSize": [0.0, 0.0], "outputAnchorSize": [0.0, 0.0] }]
//! }
//! ```
//!
//! `inputNode` is the node whose port receives the value and `outputNode` the node that
//! produces it. Loading builds a complete graph off to the side and only swaps it in once
//! every node and link has been accepted, so a rejected document never touches the graph
//! being loaded into.

use crate::core::config::GraphConfig;
use crate::core::error::{GraphError, Result};
use crate::core::graph::Graph;
use crate::core::link::{Anchors, LinkId};
use crate::core::node::{Node, NodeId, NodeKind};
use crate::core::port::{PortSlot, OUTPUT_ANCHOR};
use crate::imaging::codec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<NodeRecord>,
    pub links: Vec<LinkRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    /// Literal text, or the path an image source was read from.
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    pub id: String,
    /// The consumer.
    pub input_node: String,
    /// The producer.
    pub output_node: String,
    pub input_anchor: String,
    pub output_anchor: String,
    #[serde(default)]
    pub input_anchor_size: [f64; 2],
    #[serde(default)]
    pub output_anchor_size: [f64; 2],
}

impl GraphDocument {
    /// Snapshots the nodes and links of `graph` in their current order.
    pub fn from_graph(graph: &Graph) -> Self {
        let nodes = graph
            .nodes()
            .map(|n| {
                let [x, y] = n.position();
                NodeRecord {
                    id: n.id().to_string(),
                    kind: n.kind(),
                    x,
                    y,
                    data: n.data(),
                }
            })
            .collect();
        let links = graph
            .links()
            .map(|l| LinkRecord {
                id: l.id.to_string(),
                input_node: l.target.to_string(),
                output_node: l.source.to_string(),
                input_anchor: l.slot.anchor().to_string(),
                output_anchor: OUTPUT_ANCHOR.to_string(),
                input_anchor_size: l.anchors.input,
                output_anchor_size: l.anchors.output,
            })
            .collect();
        Self { nodes, links }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a document. Unknown node kinds and missing arrays are rejected here.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Builds a fresh graph from the document.
    pub fn build(&self, config: &GraphConfig) -> Result<Graph> {
        let mut staged = Graph::new();

        for record in &self.nodes {
            let node = restore_node(record, config)?;
            if staged.contains(node.id()) {
                return Err(GraphError::DuplicateId(record.id.clone()));
            }
            staged.insert(node);
        }

        let mut link_ids = HashSet::new();
        for record in &self.links {
            if !link_ids.insert(record.id.as_str()) {
                return Err(GraphError::DuplicateId(record.id.clone()));
            }
            let source = known_node(&staged, &record.output_node, &record.id)?;
            let target = known_node(&staged, &record.input_node, &record.id)?;
            if record.output_anchor != OUTPUT_ANCHOR {
                return Err(GraphError::InvalidDocument(format!(
                    "link {} leaves from unknown anchor {:?}",
                    record.id, record.output_anchor
                )));
            }
            let slot: PortSlot = record
                .input_anchor
                .parse()
                .map_err(|e| GraphError::InvalidDocument(format!("link {}: {}", record.id, e)))?;

            let occupied = staged
                .node(&target)
                .and_then(|n| n.input(slot))
                .is_some_and(|p| p.is_linked());
            if occupied {
                return Err(GraphError::InvalidDocument(format!(
                    "link {}: input {} of {} is linked twice",
                    record.id, slot, target
                )));
            }

            let link = staged
                .check_link(&source, &target, slot)?
                .with_id(LinkId::from(record.id.as_str()))
                .with_anchors(Anchors {
                    input: record.input_anchor_size,
                    output: record.output_anchor_size,
                });
            staged.attach(link);
        }

        Ok(staged)
    }
}

fn known_node(graph: &Graph, id: &str, link: &str) -> Result<NodeId> {
    let id = NodeId::from(id);
    if graph.contains(&id) {
        Ok(id)
    } else {
        Err(GraphError::InvalidDocument(format!(
            "link {} references unknown node {}",
            link, id
        )))
    }
}

fn restore_node(record: &NodeRecord, config: &GraphConfig) -> Result<Node> {
    let mut node = Node::new(record.kind)
        .with_id(record.id.as_str())
        .at(record.x, record.y);

    match (record.kind, &record.data) {
        (NodeKind::ImageSource, Some(path)) => {
            let path = PathBuf::from(path);
            match codec::decode_file(&path) {
                Ok(raster) => node.set_image(Some(path), Some(raster))?,
                Err(e) if config.strict_image_paths => return Err(e.into()),
                Err(e) => {
                    log::warn!(
                        "Image source {} could not re-read {}: {}",
                        record.id,
                        path.display(),
                        e
                    );
                    node.set_image(Some(path), None)?;
                }
            }
        }
        (kind, Some(text)) if kind.is_literal() => node.set_text(text.as_str())?,
        _ => {}
    }
    Ok(node)
}

impl Graph {
    pub fn to_document(&self) -> GraphDocument {
        GraphDocument::from_graph(self)
    }

    /// Replaces this graph's contents with the document's, then refreshes every node.
    /// On failure the graph is left exactly as it was.
    pub fn load_document(&mut self, doc: &GraphDocument, config: &GraphConfig) -> Result<()> {
        let staged = doc.build(config)?;
        self.clear();
        self.replace_contents(staged);
        self.refresh_all();
        Ok(())
    }

    /// Writes the graph to `path` as a JSON document.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_document().to_json()?;
        fs::write(path, json)?;
        log::info!(
            "Saved {} nodes and {} links to {}",
            self.node_count(),
            self.link_count(),
            path.display()
        );
        Ok(())
    }

    /// Reads a JSON document from `path` and loads it.
    pub fn open(&mut self, path: impl AsRef<Path>, config: &GraphConfig) -> Result<()> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let doc = GraphDocument::from_json(&text)?;
        self.load_document(&doc, config)?;
        log::info!(
            "Loaded {} nodes and {} links from {}",
            self.node_count(),
            self.link_count(),
            path.display()
        );
        Ok(())
    }
}
