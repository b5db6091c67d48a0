//! An editing session: one graph plus the file actions of an editor window.

use crate::core::config::GraphConfig;
use crate::core::error::{GraphError, Result};
use crate::core::graph::Graph;
use crate::core::node::{Node, NodeId, NodeKind};
use crate::core::observer::{GraphObserver, NullObserver};
use crate::imaging::codec;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Owns the graph being edited and the settings it is edited with.
#[derive(Debug)]
pub struct Session {
    graph: Graph,
    config: GraphConfig,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}

impl Session {
    /// Starts with a single output node at the configured sink position.
    pub fn new(config: GraphConfig) -> Self {
        Self::with_observer(config, NullObserver)
    }

    pub fn with_observer(config: GraphConfig, observer: impl GraphObserver + 'static) -> Self {
        let mut session = Self {
            graph: Graph::with_observer(observer),
            config,
        };
        session.place_sink();
        session
    }

    fn place_sink(&mut self) -> NodeId {
        let [x, y] = self.config.sink_position;
        let sink = Node::new(NodeKind::Sink).at(x, y);
        let id = sink.id().clone();
        self.graph.insert(sink);
        self.graph.kick(&id);
        id
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Adds a node of `kind` at the spawn offset.
    pub fn spawn(&mut self, kind: NodeKind) -> NodeId {
        let [x, y] = self.config.spawn_offset;
        let node = Node::new(kind).at(x, y);
        let id = node.id().clone();
        self.graph.insert(node);
        self.graph.kick(&id);
        log::debug!("Spawned {} ({}) at {}, {}", id, kind, x, y);
        id
    }

    /// Output nodes, in insertion order.
    pub fn sinks(&self) -> Vec<NodeId> {
        self.graph
            .nodes()
            .filter(|n| n.kind() == NodeKind::Sink)
            .map(|n| n.id().clone())
            .collect()
    }

    /// Discards the graph and starts over with a lone output node.
    pub fn reset(&mut self) -> NodeId {
        self.graph.clear();
        self.place_sink()
    }

    /// Replaces the graph with the one saved at `path`. The current graph survives a
    /// failed open.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.graph.open(path, &self.config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.graph.save(path)
    }

    /// Writes the image currently reaching `sink` to `path`; the format follows the
    /// file extension.
    pub fn export_image(&self, sink: &NodeId, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let node = self
            .graph
            .node(sink)
            .ok_or_else(|| GraphError::UnknownNode(sink.clone()))?;
        if node.kind() != NodeKind::Sink {
            return Err(GraphError::WrongKind(sink.clone(), "sink"));
        }
        let value = self.graph.evaluate(sink);
        let image = value
            .as_image()
            .ok_or_else(|| GraphError::NothingToExport(sink.clone()))?;
        codec::encode_file(image, path)?;
        log::info!(
            "Exported {}x{} image from {} to {}",
            image.width(),
            image.height(),
            sink,
            path.display()
        );
        Ok(())
    }
}

/// A session shared between threads. Every call runs under one lock, so graph edits,
/// pulls and kicks never interleave.
#[derive(Clone, Debug)]
pub struct SharedSession {
    inner: Arc<Mutex<Session>>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Runs `f` with exclusive access to the session.
    pub fn with<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        f(&mut self.lock())
    }

    /// Locks the session. A panic in an earlier holder does not poison later callers.
    pub fn lock(&self) -> MutexGuard<'_, Session> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<Session> for SharedSession {
    fn from(session: Session) -> Self {
        Self::new(session)
    }
}
