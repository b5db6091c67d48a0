use crate::core::node::NodeId;
use crate::core::port::PortSlot;
use crate::core::value::ValueKind;
use thiserror::Error;

/// Structural failures: bad wiring, bad documents, failed I/O.
///
/// An input that merely cannot be computed right now is not an error; it evaluates to
/// [`crate::Value::Absent`].
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("Unknown link: {0}")]
    UnknownLink(String),

    #[error("Node {node} has no input port {slot}")]
    UnknownPort { node: NodeId, slot: PortSlot },

    #[error("Node {0} has no output port")]
    NoOutput(NodeId),

    #[error("Type mismatch: port expects {expected}, source produces {found}")]
    TypeMismatch { expected: ValueKind, found: ValueKind },

    #[error("Linking {source_node} -> {target} would create a cycle")]
    CycleDetected { source_node: NodeId, target: NodeId },

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Node {0} is not a {1}")]
    WrongKind(NodeId, &'static str),

    #[error("Invalid graph document: {0}")]
    InvalidDocument(String),

    #[error("Sink {0} has no image to export")]
    NothingToExport(NodeId),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, GraphError>;
