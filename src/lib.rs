//! # Pixelgraph
//!
//! A typed dataflow graph engine for building image pipelines out of small nodes:
//! literals, an image source, a library of transforms, and an output node.
//!
//! ## Features
//!
//! - **Typed ports**: every link is checked against the kinds its endpoints declare
//! - **Pull evaluation**: a node's value is computed on demand from its upstream subgraph
//! - **Live refresh**: editing a literal or loading an image refreshes everything downstream
//! - **Acyclic by construction**: links that would close a cycle are refused
//! - **Plain JSON files**: graphs save and load as a small, stable document
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pixelgraph::prelude::*;
//!
//! let mut session = Session::default();
//! let sink = session.sinks()[0].clone();
//!
//! let image = session.spawn(NodeKind::ImageSource);
//! let sepia = session.spawn(NodeKind::Sepia);
//!
//! let graph = session.graph_mut();
//! graph.load_image(&image, "photo.png")?;
//! graph.connect(&image, &sepia, PortSlot::First)?;
//! graph.connect(&sepia, &sink, PortSlot::First)?;
//!
//! session.export_image(&sink, "photo_sepia.png")?;
//! # Ok::<(), pixelgraph::GraphError>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`imaging`]: Raster storage, file codec and the pixel primitives
//! - [`prelude`]: Commonly used types (import with `use pixelgraph::prelude::*`)

// ============================================================================
// Core Module
// ============================================================================

mod core;

pub mod imaging;

// ============================================================================
// Public Re-exports - Granular Imports
// ============================================================================

// Values and typing
pub use crate::core::signature::{Field, Signature};
pub use crate::core::value::{Value, ValueKind};

// Graph model
pub use crate::core::graph::Graph;
pub use crate::core::link::{Anchors, Link, LinkId};
pub use crate::core::node::{ImageSource, Node, NodeId, NodeKind, Operator};
pub use crate::core::port::{InputPort, PortSlot, OUTPUT_ANCHOR};

// Evaluation and refresh
pub use crate::core::eval::Evaluator;
pub use crate::core::observer::{GraphObserver, NullObserver, RecordingObserver, RefreshEvent};
pub use crate::core::propagate::Propagator;

// Checks, files and sessions
pub use crate::core::config::GraphConfig;
pub use crate::core::error::{GraphError, Result};
pub use crate::core::persist::{GraphDocument, LinkRecord, NodeRecord};
pub use crate::core::session::{Session, SharedSession};
pub use crate::core::validation::{validate, ValidationIssue, ValidationResult};

pub use crate::imaging::Raster;

// ============================================================================
// Prelude Module - Convenient Bulk Imports
// ============================================================================

/// The main prelude: the types needed to build, evaluate and save a graph.
///
/// # Example
/// ```rust
/// use pixelgraph::prelude::*;
/// ```
pub mod prelude {
    pub use super::{
        // Graph
        Graph,
        GraphConfig,
        GraphError,
        GraphObserver,
        LinkId,
        NodeId,
        NodeKind,
        PortSlot,
        Raster,
        RefreshEvent,
        // Sessions
        Session,
        SharedSession,
        ValidationResult,
        // Values
        Value,
        ValueKind,
    };
}

// ============================================================================
// Library Metadata
// ============================================================================

/// The version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of this crate.
pub const NAME: &str = env!("CARGO_PKG_NAME");
