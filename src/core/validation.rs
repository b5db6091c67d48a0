//! Static checks over a graph, run before export or on demand by a UI.

use crate::core::graph::Graph;
use crate::core::node::{Node, NodeKind, Operator};
use crate::core::value::{Value, ValueKind};

/// Represents an issue found while checking a graph.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    /// The graph cannot produce an image at this node: an output lacks its input, a literal
    /// does not parse, or a transform rejects its parameters.
    Error(String),
    /// Something is unfinished but harmless, e.g. a dangling transform input.
    Warning(String),
}

/// The result of a validation pass.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.issues.push(ValidationIssue::Error(msg.into()));
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.issues.push(ValidationIssue::Warning(msg.into()));
    }

    pub fn is_safe(&self) -> bool {
        !self.issues.iter().any(|i| matches!(i, ValidationIssue::Error(_)))
    }

    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| matches!(i, ValidationIssue::Warning(_)))
    }

    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.issues.iter().filter_map(|i| match i {
            ValidationIssue::Error(msg) => Some(msg.as_str()),
            ValidationIssue::Warning(_) => None,
        })
    }

    pub fn log_summary(&self) {
        if self.is_safe() && !self.has_warnings() {
            log::info!("Graph validation passed");
            return;
        }

        for issue in &self.issues {
            match issue {
                ValidationIssue::Error(msg) => log::error!("{}", msg),
                ValidationIssue::Warning(msg) => log::warn!("{}", msg),
            }
        }
    }
}

/// Walks every node of `graph` in insertion order.
pub fn validate(graph: &Graph) -> ValidationResult {
    let mut result = ValidationResult::new();

    for node in graph.nodes() {
        check_literal(node, &mut result);

        if let Operator::ImageSource(src) = node.operator() {
            if src.raster.is_none() {
                result.add_warning(format!("Image source {} has no image loaded", node.id()));
            }
            continue;
        }

        let mut all_inputs_ready = true;
        for port in node.inputs() {
            let ready = match graph.upstream(node.id(), port.slot) {
                Some(source) => graph.is_resolvable(source),
                None => {
                    let msg = format!(
                        "{} {} has nothing linked to input {}",
                        node.kind().title(),
                        node.id(),
                        port.slot
                    );
                    if node.kind() == NodeKind::Sink {
                        result.add_error(msg);
                    } else {
                        result.add_warning(msg);
                    }
                    false
                }
            };
            all_inputs_ready &= ready;
        }

        if all_inputs_ready && !node.inputs().is_empty() && !graph.is_resolvable(node.id()) {
            result.add_error(format!(
                "{} {} rejects its parameters",
                node.kind().title(),
                node.id()
            ));
        }
    }

    result
}

fn check_literal(node: &Node, result: &mut ValidationResult) {
    let parsed = match node.operator() {
        Operator::IntLiteral(text) => Value::parse_literal(ValueKind::Int, text),
        Operator::FloatLiteral(text) => Value::parse_literal(ValueKind::Float, text),
        _ => return,
    };
    if parsed.is_absent() {
        result.add_error(format!(
            "{} {} holds unparseable text {:?}",
            node.kind().title(),
            node.id(),
            node.literal_text().unwrap_or_default()
        ));
    }
}
