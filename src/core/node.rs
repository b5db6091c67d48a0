//! Node kinds, their parameter payloads and the node record the graph owns.

use crate::core::error::{GraphError, Result};
use crate::core::link::LinkId;
use crate::core::port::{InputPort, PortSlot};
use crate::core::signature::Signature;
use crate::core::value::{Value, ValueKind};
use crate::imaging::Raster;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Stable identifier of a node, unique within a graph and kept across save/load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// A fresh random id.
    pub fn generate() -> Self {
        NodeId(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        NodeId(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        NodeId(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The closed set of node kinds. The serialized names are the ones graph files use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    #[serde(rename = "INT")]
    Int,
    #[serde(rename = "FLOAT")]
    Float,
    #[serde(rename = "STRING")]
    Text,
    #[serde(rename = "IMAGE")]
    ImageSource,
    #[serde(rename = "SEPIA")]
    Sepia,
    #[serde(rename = "GREY")]
    Grey,
    #[serde(rename = "INVERT")]
    Invert,
    #[serde(rename = "BRIGHT")]
    Brightness,
    #[serde(rename = "GAUSSIAN")]
    GaussianBlur,
    #[serde(rename = "SCALE_PIXEL")]
    ScalePixel,
    #[serde(rename = "SCALE")]
    ScalePercent,
    #[serde(rename = "MOVE_PIXEL")]
    MovePixel,
    #[serde(rename = "MOVE")]
    MovePercent,
    #[serde(rename = "ROTATE")]
    Rotate,
    #[serde(rename = "ADD_TEXT_PIXEL")]
    AddTextPixel,
    #[serde(rename = "ADD_TEXT")]
    AddTextPercent,
    #[serde(rename = "END_NODE")]
    Sink,
}

impl NodeKind {
    pub const ALL: [NodeKind; 17] = [
        NodeKind::Int,
        NodeKind::Float,
        NodeKind::Text,
        NodeKind::ImageSource,
        NodeKind::Sepia,
        NodeKind::Grey,
        NodeKind::Invert,
        NodeKind::Brightness,
        NodeKind::GaussianBlur,
        NodeKind::ScalePixel,
        NodeKind::ScalePercent,
        NodeKind::MovePixel,
        NodeKind::MovePercent,
        NodeKind::Rotate,
        NodeKind::AddTextPixel,
        NodeKind::AddTextPercent,
        NodeKind::Sink,
    ];

    /// Title shown on the node.
    pub fn title(self) -> &'static str {
        match self {
            NodeKind::Int => "Int",
            NodeKind::Float => "Float",
            NodeKind::Text => "String",
            NodeKind::ImageSource => "Image",
            NodeKind::Sepia => "Sepia",
            NodeKind::Grey => "Grey",
            NodeKind::Invert => "Invert",
            NodeKind::Brightness => "Bright",
            NodeKind::GaussianBlur => "Gaussian",
            NodeKind::ScalePixel => "Scale Pixel",
            NodeKind::ScalePercent => "Scale",
            NodeKind::MovePixel | NodeKind::MovePercent => "Move",
            NodeKind::Rotate => "Rotate",
            NodeKind::AddTextPixel | NodeKind::AddTextPercent => "Add Text",
            NodeKind::Sink => "Output",
        }
    }

    /// The fixed port contract of this kind.
    pub fn signature(self) -> Signature {
        use ValueKind::{Float, Image, Int, Text};

        let transform = Signature::new().input("Image", Image);
        match self {
            NodeKind::Int => Signature::new().output(Int),
            NodeKind::Float => Signature::new().output(Float),
            NodeKind::Text => Signature::new().output(Text),
            NodeKind::ImageSource => Signature::new().output(Image),
            NodeKind::Sepia | NodeKind::Grey | NodeKind::Invert => transform.output(Image),
            NodeKind::Brightness | NodeKind::Rotate => {
                transform.input("Float", Float).output(Image)
            }
            NodeKind::GaussianBlur => transform.input("Int", Int).output(Image),
            NodeKind::ScalePixel | NodeKind::MovePixel => transform
                .input("int x", Int)
                .input("int y", Int)
                .output(Image),
            NodeKind::ScalePercent | NodeKind::MovePercent => transform
                .input("float x", Float)
                .input("float y", Float)
                .output(Image),
            NodeKind::AddTextPixel => transform
                .input("int x", Int)
                .input("int y", Int)
                .input("String", Text)
                .input("Scale", Float)
                .output(Image),
            NodeKind::AddTextPercent => transform
                .input("float x", Float)
                .input("float y", Float)
                .input("String", Text)
                .input("Scale", Float)
                .output(Image),
            NodeKind::Sink => transform,
        }
    }

    /// True for the kinds whose own state can change (and so start a kick).
    pub fn is_source(self) -> bool {
        matches!(
            self,
            NodeKind::Int | NodeKind::Float | NodeKind::Text | NodeKind::ImageSource
        )
    }

    /// True for the kinds edited as text.
    pub fn is_literal(self) -> bool {
        matches!(self, NodeKind::Int | NodeKind::Float | NodeKind::Text)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A loaded (or not yet loaded) image file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageSource {
    pub path: Option<PathBuf>,
    pub raster: Option<Raster>,
}

/// Per-kind behaviour and parameter payload. Evaluation dispatches on this tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    IntLiteral(String),
    FloatLiteral(String),
    TextLiteral(String),
    ImageSource(ImageSource),
    Sepia,
    Grey,
    Invert,
    Brightness,
    GaussianBlur,
    ScalePixel,
    ScalePercent,
    MovePixel,
    MovePercent,
    Rotate,
    AddTextPixel,
    AddTextPercent,
    Sink,
}

impl Operator {
    /// The operator a fresh node of `kind` starts with.
    pub fn for_kind(kind: NodeKind) -> Operator {
        match kind {
            NodeKind::Int => Operator::IntLiteral("0".to_string()),
            NodeKind::Float => Operator::FloatLiteral("0.0".to_string()),
            NodeKind::Text => Operator::TextLiteral(String::new()),
            NodeKind::ImageSource => Operator::ImageSource(ImageSource::default()),
            NodeKind::Sepia => Operator::Sepia,
            NodeKind::Grey => Operator::Grey,
            NodeKind::Invert => Operator::Invert,
            NodeKind::Brightness => Operator::Brightness,
            NodeKind::GaussianBlur => Operator::GaussianBlur,
            NodeKind::ScalePixel => Operator::ScalePixel,
            NodeKind::ScalePercent => Operator::ScalePercent,
            NodeKind::MovePixel => Operator::MovePixel,
            NodeKind::MovePercent => Operator::MovePercent,
            NodeKind::Rotate => Operator::Rotate,
            NodeKind::AddTextPixel => Operator::AddTextPixel,
            NodeKind::AddTextPercent => Operator::AddTextPercent,
            NodeKind::Sink => Operator::Sink,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Operator::IntLiteral(_) => NodeKind::Int,
            Operator::FloatLiteral(_) => NodeKind::Float,
            Operator::TextLiteral(_) => NodeKind::Text,
            Operator::ImageSource(_) => NodeKind::ImageSource,
            Operator::Sepia => NodeKind::Sepia,
            Operator::Grey => NodeKind::Grey,
            Operator::Invert => NodeKind::Invert,
            Operator::Brightness => NodeKind::Brightness,
            Operator::GaussianBlur => NodeKind::GaussianBlur,
            Operator::ScalePixel => NodeKind::ScalePixel,
            Operator::ScalePercent => NodeKind::ScalePercent,
            Operator::MovePixel => NodeKind::MovePixel,
            Operator::MovePercent => NodeKind::MovePercent,
            Operator::Rotate => NodeKind::Rotate,
            Operator::AddTextPixel => NodeKind::AddTextPixel,
            Operator::AddTextPercent => NodeKind::AddTextPercent,
            Operator::Sink => NodeKind::Sink,
        }
    }
}

/// A computation unit in the graph.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    operator: Operator,
    position: [f64; 2],
    inputs: Vec<InputPort>,
    displayed: Value,
}

impl Node {
    /// Creates a node of `kind` with a fresh id, default parameters and unlinked inputs.
    pub fn new(kind: NodeKind) -> Self {
        let inputs = kind
            .signature()
            .inputs
            .iter()
            .zip(PortSlot::ALL)
            .map(|(field, slot)| InputPort::new(slot, field.kind))
            .collect();
        Node {
            id: NodeId::generate(),
            operator: Operator::for_kind(kind),
            position: [0.0, 0.0],
            inputs,
            displayed: Value::Absent,
        }
    }

    /// Replaces the generated id.
    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = [x, y];
        self
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.operator.kind()
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn position(&self) -> [f64; 2] {
        self.position
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.position = [x, y];
    }

    pub fn inputs(&self) -> &[InputPort] {
        &self.inputs
    }

    pub fn input(&self, slot: PortSlot) -> Option<&InputPort> {
        self.inputs.get(slot.index())
    }

    /// Declared input kinds, in slot order.
    pub fn input_kinds(&self) -> Vec<ValueKind> {
        self.inputs.iter().map(|p| p.kind).collect()
    }

    pub fn output_kind(&self) -> Option<ValueKind> {
        self.kind().signature().output
    }

    /// The value the last refresh computed for this node.
    pub fn displayed(&self) -> &Value {
        &self.displayed
    }

    /// The text of a literal node.
    pub fn literal_text(&self) -> Option<&str> {
        match &self.operator {
            Operator::IntLiteral(t) | Operator::FloatLiteral(t) | Operator::TextLiteral(t) => {
                Some(t)
            }
            _ => None,
        }
    }

    /// The file an image source node was loaded from.
    pub fn source_path(&self) -> Option<&Path> {
        match &self.operator {
            Operator::ImageSource(src) => src.path.as_deref(),
            _ => None,
        }
    }

    /// The kind-specific payload as persisted: literal text, or an image source path.
    pub fn data(&self) -> Option<String> {
        match &self.operator {
            Operator::ImageSource(src) => src
                .path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
            _ => self.literal_text().map(str::to_string),
        }
    }

    pub(crate) fn set_text(&mut self, text: impl Into<String>) -> Result<()> {
        match &mut self.operator {
            Operator::IntLiteral(t) | Operator::FloatLiteral(t) | Operator::TextLiteral(t) => {
                *t = text.into();
                Ok(())
            }
            _ => Err(GraphError::WrongKind(self.id.clone(), "literal")),
        }
    }

    pub(crate) fn set_image(&mut self, path: Option<PathBuf>, raster: Option<Raster>) -> Result<()> {
        match &mut self.operator {
            Operator::ImageSource(src) => {
                src.path = path;
                src.raster = raster;
                Ok(())
            }
            _ => Err(GraphError::WrongKind(self.id.clone(), "image source")),
        }
    }

    /// Points input `slot` at `link`, returning the link it previously held.
    pub(crate) fn set_input_link(&mut self, slot: PortSlot, link: LinkId) -> Result<Option<LinkId>> {
        let port = self.port_mut(slot)?;
        Ok(port.link.replace(link))
    }

    /// Detaches input `slot`, returning the link it held.
    pub(crate) fn clear_input_link(&mut self, slot: PortSlot) -> Result<Option<LinkId>> {
        let port = self.port_mut(slot)?;
        Ok(port.link.take())
    }

    pub(crate) fn set_displayed(&mut self, value: Value) {
        self.displayed = value;
    }

    fn port_mut(&mut self, slot: PortSlot) -> Result<&mut InputPort> {
        let id = self.id.clone();
        self.inputs
            .get_mut(slot.index())
            .ok_or(GraphError::UnknownPort { node: id, slot })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ports_follow_signature() {
        let node = Node::new(NodeKind::AddTextPixel);
        assert_eq!(
            node.input_kinds(),
            vec![
                ValueKind::Image,
                ValueKind::Int,
                ValueKind::Int,
                ValueKind::Text,
                ValueKind::Float
            ]
        );
        let slots: Vec<PortSlot> = node.inputs().iter().map(|p| p.slot).collect();
        assert_eq!(slots, PortSlot::ALL.to_vec());
        assert_eq!(node.output_kind(), Some(ValueKind::Image));
    }

    #[test]
    fn test_every_transform_takes_an_image_first() {
        for kind in NodeKind::ALL {
            let sig = kind.signature();
            if kind.is_source() {
                assert!(sig.inputs.is_empty());
                assert!(sig.output.is_some());
            } else {
                assert_eq!(sig.inputs[0].kind, ValueKind::Image, "{:?}", kind);
                assert!(sig.inputs.len() <= 5);
            }
        }
        assert_eq!(NodeKind::Sink.signature().output, None);
    }

    #[test]
    fn test_literal_defaults() {
        assert_eq!(Node::new(NodeKind::Int).literal_text(), Some("0"));
        assert_eq!(Node::new(NodeKind::Float).literal_text(), Some("0.0"));
        assert_eq!(Node::new(NodeKind::Text).literal_text(), Some(""));
        assert_eq!(Node::new(NodeKind::Sepia).literal_text(), None);
    }

    #[test]
    fn test_set_text_only_on_literals() {
        let mut lit = Node::new(NodeKind::Float);
        lit.set_text("2.5").unwrap();
        assert_eq!(lit.data(), Some("2.5".to_string()));

        let mut grey = Node::new(NodeKind::Grey);
        assert!(matches!(grey.set_text("x"), Err(GraphError::WrongKind(..))));
    }

    #[test]
    fn test_input_link_replace_and_clear() {
        let mut node = Node::new(NodeKind::Brightness);
        assert_eq!(node.set_input_link(PortSlot::Second, "a".into()).unwrap(), None);
        assert_eq!(
            node.set_input_link(PortSlot::Second, "b".into()).unwrap(),
            Some(LinkId::from("a"))
        );
        assert_eq!(
            node.clear_input_link(PortSlot::Second).unwrap(),
            Some(LinkId::from("b"))
        );
        assert!(matches!(
            node.set_input_link(PortSlot::Third, "c".into()),
            Err(GraphError::UnknownPort { .. })
        ));
    }

    #[test]
    fn test_kind_names_serialize_like_graph_files() {
        assert_eq!(
            serde_json::to_string(&NodeKind::ScalePercent).unwrap(),
            "\"SCALE\""
        );
        let kind: NodeKind = serde_json::from_str("\"END_NODE\"").unwrap();
        assert_eq!(kind, NodeKind::Sink);
        assert!(serde_json::from_str::<NodeKind>("\"BLUR\"").is_err());
    }
}
