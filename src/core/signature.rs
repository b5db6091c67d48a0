use crate::core::value::ValueKind;

/// A single declared input: the label a UI shows next to the port and the kind it accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: String,
    pub kind: ValueKind,
}

impl Field {
    pub fn new(label: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            label: label.into(),
            kind,
        }
    }
}

/// The port contract of a node kind: ordered inputs and an optional single output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature {
    pub inputs: Vec<Field>,
    pub output: Option<ValueKind>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an input port.
    pub fn input(mut self, label: impl Into<String>, kind: ValueKind) -> Self {
        self.inputs.push(Field::new(label, kind));
        self
    }

    /// Set the output kind.
    pub fn output(mut self, kind: ValueKind) -> Self {
        self.output = Some(kind);
        self
    }

    pub fn input_kinds(&self) -> Vec<ValueKind> {
        self.inputs.iter().map(|f| f.kind).collect()
    }
}
