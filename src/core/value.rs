use crate::imaging::Raster;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kinds of value a port can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Int,
    Float,
    Text,
    Image,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Text => "text",
            ValueKind::Image => "image",
        };
        f.write_str(name)
    }
}

/// A value flowing along a link.
///
/// `Absent` is what a node produces when any of its inputs cannot be resolved (or a
/// parameter is out of range). It never reaches a port as a declared kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Image(Raster),
    #[default]
    Absent,
}

impl Value {
    /// The kind of a present value, `None` for `Absent`.
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::Int(_) => Some(ValueKind::Int),
            Value::Float(_) => Some(ValueKind::Float),
            Value::Text(_) => Some(ValueKind::Text),
            Value::Image(_) => Some(ValueKind::Image),
            Value::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&Raster> {
        match self {
            Value::Image(v) => Some(v),
            _ => None,
        }
    }
}

impl Value {
    /// Reads a literal node's text as a value of `kind`. Floats must be finite, so `inf`,
    /// `NaN` and overflowing exponents are rejected. Images have no literal form.
    pub fn parse_literal(kind: ValueKind, text: &str) -> Value {
        match kind {
            ValueKind::Int => text.parse().map_or(Value::Absent, Value::Int),
            ValueKind::Float => match text.parse::<f64>() {
                Ok(v) if v.is_finite() => Value::Float(v),
                _ => Value::Absent,
            },
            ValueKind::Text => Value::Text(text.to_string()),
            ValueKind::Image => Value::Absent,
        }
    }
}

impl From<Option<Raster>> for Value {
    fn from(raster: Option<Raster>) -> Self {
        raster.map_or(Value::Absent, Value::Image)
    }
}
