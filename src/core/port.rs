//! Input port slots and bindings.

use crate::core::link::LinkId;
use crate::core::value::ValueKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Anchor name every node's single output is persisted under.
pub const OUTPUT_ANCHOR: &str = "outputLink";

/// One of the (at most five) input positions on a node. A node uses a prefix of these,
/// in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PortSlot {
    #[serde(rename = "firstLink")]
    First,
    #[serde(rename = "secondLink")]
    Second,
    #[serde(rename = "thirdLink")]
    Third,
    #[serde(rename = "fourthLink")]
    Fourth,
    #[serde(rename = "fifthLink")]
    Fifth,
}

impl PortSlot {
    pub const ALL: [PortSlot; 5] = [
        PortSlot::First,
        PortSlot::Second,
        PortSlot::Third,
        PortSlot::Fourth,
        PortSlot::Fifth,
    ];

    /// Zero-based position of the slot.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<PortSlot> {
        Self::ALL.get(index).copied()
    }

    /// The persisted anchor name, e.g. `firstLink`.
    pub fn anchor(self) -> &'static str {
        match self {
            PortSlot::First => "firstLink",
            PortSlot::Second => "secondLink",
            PortSlot::Third => "thirdLink",
            PortSlot::Fourth => "fourthLink",
            PortSlot::Fifth => "fifthLink",
        }
    }
}

impl fmt::Display for PortSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.anchor())
    }
}

impl FromStr for PortSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|slot| slot.anchor() == s)
            .ok_or_else(|| format!("'{}' is not an input anchor", s))
    }
}

/// A declared input on a node together with the link currently feeding it.
#[derive(Debug, Clone, PartialEq)]
pub struct InputPort {
    pub slot: PortSlot,
    pub kind: ValueKind,
    pub link: Option<LinkId>,
}

impl InputPort {
    pub fn new(slot: PortSlot, kind: ValueKind) -> Self {
        Self {
            slot,
            kind,
            link: None,
        }
    }

    pub fn is_linked(&self) -> bool {
        self.link.is_some()
    }
}
