use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Storage type code attached to every wire column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WireType {
    /// `N` — decimal text, width recovered on decode.
    Numeric,
    /// `S` — opaque text.
    #[default]
    Text,
}

impl WireType {
    /// Single-letter code used in tags and on the wire.
    pub fn code(self) -> &'static str {
        match self {
            WireType::Numeric => "N",
            WireType::Text => "S",
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One typed column value.
///
/// Serializes to the store's low-level JSON shape: `{"N": "42"}` or
/// `{"S": "abc"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeValue {
    #[serde(rename = "N")]
    Numeric(String),
    #[serde(rename = "S")]
    Text(String),
}

impl AttributeValue {
    pub fn new(wire_type: WireType, text: impl Into<String>) -> Self {
        match wire_type {
            WireType::Numeric => AttributeValue::Numeric(text.into()),
            WireType::Text => AttributeValue::Text(text.into()),
        }
    }

    pub fn wire_type(&self) -> WireType {
        match self {
            AttributeValue::Numeric(_) => WireType::Numeric,
            AttributeValue::Text(_) => WireType::Text,
        }
    }

    /// Raw payload text regardless of variant.
    pub fn as_str(&self) -> &str {
        match self {
            AttributeValue::Numeric(s) | AttributeValue::Text(s) => s,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            AttributeValue::Numeric(s) | AttributeValue::Text(s) => s,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.wire_type(), self.as_str())
    }
}

/// Full set of wire columns for one row. Order carries no meaning.
pub type AttributeMap = HashMap<String, AttributeValue>;
