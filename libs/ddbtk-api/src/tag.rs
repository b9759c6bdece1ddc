//! Field annotation grammar.
//!
//! A tag is `""`, `"-"`, `"<name>"` or `"<name>,<type>"`. Both parts are
//! trimmed. A name of `""` or `"-"` falls back to the declared field name,
//! a type of `""` falls back to `S`. Anything the grammar cannot express
//! excludes the field instead of failing, so encode and decode agree on
//! which fields exist.

use std::fmt;

use crate::attribute::WireType;

/// Why a field was left out of the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    /// Tag was `-` or empty.
    Ignored,
    /// More than one comma.
    TooManyParts(usize),
    /// Type part was neither `N`, `S` nor empty.
    UnknownTypeCode(String),
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exclusion::Ignored => f.write_str("ignored"),
            Exclusion::TooManyParts(n) => write!(f, "tag has {n} comma-separated parts, expected at most 2"),
            Exclusion::UnknownTypeCode(code) => write!(f, "unknown type code '{code}' (expected N or S)"),
        }
    }
}

/// Resolved decision for a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTag {
    Included { wire_name: String, wire_type: WireType },
    Excluded(Exclusion),
}

impl FieldTag {
    pub fn is_included(&self) -> bool {
        matches!(self, FieldTag::Included { .. })
    }

    /// `true` when the tag was rejected rather than deliberately ignored.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            FieldTag::Excluded(Exclusion::TooManyParts(_) | Exclusion::UnknownTypeCode(_))
        )
    }
}

/// Resolve the tag of the field declared as `declared`.
///
/// `tag = None` means the field carries no annotation at all.
pub fn parse_tag(declared: &str, tag: Option<&str>) -> FieldTag {
    let Some(tag) = tag else {
        return FieldTag::Included {
            wire_name: declared.to_string(),
            wire_type: WireType::Text,
        };
    };

    let parts: Vec<&str> = tag.split(',').collect();
    if parts.len() > 2 {
        return FieldTag::Excluded(Exclusion::TooManyParts(parts.len()));
    }

    let name = parts[0].trim();
    if parts.len() == 1 && (name.is_empty() || name == "-") {
        return FieldTag::Excluded(Exclusion::Ignored);
    }

    let wire_name = if name.is_empty() || name == "-" {
        declared.to_string()
    } else {
        name.to_string()
    };

    let wire_type = match parts.get(1).map(|p| p.trim()) {
        None | Some("") | Some("S") => WireType::Text,
        Some("N") => WireType::Numeric,
        Some(other) => return FieldTag::Excluded(Exclusion::UnknownTypeCode(other.to_string())),
    };

    FieldTag::Included { wire_name, wire_type }
}
