//! Attribute value types and provenance.
//!
//! This module defines the runtime representation of attribute values, the
//! tag recording which data source last wrote a value, and the outcome of a
//! typed read.

use serde::Serialize;

/// The declared type of an attribute. Reads and writes must use it exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrType {
    String,
    Integer,
    Float,
}

impl std::fmt::Display for AttrType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AttrType::String => "string",
            AttrType::Integer => "int",
            AttrType::Float => "float",
        })
    }
}

/// Runtime representation of an attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl AttrValue {
    pub fn attr_type(&self) -> AttrType {
        match self {
            AttrValue::Text(_) => AttrType::String,
            AttrValue::Integer(_) => AttrType::Integer,
            AttrValue::Float(_) => AttrType::Float,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttrValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl std::fmt::Display for AttrValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrValue::Text(s) => write!(f, "'{}'", s),
            AttrValue::Integer(v) => write!(f, "{}", v),
            AttrValue::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Integer(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

/// Which upstream data source last wrote an attribute.
///
/// Sources are applied in a fixed order: the system capacity table first,
/// then the hypervisor export filesystem, then the diagnostic instruction.
/// Values derived by the model itself (layer type and category) carry
/// `Undefined`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
    Primary,
    Secondary,
    Tertiary,
    #[default]
    Undefined,
}

impl SourceTag {
    /// Single-letter tag used in compact diagnostics.
    pub fn code(self) -> char {
        match self {
            SourceTag::Primary => 'S',
            SourceTag::Secondary => 'H',
            SourceTag::Tertiary => 'V',
            SourceTag::Undefined => '-',
        }
    }
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SourceTag::Primary => "primary",
            SourceTag::Secondary => "secondary",
            SourceTag::Tertiary => "tertiary",
            SourceTag::Undefined => "undefined",
        })
    }
}

/// Outcome of a typed read on a declared attribute.
///
/// None of these is an error: reading an attribute the layer never received,
/// or asking for it with the wrong type, is a normal negative answer.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrQuery<T> {
    Present { value: T, source: SourceTag },
    Unset,
    /// The identifier is declared for this layer, but with another type.
    Mismatched { declared: AttrType },
}

impl<T> AttrQuery<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, AttrQuery::Present { .. })
    }

    pub fn value(self) -> Option<T> {
        match self {
            AttrQuery::Present { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn source(&self) -> Option<SourceTag> {
        match self {
            AttrQuery::Present { source, .. } => Some(*source),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> AttrQuery<U> {
        match self {
            AttrQuery::Present { value, source } => AttrQuery::Present {
                value: f(value),
                source,
            },
            AttrQuery::Unset => AttrQuery::Unset,
            AttrQuery::Mismatched { declared } => AttrQuery::Mismatched { declared },
        }
    }
}
