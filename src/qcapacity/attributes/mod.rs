//! # Attribute System
//!
//! Every datum a layer can carry is an *attribute*: a stable identifier, a
//! declared type and a storage slot in the layer's record. This module holds
//! the pieces that describe attributes independently of any particular layer:
//!
//! - **Identifiers** ([`AttributeId`]): one enumeration shared by all tier kinds
//! - **Values** ([`AttrValue`], [`AttrType`]): text, integer or floating point
//! - **Provenance** ([`SourceTag`]): which data source last wrote a value
//! - **Schemas** ([`Schema`]): the per-kind tables of declared attributes
//! - **Names** ([`attr_name`]): diagnostic names for logs and errors
//!
//! ## Declared Types
//!
//! | Type | Storage | Equality for consistency checks |
//! |------|---------|---------------------------------|
//! | `String` | bounded text, trailing blanks stripped | after canonicalization |
//! | `Integer` | `i64` | exact |
//! | `Float` | `f64` | exact |
//!
//! Reads and writes must use the declared type. A write with the wrong type is
//! rejected as not declared; a read with the wrong type is a normal negative
//! answer ([`AttrQuery::Mismatched`]).

mod id;
mod names;
mod spec;
mod value;

pub use id::AttributeId;
pub use names::{attr_name, attr_name_from_code, find_by_name};
pub use spec::{AttributeDescriptor, Schema, SchemaRegistry, SchemaVariant};
pub use value::{AttrQuery, AttrType, AttrValue, SourceTag};
