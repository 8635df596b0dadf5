//! # Qcapacity Architecture
//!
//! Qcapacity is the **in-memory model** behind a capacity-query library for
//! partitioned mainframes. It does not read anything from the machine itself:
//! the readers for the system capacity table, the hypervisor export
//! filesystem and the diagnostic instruction live outside this crate and only
//! call its setters. What lives here is everything those readers agree on:
//! which tiers exist, which attributes each tier can carry, and how values
//! from several sources are reconciled into one answer per attribute.
//!
//! ## The Layer Stack
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Configuration handle: open, build, read by layer number  │
//! │  - Settings fixed at open (config.rs)                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Chain Layer (chain.rs)                                     │
//! │  - Arena of records, ordered root first                     │
//! │  - Stable handles, automatic renumbering                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Record Layer (model.rs, accessor.rs)                       │
//! │  - Slot storage sized by the tier's schema                  │
//! │  - Typed get/set, provenance, consistency checking          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Attribute Layer (attributes/, text.rs)                     │
//! │  - Identifiers, names, per-kind schemas                     │
//! │  - Text canonicalization and EBCDIC decoding                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Acquisition Phases
//!
//! A session opens a configuration with the hardware tier as root, then the
//! sources run in a fixed order. Each may add tiers and set attributes; none
//! ever clears one:
//!
//! 1. **Primary** (system capacity table): hardware, partition and, if
//!    present, the first hypervisor and guest tiers.
//! 2. **Secondary** (hypervisor export filesystem): partition group,
//!    partition and z/VM details.
//! 3. **Tertiary** (diagnostic instruction): z/VM pool and guest data, with
//!    names in EBCDIC.
//!
//! Consumers then read by `(attribute, layer number)`.
//!
//! ## Threading
//!
//! A configuration belongs to one session. Nothing in the crate locks; a
//! `Configuration` is `Send` but sharing one between threads is left to the
//! caller to serialize.
//!
//! ## Module Overview
//!
//! - [`api`]: The `Configuration` facade and `Lookup` answers
//! - [`chain`]: The ordered layer arena
//! - [`accessor`]: Typed reads on records and the `LayerMut` write view
//! - [`model`]: Tier kinds, categories and the layer record
//! - [`attributes`]: Identifiers, values, schemas, diagnostic names
//! - [`text`]: Canonical text and IBM-1047 decoding
//! - [`config`]: Settings loading
//! - [`error`]: Error types

pub mod accessor;
pub mod api;
pub mod attributes;
pub mod chain;
pub mod config;
pub mod error;
pub mod model;
pub mod text;

pub use api::{Configuration, Lookup};
pub use attributes::{AttrType, AttrValue, AttributeId, SchemaVariant, SourceTag};
pub use chain::LayerHandle;
pub use config::QcConfig;
pub use error::{QcError, Result};
pub use model::TierKind;
