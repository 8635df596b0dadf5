//! # API Facade
//!
//! [`Configuration`] is the handle the surrounding capacity-query library holds
//! for one acquisition session. It owns the layer chain and the settings the
//! session was opened with, and is the single entry point for both sides of the
//! model:
//!
//! - **Data sources** build the stack (`append_layer`, `insert_layer`) and store
//!   values through [`Configuration::layer_mut`], in phase order: the system
//!   capacity table, then the hypervisor export filesystem, then the
//!   diagnostic instruction.
//! - **Consumers** read attributes by layer number once acquisition is done
//!   (`get_string`, `get_int`, `get_float`).
//!
//! ## Lookup Outcomes
//!
//! Consumer reads never fail. They answer with a [`Lookup`]:
//!
//! | Outcome | When |
//! |---------|------|
//! | `Present` | the layer holds a value of the requested type |
//! | `Unset` | the attribute is declared for the layer but no source supplied it, or it is declared with another type |
//! | `Invalid` | no such layer, or the attribute is not declared for the layer's kind |
//!
//! ## Settings
//!
//! The consistency check and the schema variant come from [`QcConfig`] and are
//! fixed when the configuration is opened. Every [`LayerMut`] handed out
//! carries the same consistency policy.
//!
//! ## Lifetime
//!
//! [`Configuration::close`] consumes the handle and releases every layer. Use
//! after close is ruled out by ownership.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::accessor::LayerMut;
use crate::attributes::{AttrQuery, AttrValue, AttributeId, SourceTag};
use crate::chain::{LayerChain, LayerHandle};
use crate::config::QcConfig;
use crate::error::{QcError, Result};
use crate::model::{LayerRecord, TierCategory, TierKind};

/// Answer to a consumer read.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// Stored, together with the source that supplied it.
    Present { value: T, source: SourceTag },
    /// Declared for the layer but not stored under the requested type.
    Unset,
    /// No such layer, or the attribute is not declared for its kind.
    Invalid,
}

impl<T> Lookup<T> {
    /// The stored value, dropping its source.
    pub fn value(self) -> Option<T> {
        match self {
            Lookup::Present { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, Lookup::Invalid)
    }
}

impl<T> From<AttrQuery<T>> for Lookup<T> {
    fn from(query: AttrQuery<T>) -> Self {
        match query {
            AttrQuery::Present { value, source } => Lookup::Present { value, source },
            AttrQuery::Unset | AttrQuery::Mismatched { .. } => Lookup::Unset,
        }
    }
}

/// One acquisition session: the layer stack plus its settings.
#[derive(Debug)]
pub struct Configuration {
    chain: LayerChain,
    settings: QcConfig,
}

impl Configuration {
    /// Opens a configuration whose root layer is `root_kind`.
    pub fn open(root_kind: TierKind, settings: QcConfig) -> Result<Self> {
        let chain = LayerChain::create_root(root_kind, settings.schema_variant)?;
        debug!(
            root = %root_kind,
            consistency_check = settings.consistency_check,
            variant = ?settings.schema_variant,
            "Opened configuration"
        );
        Ok(Self { chain, settings })
    }

    pub fn settings(&self) -> &QcConfig {
        &self.settings
    }

    pub fn chain(&self) -> &LayerChain {
        &self.chain
    }

    /// Number of tiers, root included.
    pub fn num_layers(&self) -> usize {
        self.chain.count()
    }

    pub fn root(&self) -> LayerHandle {
        self.chain.root()
    }

    pub fn top(&self) -> LayerHandle {
        self.chain.top()
    }

    pub fn append_layer(&mut self, after: LayerHandle, kind: TierKind) -> Result<LayerHandle> {
        self.chain.append(after, kind)
    }

    pub fn insert_layer(&mut self, before: LayerHandle, kind: TierKind) -> Result<LayerHandle> {
        self.chain.insert_before(before, kind)
    }

    pub fn layer(&self, handle: LayerHandle) -> Result<&LayerRecord> {
        self.chain.record(handle)
    }

    /// Write access to a layer under this configuration's consistency policy.
    pub fn layer_mut(&mut self, handle: LayerHandle) -> Result<LayerMut<'_>> {
        let consistency_check = self.settings.consistency_check;
        let record = self.chain.record_mut(handle)?;
        Ok(LayerMut::new(record, consistency_check))
    }

    fn lookup<'a, T>(
        &'a self,
        id: AttributeId,
        layer_no: usize,
        read: impl FnOnce(&'a LayerRecord) -> Result<AttrQuery<T>>,
    ) -> Lookup<T> {
        let Some(record) = self
            .chain
            .handle_at(layer_no)
            .and_then(|h| self.chain.record(h).ok())
        else {
            debug!(layer = layer_no, attr = %id, total = self.num_layers(), "Read from missing layer");
            return Lookup::Invalid;
        };
        match read(record) {
            Ok(query) => query.into(),
            Err(e) => {
                debug!(layer = layer_no, attr = %id, kind = %record.kind(), error = %e, "Invalid read");
                Lookup::Invalid
            }
        }
    }

    pub fn get_string(&self, id: AttributeId, layer_no: usize) -> Lookup<&str> {
        self.lookup(id, layer_no, |r| r.get_text(id))
    }

    pub fn get_int(&self, id: AttributeId, layer_no: usize) -> Lookup<i64> {
        self.lookup(id, layer_no, |r| r.get_int(id))
    }

    pub fn get_float(&self, id: AttributeId, layer_no: usize) -> Lookup<f64> {
        self.lookup(id, layer_no, |r| r.get_float(id))
    }

    /// Every layer's present attributes as JSON, root first.
    pub fn snapshot(&self) -> Result<Value> {
        let layers: Vec<LayerSnapshot<'_>> = self
            .chain
            .iter()
            .map(|(_, record)| LayerSnapshot {
                layer_no: record.layer_no(),
                layer_type: record.schema().type_name(),
                category: record.category(),
                attributes: record
                    .present()
                    .map(|(desc, value, source)| AttrSnapshot {
                        name: crate::attributes::attr_name(desc.id),
                        value,
                        source,
                    })
                    .collect(),
            })
            .collect();
        serde_json::to_value(layers).map_err(QcError::from)
    }

    /// Releases every layer.
    pub fn close(self) {
        debug!(total = self.num_layers(), "Closed configuration");
        self.chain.destroy();
    }
}

#[derive(Serialize)]
struct LayerSnapshot<'a> {
    layer_no: usize,
    layer_type: &'static str,
    category: TierCategory,
    attributes: Vec<AttrSnapshot<'a>>,
}

#[derive(Serialize)]
struct AttrSnapshot<'a> {
    name: &'static str,
    value: &'a AttrValue,
    source: SourceTag,
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;

    /// Builds a configuration bottom-up, one layer on top of the last.
    pub struct StackFixture {
        pub config: Configuration,
    }

    impl Default for StackFixture {
        fn default() -> Self {
            Self::new(QcConfig::default())
        }
    }

    impl StackFixture {
        /// A configuration holding only the hardware layer.
        pub fn new(settings: QcConfig) -> Self {
            Self {
                config: Configuration::open(TierKind::Cec, settings).unwrap(),
            }
        }

        pub fn with_layer(mut self, kind: TierKind) -> Self {
            let top = self.config.top();
            self.config.append_layer(top, kind).unwrap();
            self
        }

        /// Linux running directly in a partition.
        pub fn lpar(settings: QcConfig) -> Self {
            Self::new(settings).with_layer(TierKind::Lpar)
        }

        /// A z/VM guest in a resource pool: CEC, LPAR, z/VM, pool, guest.
        pub fn zvm_guest_in_pool(settings: QcConfig) -> Self {
            Self::new(settings)
                .with_layer(TierKind::Lpar)
                .with_layer(TierKind::ZvmHypervisor)
                .with_layer(TierKind::ZvmResourcePool)
                .with_layer(TierKind::ZvmGuest)
        }

        /// A KVM guest: CEC, LPAR, KVM host, guest.
        pub fn kvm_guest(settings: QcConfig) -> Self {
            Self::new(settings)
                .with_layer(TierKind::Lpar)
                .with_layer(TierKind::KvmHypervisor)
                .with_layer(TierKind::KvmGuest)
        }

        pub fn handle(&self, layer_no: usize) -> LayerHandle {
            self.config.chain().handle_at(layer_no).unwrap()
        }

        pub fn with_int(mut self, layer_no: usize, id: AttributeId, value: i64, source: SourceTag) -> Self {
            let handle = self.handle(layer_no);
            self.config
                .layer_mut(handle)
                .unwrap()
                .set_int(id, value, source)
                .unwrap();
            self
        }

        pub fn with_text(mut self, layer_no: usize, id: AttributeId, value: &str, source: SourceTag) -> Self {
            let handle = self.handle(layer_no);
            self.config
                .layer_mut(handle)
                .unwrap()
                .set_text(id, value, source)
                .unwrap();
            self
        }
    }
}
