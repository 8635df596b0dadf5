//! # Layer Chain
//!
//! The ordered stack of tiers of one configuration.
//!
//! Records live in an arena and are addressed by [`LayerHandle`], an index that
//! stays valid for the lifetime of the chain no matter how many layers are
//! added around it. A handle also names the chain that issued it, so handing
//! it to any other chain fails with `NotFound`.
//!
//! Layer order is kept separately as a list of handles whose first entry is
//! the root. Every record also stores its own `layer_no`, which
//! equals its position in that list; the chain renumbers affected records on
//! every insertion.
//!
//! ## Growth
//!
//! - [`LayerChain::create_root`]: a chain with a single record at layer 0
//! - [`LayerChain::append`]: new record directly above a given one
//! - [`LayerChain::insert_before`]: new record directly below a given one,
//!   never below the root
//!
//! Records are never removed individually; the chain is dropped as a whole.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

use crate::attributes::{SchemaRegistry, SchemaVariant};
use crate::error::{QcError, Result};
use crate::model::{LayerRecord, TierKind};

static NEXT_CHAIN_ID: AtomicU64 = AtomicU64::new(1);

/// Stable address of a record within the chain that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerHandle {
    chain: u64,
    index: usize,
}

impl std::fmt::Display for LayerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}.{}", self.chain, self.index)
    }
}

/// The layers of one configuration, root first.
///
/// Owns every record; records are created only through the chain and
/// released only with it.
#[derive(Debug)]
pub struct LayerChain {
    id: u64,
    records: Vec<LayerRecord>,
    order: Vec<LayerHandle>,
    registry: &'static SchemaRegistry,
}

impl LayerChain {
    /// Starts a chain whose root (layer 0) is a record of `kind`.
    pub fn create_root(kind: TierKind, variant: SchemaVariant) -> Result<Self> {
        let registry = variant.registry();
        let id = NEXT_CHAIN_ID.fetch_add(1, Ordering::Relaxed);
        let mut records = Vec::new();
        records.try_reserve(1)?;
        records.push(LayerRecord::new(registry.schema(kind), 0)?);
        let mut order = Vec::new();
        order.try_reserve(1)?;
        order.push(LayerHandle { chain: id, index: 0 });

        trace!(chain = id, kind = %kind, variant = ?variant, "Created root layer");
        Ok(Self {
            id,
            records,
            order,
            registry,
        })
    }

    /// Naming convention every record of this chain was built with.
    pub fn variant(&self) -> SchemaVariant {
        self.registry.variant()
    }

    /// Adds a record of `kind` directly above `after`.
    ///
    /// The new record takes `after`'s layer number plus one; every record that
    /// was above `after` moves up by one.
    pub fn append(&mut self, after: LayerHandle, kind: TierKind) -> Result<LayerHandle> {
        let pos = self.position(after)?;
        let handle = self.splice(pos + 1, kind)?;
        trace!(after = %after, layer = pos + 1, kind = %kind, total = self.count(), "Appended layer");
        Ok(handle)
    }

    /// Adds a record of `kind` directly below `before`.
    ///
    /// The new record takes `before`'s layer number; `before` and every record
    /// above it move up by one. Fails with `NotFound` for the root, which has
    /// no predecessor to attach to.
    pub fn insert_before(&mut self, before: LayerHandle, kind: TierKind) -> Result<LayerHandle> {
        let pos = self.position(before)?;
        if pos == 0 {
            return Err(QcError::NotFound(format!(
                "layer {} is the root and has no predecessor",
                before
            )));
        }
        let handle = self.splice(pos, kind)?;
        trace!(before = %before, layer = pos, kind = %kind, total = self.count(), "Inserted layer");
        Ok(handle)
    }

    /// Allocates a record and places it at order position `pos`.
    fn splice(&mut self, pos: usize, kind: TierKind) -> Result<LayerHandle> {
        self.records.try_reserve(1)?;
        self.order.try_reserve(1)?;
        let record = LayerRecord::new(self.registry.schema(kind), pos)?;

        let handle = LayerHandle {
            chain: self.id,
            index: self.records.len(),
        };
        self.records.push(record);
        self.order.insert(pos, handle);
        for moved in self.order[pos + 1..].iter() {
            let record = &mut self.records[moved.index];
            record.set_layer_no(record.layer_no() + 1);
        }
        Ok(handle)
    }

    /// Walks from the root to find `handle`'s position.
    fn position(&self, handle: LayerHandle) -> Result<usize> {
        self.order
            .iter()
            .position(|h| *h == handle)
            .ok_or_else(|| Self::foreign(handle))
    }

    /// Number of layers, root included.
    pub fn count(&self) -> usize {
        self.order.len()
    }

    /// Layer 0. Fixed for the chain's lifetime.
    pub fn root(&self) -> LayerHandle {
        self.order[0]
    }

    /// The chain's root as seen from `handle`; the same for every member.
    pub fn root_of(&self, handle: LayerHandle) -> Result<LayerHandle> {
        self.position(handle)?;
        Ok(self.root())
    }

    /// The layer directly above `handle`, if any.
    pub fn successor(&self, handle: LayerHandle) -> Result<Option<LayerHandle>> {
        let pos = self.position(handle)?;
        Ok(self.order.get(pos + 1).copied())
    }

    /// The layer directly below `handle`. The root has none.
    pub fn predecessor(&self, handle: LayerHandle) -> Result<LayerHandle> {
        match self.position(handle)? {
            0 => Err(QcError::NotFound(format!(
                "layer {} is the root and has no predecessor",
                handle
            ))),
            pos => Ok(self.order[pos - 1]),
        }
    }

    /// The record at `layer_no`, counting from the root.
    pub fn handle_at(&self, layer_no: usize) -> Option<LayerHandle> {
        self.order.get(layer_no).copied()
    }

    /// The highest layer; the root when nothing was added.
    pub fn top(&self) -> LayerHandle {
        self.order[self.order.len() - 1]
    }

    fn foreign(handle: LayerHandle) -> QcError {
        QcError::NotFound(format!("layer {} is not part of this chain", handle))
    }

    /// Fails with `NotFound` when `handle` came from another chain.
    pub fn record(&self, handle: LayerHandle) -> Result<&LayerRecord> {
        if handle.chain != self.id {
            return Err(Self::foreign(handle));
        }
        self.records.get(handle.index).ok_or_else(|| Self::foreign(handle))
    }

    pub(crate) fn record_mut(&mut self, handle: LayerHandle) -> Result<&mut LayerRecord> {
        if handle.chain != self.id {
            return Err(Self::foreign(handle));
        }
        self.records
            .get_mut(handle.index)
            .ok_or_else(|| Self::foreign(handle))
    }

    /// Layers from the root upwards.
    pub fn iter(&self) -> impl Iterator<Item = (LayerHandle, &LayerRecord)> + '_ {
        self.order.iter().map(move |h| (*h, &self.records[h.index]))
    }

    /// Releases every record at once.
    pub fn destroy(self) {
        trace!(total = self.count(), "Destroyed layer chain");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer_numbers(chain: &LayerChain) -> Vec<usize> {
        chain.iter().map(|(_, r)| r.layer_no()).collect()
    }

    fn kinds(chain: &LayerChain) -> Vec<TierKind> {
        chain.iter().map(|(_, r)| r.kind()).collect()
    }

    fn zvm_stack() -> (LayerChain, Vec<LayerHandle>) {
        let mut chain = LayerChain::create_root(TierKind::Cec, SchemaVariant::Current).unwrap();
        let cec = chain.root();
        let lpar = chain.append(cec, TierKind::Lpar).unwrap();
        let hv = chain.append(lpar, TierKind::ZvmHypervisor).unwrap();
        let guest = chain.append(hv, TierKind::ZvmGuest).unwrap();
        (chain, vec![cec, lpar, hv, guest])
    }

    #[test]
    fn root_is_layer_zero() {
        let chain = LayerChain::create_root(TierKind::Cec, SchemaVariant::Current).unwrap();
        assert_eq!(chain.count(), 1);
        let root = chain.root();
        assert_eq!(chain.record(root).unwrap().layer_no(), 0);
        assert_eq!(chain.root_of(root).unwrap(), root);
        assert_eq!(chain.successor(root).unwrap(), None);
        assert_eq!(chain.top(), root);
    }

    #[test]
    fn append_on_top() {
        let (chain, handles) = zvm_stack();
        assert_eq!(chain.count(), 4);
        assert_eq!(layer_numbers(&chain), vec![0, 1, 2, 3]);
        assert_eq!(
            kinds(&chain),
            vec![
                TierKind::Cec,
                TierKind::Lpar,
                TierKind::ZvmHypervisor,
                TierKind::ZvmGuest
            ]
        );
        assert_eq!(chain.top(), handles[3]);
    }

    #[test]
    fn append_in_the_middle_renumbers_above() {
        let (mut chain, handles) = zvm_stack();
        let pool = chain.append(handles[2], TierKind::ZvmResourcePool).unwrap();
        assert_eq!(chain.record(pool).unwrap().layer_no(), 3);
        assert_eq!(chain.record(handles[3]).unwrap().layer_no(), 4);
        assert_eq!(chain.record(handles[2]).unwrap().layer_no(), 2);
        assert_eq!(layer_numbers(&chain), vec![0, 1, 2, 3, 4]);
        assert_eq!(chain.successor(handles[2]).unwrap(), Some(pool));
        assert_eq!(chain.successor(pool).unwrap(), Some(handles[3]));
    }

    #[test]
    fn insert_before_takes_the_layer_number() {
        let (mut chain, handles) = zvm_stack();
        let pool = chain.insert_before(handles[3], TierKind::ZvmResourcePool).unwrap();
        assert_eq!(chain.record(pool).unwrap().layer_no(), 3);
        assert_eq!(chain.record(handles[3]).unwrap().layer_no(), 4);
        assert_eq!(chain.predecessor(handles[3]).unwrap(), pool);
        assert_eq!(chain.predecessor(pool).unwrap(), handles[2]);
        assert_eq!(chain.count(), 5);
    }

    #[test]
    fn insert_before_lower_layer_shifts_everything_above() {
        let (mut chain, handles) = zvm_stack();
        let group = chain.insert_before(handles[1], TierKind::LparGroup).unwrap();
        assert_eq!(chain.record(group).unwrap().layer_no(), 1);
        assert_eq!(layer_numbers(&chain), vec![0, 1, 2, 3, 4]);
        assert_eq!(chain.handle_at(2), Some(handles[1]));
        assert_eq!(chain.handle_at(4), Some(handles[3]));
        assert_eq!(chain.handle_at(5), None);
    }

    #[test]
    fn insert_before_root_fails() {
        let (mut chain, handles) = zvm_stack();
        let err = chain.insert_before(handles[0], TierKind::LparGroup).unwrap_err();
        assert!(matches!(err, QcError::NotFound(_)));
        assert_eq!(chain.count(), 4);
        assert_eq!(layer_numbers(&chain), vec![0, 1, 2, 3]);
    }

    #[test]
    fn root_has_no_predecessor() {
        let (chain, handles) = zvm_stack();
        assert!(matches!(
            chain.predecessor(handles[0]),
            Err(QcError::NotFound(_))
        ));
    }

    #[test]
    fn foreign_handle_is_not_found() {
        let (mut chain, _) = zvm_stack();
        let stray = LayerHandle {
            chain: chain.id,
            index: 42,
        };
        assert!(chain.record(stray).is_err());
        assert!(chain.append(stray, TierKind::KvmGuest).is_err());
        assert!(chain.insert_before(stray, TierKind::KvmGuest).is_err());
        assert!(chain.root_of(stray).is_err());
        assert_eq!(chain.count(), 4);
    }

    #[test]
    fn handle_from_another_chain_is_not_found() {
        let (mut chain, _) = zvm_stack();
        let (other, other_handles) = zvm_stack();
        // same arena index, different chain
        let lpar = other_handles[1];
        assert_eq!(other.record(lpar).unwrap().kind(), TierKind::Lpar);
        assert!(matches!(chain.record(lpar), Err(QcError::NotFound(_))));
        assert!(matches!(chain.record_mut(lpar), Err(QcError::NotFound(_))));
        assert!(chain.successor(lpar).is_err());
        assert!(chain.append(lpar, TierKind::KvmGuest).is_err());
        assert_eq!(chain.count(), 4);
    }

    #[test]
    fn handles_survive_insertion() {
        let (mut chain, handles) = zvm_stack();
        chain.insert_before(handles[1], TierKind::LparGroup).unwrap();
        chain.append(handles[2], TierKind::ZvmResourcePool).unwrap();
        assert_eq!(chain.record(handles[3]).unwrap().kind(), TierKind::ZvmGuest);
        for (handle, _) in chain.iter() {
            assert_eq!(chain.root_of(handle).unwrap(), handles[0]);
        }
    }

    #[test]
    fn variant_is_fixed_at_creation() {
        let mut chain = LayerChain::create_root(TierKind::Cec, SchemaVariant::V1).unwrap();
        let pool = chain.append(chain.root(), TierKind::ZvmResourcePool).unwrap();
        assert_eq!(chain.variant(), SchemaVariant::V1);
        assert_eq!(chain.record(pool).unwrap().schema().type_name(), "z/VM-CPU-pool");
    }

    #[test]
    fn destroy_consumes_chain() {
        let (chain, _) = zvm_stack();
        assert_eq!(chain.count(), 4);
        chain.destroy();
    }
}
