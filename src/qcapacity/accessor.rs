//! # Typed Attribute Access
//!
//! Reads are plain methods on [`LayerRecord`]. Writes go through [`LayerMut`],
//! a mutable view that also carries the configuration's consistency policy, so
//! every setter call is checked the same way no matter which data source makes
//! it.
//!
//! ## Reads
//!
//! | Outcome | Meaning |
//! |---------|---------|
//! | `Err(NotDeclared)` | the identifier is not part of this kind's schema |
//! | `AttrQuery::Mismatched` | declared, but with a different type |
//! | `AttrQuery::Unset` | declared, no source has supplied it |
//! | `AttrQuery::Present` | value plus the tag of the source that wrote it |
//!
//! ## Writes
//!
//! A write is validated completely before anything is stored: schema lookup,
//! text canonicalization and capacity, then (if enabled) agreement with the
//! value already present. A failed write leaves value and source untouched.
//!
//! Sources only ever set values. Nothing here clears a slot, so a later source
//! that has no data for an attribute cannot erase what an earlier one stored.
//!
//! ### Consistency
//!
//! With consistency checking on, a write to a slot that already holds a value
//! must agree with it: exact equality for numbers, equality after
//! canonicalization for text. The single exemption is the CP and IFL totals of
//! a partition tier written by the secondary source over a primary value: the
//! two sources count those totals differently, so the later one wins.

use std::ops::Deref;

use tracing::{debug, trace, warn};

use crate::attributes::{AttrQuery, AttrType, AttrValue, AttributeDescriptor, AttributeId, SourceTag};
use crate::error::{QcError, Result};
use crate::model::{LayerRecord, TierKind};
use crate::text::{canonicalize, decode_ebcdic, is_blank_sentinel};

impl LayerRecord {
    fn descriptor(&self, id: AttributeId, ty: AttrType) -> Result<&AttributeDescriptor> {
        self.schema().lookup(id, ty).ok_or(QcError::NotDeclared {
            attr: id,
            ty,
            kind: self.kind(),
        })
    }

    /// Typed read.
    pub fn get(&self, id: AttributeId, ty: AttrType) -> Result<AttrQuery<&AttrValue>> {
        let Some(desc) = self.schema().lookup(id, ty) else {
            return match self.schema().declared_type(id) {
                Some(declared) => Ok(AttrQuery::Mismatched { declared }),
                None => Err(QcError::NotDeclared {
                    attr: id,
                    ty,
                    kind: self.kind(),
                }),
            };
        };
        let slot = self.slot(desc.slot);
        Ok(match &slot.value {
            Some(value) => AttrQuery::Present {
                value,
                source: slot.source,
            },
            None => AttrQuery::Unset,
        })
    }

    /// Reads a text attribute.
    pub fn get_text(&self, id: AttributeId) -> Result<AttrQuery<&str>> {
        Ok(match self.get(id, AttrType::String)? {
            AttrQuery::Present {
                value: AttrValue::Text(text),
                source,
            } => AttrQuery::Present {
                value: text.as_str(),
                source,
            },
            AttrQuery::Present { .. } | AttrQuery::Unset => AttrQuery::Unset,
            AttrQuery::Mismatched { declared } => AttrQuery::Mismatched { declared },
        })
    }

    /// Reads an integer attribute.
    pub fn get_int(&self, id: AttributeId) -> Result<AttrQuery<i64>> {
        Ok(match self.get(id, AttrType::Integer)? {
            AttrQuery::Present {
                value: AttrValue::Integer(v),
                source,
            } => AttrQuery::Present { value: *v, source },
            AttrQuery::Present { .. } | AttrQuery::Unset => AttrQuery::Unset,
            AttrQuery::Mismatched { declared } => AttrQuery::Mismatched { declared },
        })
    }

    /// Reads a floating-point attribute.
    pub fn get_float(&self, id: AttributeId) -> Result<AttrQuery<f64>> {
        Ok(match self.get(id, AttrType::Float)? {
            AttrQuery::Present {
                value: AttrValue::Float(v),
                source,
            } => AttrQuery::Present { value: *v, source },
            AttrQuery::Present { .. } | AttrQuery::Unset => AttrQuery::Unset,
            AttrQuery::Mismatched { declared } => AttrQuery::Mismatched { declared },
        })
    }

    /// Whether any source has supplied `id`, whatever its type.
    ///
    /// An identifier the kind does not declare is simply not set.
    pub fn is_set(&self, id: AttributeId) -> bool {
        self.schema()
            .descriptors()
            .iter()
            .filter(|d| d.id == id)
            .any(|d| self.slot(d.slot).value.is_some())
    }

    /// Whether `id` is declared as `ty` and holds a value.
    pub fn is_set_as(&self, id: AttributeId, ty: AttrType) -> bool {
        self.schema()
            .lookup(id, ty)
            .is_some_and(|d| self.slot(d.slot).value.is_some())
    }

    /// The tag of the source that last wrote `id`; `Undefined` if none did.
    pub fn source(&self, id: AttributeId, ty: AttrType) -> Result<SourceTag> {
        let desc = self.descriptor(id, ty)?;
        Ok(self.slot(desc.slot).source)
    }
}

/// The one disagreement the consistency check lets through.
fn exempt_from_consistency(
    kind: TierKind,
    id: AttributeId,
    previous: SourceTag,
    incoming: SourceTag,
) -> bool {
    kind == TierKind::Lpar
        && matches!(id, AttributeId::NumCpTotal | AttributeId::NumIflTotal)
        && previous == SourceTag::Primary
        && incoming == SourceTag::Secondary
}

/// Mutable view of a layer used by the data sources to store values.
pub struct LayerMut<'a> {
    record: &'a mut LayerRecord,
    consistency_check: bool,
}

impl<'a> LayerMut<'a> {
    pub(crate) fn new(record: &'a mut LayerRecord, consistency_check: bool) -> Self {
        Self {
            record,
            consistency_check,
        }
    }

    /// Whether writes through this view are checked against stored values.
    pub fn consistency_check(&self) -> bool {
        self.consistency_check
    }

    /// Stores `value` for `id`, tagged with `source`.
    ///
    /// The value's type selects the descriptor; a type the kind does not
    /// declare for `id` fails with `NotDeclared`. Text capacity is counted in
    /// UTF-8 bytes.
    pub fn set(&mut self, id: AttributeId, value: impl Into<AttrValue>, source: SourceTag) -> Result<()> {
        self.store_checked(id, value.into(), source, str::len)
    }

    /// Shared write path; `width` measures text against the slot capacity.
    fn store_checked(
        &mut self,
        id: AttributeId,
        value: AttrValue,
        source: SourceTag,
        width: fn(&str) -> usize,
    ) -> Result<()> {
        let layer = self.record.layer_no();
        let kind = self.record.kind();
        let desc = match self.record.descriptor(id, value.attr_type()) {
            Ok(desc) => *desc,
            Err(e) => {
                debug!(layer, attr = %id, kind = %kind, ty = %value.attr_type(), "Rejected undeclared attribute");
                return Err(e);
            }
        };

        let value = match value {
            AttrValue::Text(text) => {
                let canonical = canonicalize(&text);
                let len = width(canonical);
                if len > desc.capacity {
                    debug!(layer, attr = %id, kind = %kind, len, capacity = desc.capacity, "Rejected oversized text");
                    return Err(QcError::Overflow {
                        attr: id,
                        len,
                        capacity: desc.capacity,
                    });
                }
                if canonical.len() == text.len() {
                    AttrValue::Text(text)
                } else {
                    AttrValue::Text(canonical.to_string())
                }
            }
            other => other,
        };

        if self.consistency_check {
            let slot = self.record.slot(desc.slot);
            if let Some(current) = slot.value.as_ref().filter(|current| **current != value) {
                if exempt_from_consistency(kind, id, slot.source, source) {
                    debug!(layer, attr = %id, kind = %kind, current = %current, proposed = %value, "Accepted secondary total over primary value");
                } else {
                    warn!(
                        layer,
                        attr = %id,
                        kind = %kind,
                        current = %current,
                        current_source = %slot.source,
                        proposed = %value,
                        proposed_source = %source,
                        "Consistency check failed"
                    );
                    return Err(QcError::Inconsistent {
                        layer,
                        attr: id,
                        current: current.clone(),
                        current_source: slot.source,
                        proposed: value,
                        proposed_source: source,
                    });
                }
            }
        }

        trace!(layer, attr = %id, value = %value, source = %source, "Stored attribute");
        self.record.store(desc.slot, value, source);
        Ok(())
    }

    /// Stores text. Trailing blanks and newlines are dropped before the
    /// capacity check.
    pub fn set_text(&mut self, id: AttributeId, value: &str, source: SourceTag) -> Result<()> {
        self.set(id, value, source)
    }

    /// Stores an integer; fails with `NotDeclared` unless `id` is an integer
    /// attribute of this kind.
    pub fn set_int(&mut self, id: AttributeId, value: i64, source: SourceTag) -> Result<()> {
        self.set(id, value, source)
    }

    /// Stores a float; compared exactly when consistency checking is on.
    pub fn set_float(&mut self, id: AttributeId, value: f64, source: SourceTag) -> Result<()> {
        self.set(id, value, source)
    }

    /// Decodes an IBM-1047 buffer and stores it as text.
    ///
    /// Returns `Ok(false)` when the buffer means "not set": all EBCDIC blanks,
    /// all zero bytes, or nothing left after canonicalization. Nothing is
    /// stored in that case.
    ///
    /// Every buffer byte decodes to one character, so capacity is counted in
    /// characters here: a buffer as wide as the slot always fits.
    pub fn set_ebcdic(&mut self, id: AttributeId, buf: &[u8], source: SourceTag) -> Result<bool> {
        let layer = self.record.layer_no();
        let kind = self.record.kind();
        self.record.descriptor(id, AttrType::String).map_err(|e| {
            debug!(layer, attr = %id, kind = %kind, "Rejected undeclared attribute");
            e
        })?;

        if is_blank_sentinel(buf) {
            trace!(layer, attr = %id, "Blank buffer, nothing stored");
            return Ok(false);
        }
        let decoded = decode_ebcdic(buf).map_err(|bad| {
            debug!(layer, attr = %id, kind = %kind, byte = bad.byte, offset = bad.offset, "Rejected malformed EBCDIC");
            QcError::DecodeError {
                attr: id,
                byte: bad.byte,
                offset: bad.offset,
            }
        })?;
        if canonicalize(&decoded).is_empty() {
            trace!(layer, attr = %id, "Empty decode, nothing stored");
            return Ok(false);
        }
        self.store_checked(id, AttrValue::Text(decoded), source, |text: &str| text.chars().count())?;
        Ok(true)
    }
}

impl Deref for LayerMut<'_> {
    type Target = LayerRecord;

    fn deref(&self) -> &LayerRecord {
        &*self.record
    }
}
