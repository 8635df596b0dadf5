//! # Domain Model: Tiers and Layer Records
//!
//! A configuration describes a stack of virtualization *tiers*: the machine
//! (CEC) at the bottom, then partitions, hypervisors, resource pools and
//! guests. Each tier is represented by one [`LayerRecord`].
//!
//! ## Tier Kinds
//!
//! | Kind | Code | Category | Type name |
//! |------|------|----------|-----------|
//! | `Cec` | 1 | HOST | `CEC` |
//! | `Lpar` | 2 | GUEST | `LPAR` |
//! | `ZvmHypervisor` | 3 | HOST | `z/VM-hypervisor` |
//! | `ZvmResourcePool` | 4 | POOL | `z/VM-resource-pool` (`z/VM-CPU-pool` in V1) |
//! | `ZvmGuest` | 5 | GUEST | `z/VM-guest` |
//! | `KvmHypervisor` | 6 | HOST | `KVM-hypervisor` |
//! | `KvmGuest` | 7 | GUEST | `KVM-guest` |
//! | `LparGroup` | 8 | POOL | `LPAR-GROUP` |
//!
//! ## Records
//!
//! A record's storage is sized by its kind's schema: one slot per declared
//! attribute, each holding an optional value and the tag of the source that
//! wrote it. Presence is simply "the slot holds a value". Typed reads and writes
//! go through the accessor (see [`crate::accessor`]); this module only owns the
//! storage.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::attributes::{AttrValue, AttributeDescriptor, AttributeId, Schema, SchemaVariant, SourceTag};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierKind {
    Cec,
    Lpar,
    ZvmHypervisor,
    ZvmResourcePool,
    ZvmGuest,
    KvmHypervisor,
    KvmGuest,
    LparGroup,
}

impl TierKind {
    /// Every kind, ordered by numeric code.
    pub const ALL: [TierKind; 8] = [
        TierKind::Cec,
        TierKind::Lpar,
        TierKind::ZvmHypervisor,
        TierKind::ZvmResourcePool,
        TierKind::ZvmGuest,
        TierKind::KvmHypervisor,
        TierKind::KvmGuest,
        TierKind::LparGroup,
    ];

    /// Numeric code reported in `layer_type_num`.
    pub fn code(self) -> i64 {
        self.index() as i64 + 1
    }

    /// The kind reported as `layer_type_num`, if `code` names one.
    pub fn from_code(code: i64) -> Option<TierKind> {
        let idx = usize::try_from(code).ok()?.checked_sub(1)?;
        TierKind::ALL.get(idx).copied()
    }

    pub(crate) fn index(self) -> usize {
        match self {
            TierKind::Cec => 0,
            TierKind::Lpar => 1,
            TierKind::ZvmHypervisor => 2,
            TierKind::ZvmResourcePool => 3,
            TierKind::ZvmGuest => 4,
            TierKind::KvmHypervisor => 5,
            TierKind::KvmGuest => 6,
            TierKind::LparGroup => 7,
        }
    }

    pub fn category(self) -> TierCategory {
        match self {
            TierKind::Cec | TierKind::ZvmHypervisor | TierKind::KvmHypervisor => TierCategory::Host,
            TierKind::Lpar | TierKind::ZvmGuest | TierKind::KvmGuest => TierCategory::Guest,
            TierKind::ZvmResourcePool | TierKind::LparGroup => TierCategory::Pool,
        }
    }

    /// Type name reported in `layer_type`.
    pub fn type_name(self, variant: SchemaVariant) -> &'static str {
        match self {
            TierKind::Cec => "CEC",
            TierKind::Lpar => "LPAR",
            TierKind::ZvmHypervisor => "z/VM-hypervisor",
            TierKind::ZvmResourcePool => match variant {
                SchemaVariant::Current => "z/VM-resource-pool",
                SchemaVariant::V1 => "z/VM-CPU-pool",
            },
            TierKind::ZvmGuest => "z/VM-guest",
            TierKind::KvmHypervisor => "KVM-hypervisor",
            TierKind::KvmGuest => "KVM-guest",
            TierKind::LparGroup => "LPAR-GROUP",
        }
    }
}

impl std::fmt::Display for TierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name(SchemaVariant::Current))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TierCategory {
    Guest,
    Host,
    Pool,
}

impl TierCategory {
    /// Numeric code reported in `layer_category_num`.
    pub fn code(self) -> i64 {
        match self {
            TierCategory::Guest => 1,
            TierCategory::Host => 2,
            TierCategory::Pool => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TierCategory::Guest => "GUEST",
            TierCategory::Host => "HOST",
            TierCategory::Pool => "POOL",
        }
    }
}

bitflags! {
    /// Partition characteristics as reported for an LPAR.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PartitionChars: u32 {
        const DEDICATED = 1;
        const SHARED = 2;
        const LIMITED = 4;
    }
}

impl PartitionChars {
    const WORDS: [(&'static str, PartitionChars); 3] = [
        ("Dedicated", PartitionChars::DEDICATED),
        ("Shared", PartitionChars::SHARED),
        ("Limited", PartitionChars::LIMITED),
    ];

    /// Parses the text form, e.g. `"Shared Limited"`.
    ///
    /// Returns `None` if any word is not a known characteristic.
    pub fn parse(text: &str) -> Option<Self> {
        text.split_whitespace().try_fold(PartitionChars::empty(), |acc, word| {
            Self::WORDS
                .iter()
                .find(|(name, _)| *name == word)
                .map(|(_, flag)| acc | *flag)
        })
    }

    /// Renders the text form, in the order Dedicated, Shared, Limited.
    pub fn describe(self) -> String {
        Self::WORDS
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Capping mode of a z/VM guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capping {
    Off,
    Soft,
    Hard,
}

impl Capping {
    /// Numeric code reported in `capping_num`.
    pub fn code(self) -> i64 {
        match self {
            Capping::Off => 0,
            Capping::Soft => 1,
            Capping::Hard => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Capping::Off => "off",
            Capping::Soft => "soft",
            Capping::Hard => "hard",
        }
    }
}

impl std::str::FromStr for Capping {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "off" => Ok(Capping::Off),
            "soft" => Ok(Capping::Soft),
            "hard" => Ok(Capping::Hard),
            other => Err(format!("unknown capping mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Slot {
    pub(crate) value: Option<AttrValue>,
    pub(crate) source: SourceTag,
}

/// Storage for one tier of the stack.
#[derive(Debug)]
pub struct LayerRecord {
    kind: TierKind,
    schema: &'static Schema,
    slots: Vec<Slot>,
    layer_no: usize,
}

impl LayerRecord {
    /// Allocates a record for `schema` and fills in the attributes every
    /// layer carries: type and category, both as number and as text.
    pub(crate) fn new(schema: &'static Schema, layer_no: usize) -> Result<Self> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(schema.slot_count())?;
        slots.resize_with(schema.slot_count(), Slot::default);

        let mut record = Self {
            kind: schema.kind(),
            schema,
            slots,
            layer_no,
        };
        let kind = record.kind;
        let category = kind.category();
        record.init(AttributeId::LayerTypeNum, AttrValue::Integer(kind.code()));
        record.init(AttributeId::LayerCategoryNum, AttrValue::Integer(category.code()));
        record.init(AttributeId::LayerType, AttrValue::from(schema.type_name()));
        record.init(AttributeId::LayerCategory, AttrValue::from(category.as_str()));
        Ok(record)
    }

    fn init(&mut self, id: AttributeId, value: AttrValue) {
        if let Some(desc) = self.schema.lookup(id, value.attr_type()) {
            let slot = desc.slot;
            self.store(slot, value, SourceTag::Undefined);
        }
    }

    pub fn kind(&self) -> TierKind {
        self.kind
    }

    pub fn category(&self) -> TierCategory {
        self.kind.category()
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Position in the chain, counted from 0 at the root.
    pub fn layer_no(&self) -> usize {
        self.layer_no
    }

    pub(crate) fn set_layer_no(&mut self, layer_no: usize) {
        self.layer_no = layer_no;
    }

    pub(crate) fn slot(&self, idx: usize) -> &Slot {
        &self.slots[idx]
    }

    pub(crate) fn store(&mut self, idx: usize, value: AttrValue, source: SourceTag) {
        let slot = &mut self.slots[idx];
        slot.value = Some(value);
        slot.source = source;
    }

    /// Every slot holding a value, with the canonical descriptor naming it.
    pub fn present(&self) -> impl Iterator<Item = (&AttributeDescriptor, &AttrValue, SourceTag)> + '_ {
        self.slots.iter().enumerate().filter_map(move |(idx, slot)| {
            let value = slot.value.as_ref()?;
            let desc = self.schema.slot_owner(idx)?;
            Some((desc, value, slot.source))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttrType;

    fn record(kind: TierKind, variant: SchemaVariant) -> LayerRecord {
        LayerRecord::new(variant.registry().schema(kind), 0).unwrap()
    }

    #[test]
    fn kind_codes_roundtrip() {
        for kind in TierKind::ALL {
            assert_eq!(TierKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(TierKind::from_code(0), None);
        assert_eq!(TierKind::from_code(9), None);
        assert_eq!(TierKind::from_code(-3), None);
        assert_eq!(TierKind::from_code(i64::MIN), None);
        assert_eq!(TierKind::from_code(i64::MAX), None);
    }

    #[test]
    fn categories() {
        assert_eq!(TierKind::Cec.category(), TierCategory::Host);
        assert_eq!(TierKind::Lpar.category(), TierCategory::Guest);
        assert_eq!(TierKind::ZvmResourcePool.category(), TierCategory::Pool);
        assert_eq!(TierKind::LparGroup.category(), TierCategory::Pool);
        assert_eq!(TierKind::KvmHypervisor.category(), TierCategory::Host);
        assert_eq!(TierCategory::Pool.code(), 3);
    }

    #[test]
    fn new_record_carries_type_and_category() {
        let rec = record(TierKind::ZvmGuest, SchemaVariant::Current);
        let present: Vec<_> = rec.present().map(|(d, v, s)| (d.id, v.clone(), s)).collect();
        assert_eq!(present.len(), 4);
        assert!(present.contains(&(
            AttributeId::LayerTypeNum,
            AttrValue::Integer(5),
            SourceTag::Undefined
        )));
        assert!(present.contains(&(
            AttributeId::LayerType,
            AttrValue::Text("z/VM-guest".into()),
            SourceTag::Undefined
        )));
        assert!(present.contains(&(
            AttributeId::LayerCategory,
            AttrValue::Text("GUEST".into()),
            SourceTag::Undefined
        )));
    }

    #[test]
    fn new_pool_record_uses_variant_name() {
        let rec = record(TierKind::ZvmResourcePool, SchemaVariant::V1);
        let slot = rec
            .schema()
            .lookup(AttributeId::LayerType, AttrType::String)
            .unwrap()
            .slot;
        assert_eq!(
            rec.slot(slot).value,
            Some(AttrValue::Text("z/VM-CPU-pool".into()))
        );
    }

    #[test]
    fn partition_chars_parse_and_describe() {
        let chars = PartitionChars::parse("Shared Limited").unwrap();
        assert_eq!(chars, PartitionChars::SHARED | PartitionChars::LIMITED);
        assert_eq!(chars.bits(), 6);
        assert_eq!(chars.describe(), "Shared Limited");
        assert_eq!(PartitionChars::parse("Dedicated").unwrap().bits(), 1);
        assert_eq!(PartitionChars::parse("Dedicated Bogus"), None);
        assert_eq!(PartitionChars::parse("").unwrap(), PartitionChars::empty());
    }

    #[test]
    fn capping_text_forms() {
        assert_eq!("soft".parse::<Capping>().unwrap(), Capping::Soft);
        assert_eq!(Capping::Hard.code(), 2);
        assert_eq!(Capping::Off.as_str(), "off");
        assert!("HARD".parse::<Capping>().is_err());
    }
}
