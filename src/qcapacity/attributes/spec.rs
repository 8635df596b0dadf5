//! Attribute schemas per tier kind.
//!
//! Every tier kind has a fixed table of declared attributes. Each entry maps an
//! identifier plus declared type to a storage slot; text entries also carry the
//! slot's capacity in bytes. The table is the single source of truth for what a
//! layer of that kind can hold: adding an attribute to a kind means adding an
//! entry here.
//!
//! ## Variants
//!
//! Two schema variants exist. [`SchemaVariant::Current`] uses the tables as
//! written. [`SchemaVariant::V1`] keeps older consumers working: the pool tier
//! reports its type as `z/VM-CPU-pool`, and on hardware, partition and
//! hypervisor tiers the `num_cpu_*` identifiers address the `num_core_*` slots.
//! The aliases are extra descriptors pointing at an existing slot, resolved when
//! the schema is built.
//!
//! Both registries are built once per process and shared read-only.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::{AttrType, AttributeId};
use crate::model::TierKind;

const LAYER_TYPE_LEN: usize = 19;
const LAYER_CAT_LEN: usize = 5;
const NAME_LEN: usize = 8;
const EXTENDED_NAME_LEN: usize = 256;
const UUID_LEN: usize = 36;
const FIELD16_LEN: usize = 16;
const FIELD4_LEN: usize = 4;
const PARTITION_CHAR_LEN: usize = 25;

/// Selects which naming convention the schemas follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVariant {
    #[default]
    Current,
    V1,
}

impl SchemaVariant {
    /// The process-wide registry for this variant.
    pub fn registry(self) -> &'static SchemaRegistry {
        match self {
            SchemaVariant::Current => &CURRENT_SCHEMAS,
            SchemaVariant::V1 => &V1_SCHEMAS,
        }
    }
}

/// A static table entry: identifier, declared type and text capacity.
#[derive(Debug, Clone, Copy)]
struct FieldSpec {
    id: AttributeId,
    ty: AttrType,
    capacity: usize,
}

impl FieldSpec {
    const fn text(id: AttributeId, capacity: usize) -> Self {
        Self {
            id,
            ty: AttrType::String,
            capacity,
        }
    }

    const fn int(id: AttributeId) -> Self {
        Self {
            id,
            ty: AttrType::Integer,
            capacity: 0,
        }
    }

    const fn float(id: AttributeId) -> Self {
        Self {
            id,
            ty: AttrType::Float,
            capacity: 0,
        }
    }
}

use AttributeId as A;

const COMMON: [FieldSpec; 4] = [
    FieldSpec::int(A::LayerTypeNum),
    FieldSpec::int(A::LayerCategoryNum),
    FieldSpec::text(A::LayerType, LAYER_TYPE_LEN),
    FieldSpec::text(A::LayerCategory, LAYER_CAT_LEN),
];

const CEC_FIELDS: &[FieldSpec] = &[
    COMMON[0],
    COMMON[1],
    COMMON[2],
    COMMON[3],
    FieldSpec::text(A::LayerName, NAME_LEN),
    FieldSpec::text(A::Manufacturer, FIELD16_LEN),
    FieldSpec::text(A::Type, FIELD4_LEN),
    FieldSpec::text(A::ModelCapacity, FIELD16_LEN),
    FieldSpec::text(A::Model, FIELD16_LEN),
    FieldSpec::text(A::SequenceCode, FIELD16_LEN),
    FieldSpec::text(A::Plant, FIELD4_LEN),
    FieldSpec::int(A::NumCoreTotal),
    FieldSpec::int(A::NumCoreConfigured),
    FieldSpec::int(A::NumCoreStandby),
    FieldSpec::int(A::NumCoreReserved),
    FieldSpec::int(A::NumCoreDedicated),
    FieldSpec::int(A::NumCoreShared),
    FieldSpec::int(A::NumCpTotal),
    FieldSpec::int(A::NumCpDedicated),
    FieldSpec::int(A::NumCpShared),
    FieldSpec::int(A::NumIflTotal),
    FieldSpec::int(A::NumIflDedicated),
    FieldSpec::int(A::NumIflShared),
    FieldSpec::int(A::NumCpThreads),
    FieldSpec::int(A::NumIflThreads),
    FieldSpec::float(A::Capability),
    FieldSpec::float(A::SecondaryCapability),
    FieldSpec::int(A::CapacityAdjustmentIndication),
    FieldSpec::int(A::CapacityChangeReason),
];

const LPAR_GROUP_FIELDS: &[FieldSpec] = &[
    COMMON[0],
    COMMON[1],
    COMMON[2],
    COMMON[3],
    FieldSpec::text(A::LayerName, NAME_LEN),
    FieldSpec::int(A::CpAbsoluteCapping),
    FieldSpec::int(A::IflAbsoluteCapping),
];

const LPAR_FIELDS: &[FieldSpec] = &[
    COMMON[0],
    COMMON[1],
    COMMON[2],
    COMMON[3],
    FieldSpec::int(A::PartitionNumber),
    FieldSpec::text(A::PartitionChar, PARTITION_CHAR_LEN),
    FieldSpec::int(A::PartitionCharNum),
    FieldSpec::text(A::LayerName, NAME_LEN),
    FieldSpec::text(A::LayerExtendedName, EXTENDED_NAME_LEN),
    FieldSpec::text(A::LayerUuid, UUID_LEN),
    FieldSpec::int(A::Adjustment),
    FieldSpec::int(A::NumCoreTotal),
    FieldSpec::int(A::NumCoreConfigured),
    FieldSpec::int(A::NumCoreStandby),
    FieldSpec::int(A::NumCoreReserved),
    FieldSpec::int(A::NumCoreDedicated),
    FieldSpec::int(A::NumCoreShared),
    FieldSpec::int(A::NumCpTotal),
    FieldSpec::int(A::NumCpDedicated),
    FieldSpec::int(A::NumCpShared),
    FieldSpec::int(A::NumIflTotal),
    FieldSpec::int(A::NumIflDedicated),
    FieldSpec::int(A::NumIflShared),
    FieldSpec::int(A::NumCpThreads),
    FieldSpec::int(A::NumIflThreads),
    FieldSpec::int(A::CpAbsoluteCapping),
    FieldSpec::int(A::IflAbsoluteCapping),
    FieldSpec::int(A::CpWeightCapping),
    FieldSpec::int(A::IflWeightCapping),
];

const ZVM_HYPERVISOR_FIELDS: &[FieldSpec] = &[
    COMMON[0],
    COMMON[1],
    COMMON[2],
    COMMON[3],
    FieldSpec::text(A::LayerName, NAME_LEN),
    FieldSpec::text(A::ClusterName, NAME_LEN),
    FieldSpec::text(A::ControlProgramId, FIELD16_LEN),
    FieldSpec::int(A::Adjustment),
    FieldSpec::int(A::HardlimitConsumption),
    FieldSpec::int(A::ProratedCoreTime),
    FieldSpec::int(A::NumCoreTotal),
    FieldSpec::int(A::NumCoreDedicated),
    FieldSpec::int(A::NumCoreShared),
    FieldSpec::int(A::NumCpTotal),
    FieldSpec::int(A::NumCpDedicated),
    FieldSpec::int(A::NumCpShared),
    FieldSpec::int(A::NumIflTotal),
    FieldSpec::int(A::NumIflDedicated),
    FieldSpec::int(A::NumIflShared),
    FieldSpec::int(A::NumCpThreads),
    FieldSpec::int(A::NumIflThreads),
];

const KVM_HYPERVISOR_FIELDS: &[FieldSpec] = &[
    COMMON[0],
    COMMON[1],
    COMMON[2],
    COMMON[3],
    FieldSpec::text(A::ControlProgramId, FIELD16_LEN),
    FieldSpec::int(A::Adjustment),
    FieldSpec::int(A::NumCoreTotal),
    FieldSpec::int(A::NumCoreDedicated),
    FieldSpec::int(A::NumCoreShared),
    FieldSpec::int(A::NumCpTotal),
    FieldSpec::int(A::NumCpDedicated),
    FieldSpec::int(A::NumCpShared),
    FieldSpec::int(A::NumIflTotal),
    FieldSpec::int(A::NumIflDedicated),
    FieldSpec::int(A::NumIflShared),
];

const ZVM_POOL_FIELDS: &[FieldSpec] = &[
    COMMON[0],
    COMMON[1],
    COMMON[2],
    COMMON[3],
    FieldSpec::text(A::LayerName, NAME_LEN),
    FieldSpec::int(A::CpLimithardCap),
    FieldSpec::int(A::CpCapacityCap),
    FieldSpec::int(A::IflLimithardCap),
    FieldSpec::int(A::IflCapacityCap),
    FieldSpec::int(A::CpCappedCapacity),
    FieldSpec::int(A::IflCappedCapacity),
];

const ZVM_GUEST_FIELDS: &[FieldSpec] = &[
    COMMON[0],
    COMMON[1],
    COMMON[2],
    COMMON[3],
    FieldSpec::text(A::LayerName, NAME_LEN),
    FieldSpec::text(A::Capping, FIELD4_LEN),
    FieldSpec::int(A::CappingNum),
    FieldSpec::int(A::NumCpuTotal),
    FieldSpec::int(A::NumCpuConfigured),
    FieldSpec::int(A::NumCpuStandby),
    FieldSpec::int(A::NumCpuReserved),
    FieldSpec::int(A::NumCpuDedicated),
    FieldSpec::int(A::NumCpuShared),
    FieldSpec::int(A::NumCpTotal),
    FieldSpec::int(A::NumCpDedicated),
    FieldSpec::int(A::NumCpShared),
    FieldSpec::int(A::NumIflTotal),
    FieldSpec::int(A::NumIflDedicated),
    FieldSpec::int(A::NumIflShared),
    FieldSpec::int(A::MobilityEnabled),
    FieldSpec::int(A::HasMultipleCpuTypes),
    FieldSpec::int(A::CpDispatchLimithard),
    FieldSpec::int(A::CpCappedCapacity),
    FieldSpec::int(A::IflDispatchLimithard),
    FieldSpec::int(A::IflCappedCapacity),
    FieldSpec::int(A::CpDispatchType),
    FieldSpec::int(A::IflDispatchType),
];

const KVM_GUEST_FIELDS: &[FieldSpec] = &[
    COMMON[0],
    COMMON[1],
    COMMON[2],
    COMMON[3],
    FieldSpec::text(A::LayerName, NAME_LEN),
    FieldSpec::text(A::LayerExtendedName, EXTENDED_NAME_LEN),
    FieldSpec::text(A::LayerUuid, UUID_LEN),
    FieldSpec::int(A::NumCpuTotal),
    FieldSpec::int(A::NumCpuConfigured),
    FieldSpec::int(A::NumCpuStandby),
    FieldSpec::int(A::NumCpuReserved),
    FieldSpec::int(A::NumCpuDedicated),
    FieldSpec::int(A::NumCpuShared),
    FieldSpec::int(A::NumIflTotal),
    FieldSpec::int(A::NumIflDedicated),
    FieldSpec::int(A::NumIflShared),
    FieldSpec::int(A::IflDispatchType),
];

/// CPU counters that older consumers read under their `num_cpu_*` names on
/// every host-like tier.
const V1_CPU_ALIASES: &[(AttributeId, AttributeId)] = &[
    (A::NumCpuTotal, A::NumCoreTotal),
    (A::NumCpuDedicated, A::NumCoreDedicated),
    (A::NumCpuShared, A::NumCoreShared),
];

/// Additional counters aliased on hardware and partition tiers only.
const V1_CPU_COUNT_ALIASES: &[(AttributeId, AttributeId)] = &[
    (A::NumCpuConfigured, A::NumCoreConfigured),
    (A::NumCpuStandby, A::NumCoreStandby),
    (A::NumCpuReserved, A::NumCoreReserved),
];

fn base_fields(kind: TierKind) -> &'static [FieldSpec] {
    match kind {
        TierKind::Cec => CEC_FIELDS,
        TierKind::LparGroup => LPAR_GROUP_FIELDS,
        TierKind::Lpar => LPAR_FIELDS,
        TierKind::ZvmHypervisor => ZVM_HYPERVISOR_FIELDS,
        TierKind::ZvmResourcePool => ZVM_POOL_FIELDS,
        TierKind::ZvmGuest => ZVM_GUEST_FIELDS,
        TierKind::KvmHypervisor => KVM_HYPERVISOR_FIELDS,
        TierKind::KvmGuest => KVM_GUEST_FIELDS,
    }
}

fn v1_aliases(kind: TierKind) -> Vec<(AttributeId, AttributeId)> {
    match kind {
        TierKind::Cec | TierKind::Lpar => V1_CPU_COUNT_ALIASES
            .iter()
            .chain(V1_CPU_ALIASES)
            .copied()
            .collect(),
        TierKind::ZvmHypervisor | TierKind::KvmHypervisor => V1_CPU_ALIASES.to_vec(),
        _ => Vec::new(),
    }
}

/// Maps an identifier and declared type to a storage slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeDescriptor {
    pub id: AttributeId,
    pub ty: AttrType,
    pub slot: usize,
    /// Maximum text length in bytes; zero for numeric attributes.
    pub capacity: usize,
}

/// The resolved schema for one tier kind under one variant.
#[derive(Debug, Clone)]
pub struct Schema {
    kind: TierKind,
    type_name: &'static str,
    descriptors: Vec<AttributeDescriptor>,
    slot_count: usize,
}

impl Schema {
    fn build(kind: TierKind, variant: SchemaVariant) -> Self {
        let fields = base_fields(kind);
        let mut descriptors: Vec<AttributeDescriptor> = fields
            .iter()
            .enumerate()
            .map(|(slot, field)| AttributeDescriptor {
                id: field.id,
                ty: field.ty,
                slot,
                capacity: field.capacity,
            })
            .collect();

        if variant == SchemaVariant::V1 {
            for (alias, target) in v1_aliases(kind) {
                let target = descriptors
                    .iter()
                    .find(|d| d.id == target)
                    .copied();
                if let Some(target) = target {
                    if !descriptors.iter().any(|d| d.id == alias) {
                        descriptors.push(AttributeDescriptor { id: alias, ..target });
                    }
                }
            }
        }

        Self {
            kind,
            type_name: kind.type_name(variant),
            descriptors,
            slot_count: fields.len(),
        }
    }

    pub fn kind(&self) -> TierKind {
        self.kind
    }

    /// Type name reported in the `layer_type` attribute.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Look up the descriptor for an identifier with a specific type.
    ///
    /// `None` means "not declared for this kind", which callers must keep
    /// apart from "declared but unset".
    pub fn lookup(&self, id: AttributeId, ty: AttrType) -> Option<&AttributeDescriptor> {
        self.descriptors.iter().find(|d| d.id == id && d.ty == ty)
    }

    /// The declared type of an identifier, regardless of the type asked for.
    pub fn declared_type(&self, id: AttributeId) -> Option<AttrType> {
        self.descriptors.iter().find(|d| d.id == id).map(|d| d.ty)
    }

    pub fn is_declared(&self, id: AttributeId) -> bool {
        self.declared_type(id).is_some()
    }

    pub fn descriptors(&self) -> &[AttributeDescriptor] {
        &self.descriptors
    }

    /// Number of distinct storage slots. Aliases share slots, so this can be
    /// smaller than the number of descriptors.
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// The canonical descriptor owning a slot (the first one declared for it).
    pub fn slot_owner(&self, slot: usize) -> Option<&AttributeDescriptor> {
        self.descriptors.iter().find(|d| d.slot == slot)
    }
}

/// All schemas of one variant, one per tier kind.
#[derive(Debug)]
pub struct SchemaRegistry {
    variant: SchemaVariant,
    schemas: Vec<Schema>,
}

impl SchemaRegistry {
    fn build(variant: SchemaVariant) -> Self {
        let schemas = TierKind::ALL
            .iter()
            .map(|kind| Schema::build(*kind, variant))
            .collect();
        Self { variant, schemas }
    }

    pub fn variant(&self) -> SchemaVariant {
        self.variant
    }

    pub fn schema(&self, kind: TierKind) -> &Schema {
        // TierKind::ALL and `schemas` share the same order
        &self.schemas[kind.index()]
    }
}

static CURRENT_SCHEMAS: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::build(SchemaVariant::Current));
static V1_SCHEMAS: Lazy<SchemaRegistry> = Lazy::new(|| SchemaRegistry::build(SchemaVariant::V1));
