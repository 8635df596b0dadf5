//! Diagnostic names for attribute identifiers.
//!
//! Names only ever show up in log events and error messages. They are not part
//! of any validated access path: getters and setters work on [`AttributeId`]
//! directly.

use crate::error::{QcError, Result};

use super::AttributeId;

/// Diagnostic name of an attribute.
pub fn attr_name(id: AttributeId) -> &'static str {
    match id {
        AttributeId::Adjustment => "adjustment",
        AttributeId::Capability => "capability",
        AttributeId::CapacityAdjustmentIndication => "capacity_adjustment_indication",
        AttributeId::CapacityChangeReason => "capacity_change_reason",
        AttributeId::Capping => "capping",
        AttributeId::CappingNum => "capping_num",
        AttributeId::ClusterName => "cluster_name",
        AttributeId::ControlProgramId => "control_program_id",
        AttributeId::CpAbsoluteCapping => "cp_absolute_capping",
        // Pool capping flags carry a prefix to tell them apart from guest settings
        AttributeId::CpCapacityCap => "pool_cp_capacity_cap",
        AttributeId::CpCappedCapacity => "cp_capped_capacity",
        AttributeId::CpDispatchLimithard => "cp_dispatch_limithard",
        AttributeId::CpDispatchType => "cp_dispatch_type",
        AttributeId::CpLimithardCap => "pool_cp_limithard_cap",
        AttributeId::CpWeightCapping => "cp_weight_capping",
        AttributeId::HardlimitConsumption => "hardlimit_consumption",
        AttributeId::HasMultipleCpuTypes => "has_multiple_cpu_types",
        AttributeId::IflAbsoluteCapping => "ifl_absolute_capping",
        AttributeId::IflCapacityCap => "pool_ifl_capacity_cap",
        AttributeId::IflCappedCapacity => "ifl_capped_capacity",
        AttributeId::IflDispatchLimithard => "ifl_dispatch_limithard",
        AttributeId::IflDispatchType => "ifl_dispatch_type",
        AttributeId::IflLimithardCap => "pool_ifl_limithard_cap",
        AttributeId::IflWeightCapping => "ifl_weight_capping",
        AttributeId::LayerCategory => "layer_category",
        AttributeId::LayerCategoryNum => "layer_category_num",
        AttributeId::LayerExtendedName => "layer_extended_name",
        AttributeId::LayerName => "layer_name",
        AttributeId::LayerType => "layer_type",
        AttributeId::LayerTypeNum => "layer_type_num",
        AttributeId::LayerUuid => "layer_uuid",
        AttributeId::Manufacturer => "manufacturer",
        AttributeId::MobilityEnabled => "mobility_enabled",
        AttributeId::Model => "model",
        AttributeId::ModelCapacity => "model_capacity",
        AttributeId::NumCpDedicated => "num_cp_dedicated",
        AttributeId::NumCpShared => "num_cp_shared",
        AttributeId::NumCpTotal => "num_cp_total",
        AttributeId::NumCpuConfigured => "num_cpu_configured",
        AttributeId::NumCpuDedicated => "num_cpu_dedicated",
        AttributeId::NumCpuReserved => "num_cpu_reserved",
        AttributeId::NumCpuShared => "num_cpu_shared",
        AttributeId::NumCpuStandby => "num_cpu_standby",
        AttributeId::NumCpuTotal => "num_cpu_total",
        AttributeId::NumIflDedicated => "num_ifl_dedicated",
        AttributeId::NumIflShared => "num_ifl_shared",
        AttributeId::NumIflTotal => "num_ifl_total",
        AttributeId::PartitionChar => "partition_char",
        AttributeId::PartitionCharNum => "partition_char_num",
        AttributeId::PartitionNumber => "partition_number",
        AttributeId::Plant => "plant",
        AttributeId::SecondaryCapability => "secondary_capability",
        AttributeId::SequenceCode => "sequence_code",
        AttributeId::Type => "type",
        AttributeId::NumCpThreads => "num_cp_threads",
        AttributeId::NumIflThreads => "num_ifl_threads",
        AttributeId::NumCoreTotal => "num_core_total",
        AttributeId::NumCoreConfigured => "num_core_configured",
        AttributeId::NumCoreStandby => "num_core_standby",
        AttributeId::NumCoreReserved => "num_core_reserved",
        AttributeId::NumCoreDedicated => "num_core_dedicated",
        AttributeId::NumCoreShared => "num_core_shared",
        AttributeId::ProratedCoreTime => "prorated_core_time",
    }
}

/// Diagnostic name for a raw attribute code, as received from callers that
/// have not converted to [`AttributeId`] yet.
pub fn attr_name_from_code(code: u32) -> Result<&'static str> {
    match AttributeId::try_from(code) {
        Ok(id) => Ok(attr_name(id)),
        Err(err) => {
            tracing::debug!(code, "Cannot convert unknown attribute code to a name");
            Err(err)
        }
    }
}

/// Reverse of [`attr_name`]: the identifier with diagnostic name `name`.
pub fn find_by_name(name: &str) -> Option<AttributeId> {
    AttributeId::ALL
        .iter()
        .copied()
        .find(|id| attr_name(*id) == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = AttributeId::ALL.iter().map(|id| attr_name(*id)).collect();
        assert_eq!(names.len(), AttributeId::ALL.len());
    }

    #[test]
    fn pool_caps_use_prefixed_names() {
        assert_eq!(attr_name(AttributeId::CpLimithardCap), "pool_cp_limithard_cap");
        assert_eq!(attr_name(AttributeId::IflCapacityCap), "pool_ifl_capacity_cap");
    }

    #[test]
    fn name_from_code() {
        assert_eq!(attr_name_from_code(27).unwrap(), "layer_name");
    }

    #[test]
    fn name_from_unknown_code_fails() {
        assert!(matches!(attr_name_from_code(4096), Err(QcError::Unknown(4096))));
    }

    #[test]
    fn find_by_name_roundtrips_every_id() {
        for id in AttributeId::ALL {
            assert_eq!(find_by_name(attr_name(id)), Some(id));
        }
        assert_eq!(find_by_name("no_such_attr"), None);
    }
}
