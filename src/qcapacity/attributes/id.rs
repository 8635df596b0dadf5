//! Attribute identifiers.
//!
//! Identifiers are shared by every tier kind; whether an identifier is valid
//! for a given layer is decided by that layer's schema (see [`super::spec`]).
//! The numeric codes are stable and match the public query interface, so a
//! caller holding a raw code can convert it with `AttributeId::try_from`.

use crate::error::QcError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum AttributeId {
    /// Adjustment factor of the layer
    Adjustment = 0,
    Capability = 1,
    CapacityAdjustmentIndication = 2,
    CapacityChangeReason = 3,
    /// Capping type as text: "off", "soft" or "hard"
    Capping = 4,
    CappingNum = 5,
    /// SSI cluster name
    ClusterName = 6,
    ControlProgramId = 7,
    /// Scaled so that 0x10000 equals one CPU; 0 when no capping is set
    CpAbsoluteCapping = 8,
    CpCapacityCap = 9,
    CpCappedCapacity = 10,
    CpDispatchLimithard = 11,
    CpDispatchType = 12,
    CpLimithardCap = 13,
    CpWeightCapping = 14,
    HardlimitConsumption = 15,
    HasMultipleCpuTypes = 16,
    IflAbsoluteCapping = 17,
    IflCapacityCap = 18,
    IflCappedCapacity = 19,
    IflDispatchLimithard = 20,
    IflDispatchType = 21,
    IflLimithardCap = 22,
    IflWeightCapping = 23,
    LayerCategory = 24,
    LayerCategoryNum = 25,
    LayerExtendedName = 26,
    LayerName = 27,
    LayerType = 28,
    LayerTypeNum = 29,
    LayerUuid = 30,
    Manufacturer = 31,
    MobilityEnabled = 32,
    Model = 33,
    ModelCapacity = 34,
    NumCpDedicated = 35,
    NumCpShared = 36,
    NumCpTotal = 37,
    NumCpuConfigured = 38,
    NumCpuDedicated = 39,
    NumCpuReserved = 40,
    NumCpuShared = 41,
    NumCpuStandby = 42,
    NumCpuTotal = 43,
    NumIflDedicated = 44,
    NumIflShared = 45,
    NumIflTotal = 46,
    /// Any combination of "Dedicated", "Shared" and "Limited"
    PartitionChar = 47,
    PartitionCharNum = 48,
    PartitionNumber = 49,
    Plant = 50,
    SecondaryCapability = 51,
    SequenceCode = 52,
    /// 4-digit machine type
    Type = 53,
    NumCpThreads = 54,
    NumIflThreads = 55,
    NumCoreTotal = 56,
    NumCoreConfigured = 57,
    NumCoreStandby = 58,
    NumCoreReserved = 59,
    NumCoreDedicated = 60,
    NumCoreShared = 61,
    ProratedCoreTime = 62,
}

impl AttributeId {
    /// Every identifier, ordered by numeric code.
    pub const ALL: [AttributeId; 63] = [
        AttributeId::Adjustment,
        AttributeId::Capability,
        AttributeId::CapacityAdjustmentIndication,
        AttributeId::CapacityChangeReason,
        AttributeId::Capping,
        AttributeId::CappingNum,
        AttributeId::ClusterName,
        AttributeId::ControlProgramId,
        AttributeId::CpAbsoluteCapping,
        AttributeId::CpCapacityCap,
        AttributeId::CpCappedCapacity,
        AttributeId::CpDispatchLimithard,
        AttributeId::CpDispatchType,
        AttributeId::CpLimithardCap,
        AttributeId::CpWeightCapping,
        AttributeId::HardlimitConsumption,
        AttributeId::HasMultipleCpuTypes,
        AttributeId::IflAbsoluteCapping,
        AttributeId::IflCapacityCap,
        AttributeId::IflCappedCapacity,
        AttributeId::IflDispatchLimithard,
        AttributeId::IflDispatchType,
        AttributeId::IflLimithardCap,
        AttributeId::IflWeightCapping,
        AttributeId::LayerCategory,
        AttributeId::LayerCategoryNum,
        AttributeId::LayerExtendedName,
        AttributeId::LayerName,
        AttributeId::LayerType,
        AttributeId::LayerTypeNum,
        AttributeId::LayerUuid,
        AttributeId::Manufacturer,
        AttributeId::MobilityEnabled,
        AttributeId::Model,
        AttributeId::ModelCapacity,
        AttributeId::NumCpDedicated,
        AttributeId::NumCpShared,
        AttributeId::NumCpTotal,
        AttributeId::NumCpuConfigured,
        AttributeId::NumCpuDedicated,
        AttributeId::NumCpuReserved,
        AttributeId::NumCpuShared,
        AttributeId::NumCpuStandby,
        AttributeId::NumCpuTotal,
        AttributeId::NumIflDedicated,
        AttributeId::NumIflShared,
        AttributeId::NumIflTotal,
        AttributeId::PartitionChar,
        AttributeId::PartitionCharNum,
        AttributeId::PartitionNumber,
        AttributeId::Plant,
        AttributeId::SecondaryCapability,
        AttributeId::SequenceCode,
        AttributeId::Type,
        AttributeId::NumCpThreads,
        AttributeId::NumIflThreads,
        AttributeId::NumCoreTotal,
        AttributeId::NumCoreConfigured,
        AttributeId::NumCoreStandby,
        AttributeId::NumCoreReserved,
        AttributeId::NumCoreDedicated,
        AttributeId::NumCoreShared,
        AttributeId::ProratedCoreTime,
    ];

    pub const fn code(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for AttributeId {
    type Error = QcError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        AttributeId::ALL
            .get(code as usize)
            .copied()
            .ok_or(QcError::Unknown(code))
    }
}

impl std::fmt::Display for AttributeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(super::names::attr_name(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_ordered_by_code() {
        for (idx, id) in AttributeId::ALL.iter().enumerate() {
            assert_eq!(id.code() as usize, idx, "{:?} out of place", id);
        }
    }

    #[test]
    fn try_from_known_codes() {
        assert_eq!(AttributeId::try_from(0).unwrap(), AttributeId::Adjustment);
        assert_eq!(AttributeId::try_from(37).unwrap(), AttributeId::NumCpTotal);
        assert_eq!(
            AttributeId::try_from(62).unwrap(),
            AttributeId::ProratedCoreTime
        );
    }

    #[test]
    fn try_from_unknown_code_fails() {
        match AttributeId::try_from(63) {
            Err(QcError::Unknown(code)) => assert_eq!(code, 63),
            other => panic!("Expected Unknown, got {:?}", other),
        }
        assert!(AttributeId::try_from(u32::MAX).is_err());
    }

    #[test]
    fn display_uses_diagnostic_name() {
        assert_eq!(AttributeId::NumIflTotal.to_string(), "num_ifl_total");
        assert_eq!(AttributeId::Type.to_string(), "type");
    }
}
