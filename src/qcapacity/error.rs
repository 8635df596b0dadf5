use thiserror::Error;

use crate::attributes::{AttrType, AttrValue, AttributeId, SourceTag};
use crate::model::TierKind;

#[derive(Error, Debug)]
pub enum QcError {
    #[error("attribute {attr} of type {ty} is not declared for {kind} layers")]
    NotDeclared {
        attr: AttributeId,
        ty: AttrType,
        kind: TierKind,
    },

    #[error(
        "consistency at layer {layer}: attr {attr} had value {current} from {current_source}, \
         refused {proposed} from {proposed_source}"
    )]
    Inconsistent {
        layer: usize,
        attr: AttributeId,
        current: AttrValue,
        current_source: SourceTag,
        proposed: AttrValue,
        proposed_source: SourceTag,
    },

    #[error("value for {attr} is {len} bytes, slot holds at most {capacity}")]
    Overflow {
        attr: AttributeId,
        len: usize,
        capacity: usize,
    },

    #[error("cannot decode {attr}: byte 0x{byte:02x} at offset {offset} is not text")]
    DecodeError {
        attr: AttributeId,
        byte: u8,
        offset: usize,
    },

    #[error("failed to allocate layer storage")]
    AllocationFailure,

    #[error("Layer not found: {0}")]
    NotFound(String),

    #[error("unknown attribute code {0}")]
    Unknown(u32),

    #[error("Configuration error: {0}")]
    Config(#[from] confique::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<std::collections::TryReserveError> for QcError {
    fn from(_: std::collections::TryReserveError) -> Self {
        QcError::AllocationFailure
    }
}

pub type Result<T> = std::result::Result<T, QcError>;
