//! Error types for the contract wire codec.
//!
//! Every decode failure is local to a single call: the decoder stops at the
//! first malformed byte and hands the error back. There is no partial-result
//! mode.

use thiserror::Error;

use crate::wire::WireType;

/// Result alias used throughout the codec.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while encoding or decoding records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Buffer ended before a complete field (or varint) was read
    #[error("buffer truncated at offset {offset}")]
    Truncated {
        /// Offset at which more bytes were needed
        offset: usize,
    },

    /// Varint longer than 10 bytes or carrying bits above 2^64
    #[error("varint overflow at offset {offset}")]
    Overflow {
        /// Offset of the first byte of the varint
        offset: usize,
    },

    /// Tag with a field number of zero or beyond the allowed range
    #[error("invalid tag {tag:#x} at offset {offset}")]
    InvalidTag {
        /// Raw tag value
        tag: u64,
        /// Offset of the tag
        offset: usize,
    },

    /// Tag with wire type 6 or 7
    #[error("invalid wire type {wire_type} at offset {offset}")]
    InvalidWireType {
        /// Raw wire type bits
        wire_type: u8,
        /// Offset of the tag
        offset: usize,
    },

    /// Length prefix that cannot be represented on this platform
    #[error("invalid length prefix {length} at offset {offset}")]
    InvalidLength {
        /// Declared length
        length: u64,
        /// Offset of the length prefix
        offset: usize,
    },

    /// Known field number arrived with the wrong wire type
    #[error("{record}.{field}: expected wire type {expected:?}, got {actual:?}")]
    WrongWireType {
        /// Record being decoded
        record: &'static str,
        /// Field name in the schema
        field: &'static str,
        /// Wire type required by the schema
        expected: WireType,
        /// Wire type found in the buffer
        actual: WireType,
    },

    /// EndGroup without a matching StartGroup
    #[error("unexpected end group for field {field_number} at offset {offset}")]
    UnexpectedEndGroup {
        /// Field number carried by the EndGroup tag
        field_number: u32,
        /// Offset of the tag
        offset: usize,
    },

    /// Groups or nested messages deeper than the configured limit
    #[error("nesting exceeds recursion limit {limit}")]
    RecursionLimit {
        /// Configured limit
        limit: u32,
    },

    /// Input rejected before decoding because of its size
    #[error("input of {len} bytes exceeds limit of {max} bytes")]
    InputTooLarge {
        /// Input length
        len: usize,
        /// Configured maximum
        max: usize,
    },

    /// Caller-provided output buffer is shorter than the encoding
    #[error("output buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall {
        /// Encoded length
        needed: usize,
        /// Length of the supplied buffer
        available: usize,
    },

    /// Size pass and write pass disagreed. This is a codec defect, not an
    /// input problem.
    #[error("encoder size mismatch: computed {expected} bytes, wrote {actual}")]
    SizeMismatch {
        /// Size computed by the size pass
        expected: usize,
        /// Bytes produced by the write pass
        actual: usize,
    },
}

impl ProtocolError {
    /// True for errors caused by a buffer that ended too early.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }
}
