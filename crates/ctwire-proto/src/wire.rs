//! Wire types and field tags.
//!
//! A tag is a single varint `(field_number << 3) | wire_type`. The wire type
//! tells a reader how to find the end of the value without knowing the
//! schema, which is what lets old decoders step over new fields.

use bytes::BufMut;

use crate::{
    errors::{ProtocolError, Result},
    varint::{decode_varint, encode_varint, encoded_len_varint},
};

/// Largest field number a tag can carry.
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// How a field's value is framed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Base-128 varint (integers, bools, enums)
    Varint = 0,
    /// 8 little-endian bytes
    Fixed64 = 1,
    /// Varint length followed by that many bytes (text, bytes, messages)
    LengthDelimited = 2,
    /// Legacy group opener. Decode side only.
    StartGroup = 3,
    /// Legacy group terminator. Decode side only.
    EndGroup = 4,
    /// 4 little-endian bytes
    Fixed32 = 5,
}

impl WireType {
    /// Raw 3-bit value.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Varint => "varint",
            Self::Fixed64 => "fixed64",
            Self::LengthDelimited => "length-delimited",
            Self::StartGroup => "start-group",
            Self::EndGroup => "end-group",
            Self::Fixed32 => "fixed32",
        }
    }
}

impl TryFrom<u8> for WireType {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Varint),
            1 => Ok(Self::Fixed64),
            2 => Ok(Self::LengthDelimited),
            3 => Ok(Self::StartGroup),
            4 => Ok(Self::EndGroup),
            5 => Ok(Self::Fixed32),
            other => Err(other),
        }
    }
}

/// A decoded field key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    /// Field number, `1..=MAX_FIELD_NUMBER`
    pub field_number: u32,
    /// Framing of the value that follows
    pub wire_type: WireType,
}

impl Tag {
    /// Build a tag. Field numbers come from static schemas, so range is only
    /// checked in debug builds.
    pub const fn new(field_number: u32, wire_type: WireType) -> Self {
        debug_assert!(field_number >= 1 && field_number <= MAX_FIELD_NUMBER);
        Self { field_number, wire_type }
    }

    /// The varint value written on the wire.
    pub const fn to_u64(self) -> u64 {
        ((self.field_number as u64) << 3) | self.wire_type as u64
    }

    /// Bytes taken by this tag on the wire.
    pub const fn encoded_len(self) -> usize {
        encoded_len_varint(self.to_u64())
    }

    /// Append the tag to `buf`.
    pub fn encode(self, buf: &mut impl BufMut) {
        encode_varint(self.to_u64(), buf);
    }

    /// Read a tag at `offset`, returning it with the offset of the value.
    ///
    /// # Errors
    ///
    /// - `InvalidTag` for field number 0 or beyond [`MAX_FIELD_NUMBER`]
    /// - `InvalidWireType` for wire types 6 and 7
    /// - varint errors from [`decode_varint`]
    pub fn decode(buf: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (raw, next) = decode_varint(buf, offset)?;

        let field_number = raw >> 3;
        if field_number == 0 || field_number > u64::from(MAX_FIELD_NUMBER) {
            return Err(ProtocolError::InvalidTag { tag: raw, offset });
        }

        let wire_type = WireType::try_from((raw & 0x7) as u8)
            .map_err(|wire_type| ProtocolError::InvalidWireType { wire_type, offset })?;

        Ok((Self { field_number: field_number as u32, wire_type }, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_bytes_match_wire_format() {
        assert_eq!(Tag::new(1, WireType::LengthDelimited).to_u64(), 0x0A);
        assert_eq!(Tag::new(2, WireType::LengthDelimited).to_u64(), 0x12);
        assert_eq!(Tag::new(3, WireType::LengthDelimited).to_u64(), 0x1A);
    }

    #[test]
    fn large_field_numbers_use_multi_byte_tags() {
        let tag = Tag::new(16, WireType::Varint);
        assert_eq!(tag.encoded_len(), 2);

        let mut buf = Vec::new();
        tag.encode(&mut buf);
        assert_eq!(buf, [0x80, 0x01]);
        assert_eq!(Tag::decode(&buf, 0), Ok((tag, 2)));
    }

    #[test]
    fn field_number_zero_is_invalid() {
        assert_eq!(
            Tag::decode(&[0x02], 0),
            Err(ProtocolError::InvalidTag { tag: 0x02, offset: 0 })
        );
    }

    #[test]
    fn field_number_above_max_is_invalid() {
        let mut buf = Vec::new();
        encode_varint(u64::from(MAX_FIELD_NUMBER + 1) << 3, &mut buf);
        assert!(matches!(Tag::decode(&buf, 0), Err(ProtocolError::InvalidTag { .. })));
    }

    #[test]
    fn reserved_wire_types_are_rejected() {
        assert_eq!(
            Tag::decode(&[0x0E], 0),
            Err(ProtocolError::InvalidWireType { wire_type: 6, offset: 0 })
        );
        assert_eq!(
            Tag::decode(&[0x0F], 0),
            Err(ProtocolError::InvalidWireType { wire_type: 7, offset: 0 })
        );
    }

    #[test]
    fn every_defined_wire_type_round_trips() {
        for raw in 0u8..=5 {
            let wire_type = WireType::try_from(raw).unwrap();
            assert_eq!(wire_type.as_u8(), raw);
        }
    }
}
