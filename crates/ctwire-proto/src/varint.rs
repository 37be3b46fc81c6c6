//! Base-128 variable-length integers.
//!
//! Each byte carries 7 value bits, least significant group first. The high
//! bit (0x80) is set on every byte except the last. Encoding is always
//! minimal, so a u64 takes between 1 and [`MAX_VARINT_LEN`] bytes.

use bytes::BufMut;

use crate::errors::{ProtocolError, Result};

/// Longest possible encoding of a u64.
pub const MAX_VARINT_LEN: usize = 10;

const CONTINUATION: u8 = 0x80;
const PAYLOAD: u8 = 0x7F;

/// Append `value` to `buf` as a varint.
#[inline]
pub fn encode_varint(value: u64, buf: &mut impl BufMut) {
    let mut value = value;
    while value >= u64::from(CONTINUATION) {
        buf.put_u8((value as u8 & PAYLOAD) | CONTINUATION);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Number of bytes [`encode_varint`] writes for `value`.
#[inline]
pub const fn encoded_len_varint(value: u64) -> usize {
    // Bits needed (at least one), rounded up to groups of 7
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Decode a varint starting at `offset`.
///
/// Returns the value and the offset just past the last byte consumed.
///
/// # Errors
///
/// - `Truncated` if the buffer ends before a byte without the continuation
///   bit.
/// - `Overflow` if the varint runs past 10 bytes or its 10th byte carries
///   bits that do not fit in a u64.
#[inline]
pub fn decode_varint(buf: &[u8], offset: usize) -> Result<(u64, usize)> {
    let mut value = 0u64;
    let mut pos = offset;

    for index in 0..MAX_VARINT_LEN {
        let Some(&byte) = buf.get(pos) else {
            return Err(ProtocolError::Truncated { offset: pos });
        };
        pos += 1;

        // The 10th byte holds only the top bit of a u64
        if index == MAX_VARINT_LEN - 1 && byte > 1 {
            return Err(ProtocolError::Overflow { offset });
        }

        value |= u64::from(byte & PAYLOAD) << (7 * index);
        if byte & CONTINUATION == 0 {
            return Ok((value, pos));
        }
    }

    Err(ProtocolError::Overflow { offset })
}

/// Advance past a varint without assembling its value.
pub fn skip_varint(buf: &[u8], offset: usize) -> Result<usize> {
    for (index, pos) in (offset..).take(MAX_VARINT_LEN).enumerate() {
        let Some(&byte) = buf.get(pos) else {
            return Err(ProtocolError::Truncated { offset: pos });
        };
        if index == MAX_VARINT_LEN - 1 && byte > 1 {
            return Err(ProtocolError::Overflow { offset });
        }
        if byte & CONTINUATION == 0 {
            return Ok(pos + 1);
        }
    }

    Err(ProtocolError::Overflow { offset })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn encode(value: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_varint(value, &mut buf);
        buf
    }

    #[test]
    fn single_byte_values() {
        assert_eq!(encode(0), [0x00]);
        assert_eq!(encode(1), [0x01]);
        assert_eq!(encode(127), [0x7F]);
    }

    #[test]
    fn multi_byte_values() {
        assert_eq!(encode(128), [0x80, 0x01]);
        assert_eq!(encode(300), [0xAC, 0x02]);
        assert_eq!(encode(16_384), [0x80, 0x80, 0x01]);
        assert_eq!(encode(u64::MAX), [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]);
    }

    #[test]
    fn encoded_len_boundaries() {
        assert_eq!(encoded_len_varint(0), 1);
        assert_eq!(encoded_len_varint(0x7F), 1);
        assert_eq!(encoded_len_varint(0x80), 2);
        assert_eq!(encoded_len_varint(0x3FFF), 2);
        assert_eq!(encoded_len_varint(0x4000), 3);
        assert_eq!(encoded_len_varint(1 << 63), 10);
        assert_eq!(encoded_len_varint(u64::MAX), 10);
    }

    #[test]
    fn decode_at_offset() {
        let buf = [0xFF, 0xAC, 0x02, 0x05];
        assert_eq!(decode_varint(&buf, 1), Ok((300, 3)));
        assert_eq!(decode_varint(&buf, 3), Ok((5, 4)));
    }

    #[test]
    fn decode_empty_is_truncated() {
        assert_eq!(decode_varint(&[], 0), Err(ProtocolError::Truncated { offset: 0 }));
    }

    #[test]
    fn decode_dangling_continuation_is_truncated() {
        assert_eq!(decode_varint(&[0x80, 0x80], 0), Err(ProtocolError::Truncated { offset: 2 }));
        assert_eq!(skip_varint(&[0x80], 0), Err(ProtocolError::Truncated { offset: 1 }));
    }

    #[test]
    fn decode_eleven_bytes_overflows() {
        let buf = [0xFF; 11];
        assert_eq!(decode_varint(&buf, 0), Err(ProtocolError::Overflow { offset: 0 }));
        assert_eq!(skip_varint(&buf, 0), Err(ProtocolError::Overflow { offset: 0 }));
    }

    #[test]
    fn decode_tenth_byte_above_one_overflows() {
        let mut buf = [0xFF; 10];
        buf[9] = 0x02;
        assert_eq!(decode_varint(&buf, 0), Err(ProtocolError::Overflow { offset: 0 }));
    }

    #[test]
    fn non_minimal_encoding_still_decodes() {
        // Padded zero: legal on the wire even though we never produce it
        assert_eq!(decode_varint(&[0x80, 0x00], 0), Ok((0, 2)));
    }

    proptest! {
        #[test]
        fn varint_bijection(value: u64) {
            let bytes = encode(value);
            prop_assert_eq!(bytes.len(), encoded_len_varint(value));
            prop_assert_eq!(decode_varint(&bytes, 0), Ok((value, bytes.len())));
            prop_assert_eq!(skip_varint(&bytes, 0), Ok(bytes.len()));
        }

        #[test]
        fn truncated_varint_never_decodes(value in 128u64.., cut in 0usize..9) {
            let bytes = encode(value);
            let cut = cut.min(bytes.len() - 1);
            prop_assert!(decode_varint(&bytes[..cut], 0).is_err());
        }
    }
}
