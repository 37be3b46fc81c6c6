//! Skip engine.
//!
//! Steps over one field value using only its wire type. This is the single
//! place that knows how groups nest; the decoder uses it both to discard
//! values and to capture unknown fields verbatim for the trailer.

use std::ops::Range;

use tracing::trace;

use crate::{
    errors::{ProtocolError, Result},
    varint::{decode_varint, skip_varint},
    wire::{Tag, WireType},
};

/// Default bound on group and nested-message depth.
pub const DEFAULT_RECURSION_LIMIT: u32 = 100;

/// Current depth within nested groups or messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nesting {
    depth: u32,
    limit: u32,
}

impl Nesting {
    /// Top level with the given limit.
    pub const fn new(limit: u32) -> Self {
        Self { depth: 0, limit }
    }

    /// Current depth, zero at top level.
    pub const fn depth(self) -> u32 {
        self.depth
    }

    /// One level deeper.
    ///
    /// # Errors
    ///
    /// `RecursionLimit` once the limit is reached.
    pub fn descend(self) -> Result<Self> {
        if self.depth >= self.limit {
            return Err(ProtocolError::RecursionLimit { limit: self.limit });
        }
        Ok(Self { depth: self.depth + 1, limit: self.limit })
    }
}

impl Default for Nesting {
    fn default() -> Self {
        Self::new(DEFAULT_RECURSION_LIMIT)
    }
}

/// Read a length prefix at `offset` and return the byte range it frames.
///
/// # Errors
///
/// - `InvalidLength` if the length cannot be a valid in-memory size
/// - `Truncated` if the framed bytes run past the end of `buf`
pub fn length_delimited(buf: &[u8], offset: usize) -> Result<Range<usize>> {
    let (length, start) = decode_varint(buf, offset)?;

    if i64::try_from(length).is_err() {
        return Err(ProtocolError::InvalidLength { length, offset });
    }
    let end = usize::try_from(length)
        .ok()
        .and_then(|len| start.checked_add(len))
        .ok_or(ProtocolError::InvalidLength { length, offset })?;

    if end > buf.len() {
        return Err(ProtocolError::Truncated { offset: buf.len() });
    }
    Ok(start..end)
}

fn fixed(buf: &[u8], offset: usize, width: usize) -> Result<usize> {
    let end = offset + width;
    if end > buf.len() {
        return Err(ProtocolError::Truncated { offset: buf.len() });
    }
    Ok(end)
}

/// Skip the value of `tag`, which starts at `offset`, using the default
/// recursion limit.
pub fn skip_field(buf: &[u8], offset: usize, tag: Tag) -> Result<usize> {
    skip_nested(buf, offset, tag, Nesting::default())
}

/// Skip the value of `tag` starting at `offset` and return the offset just
/// past it.
///
/// # Errors
///
/// - `Truncated` if the value (or an open group) runs past the buffer
/// - `Overflow`/`InvalidLength` on malformed varints or length prefixes
/// - `UnexpectedEndGroup` for a bare EndGroup or one closing a different
///   field number
/// - `RecursionLimit` for groups nested deeper than `nesting` allows
pub fn skip_nested(buf: &[u8], offset: usize, tag: Tag, nesting: Nesting) -> Result<usize> {
    match tag.wire_type {
        WireType::Varint => skip_varint(buf, offset),
        WireType::Fixed64 => fixed(buf, offset, 8),
        WireType::Fixed32 => fixed(buf, offset, 4),
        WireType::LengthDelimited => Ok(length_delimited(buf, offset)?.end),
        WireType::StartGroup => skip_group(buf, offset, tag.field_number, nesting.descend()?),
        WireType::EndGroup => {
            Err(ProtocolError::UnexpectedEndGroup { field_number: tag.field_number, offset })
        },
    }
}

fn skip_group(buf: &[u8], offset: usize, field_number: u32, nesting: Nesting) -> Result<usize> {
    let mut pos = offset;

    loop {
        if pos >= buf.len() {
            return Err(ProtocolError::Truncated { offset: pos });
        }

        let (inner, value_start) = Tag::decode(buf, pos)?;
        if inner.wire_type == WireType::EndGroup {
            if inner.field_number != field_number {
                return Err(ProtocolError::UnexpectedEndGroup {
                    field_number: inner.field_number,
                    offset: pos,
                });
            }
            trace!(field_number, depth = nesting.depth(), "skipped group");
            return Ok(value_start);
        }

        pos = skip_nested(buf, value_start, inner, nesting)?;
    }
}

/// Skip a field and return the exact bytes it occupied, tag included.
///
/// `field_start` is the offset of the tag, `value_start` the offset just past
/// it. Returns the captured span and the offset of the next field.
pub fn capture_field(
    buf: &[u8],
    field_start: usize,
    value_start: usize,
    tag: Tag,
    nesting: Nesting,
) -> Result<(&[u8], usize)> {
    let end = skip_nested(buf, value_start, tag, nesting)?;
    Ok((&buf[field_start..end], end))
}

/// One top-level field as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField<'a> {
    /// Decoded tag
    pub tag: Tag,
    /// Byte range of the whole field (tag included) within the buffer
    pub range: Range<usize>,
    /// Bytes of the whole field
    pub bytes: &'a [u8],
}

/// Iterator over the top-level fields of a buffer, without a schema.
///
/// Stops after the first error.
#[derive(Debug, Clone)]
pub struct FieldIter<'a> {
    buf: &'a [u8],
    pos: usize,
    nesting: Nesting,
    failed: bool,
}

impl<'a> FieldIter<'a> {
    /// Walk `buf` with the default recursion limit.
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_nesting(buf, Nesting::default())
    }

    /// Walk `buf` with an explicit nesting bound for groups.
    pub fn with_nesting(buf: &'a [u8], nesting: Nesting) -> Self {
        Self { buf, pos: 0, nesting, failed: false }
    }

    fn read(&mut self) -> Result<RawField<'a>> {
        let start = self.pos;
        let (tag, value_start) = Tag::decode(self.buf, start)?;
        let (bytes, end) = capture_field(self.buf, start, value_start, tag, self.nesting)?;
        self.pos = end;
        Ok(RawField { tag, range: start..end, bytes })
    }
}

impl<'a> Iterator for FieldIter<'a> {
    type Item = Result<RawField<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.buf.len() {
            return None;
        }

        let field = self.read();
        self.failed = field.is_err();
        Some(field)
    }
}
