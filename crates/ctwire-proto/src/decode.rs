//! Schema-driven decoder.
//!
//! Walks tag/value pairs and routes each recognised field number into the
//! record's typed storage. Anything the schema does not know is stepped over
//! by the skip engine and its exact bytes, tag included, are appended to the
//! record's unknown-field trailer so a later encode reproduces them.
//!
//! Merge rules for fields that occur more than once:
//! - text: last occurrence wins
//! - repeated text / repeated records: each occurrence appends
//! - singular record: allocated on first occurrence, later occurrences merge
//!   into it field by field

use std::ops::Range;

use tracing::trace;

use crate::{
    errors::{ProtocolError, Result},
    schema::{FieldDescriptor, FieldMut, Message, Schema},
    skip::{DEFAULT_RECURSION_LIMIT, Nesting, capture_field, length_delimited},
    text::Text,
    wire::{Tag, WireType},
};

/// Default cap on input size (16 MiB).
pub const DEFAULT_MAX_INPUT_LEN: usize = 16 * 1024 * 1024;

/// Limits applied before and during decoding.
///
/// Decode cost is linear in input length plus nesting depth, so these two
/// bounds are enough to bound a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Inputs longer than this are rejected before any parsing
    pub max_input_len: usize,
    /// Maximum depth of nested records and groups
    pub recursion_limit: u32,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self { max_input_len: DEFAULT_MAX_INPUT_LEN, recursion_limit: DEFAULT_RECURSION_LIMIT }
    }
}

/// Decode a fresh `M` from `buf` with default limits.
pub fn decode<M: Message>(buf: &[u8]) -> Result<M> {
    M::decode(buf)
}

/// Decode `buf` on top of `record` with default limits.
pub fn merge(record: &mut dyn Schema, buf: &[u8]) -> Result<()> {
    merge_with(record, buf, &DecodeOptions::default())
}

/// Decode `buf` on top of `record`.
///
/// # Errors
///
/// - `InputTooLarge` if `buf` exceeds `options.max_input_len`
/// - `Truncated` if a field runs past the end of its enclosing buffer
/// - `InvalidTag`, `InvalidWireType`, `InvalidLength`, `Overflow` on bad
///   framing
/// - `WrongWireType` if a known field arrives with a different wire type
/// - `UnexpectedEndGroup` for an EndGroup outside any group
/// - `RecursionLimit` past `options.recursion_limit` levels of nesting
pub fn merge_with(record: &mut dyn Schema, buf: &[u8], options: &DecodeOptions) -> Result<()> {
    if buf.len() > options.max_input_len {
        return Err(ProtocolError::InputTooLarge { len: buf.len(), max: options.max_input_len });
    }

    merge_span(record, buf, 0..buf.len(), Nesting::new(options.recursion_limit))
}

/// Decode the bytes of `buf[range]` into `record`. Offsets stay relative to
/// the whole input so errors point at the real position.
fn merge_span(
    record: &mut dyn Schema,
    buf: &[u8],
    range: Range<usize>,
    nesting: Nesting,
) -> Result<()> {
    let descriptor = record.descriptor();
    let window = &buf[..range.end];
    let mut pos = range.start;

    while pos < window.len() {
        let field_start = pos;
        let (tag, value_start) = Tag::decode(window, pos)?;

        if tag.wire_type == WireType::EndGroup {
            return Err(ProtocolError::UnexpectedEndGroup {
                field_number: tag.field_number,
                offset: field_start,
            });
        }

        pos = match descriptor.field(tag.field_number) {
            Some(field) => {
                if tag.wire_type != field.kind.wire_type() {
                    return Err(ProtocolError::WrongWireType {
                        record: descriptor.name,
                        field: field.name,
                        expected: field.kind.wire_type(),
                        actual: tag.wire_type,
                    });
                }
                merge_field(record, field, window, field_start..value_start, nesting)?
            },
            None => {
                let (span, next) = capture_field(window, field_start, value_start, tag, nesting)?;
                trace!(
                    record = descriptor.name,
                    field_number = tag.field_number,
                    wire_type = ?tag.wire_type,
                    len = span.len(),
                    "captured unknown field"
                );
                record.unknown_fields_mut().push_span(span);
                next
            },
        };
    }

    Ok(())
}

/// Decode one length-delimited value of a known field and return the offset
/// of the next field. `key` is the byte range of the field's tag.
fn merge_field(
    record: &mut dyn Schema,
    field: &'static FieldDescriptor,
    window: &[u8],
    key: Range<usize>,
    nesting: Nesting,
) -> Result<usize> {
    let span = length_delimited(window, key.end)?;
    let next = span.end;

    match record.field_mut(field.number) {
        Some(FieldMut::Text(value)) => *value = Text::from(&window[span]),
        Some(FieldMut::RepeatedText(values)) => values.push(Text::from(&window[span])),
        Some(FieldMut::Message(slot)) => {
            merge_span(slot.get_or_insert_default(), window, span, nesting.descend()?)?;
        },
        Some(FieldMut::RepeatedMessage(seq)) => {
            merge_span(seq.push_default(), window, span, nesting.descend()?)?;
        },
        None => {
            // Descriptor lists a field the record does not expose; keep the
            // bytes, tag as read, rather than lose them
            record.unknown_fields_mut().push_span(&window[key.start..next]);
        },
    }

    Ok(next)
}
