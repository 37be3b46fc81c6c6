//! Two-pass encoder.
//!
//! 1. **Size pass** (bottom-up): compute every nested record's content length
//!    before its parent's, recording them in a [`SizeCache`] in pre-order.
//! 2. **Write pass** (top-down): walk the tree in the same order, writing
//!    tag, length prefix and payload for each present field in ascending
//!    field-number order, then the record's unknown-field trailer.
//!
//! The total is known before the first byte is written, so the output is a
//! single exact-size allocation and every length prefix is written once.
//! Nested lengths come from the cache, never recomputed.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::error;

use crate::{
    errors::{ProtocolError, Result},
    schema::{FieldDescriptor, FieldRef, Schema},
    text::Text,
    varint::{encode_varint, encoded_len_varint},
};

/// Content lengths of nested records, in the order the write pass visits
/// them.
#[derive(Debug, Default)]
pub struct SizeCache {
    sizes: Vec<usize>,
    cursor: usize,
}

impl SizeCache {
    fn reserve(&mut self) -> usize {
        self.sizes.push(0);
        self.sizes.len() - 1
    }

    fn set(&mut self, slot: usize, len: usize) {
        self.sizes[slot] = len;
    }

    fn next(&mut self) -> Result<usize> {
        let len = self.sizes.get(self.cursor).copied().ok_or_else(|| {
            error!(visited = self.cursor, cached = self.sizes.len(), "size cache exhausted");
            ProtocolError::SizeMismatch { expected: self.sizes.len(), actual: self.cursor + 1 }
        })?;
        self.cursor += 1;
        Ok(len)
    }

    fn finish(&self) -> Result<()> {
        if self.cursor != self.sizes.len() {
            error!(visited = self.cursor, cached = self.sizes.len(), "size cache not drained");
            return Err(ProtocolError::SizeMismatch {
                expected: self.sizes.len(),
                actual: self.cursor,
            });
        }
        Ok(())
    }
}

const fn delimited_len(content: usize) -> usize {
    encoded_len_varint(content as u64) + content
}

/// Exact encoded length of `record`.
pub fn encoded_len(record: &dyn Schema) -> usize {
    content_len(record, &mut SizeCache::default())
}

fn content_len(record: &dyn Schema, cache: &mut SizeCache) -> usize {
    let mut len = 0;

    for field in record.descriptor().fields {
        let tag_len = field.tag().encoded_len();

        match record.field(field.number) {
            Some(FieldRef::Text(text)) => {
                if !text.is_empty() {
                    len += tag_len + delimited_len(text.len());
                }
            },
            Some(FieldRef::RepeatedText(items)) => {
                len += items.iter().map(|item| tag_len + delimited_len(item.len())).sum::<usize>();
            },
            Some(FieldRef::Message(Some(child))) => {
                len += tag_len + delimited_len(nested_len(child, cache));
            },
            Some(FieldRef::RepeatedMessage(seq)) => {
                for child in (0..seq.len()).filter_map(|index| seq.get(index)) {
                    len += tag_len + delimited_len(nested_len(child, cache));
                }
            },
            Some(FieldRef::Message(None)) | None => {},
        }
    }

    len + record.unknown_fields().len()
}

fn nested_len(child: &dyn Schema, cache: &mut SizeCache) -> usize {
    // Reserve before recursing so the slot order matches the write order
    let slot = cache.reserve();
    let len = content_len(child, cache);
    cache.set(slot, len);
    len
}

/// Serialize `record` into an exact-size buffer.
///
/// # Errors
///
/// Only `SizeMismatch`, which indicates a codec defect. Well-formed records
/// always encode.
pub fn encode(record: &dyn Schema) -> Result<Bytes> {
    let mut cache = SizeCache::default();
    let total = content_len(record, &mut cache);

    let mut buf = BytesMut::with_capacity(total);
    write_checked(record, &mut cache, &mut buf, total)?;
    Ok(buf.freeze())
}

/// Serialize `record` into the front of `out`, returning the byte count.
///
/// # Errors
///
/// `BufferTooSmall` if `out` is shorter than [`encoded_len`].
pub fn encode_to_slice(record: &dyn Schema, out: &mut [u8]) -> Result<usize> {
    let mut cache = SizeCache::default();
    let total = content_len(record, &mut cache);

    if out.len() < total {
        return Err(ProtocolError::BufferTooSmall { needed: total, available: out.len() });
    }

    let mut dst = &mut out[..total];
    write_checked(record, &mut cache, &mut dst, total)?;
    Ok(total)
}

fn write_checked<B: BufMut>(
    record: &dyn Schema,
    cache: &mut SizeCache,
    buf: &mut B,
    total: usize,
) -> Result<()> {
    let mut writer = Writer { buf, written: 0, limit: total };
    writer.record(record, cache)?;
    cache.finish()?;

    if writer.written != total {
        error!(expected = total, actual = writer.written, "encoded length mismatch");
        return Err(ProtocolError::SizeMismatch { expected: total, actual: writer.written });
    }
    Ok(())
}

/// Write pass over a destination whose capacity is exactly the computed
/// total. Every write is bounds-checked against that total.
struct Writer<'b, B> {
    buf: &'b mut B,
    written: usize,
    limit: usize,
}

impl<B: BufMut> Writer<'_, B> {
    fn reserve(&self, len: usize) -> Result<()> {
        if self.written + len > self.limit {
            error!(limit = self.limit, attempted = self.written + len, "write past computed size");
            return Err(ProtocolError::SizeMismatch {
                expected: self.limit,
                actual: self.written + len,
            });
        }
        Ok(())
    }

    fn varint(&mut self, value: u64) -> Result<()> {
        let len = encoded_len_varint(value);
        self.reserve(len)?;
        encode_varint(value, self.buf);
        self.written += len;
        Ok(())
    }

    fn raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.reserve(bytes.len())?;
        self.buf.put_slice(bytes);
        self.written += bytes.len();
        Ok(())
    }

    fn text(&mut self, field: &FieldDescriptor, text: &Text) -> Result<()> {
        self.varint(field.tag().to_u64())?;
        self.varint(text.len() as u64)?;
        self.raw(text.as_bytes())
    }

    fn nested(
        &mut self,
        field: &FieldDescriptor,
        child: &dyn Schema,
        cache: &mut SizeCache,
    ) -> Result<()> {
        let len = cache.next()?;
        self.varint(field.tag().to_u64())?;
        self.varint(len as u64)?;

        let start = self.written;
        self.record(child, cache)?;
        let actual = self.written - start;
        if actual != len {
            error!(
                record = child.descriptor().name,
                expected = len,
                actual,
                "nested length mismatch"
            );
            return Err(ProtocolError::SizeMismatch { expected: len, actual });
        }
        Ok(())
    }

    fn record(&mut self, record: &dyn Schema, cache: &mut SizeCache) -> Result<()> {
        for field in record.descriptor().fields {
            let Some(value) = record.field(field.number) else {
                continue;
            };
            debug_assert_eq!(
                value.kind(),
                field.kind,
                "{} field {}",
                record.descriptor().name,
                field.name
            );

            match value {
                FieldRef::Text(text) => {
                    if !text.is_empty() {
                        self.text(field, text)?;
                    }
                },
                FieldRef::RepeatedText(items) => {
                    for item in items {
                        self.text(field, item)?;
                    }
                },
                FieldRef::Message(Some(child)) => self.nested(field, child, cache)?,
                FieldRef::Message(None) => {},
                FieldRef::RepeatedMessage(seq) => {
                    for child in (0..seq.len()).filter_map(|index| seq.get(index)) {
                        self.nested(field, child, cache)?;
                    }
                },
            }
        }

        let trailer = record.unknown_fields();
        self.reserve(trailer.len())?;
        trailer.write_to(self.buf);
        self.written += trailer.len();
        Ok(())
    }
}
