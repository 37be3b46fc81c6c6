//! Schema model shared by every record.
//!
//! Each record publishes a static [`MessageDescriptor`] listing its fields in
//! ascending field-number order, and implements [`Schema`] to hand out typed
//! views of those fields by number. The encoder and decoder are written once
//! against `dyn Schema`; records carry no codec logic of their own.
//!
//! # Field views
//!
//! ```text
//!  descriptor.fields ──> number ──> record.field(n)      ──> FieldRef  (encode, merge source)
//!                                   record.field_mut(n)  ──> FieldMut  (decode, merge target)
//! ```
//!
//! Nested records are reached through [`MessageSlot`] (singular, explicit
//! presence) and [`MessageSeq`] (repeated) so that the codec can recurse
//! without knowing the concrete child type.

use bytes::{BufMut, Bytes};
use serde::{Deserialize, Serialize};

use crate::{
    decode::{self, DecodeOptions},
    encode,
    errors::Result,
    merge,
    skip::FieldIter,
    text::Text,
    wire::{Tag, WireType},
};

/// Value shape of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Text with implicit presence (empty is not written)
    Text,
    /// Repeated text, one tag per element
    RepeatedText,
    /// Singular embedded record with explicit presence
    Message,
    /// Repeated embedded record, one tag per element
    RepeatedMessage,
}

impl FieldKind {
    /// Wire type every value of this kind is framed with.
    pub const fn wire_type(self) -> WireType {
        match self {
            Self::Text | Self::RepeatedText | Self::Message | Self::RepeatedMessage => {
                WireType::LengthDelimited
            },
        }
    }
}

/// One field of a record schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Stable field number. Never reused for a different field.
    pub number: u32,
    /// Field name, used in errors and diagnostics
    pub name: &'static str,
    /// Value shape
    pub kind: FieldKind,
}

impl FieldDescriptor {
    /// Descriptor for a field.
    pub const fn new(number: u32, name: &'static str, kind: FieldKind) -> Self {
        Self { number, name, kind }
    }

    /// Tag written before each value of this field.
    pub const fn tag(&self) -> Tag {
        Tag::new(self.number, self.kind.wire_type())
    }
}

/// Static description of a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageDescriptor {
    /// Record name, used in errors and diagnostics
    pub name: &'static str,
    /// Fields in ascending field-number order
    pub fields: &'static [FieldDescriptor],
}

impl MessageDescriptor {
    /// Look up a field by number.
    pub fn field(&self, number: u32) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|field| field.number == number)
    }
}

/// Read-only view of one field's value.
#[derive(Clone, Copy)]
pub enum FieldRef<'a> {
    /// Text value, possibly empty
    Text(&'a Text),
    /// Repeated text values
    RepeatedText(&'a [Text]),
    /// Singular nested record, `None` when absent
    Message(Option<&'a dyn Schema>),
    /// Repeated nested records
    RepeatedMessage(&'a dyn MessageSeq),
}

impl FieldRef<'_> {
    /// Kind this view corresponds to.
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::RepeatedText(_) => FieldKind::RepeatedText,
            Self::Message(_) => FieldKind::Message,
            Self::RepeatedMessage(_) => FieldKind::RepeatedMessage,
        }
    }
}

/// Mutable view of one field's storage.
pub enum FieldMut<'a> {
    /// Text storage, overwritten on each occurrence
    Text(&'a mut Text),
    /// Repeated text storage, appended on each occurrence
    RepeatedText(&'a mut Vec<Text>),
    /// Singular nested record, allocated on first occurrence
    Message(&'a mut dyn MessageSlot),
    /// Repeated nested records, one new element per occurrence
    RepeatedMessage(&'a mut dyn MessageSeq),
}

/// Object-safe access to a record's schema and storage.
pub trait Schema {
    /// Static field layout.
    fn descriptor(&self) -> &'static MessageDescriptor;

    /// View of field `number`, `None` if the schema has no such field.
    fn field(&self, number: u32) -> Option<FieldRef<'_>>;

    /// Storage for field `number`, `None` if the schema has no such field.
    fn field_mut(&mut self, number: u32) -> Option<FieldMut<'_>>;

    /// Bytes of fields this schema version does not recognise.
    fn unknown_fields(&self) -> &UnknownFields;

    /// Mutable trailer, appended to by the decoder.
    fn unknown_fields_mut(&mut self) -> &mut UnknownFields;
}

/// Singular nested record with explicit presence.
pub trait MessageSlot {
    /// The record, if present.
    fn get(&self) -> Option<&dyn Schema>;

    /// The record, if present.
    fn get_mut(&mut self) -> Option<&mut dyn Schema>;

    /// The record, allocating a default one if absent.
    fn get_or_insert_default(&mut self) -> &mut dyn Schema;
}

impl<T: Message> MessageSlot for Option<T> {
    fn get(&self) -> Option<&dyn Schema> {
        self.as_ref().map(|record| record as &dyn Schema)
    }

    fn get_mut(&mut self) -> Option<&mut dyn Schema> {
        self.as_mut().map(|record| record as &mut dyn Schema)
    }

    fn get_or_insert_default(&mut self) -> &mut dyn Schema {
        self.get_or_insert_with(T::default)
    }
}

/// Ordered sequence of nested records.
pub trait MessageSeq {
    /// Number of elements.
    fn len(&self) -> usize;

    /// True if the sequence has no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`.
    fn get(&self, index: usize) -> Option<&dyn Schema>;

    /// Mutable element at `index`.
    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Schema>;

    /// Append a default element and return it.
    fn push_default(&mut self) -> &mut dyn Schema;
}

impl<T: Message> MessageSeq for Vec<T> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn get(&self, index: usize) -> Option<&dyn Schema> {
        self.as_slice().get(index).map(|record| record as &dyn Schema)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Schema> {
        self.as_mut_slice().get_mut(index).map(|record| record as &mut dyn Schema)
    }

    fn push_default(&mut self) -> &mut dyn Schema {
        let index = self.as_slice().len();
        self.push(T::default());
        &mut self[index]
    }
}

/// Codec entry points for concrete record types.
///
/// Everything here is provided; a record only implements [`Schema`] and
/// `Default`.
pub trait Message: Schema + Default {
    /// Exact number of bytes [`Message::encode`] produces.
    fn encoded_len(&self) -> usize {
        encode::encoded_len(self)
    }

    /// Serialize into a freshly allocated buffer of exact size.
    fn encode(&self) -> Result<Bytes> {
        encode::encode(self)
    }

    /// Serialize into `out`, returning the number of bytes written.
    fn encode_to_slice(&self, out: &mut [u8]) -> Result<usize> {
        encode::encode_to_slice(self, out)
    }

    /// Decode a fresh record with default limits.
    fn decode(buf: &[u8]) -> Result<Self> {
        Self::decode_with(buf, &DecodeOptions::default())
    }

    /// Decode a fresh record with explicit limits.
    fn decode_with(buf: &[u8], options: &DecodeOptions) -> Result<Self> {
        let mut record = Self::default();
        decode::merge_with(&mut record, buf, options)?;
        Ok(record)
    }

    /// Decode `buf` on top of this record. On error the record may hold a
    /// partially merged state.
    fn merge_from_slice(&mut self, buf: &[u8]) -> Result<()> {
        decode::merge(self, buf)
    }

    /// Merge another record into this one, with the same result as decoding
    /// `other`'s encoding on top of this record.
    fn merge_from(&mut self, other: &Self) {
        merge::merge_from(self, other);
    }

    /// Drop captured unknown fields here and in every nested record.
    fn discard_unknown(&mut self) {
        merge::discard_unknown(self);
    }

    /// Reset every field to its default.
    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Raw bytes of fields a record's schema does not recognise.
///
/// Stored exactly as read (tags included) and written back after all known
/// fields on encode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnknownFields(Vec<u8>);

impl UnknownFields {
    /// Empty trailer.
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Captured bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Captured byte count.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drop all captured bytes.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Append one captured field span.
    pub fn push_span(&mut self, span: &[u8]) {
        self.0.extend_from_slice(span);
    }

    /// Append another trailer.
    pub fn extend_from(&mut self, other: &Self) {
        self.0.extend_from_slice(&other.0);
    }

    /// Walk the captured fields.
    pub fn fields(&self) -> FieldIter<'_> {
        FieldIter::new(&self.0)
    }

    pub(crate) fn write_to(&self, buf: &mut impl BufMut) {
        buf.put_slice(&self.0);
    }
}

impl From<Vec<u8>> for UnknownFields {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for UnknownFields {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
