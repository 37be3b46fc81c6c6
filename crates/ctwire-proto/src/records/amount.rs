//! Per-token spending cap.

use serde::{Deserialize, Serialize};

use crate::{
    schema::{
        FieldDescriptor, FieldKind, FieldMut, FieldRef, Message, MessageDescriptor, Schema,
        UnknownFields,
    },
    text::Text,
};

/// Spending cap for one token.
///
/// `val` is a decimal literal kept as text so no precision is lost in
/// transit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    /// Token symbol, e.g. `iost`
    #[serde(default)]
    pub token: Text,
    /// Decimal amount, e.g. `123.45`
    #[serde(default)]
    pub val: Text,
    /// Fields unknown to this schema version
    #[serde(default, skip_serializing_if = "UnknownFields::is_empty")]
    pub unknown_fields: UnknownFields,
}

impl Amount {
    /// Field number of `token`
    pub const TOKEN: u32 = 1;
    /// Field number of `val`
    pub const VAL: u32 = 2;

    /// Layout of this record.
    pub const DESCRIPTOR: MessageDescriptor = MessageDescriptor {
        name: "Amount",
        fields: &[
            FieldDescriptor::new(Self::TOKEN, "token", FieldKind::Text),
            FieldDescriptor::new(Self::VAL, "val", FieldKind::Text),
        ],
    };

    /// Amount of `val` in `token`.
    pub fn new(token: impl Into<Text>, val: impl Into<Text>) -> Self {
        Self { token: token.into(), val: val.into(), unknown_fields: UnknownFields::new() }
    }
}

impl Schema for Amount {
    fn descriptor(&self) -> &'static MessageDescriptor {
        &Self::DESCRIPTOR
    }

    fn field(&self, number: u32) -> Option<FieldRef<'_>> {
        match number {
            Self::TOKEN => Some(FieldRef::Text(&self.token)),
            Self::VAL => Some(FieldRef::Text(&self.val)),
            _ => None,
        }
    }

    fn field_mut(&mut self, number: u32) -> Option<FieldMut<'_>> {
        match number {
            Self::TOKEN => Some(FieldMut::Text(&mut self.token)),
            Self::VAL => Some(FieldMut::Text(&mut self.val)),
            _ => None,
        }
    }

    fn unknown_fields(&self) -> &UnknownFields {
        &self.unknown_fields
    }

    fn unknown_fields_mut(&mut self) -> &mut UnknownFields {
        &mut self.unknown_fields
    }
}

impl Message for Amount {}
