//! Callable entry point of a contract.

use serde::{Deserialize, Serialize};

use super::Amount;
use crate::{
    schema::{
        FieldDescriptor, FieldKind, FieldMut, FieldRef, Message, MessageDescriptor, Schema,
        UnknownFields,
    },
    text::Text,
};

/// One ABI entry: a function name, its parameter kinds and the spending caps
/// that apply when it is called.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Abi {
    /// Function identifier
    #[serde(default)]
    pub name: Text,
    /// Parameter kind tags, in call order (e.g. `string`, `number`)
    #[serde(default)]
    pub args: Vec<Text>,
    /// Per-token spending caps for this call
    #[serde(default, rename = "amountLimit")]
    pub amount_limit: Vec<Amount>,
    /// Fields unknown to this schema version
    #[serde(default, skip_serializing_if = "UnknownFields::is_empty")]
    pub unknown_fields: UnknownFields,
}

impl Abi {
    /// Field number of `name`
    pub const NAME: u32 = 1;
    /// Field number of `args`
    pub const ARGS: u32 = 2;
    /// Field number of `amount_limit`
    pub const AMOUNT_LIMIT: u32 = 3;

    /// Layout of this record.
    pub const DESCRIPTOR: MessageDescriptor = MessageDescriptor {
        name: "ABI",
        fields: &[
            FieldDescriptor::new(Self::NAME, "name", FieldKind::Text),
            FieldDescriptor::new(Self::ARGS, "args", FieldKind::RepeatedText),
            FieldDescriptor::new(Self::AMOUNT_LIMIT, "amountLimit", FieldKind::RepeatedMessage),
        ],
    };

    /// Entry for `name` taking `args`, with no spending caps.
    pub fn new<I, S>(name: impl Into<Text>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Text>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Add a spending cap.
    #[must_use]
    pub fn with_limit(mut self, limit: Amount) -> Self {
        self.amount_limit.push(limit);
        self
    }
}

impl Schema for Abi {
    fn descriptor(&self) -> &'static MessageDescriptor {
        &Self::DESCRIPTOR
    }

    fn field(&self, number: u32) -> Option<FieldRef<'_>> {
        match number {
            Self::NAME => Some(FieldRef::Text(&self.name)),
            Self::ARGS => Some(FieldRef::RepeatedText(&self.args)),
            Self::AMOUNT_LIMIT => Some(FieldRef::RepeatedMessage(&self.amount_limit)),
            _ => None,
        }
    }

    fn field_mut(&mut self, number: u32) -> Option<FieldMut<'_>> {
        match number {
            Self::NAME => Some(FieldMut::Text(&mut self.name)),
            Self::ARGS => Some(FieldMut::RepeatedText(&mut self.args)),
            Self::AMOUNT_LIMIT => Some(FieldMut::RepeatedMessage(&mut self.amount_limit)),
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

impl Message for Abi {}
