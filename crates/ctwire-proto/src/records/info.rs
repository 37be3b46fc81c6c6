//! Contract metadata and interface.

use serde::{Deserialize, Serialize};

use super::Abi;
use crate::{
    schema::{
        FieldDescriptor, FieldKind, FieldMut, FieldRef, Message, MessageDescriptor, Schema,
        UnknownFields,
    },
    text::Text,
};

/// Source language, version and callable interface of a contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Info {
    /// Language of the contract body, e.g. `javascript`
    #[serde(default)]
    pub lang: Text,
    /// Contract version
    #[serde(default)]
    pub version: Text,
    /// Callable entry points
    #[serde(default)]
    pub abi: Vec<Abi>,
    /// Fields unknown to this schema version
    #[serde(default, skip_serializing_if = "UnknownFields::is_empty")]
    pub unknown_fields: UnknownFields,
}

impl Info {
    /// Field number of `lang`
    pub const LANG: u32 = 1;
    /// Field number of `version`
    pub const VERSION: u32 = 2;
    /// Field number of `abi`
    pub const ABI: u32 = 3;

    /// Layout of this record.
    pub const DESCRIPTOR: MessageDescriptor = MessageDescriptor {
        name: "Info",
        fields: &[
            FieldDescriptor::new(Self::LANG, "lang", FieldKind::Text),
            FieldDescriptor::new(Self::VERSION, "version", FieldKind::Text),
            FieldDescriptor::new(Self::ABI, "abi", FieldKind::RepeatedMessage),
        ],
    };
}

impl Schema for Info {
    fn descriptor(&self) -> &'static MessageDescriptor {
        &Self::DESCRIPTOR
    }

    fn field(&self, number: u32) -> Option<FieldRef<'_>> {
        match number {
            Self::LANG => Some(FieldRef::Text(&self.lang)),
            Self::VERSION => Some(FieldRef::Text(&self.version)),
            Self::ABI => Some(FieldRef::RepeatedMessage(&self.abi)),
            _ => None,
        }
    }

    fn field_mut(&mut self, number: u32) -> Option<FieldMut<'_>> {
        match number {
            Self::LANG => Some(FieldMut::Text(&mut self.lang)),
            Self::VERSION => Some(FieldMut::Text(&mut self.version)),
            Self::ABI => Some(FieldMut::RepeatedMessage(&mut self.abi)),
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

impl Message for Info {}
