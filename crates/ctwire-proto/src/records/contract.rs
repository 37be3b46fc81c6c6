//! Top-level contract descriptor.

use serde::{Deserialize, Serialize};

use super::Info;
use crate::{
    schema::{
        FieldDescriptor, FieldKind, FieldMut, FieldRef, Message, MessageDescriptor, Schema,
        UnknownFields,
    },
    text::Text,
};

static EMPTY_INFO: Info = Info {
    lang: Text::new(),
    version: Text::new(),
    abi: Vec::new(),
    unknown_fields: UnknownFields::new(),
};

/// A deployable contract: identifier, optional metadata and body.
///
/// `info` has explicit presence: `None` writes nothing, while
/// `Some(Info::default())` writes an empty embedded record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Contract {
    /// Unique identifier
    #[serde(default, rename = "ID")]
    pub id: Text,
    /// Metadata and interface, if attached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,
    /// Contract body, e.g. script source
    #[serde(default)]
    pub code: Text,
    /// Fields unknown to this schema version
    #[serde(default, skip_serializing_if = "UnknownFields::is_empty")]
    pub unknown_fields: UnknownFields,
}

impl Contract {
    /// Field number of `id`
    pub const ID: u32 = 1;
    /// Field number of `info`
    pub const INFO: u32 = 2;
    /// Field number of `code`
    pub const CODE: u32 = 3;

    /// Layout of this record.
    pub const DESCRIPTOR: MessageDescriptor = MessageDescriptor {
        name: "Contract",
        fields: &[
            FieldDescriptor::new(Self::ID, "ID", FieldKind::Text),
            FieldDescriptor::new(Self::INFO, "info", FieldKind::Message),
            FieldDescriptor::new(Self::CODE, "code", FieldKind::Text),
        ],
    };

    /// The attached Info, or an empty one when absent.
    pub fn info_or_default(&self) -> &Info {
        self.info.as_ref().unwrap_or(&EMPTY_INFO)
    }
}

impl Schema for Contract {
    fn descriptor(&self) -> &'static MessageDescriptor {
        &Self::DESCRIPTOR
    }

    fn field(&self, number: u32) -> Option<FieldRef<'_>> {
        match number {
            Self::ID => Some(FieldRef::Text(&self.id)),
            Self::INFO => {
                Some(FieldRef::Message(self.info.as_ref().map(|info| info as &dyn Schema)))
            },
            Self::CODE => Some(FieldRef::Text(&self.code)),
            _ => None,
        }
    }

    fn field_mut(&mut self, number: u32) -> Option<FieldMut<'_>> {
        match number {
            Self::ID => Some(FieldMut::Text(&mut self.id)),
            Self::INFO => Some(FieldMut::Message(&mut self.info)),
            Self::CODE => Some(FieldMut::Text(&mut self.code)),
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

impl Message for Contract {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Abi, Amount};

    #[test]
    fn info_or_default_without_info() {
        let contract = Contract { id: "c1".into(), ..Contract::default() };
        assert_eq!(contract.info_or_default(), &Info::default());
    }

    #[test]
    fn descriptor_fields_are_ascending() {
        for descriptor in [
            Contract::DESCRIPTOR,
            Info::DESCRIPTOR,
            Abi::DESCRIPTOR,
            Amount::DESCRIPTOR,
        ] {
            assert!(descriptor.fields.windows(2).all(|pair| pair[0].number < pair[1].number));
        }
    }

    #[test]
    fn schema_views_match_descriptor_kinds() {
        let contract = Contract { info: Some(Info::default()), ..Contract::default() };
        for field in Contract::DESCRIPTOR.fields {
            let view = contract.field(field.number).unwrap();
            assert_eq!(view.kind(), field.kind, "field {}", field.name);
        }
        assert!(contract.field(4).is_none());
    }
}
