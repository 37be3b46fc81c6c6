//! In-memory merge and trailer maintenance.

use crate::schema::{FieldMut, FieldRef, Schema};

/// Merge `src` into `dst`.
///
/// Produces the same record as decoding `src`'s encoding on top of `dst`:
/// non-empty text overwrites, repeated fields append, a present singular
/// record merges recursively (allocated in `dst` if absent) and trailers
/// concatenate. Both sides must be the same record type; fields `dst` does
/// not expose are ignored.
pub fn merge_from(dst: &mut dyn Schema, src: &dyn Schema) {
    debug_assert_eq!(dst.descriptor().name, src.descriptor().name);

    for field in src.descriptor().fields {
        let (Some(from), Some(to)) = (src.field(field.number), dst.field_mut(field.number)) else {
            continue;
        };

        match (from, to) {
            (FieldRef::Text(value), FieldMut::Text(target)) => {
                if !value.is_empty() {
                    target.clone_from(value);
                }
            },
            (FieldRef::RepeatedText(values), FieldMut::RepeatedText(target)) => {
                target.extend_from_slice(values);
            },
            (FieldRef::Message(Some(child)), FieldMut::Message(slot)) => {
                merge_from(slot.get_or_insert_default(), child);
            },
            (FieldRef::RepeatedMessage(children), FieldMut::RepeatedMessage(seq)) => {
                for child in (0..children.len()).filter_map(|index| children.get(index)) {
                    merge_from(seq.push_default(), child);
                }
            },
            _ => {},
        }
    }

    dst.unknown_fields_mut().extend_from(src.unknown_fields());
}

/// Clear the unknown-field trailer of `record` and of every record nested in
/// it.
pub fn discard_unknown(record: &mut dyn Schema) {
    record.unknown_fields_mut().clear();

    for field in record.descriptor().fields {
        match record.field_mut(field.number) {
            Some(FieldMut::Message(slot)) => {
                if let Some(child) = slot.get_mut() {
                    discard_unknown(child);
                }
            },
            Some(FieldMut::RepeatedMessage(seq)) => {
                for index in 0..seq.len() {
                    if let Some(child) = seq.get_mut(index) {
                        discard_unknown(child);
                    }
                }
            },
            _ => {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        records::{Abi, Amount, Contract, Info},
        schema::{Message, UnknownFields},
    };

    fn amount(token: &str, val: &str) -> Amount {
        Amount { token: token.into(), val: val.into(), ..Amount::default() }
    }

    #[test]
    fn merge_keeps_text_when_source_empty() {
        let mut dst = amount("iost", "1");
        dst.merge_from(&amount("", "2"));
        assert_eq!(dst, amount("iost", "2"));
    }

    #[test]
    fn merge_allocates_absent_info() {
        let mut dst = Contract { id: "c1".into(), ..Contract::default() };
        let src = Contract { info: Some(Info::default()), ..Contract::default() };

        dst.merge_from(&src);
        assert_eq!(dst.info, Some(Info::default()));
        assert_eq!(dst.id, "c1");
    }

    #[test]
    fn merge_matches_decoding_concatenation() {
        let mut dst = Contract {
            id: "c1".into(),
            info: Some(Info {
                lang: "javascript".into(),
                abi: vec![Abi { name: "init".into(), ..Abi::default() }],
                ..Info::default()
            }),
            unknown_fields: UnknownFields::from(vec![0x20, 0x01]),
            ..Contract::default()
        };
        let src = Contract {
            info: Some(Info {
                version: "1.0.0".into(),
                abi: vec![Abi {
                    name: "transfer".into(),
                    args: vec!["string".into(), "number".into()],
                    amount_limit: vec![amount("iost", "100")],
                    ..Abi::default()
                }],
                ..Info::default()
            }),
            code: "return 1".into(),
            unknown_fields: UnknownFields::from(vec![0x28, 0x02]),
            ..Contract::default()
        };

        let mut concatenated = dst.encode().unwrap().to_vec();
        concatenated.extend_from_slice(&src.encode().unwrap());
        let expected = Contract::decode(&concatenated).unwrap();

        dst.merge_from(&src);
        assert_eq!(dst, expected);
    }

    #[test]
    fn discard_unknown_is_recursive() {
        let trailer = || UnknownFields::from(vec![0x78, 0x00]);
        let mut contract = Contract {
            info: Some(Info {
                abi: vec![Abi {
                    amount_limit: vec![Amount { unknown_fields: trailer(), ..Amount::default() }],
                    unknown_fields: trailer(),
                    ..Abi::default()
                }],
                unknown_fields: trailer(),
                ..Info::default()
            }),
            unknown_fields: trailer(),
            ..Contract::default()
        };

        contract.discard_unknown();

        let info = contract.info.as_ref().unwrap();
        assert!(contract.unknown_fields.is_empty());
        assert!(info.unknown_fields.is_empty());
        assert!(info.abi[0].unknown_fields.is_empty());
        assert!(info.abi[0].amount_limit[0].unknown_fields.is_empty());
    }
}
