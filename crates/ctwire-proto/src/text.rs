//! Storage for text fields.
//!
//! Text fields are length-delimited bytes on the wire and producers do not
//! enforce UTF-8, so a value is kept exactly as read and written back
//! unchanged. UTF-8 only matters when a caller asks for a `&str`.

use std::{borrow::Cow, fmt};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Bytes of one text field, usually but not necessarily UTF-8.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Text(Vec<u8>);

impl Text {
    /// Empty text.
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Raw bytes as read from the wire.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The value as `&str`, or `None` if it is not UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// The value with invalid sequences replaced by U+FFFD.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    /// Byte length.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the empty value, which is never written to the wire.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(text) => fmt::Debug::fmt(text, f),
            None => write!(f, "b\"{}\"", self.0.escape_ascii()),
        }
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl From<&str> for Text {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl From<String> for Text {
    fn from(text: String) -> Self {
        Self(text.into_bytes())
    }
}

impl From<&[u8]> for Text {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Text {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl PartialEq<&str> for Text {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

/// UTF-8 values serialize as strings, anything else as a byte string.
impl Serialize for Text {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_str() {
            Some(text) => serializer.serialize_str(text),
            None => serializer.serialize_bytes(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for Text {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TextVisitor)
    }
}

struct TextVisitor;

impl de::Visitor<'_> for TextVisitor {
    type Value = Text;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or byte string")
    }

    fn visit_str<E: de::Error>(self, text: &str) -> Result<Text, E> {
        Ok(text.into())
    }

    fn visit_string<E: de::Error>(self, text: String) -> Result<Text, E> {
        Ok(text.into())
    }

    fn visit_bytes<E: de::Error>(self, bytes: &[u8]) -> Result<Text, E> {
        Ok(bytes.into())
    }

    fn visit_byte_buf<E: de::Error>(self, bytes: Vec<u8>) -> Result<Text, E> {
        Ok(bytes.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_text_reads_as_str() {
        let text = Text::from("vote.iost");
        assert_eq!(text.as_str(), Some("vote.iost"));
        assert_eq!(text.len(), 9);
        assert_eq!(text, "vote.iost");
        assert_eq!(format!("{text:?}"), "\"vote.iost\"");
    }

    #[test]
    fn non_utf8_bytes_are_kept() {
        let text = Text::from(vec![0x61, 0xff, 0xfe]);
        assert_eq!(text.as_str(), None);
        assert_eq!(text.as_bytes(), [0x61, 0xff, 0xfe]);
        assert_eq!(text.to_string(), "a\u{fffd}\u{fffd}");
        assert_eq!(format!("{text:?}"), "b\"a\\xff\\xfe\"");
    }

    #[test]
    fn cbor_keeps_string_and_byte_forms() {
        for text in [Text::from("return 1;"), Text::from(vec![0xc3, 0x28])] {
            let mut cbor = Vec::new();
            ciborium::into_writer(&text, &mut cbor).unwrap();
            // Major type 3 (text) for UTF-8, 2 (bytes) otherwise
            let major = cbor[0] >> 5;
            assert_eq!(major, if text.as_str().is_some() { 3 } else { 2 });

            let back: Text = ciborium::from_reader(cbor.as_slice()).unwrap();
            assert_eq!(back, text);
        }
    }
}
