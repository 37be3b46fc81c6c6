//! Wire codec for smart contract descriptors.
//!
//! A contract descriptor is a small tree of records (Contract -> Info -> ABI
//! entries -> Amount limits) serialized as length-delimited tag/varint
//! fields. The format is byte-compatible with any standard encoder that uses
//! the same field numbers, so producers and consumers outside this crate can
//! interoperate with it directly.
//!
//! Records never carry codec logic. Each publishes a static field layout and
//! hands out typed views of its fields; one encoder and one decoder work
//! against that [`Schema`] for every record type.
//!
//! # Compatibility
//!
//! Fields the current schema does not recognise are kept byte-for-byte in a
//! per-record trailer and written back after the known fields, so a
//! decode/encode cycle through an older schema version loses nothing. Legacy
//! group fields are understood for skipping but never produced.
//!
//! # Limits
//!
//! Decoding is linear in input size plus nesting depth. [`DecodeOptions`]
//! caps both; there are no other timeouts.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod decode;
pub mod encode;
pub mod errors;
pub mod merge;
pub mod records;
pub mod schema;
pub mod skip;
pub mod text;
pub mod varint;
pub mod wire;

pub use decode::DecodeOptions;
pub use errors::{ProtocolError, Result};
pub use records::{Abi, Amount, Contract, Info};
pub use schema::{Message, Schema, UnknownFields};
pub use skip::{FieldIter, RawField};
pub use text::Text;
pub use wire::{Tag, WireType};
