//! Arbitrary bytes through the contract decoder.
//!
//! Decoding must return (Ok or Err) without panicking, and a tight recursion
//! limit must never be exceeded on the stack.

#![no_main]

use ctwire_proto::{Contract, DecodeOptions, Message};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = Contract::decode(data);

    let tight = DecodeOptions { recursion_limit: 4, ..DecodeOptions::default() };
    let _ = Contract::decode_with(data, &tight);
});
