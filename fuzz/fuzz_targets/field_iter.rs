//! Schema-less field iteration over arbitrary bytes.
//!
//! Spans must tile the input from the start with no gaps, and iteration must
//! stop after the first error.

#![no_main]

use ctwire_proto::FieldIter;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut expected_start = 0;
    let mut failed = false;

    for field in FieldIter::new(data) {
        assert!(!failed, "iterator yielded after an error");
        match field {
            Ok(field) => {
                assert_eq!(field.range.start, expected_start);
                assert_eq!(field.bytes, &data[field.range.clone()]);
                expected_start = field.range.end;
            },
            Err(_) => failed = true,
        }
    }

    if !failed {
        assert_eq!(expected_start, data.len());
    }
});
