//! Anything that decodes must re-encode to a buffer that decodes to the same
//! record, and whose size matches the size pass.

#![no_main]

use ctwire_proto::{Contract, Message};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(contract) = Contract::decode(data) else {
        return;
    };

    let encoded = contract.encode().unwrap();
    assert_eq!(encoded.len(), contract.encoded_len());

    let again = Contract::decode(&encoded).unwrap();
    assert_eq!(again, contract);
    assert_eq!(again.encode().unwrap(), encoded);
});
