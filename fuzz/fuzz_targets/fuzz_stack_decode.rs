#![no_main]

use libfuzzer_sys::fuzz_target;
use squircle_cache::codec::{decode, encode};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 8192 {
        return;
    }

    // decode must never panic.
    let Ok(stack) = decode(text) else {
        return;
    };

    // Whatever decodes must survive a re-encode.
    let again = decode(&encode(&stack)).expect("re-encoded blob must decode");
    assert_eq!(again, stack, "re-encode changed the stack");
});
