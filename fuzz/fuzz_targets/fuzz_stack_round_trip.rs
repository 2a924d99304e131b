#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use squircle_cache::codec::{decode, encode};
use squircle_cache::{DELIMITER, EditRecord, EditStack};

#[derive(Debug, Arbitrary)]
struct Input {
    records: Vec<(String, String, u32)>,
}

fuzz_target!(|input: Input| {
    if input.records.len() > 256 {
        return;
    }

    let stack: EditStack = input
        .records
        .into_iter()
        .filter(|(old, new, _)| !old.contains(DELIMITER) && !new.contains(DELIMITER))
        .map(|(old, new, start)| EditRecord::new(old, new, start as usize))
        .collect();

    let blob = encode(&stack);
    assert_eq!(decode(&blob).expect("round trip decodes"), stack);

    // A buffered writer's trailing newline must not matter.
    let with_newline = format!("{blob}\n");
    assert_eq!(decode(&with_newline).expect("newline tolerated"), stack);
});
