#![no_main]
use ipmatch::addr::{VersionHint, from_number, narrow, parse_text, to_text};
use ipmatch::to_number;
use libfuzzer_sys::fuzz_target;
use num_bigint::BigUint;

fuzz_target!(|data: &[u8]| {
    let _ = to_text(data, VersionHint::Any);
    let _ = to_text(data, VersionHint::V4);
    let _ = to_text(data, VersionHint::V6);

    if data.len() != 4 && data.len() != 16 {
        return;
    }

    // Rendering then parsing returns the same real bytes.
    let text = to_text(data, VersionHint::Any);
    let parsed = parse_text(&text).unwrap();
    assert_eq!(narrow(parsed.as_bytes()), narrow(data));

    // Number form survives a trip through from_number.
    let n = to_number(&text);
    assert_eq!(n, BigUint::from_bytes_be(narrow(data)));
    let back = from_number(&n, VersionHint::Any).unwrap();
    assert_eq!(BigUint::from_bytes_be(back.as_bytes()), n);
});
