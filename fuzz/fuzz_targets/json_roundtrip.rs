#![no_main]

use libfuzzer_sys::fuzz_target;

use extcbor::{CborObject, DecodeLimits};

fuzz_target!(|data: &[u8]| {
    let limits = DecodeLimits {
        max_depth: 64,
        ..DecodeLimits::for_bytes(data.len())
    };
    let Ok(v) = CborObject::from_json_bytes_with_limits(data, &limits) else {
        return;
    };

    // Parsed JSON only contains text keys, finite numbers and exact decimals, so the text form
    // parses back to an equal value.
    let text = v.to_json_string();
    let again = CborObject::from_json_str(&text).expect("reparse");
    assert_eq!(again, v);

    // A negative zero decimal loses its sign in CBOR, so compare encodings instead of values.
    let bytes = v.encode_to_bytes().expect("encode");
    let decoded = CborObject::decode(&bytes).expect("decode");
    assert_eq!(decoded.encode_to_bytes().expect("re-encode"), bytes);
});
