#![no_main]

use core::cmp::Ordering;

use libfuzzer_sys::fuzz_target;

use extcbor::{CborObject, DecodeLimits};

fn fuzz_limits(input_len: usize) -> DecodeLimits {
    // Bignum and decimal arithmetic grows with the magnitude, so keep items small.
    let max = input_len.min(1 << 16);
    DecodeLimits {
        max_input_bytes: input_len,
        max_depth: 32,
        max_total_items: 1 << 12,
        max_array_len: 1 << 10,
        max_map_len: 1 << 10,
        max_bytes_len: max,
        max_text_len: max,
    }
}

fuzz_target!(|data: &[u8]| {
    let limits = fuzz_limits(data.len());
    let Ok(v) = CborObject::decode_with_limits(data, &limits) else {
        return;
    };

    // Whatever decodes must re-encode, and the re-encoding must decode to an equal value.
    let out = v.encode_to_bytes().expect("re-encode");
    let again = CborObject::decode_with_limits(&out, &DecodeLimits::for_bytes(out.len().max(1)))
        .expect("decode re-encoding");
    assert_eq!(again, v);
    assert_eq!(again.compare_to(&v), Ordering::Equal);

    // Encoding is deterministic once the value has been through the codec.
    assert_eq!(again.encode_to_bytes().expect("re-encode"), out);

    let _ = v.to_json_string();
});
