#![no_main]

use libfuzzer_sys::fuzz_target;

use extcbor::{CborObject, DecodeLimits};

fn fuzz_limits(input_len: usize) -> DecodeLimits {
    let max = input_len.min(1 << 20);
    DecodeLimits {
        max_input_bytes: input_len,
        max_depth: 64,
        max_total_items: 1 << 16,
        max_array_len: 1 << 12,
        max_map_len: 1 << 12,
        max_bytes_len: max,
        max_text_len: max,
    }
}

fuzz_target!(|data: &[u8]| {
    let limits = fuzz_limits(data.len());
    let _ = CborObject::decode_with_limits(data, &limits);
    let _ = CborObject::read(data, &limits);
});
