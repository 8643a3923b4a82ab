#![allow(clippy::unwrap_used)]

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use extcbor::{CborObject, DecodeLimits, ExtendedDecimal, PrecisionContext};

fn sample_small() -> Vec<u8> {
    vec![0xa1, 0x61, 0x61, 0x01] // {"a":1}
}

fn sample_medium() -> CborObject {
    let mut map = CborObject::new_map();
    for i in 0..64_i64 {
        let price: ExtendedDecimal = format!("{i}.{:02}", i % 100).parse().unwrap();
        map.insert(format!("k{i:03}"), CborObject::from(price)).unwrap();
    }
    map.insert("big", CborObject::from_json_str("123456789012345678901234567890").unwrap())
        .unwrap();
    map.insert("f", 0.1).unwrap();
    map
}

fn bench_codec(c: &mut Criterion) {
    let small = sample_small();
    let small_limits = DecodeLimits::for_bytes(small.len());

    c.bench_function("decode_small", |b| {
        b.iter(|| {
            let v = CborObject::decode_with_limits(black_box(&small), &small_limits).unwrap();
            black_box(v);
        })
    });

    let medium = sample_medium().encode_to_bytes().unwrap();
    let medium_limits = DecodeLimits::for_bytes(medium.len());

    c.bench_function("decode_medium", |b| {
        b.iter(|| {
            let v = CborObject::decode_with_limits(black_box(&medium), &medium_limits).unwrap();
            black_box(v);
        })
    });

    let decoded = CborObject::decode(&medium).unwrap();
    c.bench_function("encode_medium", |b| {
        b.iter(|| {
            let bytes = black_box(&decoded).encode_to_bytes().unwrap();
            black_box(bytes);
        })
    });
}

fn bench_json(c: &mut Criterion) {
    let value = sample_medium();
    let text = value.to_json_string();

    c.bench_function("json_parse_medium", |b| {
        b.iter(|| {
            let v = CborObject::from_json_str(black_box(&text)).unwrap();
            black_box(v);
        })
    });

    c.bench_function("json_write_medium", |b| {
        b.iter(|| black_box(black_box(&value).to_json_string()))
    });
}

fn bench_decimal(c: &mut Criterion) {
    let a: ExtendedDecimal = "12345.6789".parse().unwrap();
    let b3: ExtendedDecimal = "3".parse().unwrap();

    c.bench_function("decimal_multiply", |b| {
        b.iter(|| black_box(black_box(&a).multiply(black_box(&b3))))
    });

    c.bench_function("decimal_divide_decimal128", |b| {
        b.iter(|| {
            let q = black_box(&a)
                .divide_with(black_box(&b3), &PrecisionContext::DECIMAL128)
                .unwrap();
            black_box(q);
        })
    });

    c.bench_function("decimal_to_string", |b| {
        b.iter(|| black_box(black_box(&a).to_string()))
    });
}

criterion_group!(benches, bench_codec, bench_json, bench_decimal);
criterion_main!(benches);
