#![allow(clippy::unwrap_used, clippy::expect_used)]

use extcbor::{
    BigInt, CborError, CborObject, Encoder, ErrorCode, ExtendedDecimal, ExtendedFloat,
    ExtendedRational,
};

fn encode_one(f: impl FnOnce(&mut Encoder) -> Result<(), CborError>) -> Vec<u8> {
    let mut enc = Encoder::new();
    f(&mut enc).unwrap();
    enc.into_vec()
}

fn hex_of(v: &CborObject) -> String {
    hex::encode(v.encode_to_bytes().unwrap())
}

#[test]
fn encode_uint_boundaries() {
    assert_eq!(encode_one(|e| e.int(0)), vec![0x00]);
    assert_eq!(encode_one(|e| e.int(23)), vec![0x17]);
    assert_eq!(encode_one(|e| e.int(24)), vec![0x18, 0x18]);
    assert_eq!(encode_one(|e| e.int(255)), vec![0x18, 0xff]);
    assert_eq!(encode_one(|e| e.int(256)), vec![0x19, 0x01, 0x00]);
    assert_eq!(encode_one(|e| e.int(65_535)), vec![0x19, 0xff, 0xff]);
    assert_eq!(
        encode_one(|e| e.int(65_536)),
        vec![0x1a, 0x00, 0x01, 0x00, 0x00]
    );
    assert_eq!(
        encode_one(|e| e.uint(u64::MAX)),
        vec![0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
    );

    let mut expected = vec![0x1b];
    expected.extend_from_slice(&i64::MAX.to_be_bytes());
    assert_eq!(encode_one(|e| e.int(i64::MAX)), expected);
}

#[test]
fn encode_nint_boundaries() {
    assert_eq!(encode_one(|e| e.int(-1)), vec![0x20]);
    assert_eq!(encode_one(|e| e.int(-24)), vec![0x37]);
    assert_eq!(encode_one(|e| e.int(-25)), vec![0x38, 0x18]);
    assert_eq!(encode_one(|e| e.int(-256)), vec![0x38, 0xff]);
    assert_eq!(encode_one(|e| e.int(-257)), vec![0x39, 0x01, 0x00]);
    assert_eq!(encode_one(|e| e.int(-65_536)), vec![0x39, 0xff, 0xff]);
    assert_eq!(
        encode_one(|e| e.int(-65_537)),
        vec![0x3a, 0x00, 0x01, 0x00, 0x00]
    );

    let mut expected = vec![0x3b];
    expected.extend_from_slice(&i64::MAX.to_be_bytes());
    assert_eq!(encode_one(|e| e.int(i64::MIN)), expected);
}

#[test]
fn bigints_pick_major_type_or_tag() {
    let cases = [
        ("18446744073709551615", "1bffffffffffffffff"),
        ("18446744073709551616", "c249010000000000000000"),
        ("-18446744073709551616", "3bffffffffffffffff"),
        ("-18446744073709551617", "c349010000000000000000"),
        ("-9223372036854775809", "3b8000000000000000"),
    ];
    for (dec, hex) in cases {
        let n: BigInt = dec.parse().unwrap();
        assert_eq!(hex::encode(encode_one(|e| e.bigint(&n))), hex, "{dec}");
        assert_eq!(hex_of(&CborObject::from_bigint(n)), hex, "{dec}");
    }
}

#[test]
fn floats_keep_their_width() {
    assert_eq!(hex_of(&CborObject::Double(1.1)), "fb3ff199999999999a");
    assert_eq!(hex_of(&CborObject::Double(-0.0)), "fb8000000000000000");
    assert_eq!(hex_of(&CborObject::Single(1.5)), "fa3fc00000");
    assert_eq!(hex_of(&CborObject::Double(f64::INFINITY)), "fb7ff0000000000000");
    assert_eq!(hex::encode(encode_one(|e| e.f32(100_000.0))), "fa47c35000");
}

#[test]
fn extended_numbers_use_numeric_tags() {
    let d: ExtendedDecimal = "273.15".parse().unwrap();
    assert_eq!(hex_of(&d.into()), "c48221196ab3");

    let d: ExtendedDecimal = "-1.5E+400".parse().unwrap();
    let bytes = CborObject::from(d.clone()).encode_to_bytes().unwrap();
    assert_eq!(&bytes[..3], [0xc4, 0x82, 0x19]);
    assert_eq!(CborObject::decode(&bytes).unwrap(), CborObject::Decimal(d));

    assert_eq!(hex_of(&ExtendedFloat::from_f64(1.5).into()), "c5822003");

    let r = ExtendedRational::new(BigInt::from(-1), BigInt::from(3)).unwrap();
    assert_eq!(hex_of(&r.into()), "d81e822003");

    // Exponents outside the i64 range switch to tags 264/265.
    let wide = ExtendedDecimal::new(BigInt::one(), BigInt::one().shl(64));
    assert!(hex_of(&wide.into()).starts_with("d9010882c2"));

    // Non-finite extended values have no tagged form.
    assert_eq!(
        hex_of(&ExtendedDecimal::negative_infinity().into()),
        "fbfff0000000000000"
    );
    let nan = CborObject::from(ExtendedFloat::nan()).encode_to_bytes().unwrap();
    assert!(CborObject::decode(&nan).unwrap().is_nan());
}

#[test]
fn simple_values_skip_reserved_range() {
    assert_eq!(hex_of(&CborObject::Simple(16)), "f0");
    assert_eq!(hex_of(&CborObject::Simple(255)), "f8ff");
    let err = CborObject::Simple(24).encode_to_bytes().unwrap_err();
    assert_eq!(err.code, ErrorCode::SimpleValueOutOfRange);
    assert_eq!(CborObject::from_simple_value(24).unwrap_err().code, ErrorCode::SimpleValueOutOfRange);
}

#[test]
fn containers_keep_insertion_order() {
    let mut m = CborObject::new_map();
    m.insert("b", 1).unwrap();
    m.insert("a", 2).unwrap();
    assert_eq!(hex_of(&m), "a2616201616102");

    let arr: CborObject = vec![CborObject::from(1), CborObject::from("x")].into();
    assert_eq!(hex_of(&arr), "82016178");

    let tagged = CborObject::tagged(32, "http://a".into()).unwrap();
    assert_eq!(hex_of(&tagged), "d82068687474703a2f2f61");
}

#[test]
fn builders_match_value_encoding() {
    let built = encode_one(|e| {
        e.map(2, |m| {
            m.entry("a", |e| {
                e.array(3, |a| {
                    a.int(1)?;
                    a.text("x")?;
                    a.null()
                })
            })?;
            m.entry_value(&CborObject::from(7), |e| e.bool(true))
        })
    });

    let mut v = CborObject::new_map();
    v.insert(
        "a",
        CborObject::Array(vec![1.into(), "x".into(), CborObject::Null]),
    )
    .unwrap();
    v.insert(7, true).unwrap();
    assert_eq!(built, v.encode_to_bytes().unwrap());
}

#[test]
fn builder_errors_leave_no_partial_output() {
    let mut enc = Encoder::new();
    enc.int(5).unwrap();

    let err = enc.array(2, |a| a.int(1)).unwrap_err();
    assert_eq!(err.code, ErrorCode::LengthMismatch);
    assert_eq!(enc.as_bytes(), [0x05]);

    let err = enc
        .map(2, |m| {
            m.entry("k", |e| e.int(1))?;
            m.entry("k", |e| e.int(2))
        })
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DuplicateMapKey);
    assert_eq!(enc.as_bytes(), [0x05]);

    let err = enc.array(1, |a| {
        a.int(1)?;
        a.int(2)
    });
    assert_eq!(err.unwrap_err().code, ErrorCode::LengthMismatch);
    assert_eq!(enc.len(), 1);
}

#[test]
fn write_to_streams_the_same_bytes() {
    let v = CborObject::Array(vec![1.into(), "two".into(), 3.5.into()]);
    let mut out = Vec::new();
    v.write_to(&mut out).unwrap();
    assert_eq!(out, v.encode_to_bytes().unwrap());
}

#[test]
fn sequences_concatenate() {
    let items = [CborObject::from(1), CborObject::from("a"), CborObject::Null];
    let mut bytes = Vec::new();
    for item in &items {
        item.write_to(&mut bytes).unwrap();
    }
    assert_eq!(CborObject::decode_sequence(&bytes).unwrap(), items);
}
