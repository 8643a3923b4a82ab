#![allow(clippy::unwrap_used, clippy::expect_used)]

use extcbor::{tags, BigInt, CborObject, CborType, ErrorCode, ExtendedDecimal};

#[test]
fn simple_values_and_constants() {
    assert_eq!(CborObject::from_simple_value(20).unwrap(), CborObject::FALSE);
    assert_eq!(CborObject::from_simple_value(23).unwrap(), CborObject::UNDEFINED);
    assert_eq!(CborObject::from_simple_value(0).unwrap(), CborObject::Simple(0));
    for v in 24..=31 {
        let err = CborObject::from_simple_value(v).unwrap_err();
        assert_eq!(err.code, ErrorCode::SimpleValueOutOfRange);
    }
    assert_eq!(CborObject::NULL.simple_value().unwrap(), 22);
    assert_eq!(CborObject::Simple(99).simple_value().unwrap(), 99);
    assert_eq!(CborObject::from(1).simple_value().unwrap_err().code, ErrorCode::TypeMismatch);
}

#[test]
fn tagging_interprets_numeric_tags() {
    let bignum = CborObject::tagged(tags::POSITIVE_BIGNUM, CborObject::ByteString(vec![1, 0])).unwrap();
    assert_eq!(bignum, CborObject::Integer(256));

    let frac = CborObject::tagged(
        tags::DECIMAL_FRACTION,
        CborObject::Array(vec![(-2).into(), 27315.into()]),
    )
    .unwrap();
    assert_eq!(frac.as_extended_decimal().unwrap().to_string(), "273.15");

    let err = CborObject::tagged(tags::RATIONAL, CborObject::from("1/2")).unwrap_err();
    assert_eq!(err.code, ErrorCode::MalformedNumericTag);

    let too_big: BigInt = "18446744073709551616".parse().unwrap();
    let err = CborObject::tagged_bigint(&too_big, CborObject::Null).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTag);
    let err = CborObject::tagged_bigint(&BigInt::from(-1), CborObject::Null).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTag);
    let ok = CborObject::tagged_bigint(&BigInt::from(u64::MAX), CborObject::Null).unwrap();
    assert_eq!(ok.tag(), Some(u64::MAX));
}

#[test]
fn tag_chains() {
    let v = CborObject::tagged(1, CborObject::tagged(2000, "x".into()).unwrap()).unwrap();
    assert_eq!(v.tags(), vec![1, 2000]);
    assert!(v.has_tag(2000));
    assert!(!v.has_tag(3));
    assert_eq!(v.untag(), &CborObject::from("x"));
    assert_eq!(v.as_str().unwrap(), "x");
    assert_eq!(v.cbor_type(), CborType::TextString);
    assert_eq!(v.clone().into_untagged(), CborObject::from("x"));
    assert_ne!(v, CborObject::from("x"));
}

#[test]
fn numeric_accessors() {
    let d = CborObject::Decimal("-7.9".parse().unwrap());
    assert_eq!(d.as_i32().unwrap(), -7);
    assert_eq!(d.as_bigint().unwrap(), BigInt::from(-7));
    assert_eq!(d.as_f64().unwrap(), -7.9);
    assert_eq!(d.signum().unwrap(), -1);
    assert!(!d.is_integral());
    assert_eq!(d.as_u64().unwrap_err().code, ErrorCode::Overflow);

    assert_eq!(CborObject::from(300).as_u8().unwrap_err().code, ErrorCode::Overflow);
    assert_eq!(CborObject::from(-1).as_u64().unwrap_err().code, ErrorCode::Overflow);
    assert_eq!(CborObject::from(u64::MAX).as_u64().unwrap(), u64::MAX);
    assert_eq!(CborObject::from(f64::NAN).as_i64().unwrap_err().code, ErrorCode::Overflow);
    assert_eq!(CborObject::from(f64::NAN).signum().unwrap_err().code, ErrorCode::NotFinite);
    assert_eq!(CborObject::from("1").as_i64().unwrap_err().code, ErrorCode::TypeMismatch);

    let huge = CborObject::Decimal("1E+100000".parse().unwrap());
    assert_eq!(huge.as_i64().unwrap_err().code, ErrorCode::Overflow);
    assert!(huge.is_integral());

    let half = CborObject::from(0.5);
    assert_eq!(half.as_extended_rational().unwrap().to_string(), "1/2");
    assert_eq!(half.as_extended_decimal().unwrap(), "0.5".parse::<ExtendedDecimal>().unwrap());
    assert!(CborObject::from(-0.0).is_zero());
    assert!(CborObject::Single(f32::NEG_INFINITY).is_negative_infinity());
}

#[test]
fn array_editing() {
    let mut arr = CborObject::new_array();
    arr.add(1).unwrap();
    arr.add("two").unwrap();
    arr.add(CborObject::Null).unwrap();
    assert_eq!(arr.len(), 3);

    let old = arr.set_index(0, 10).unwrap();
    assert_eq!(old, CborObject::Integer(1));
    assert_eq!(arr.set_index(5, 0).unwrap_err().code, ErrorCode::IndexOutOfRange);

    assert_eq!(arr.remove(&"two".into()).unwrap(), Some(CborObject::from("two")));
    assert_eq!(arr.remove(&"two".into()).unwrap(), None);
    let items: Vec<_> = arr.values().unwrap().cloned().collect();
    assert_eq!(items, [CborObject::from(10), CborObject::Null]);

    let mut text = CborObject::from("x");
    assert_eq!(text.add(1).unwrap_err().code, ErrorCode::NotAContainer);
}

#[test]
fn map_editing() {
    let mut m = CborObject::new_map();
    m.insert("a", 1).unwrap();
    m.insert(2, "b").unwrap();
    assert_eq!(m.insert("a", 9).unwrap_err().code, ErrorCode::KeyAlreadyExists);
    assert_eq!(m.get_str("a"), Some(&CborObject::Integer(1)));

    assert_eq!(m.set("a", 5).unwrap(), Some(CborObject::Integer(1)));
    assert_eq!(m.set("c", true).unwrap(), None);
    *m.get_mut(&CborObject::from(2)).unwrap() = CborObject::from("B");

    let keys: Vec<_> = m.keys().unwrap().cloned().collect();
    assert_eq!(keys, [CborObject::from("a"), 2.into(), "c".into()]);

    // A bignum key equal to a small integer finds the same entry.
    assert!(m.contains_key(&CborObject::BigInteger(BigInt::from(2))));

    assert_eq!(m.remove(&"a".into()).unwrap(), Some(CborObject::Integer(5)));
    let values: Vec<_> = m.values().unwrap().cloned().collect();
    assert_eq!(values, [CborObject::from("B"), CborObject::TRUE]);
    assert_eq!(m.to_json_string(), r#"{"2":"B","c":true}"#);

    let mut tagged = CborObject::tagged(6, CborObject::new_map()).unwrap();
    tagged.insert("k", 1).unwrap();
    assert_eq!(tagged.tag(), Some(6));
    assert_eq!(tagged.len(), 1);

    assert_eq!(CborObject::Null.keys().unwrap_err().code, ErrorCode::NotAContainer);
    assert_eq!(CborObject::Null.len(), 0);
    assert!(CborObject::Null.get_str("a").is_none());
}

#[test]
fn conversions_from_rust() {
    assert_eq!(CborObject::from(u64::MAX).cbor_type(), CborType::Number);
    assert!(matches!(CborObject::from(u64::MAX), CborObject::BigInteger(_)));
    assert!(matches!(CborObject::from(5u64), CborObject::Integer(5)));
    assert_eq!(CborObject::from('z'), CborObject::from("z"));
    assert_eq!(CborObject::from(None::<i32>), CborObject::Null);
    assert_eq!(CborObject::from(Some(3)), CborObject::Integer(3));
    let bytes: &[u8] = &[1, 2];
    assert_eq!(CborObject::from(bytes).cbor_type(), CborType::ByteString);
    let collected: CborObject = (1..=3).map(CborObject::from).collect();
    assert_eq!(collected.len(), 3);
}

#[cfg(feature = "sha2")]
#[test]
fn sha256_follows_encoding() {
    let a = extcbor::cbor!({ x: [1, 2] }).unwrap();
    let b = CborObject::decode(&a.encode_to_bytes().unwrap()).unwrap();
    assert_eq!(a.sha256().unwrap(), b.sha256().unwrap());

    let reordered = extcbor::cbor!({ y: 0, x: [1, 2] }).unwrap();
    let mut same_entries = extcbor::cbor!({ x: [1, 2], y: 0 }).unwrap();
    assert_eq!(reordered, same_entries);
    assert_ne!(reordered.sha256().unwrap(), same_entries.sha256().unwrap());

    same_entries.set("y", 1).unwrap();
    assert_ne!(a.sha256().unwrap(), same_entries.sha256().unwrap());
}
