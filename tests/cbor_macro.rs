#![allow(clippy::unwrap_used, clippy::expect_used)]

use extcbor::{cbor, BigInt, CborObject, ErrorCode, ExtendedDecimal};

#[test]
fn cbor_macro_primitives() {
    assert_eq!(cbor!(null).unwrap(), CborObject::Null);
    assert_eq!(cbor!(undefined).unwrap(), CborObject::Undefined);
    assert_eq!(cbor!(true).unwrap(), CborObject::Bool(true));
    assert_eq!(cbor!(false).unwrap(), CborObject::Bool(false));
    assert_eq!(cbor!("hi").unwrap(), CborObject::from("hi"));
    assert_eq!(cbor!(b"hi").unwrap(), CborObject::ByteString(vec![0x68, 0x69]));
    assert_eq!(cbor!(42).unwrap(), CborObject::Integer(42));
    assert_eq!(cbor!(1.5f64).unwrap(), CborObject::Double(1.5));
    assert_eq!(cbor!(1.5f32).unwrap(), CborObject::Single(1.5));
}

#[test]
fn cbor_macro_numeric_tower() {
    let big: BigInt = "123456789012345678901234567890".parse().unwrap();
    assert_eq!(cbor!(big.clone()).unwrap(), CborObject::BigInteger(big));

    let d: ExtendedDecimal = "2.50".parse().unwrap();
    let v = cbor!({ price: (d) }).unwrap();
    assert_eq!(v.get_str("price").unwrap().as_extended_decimal().unwrap(), d);
}

#[test]
fn cbor_macro_array_and_map_keep_order() {
    let v = cbor!([1, true, null]).unwrap();
    assert_eq!(v.encode_to_bytes().unwrap(), vec![0x83, 0x01, 0xf5, 0xf6]);

    let v = cbor!({ b: 2, a: 1 }).unwrap();
    assert_eq!(
        v.encode_to_bytes().unwrap(),
        vec![0xa2, 0x61, 0x62, 0x02, 0x61, 0x61, 0x01]
    );
}

#[test]
fn cbor_macro_duplicate_keys_error() {
    let err = cbor!({ a: 1, a: 2 }).unwrap_err();
    assert_eq!(err.code, ErrorCode::DuplicateMapKey);

    let err = cbor!({ 1: "x", (1i64): "y" }).unwrap_err();
    assert_eq!(err.code, ErrorCode::DuplicateMapKey);
}

#[test]
fn cbor_macro_key_ident_vs_expr() {
    let key = "dynamic";

    let v = cbor!({ key: 1 }).unwrap();
    assert!(v.get_str("key").is_some());
    assert!(v.get_str(key).is_none());

    let v = cbor!({ (key): 1 }).unwrap();
    assert!(v.get_str("dynamic").is_some());
    assert!(v.get_str("key").is_none());
}

#[test]
fn cbor_macro_non_text_keys() {
    let v = cbor!({ 7: "seven", (-1): "minus one", (b"k"): null }).unwrap();
    assert_eq!(v.get(&CborObject::from(7)).unwrap().as_str().unwrap(), "seven");
    assert_eq!(v.get(&CborObject::from(-1)).unwrap().as_str().unwrap(), "minus one");
    assert!(v.get(&CborObject::from(&b"k"[..])).unwrap().is_null());
}

#[test]
fn cbor_macro_nested() {
    let inner = vec![1u32, 2, 3];
    let v = cbor!({
        list: [[], {}, [null]],
        (String::from("vec")): (inner),
        trailing: "comma",
    })
    .unwrap();
    assert_eq!(v.len(), 3);
    let list = v.get_str("list").unwrap().as_array().unwrap();
    assert!(list[0].as_array().unwrap().is_empty());
    assert!(list[1].as_map().unwrap().is_empty());
    assert_eq!(list[2].len(), 1);
    assert_eq!(v.get_str("vec").unwrap().len(), 3);
    assert_eq!(v.to_json_string(), r#"{"list":[[],{},[null]],"vec":[1,2,3],"trailing":"comma"}"#);
}
