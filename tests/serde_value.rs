#![cfg(feature = "serde")]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::BTreeMap;

use extcbor::{
    cbor, deserialize_from_slice, from_object, serialize_to_vec, to_object, BigInt, CborObject,
    DecodeLimits, ErrorCode, ExtendedDecimal, ExtendedRational,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
enum Status {
    Active,
    Suspended(String),
    Moved { to: u32 },
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Account {
    id: u64,
    owner: String,
    balance: ExtendedDecimal,
    limit: Option<BigInt>,
    tags: Vec<String>,
    status: Status,
    extra: BTreeMap<String, i32>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Envelope {
    details: CborObject,
    note: Option<CborObject>,
}

fn account() -> Account {
    Account {
        id: 42,
        owner: "ana".into(),
        balance: "1024.50".parse().unwrap(),
        limit: Some("340282366920938463463374607431768211456".parse().unwrap()),
        tags: vec!["a".into(), "b".into()],
        status: Status::Moved { to: 7 },
        extra: BTreeMap::from([("x".to_string(), -1)]),
    }
}

#[test]
fn struct_roundtrip_through_bytes() {
    let acct = account();
    let bytes = serialize_to_vec(&acct).unwrap();
    let decoded: Account = deserialize_from_slice(&bytes, &DecodeLimits::for_bytes(bytes.len())).unwrap();
    assert_eq!(decoded, acct);
}

#[test]
fn struct_layout_as_object() {
    let v = to_object(&account()).unwrap();
    assert_eq!(v.get_str("id"), Some(&CborObject::Integer(42)));
    assert_eq!(v.get_str("balance").unwrap().as_str().unwrap(), "1024.50");
    assert_eq!(
        v.get_str("status").unwrap().to_json_string(),
        r#"{"Moved":{"to":7}}"#
    );
    assert!(from_object::<Account>(&v).is_ok());

    let unit = to_object(&Status::Active).unwrap();
    assert_eq!(unit, CborObject::from("Active"));
    let newtype = to_object(&Status::Suspended("fraud".into())).unwrap();
    assert_eq!(newtype.to_json_string(), r#"{"Suspended":"fraud"}"#);
    assert_eq!(from_object::<Status>(&newtype).unwrap(), Status::Suspended("fraud".into()));
}

#[test]
fn value_fields_roundtrip() {
    let msg = Envelope {
        details: cbor!({"a": 1, "b": [true, null]}).unwrap(),
        note: None,
    };
    let bytes = serialize_to_vec(&msg).unwrap();
    let decoded: Envelope = deserialize_from_slice(&bytes, &DecodeLimits::default()).unwrap();
    assert_eq!(decoded, msg);

    let msg = Envelope {
        details: CborObject::ByteString(vec![1, 2]),
        note: Some(CborObject::from("hi")),
    };
    let bytes = serialize_to_vec(&msg).unwrap();
    let decoded: Envelope = deserialize_from_slice(&bytes, &DecodeLimits::default()).unwrap();
    assert_eq!(decoded, msg);
}

#[test]
fn numeric_types_use_text_in_other_formats() {
    let r = ExtendedRational::new(BigInt::from(1), BigInt::from(3)).unwrap();
    assert_eq!(serde_json::to_string(&r).unwrap(), "\"1/3\"");
    let back: ExtendedRational = serde_json::from_str("\"1/3\"").unwrap();
    assert_eq!(back, r);

    let d: ExtendedDecimal = serde_json::from_str("\"-2.5E+3\"").unwrap();
    assert_eq!(d.to_string(), "-2.5E+3");

    let v = CborObject::from_json_str(r#"{"n":[1,2.25,"x",null]}"#).unwrap();
    assert_eq!(serde_json::to_string(&v).unwrap(), r#"{"n":[1,"2.25","x",null]}"#);
}

#[test]
fn foreign_values_convert() {
    let json = serde_json::json!({"k": [1, -2, true, "s"], "f": 0.5});
    let v = to_object(&json).unwrap();
    assert_eq!(v.get_str("k").unwrap().len(), 4);
    assert_eq!(v.get_str("f"), Some(&CborObject::Double(0.5)));

    let back: serde_json::Value = from_object(&v).unwrap();
    assert_eq!(back, json);
}

#[test]
fn mismatches_report_codes() {
    let v = cbor!({ id: "not a number" }).unwrap();
    let err = from_object::<Account>(&v).unwrap_err();
    assert!(matches!(
        err.code,
        ErrorCode::TypeMismatch | ErrorCode::SerdeError
    ));

    let err = from_object::<u8>(&CborObject::from(300)).unwrap_err();
    assert_eq!(err.code, ErrorCode::Overflow);

    let bytes = hex::decode("a2616101616102").unwrap();
    let err = deserialize_from_slice::<BTreeMap<String, i32>>(&bytes, &DecodeLimits::default())
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DuplicateMapKey);
}
