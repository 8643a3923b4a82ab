// Property-based tests for the codec, the total order and the numeric tower.
//
// Sizes and depths stay small to keep CI fast.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use core::cmp::Ordering;

use proptest::prelude::*;

use extcbor::{
    BigInt, CborObject, DecodeLimits, ExtendedDecimal, ExtendedFloat, ExtendedRational,
    PrecisionContext,
};

fn arb_key() -> impl Strategy<Value = String> {
    proptest::collection::vec(proptest::char::range('a', 'z'), 0..8)
        .prop_map(|chars| chars.into_iter().collect())
}

fn arb_bigint() -> impl Strategy<Value = BigInt> {
    (any::<bool>(), proptest::collection::vec(any::<u8>(), 0..24)).prop_map(|(neg, mag)| {
        let n = BigInt::from_be_magnitude(&mag);
        if neg {
            n.negate()
        } else {
            n
        }
    })
}

fn arb_decimal() -> impl Strategy<Value = ExtendedDecimal> {
    (any::<i64>(), -400i64..400).prop_map(|(m, e)| ExtendedDecimal::new(m.into(), e.into()))
}

fn arb_number() -> impl Strategy<Value = CborObject> {
    prop_oneof![
        any::<i64>().prop_map(CborObject::Integer),
        arb_bigint().prop_map(CborObject::from_bigint),
        any::<f64>().prop_map(CborObject::Double),
        any::<f32>().prop_map(CborObject::Single),
        arb_decimal().prop_map(CborObject::Decimal),
        (any::<i64>(), -80i64..80)
            .prop_map(|(m, e)| CborObject::Float(ExtendedFloat::new(m.into(), e.into()))),
        (any::<i64>(), 1u64..u64::MAX).prop_map(|(n, d)| {
            CborObject::Rational(ExtendedRational::new(n.into(), d.into()).unwrap())
        }),
    ]
}

/// The value as a decimal, if it is finite and has a terminating decimal expansion.
fn exact_decimal(v: &CborObject) -> Option<ExtendedDecimal> {
    let d = v.as_extended_decimal().ok()?;
    if !d.is_finite() {
        return None;
    }
    let exact = v.as_extended_rational().ok()?;
    (exact.compare_to(&ExtendedRational::from_extended_decimal(&d)) == Ordering::Equal).then_some(d)
}

fn arb_leaf() -> impl Strategy<Value = CborObject> {
    prop_oneof![
        arb_number(),
        proptest::collection::vec(any::<u8>(), 0..32).prop_map(CborObject::ByteString),
        any::<String>().prop_map(CborObject::TextString),
        any::<bool>().prop_map(CborObject::Bool),
        Just(CborObject::Null),
        Just(CborObject::Undefined),
        prop_oneof![0u8..=19, 32u8..=255].prop_map(CborObject::Simple),
    ]
}

fn arb_value() -> impl Strategy<Value = CborObject> {
    arb_leaf().prop_recursive(4, 128, 8, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..8).prop_map(CborObject::Array),
            proptest::collection::vec((arb_key(), inner.clone()), 0..8).prop_map(|pairs| {
                pairs
                    .into_iter()
                    .map(|(k, v)| (CborObject::from(k), v))
                    .collect::<CborObject>()
            }),
            // Tag numbers below 30 that carry no numeric meaning.
            (6u64..=29, inner).prop_map(|(tag, v)| CborObject::tagged(tag, v).unwrap()),
        ]
    })
}

fn arb_json_value() -> impl Strategy<Value = CborObject> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(CborObject::Integer),
        arb_bigint().prop_map(CborObject::from_bigint),
        any::<String>().prop_map(CborObject::TextString),
        any::<bool>().prop_map(CborObject::Bool),
        Just(CborObject::Null),
    ];
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..8).prop_map(CborObject::Array),
            proptest::collection::vec((any::<String>(), inner), 0..8).prop_map(|pairs| {
                pairs
                    .into_iter()
                    .map(|(k, v)| (CborObject::from(k), v))
                    .collect::<CborObject>()
            }),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn encode_decode_roundtrip(v in arb_value()) {
        let bytes = v.encode_to_bytes().unwrap();
        let decoded = CborObject::decode(&bytes).unwrap();
        prop_assert_eq!(&decoded, &v);
        prop_assert_eq!(decoded.encode_to_bytes().unwrap(), bytes);
    }

    #[test]
    fn read_matches_decode(v in arb_value()) {
        let bytes = v.encode_to_bytes().unwrap();
        let read = CborObject::read(bytes.as_slice(), &DecodeLimits::default()).unwrap();
        prop_assert_eq!(read, v);
    }

    #[test]
    fn decoder_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = CborObject::decode(&bytes);
        let _ = CborObject::decode_sequence(&bytes);
    }

    #[test]
    fn mutated_encodings_never_panic(v in arb_value(), at in any::<usize>(), byte in any::<u8>()) {
        let mut bytes = v.encode_to_bytes().unwrap();
        let i = at % bytes.len();
        bytes[i] = byte;
        if let Ok(decoded) = CborObject::decode(&bytes) {
            prop_assert!(decoded.encode_to_bytes().is_ok());
        }
        bytes.truncate(i);
        prop_assert!(CborObject::decode(&bytes).is_err());
    }

    #[test]
    fn compare_to_is_reciprocal(a in arb_value(), b in arb_value()) {
        prop_assert_eq!(a.compare_to(&a), Ordering::Equal);
        prop_assert_eq!(a.compare_to(&b), b.compare_to(&a).reverse());
        if a == b {
            prop_assert_eq!(a.compare_to(&b), Ordering::Equal);
        }
    }

    #[test]
    fn compare_to_is_transitive(a in arb_number(), b in arb_number(), c in arb_number()) {
        let mut v = [a, b, c];
        v.sort_by(CborObject::compare_to);
        prop_assert_ne!(v[0].compare_to(&v[1]), Ordering::Greater);
        prop_assert_ne!(v[1].compare_to(&v[2]), Ordering::Greater);
        prop_assert_ne!(v[0].compare_to(&v[2]), Ordering::Greater);
    }

    #[test]
    fn representations_agree_on_order(a in any::<i64>(), b in any::<i64>()) {
        let ia = CborObject::from(a);
        let ib = CborObject::from(b);
        let da = CborObject::Decimal(ExtendedDecimal::from(a));
        let rb = CborObject::Rational(ExtendedRational::from(b));
        prop_assert_eq!(ia.compare_to(&ib), a.cmp(&b));
        prop_assert_eq!(da.compare_to(&rb), a.cmp(&b));
        prop_assert_eq!(da.compare_to(&ia), Ordering::Equal);
    }

    #[test]
    fn decimal_strings_roundtrip(d in arb_decimal()) {
        let sci: ExtendedDecimal = d.to_scientific_string().parse().unwrap();
        prop_assert_eq!(&sci, &d);
        let eng: ExtendedDecimal = d.to_engineering_string().parse().unwrap();
        prop_assert_eq!(eng.compare_to(&d), Ordering::Equal);
        let plain: ExtendedDecimal = d.to_plain_string().parse().unwrap();
        prop_assert_eq!(plain.compare_to(&d), Ordering::Equal);
    }

    #[test]
    fn bigint_matches_i128(a in any::<i64>(), b in any::<i64>()) {
        let (x, y) = (BigInt::from(a), BigInt::from(b));
        let (a, b) = (i128::from(a), i128::from(b));
        prop_assert_eq!((&x + &y).to_i128(), Some(a + b));
        prop_assert_eq!((&x - &y).to_i128(), Some(a - b));
        prop_assert_eq!((&x * &y).to_i128(), Some(a * b));
        prop_assert_eq!(x.cmp(&y), a.cmp(&b));
        if b != 0 {
            let (q, r) = x.div_rem(&y).unwrap();
            prop_assert_eq!(q.to_i128(), Some(a / b));
            prop_assert_eq!(r.to_i128(), Some(a % b));
            prop_assert_eq!(x.modulo(&y).unwrap().to_i128(), Some(a.rem_euclid(b)));
        }
        prop_assert_eq!(x.to_string(), a.to_string());
        prop_assert_eq!(BigInt::from_bytes(&x.to_bytes(true), true), x);
    }

    #[test]
    fn bigint_text_roundtrip(n in arb_bigint(), radix in 2u32..=36) {
        let s = n.to_string_radix(radix);
        prop_assert_eq!(BigInt::from_str_radix(&s, radix).unwrap(), n);
    }

    #[test]
    fn exact_arithmetic_undoes_itself(a in arb_decimal(), b in arb_decimal()) {
        let sum = a.add(&b);
        prop_assert_eq!(sum.subtract(&b).compare_to(&a), Ordering::Equal);
        if !b.is_zero() {
            let product = a.multiply(&b);
            prop_assert_eq!(product.divide(&b).unwrap().compare_to(&a), Ordering::Equal);
        }
    }

    #[test]
    fn object_arithmetic_matches_decimal_arithmetic(a in arb_number(), b in arb_number()) {
        let (Some(da), Some(db)) = (exact_decimal(&a), exact_decimal(&b)) else {
            return Ok(());
        };
        let agrees = |v: CborObject, want: &ExtendedDecimal| {
            exact_decimal(&v).is_some_and(|got| got.compare_to(want) == Ordering::Equal)
        };
        prop_assert!(agrees(a.addition(&b).unwrap(), &da.add(&db)));
        prop_assert!(agrees(a.subtract(&b).unwrap(), &da.subtract(&db)));
        prop_assert!(agrees(a.multiply(&b).unwrap(), &da.multiply(&db)));
        if db.is_zero() {
            return Ok(());
        }

        let q = a.divide(&b).unwrap();
        let exact = a.as_extended_rational().unwrap().divide(&b.as_extended_rational().unwrap());
        let got = q.as_extended_rational().unwrap();
        // Rounded quotients carry at least 34 digits or 113 bits.
        let tolerance = ExtendedRational::new(BigInt::one(), BigInt::from(10u32).pow(32)).unwrap();
        let error = got.subtract(&exact).abs();
        prop_assert_ne!(error.compare_to(&exact.abs().multiply(&tolerance)), Ordering::Greater);
        if matches!((&a, &b), (CborObject::Decimal(_), CborObject::Decimal(_))) {
            let want = da
                .divide(&db)
                .or_else(|_| da.divide_with(&db, &PrecisionContext::for_precision(34)))
                .unwrap();
            prop_assert!(agrees(q, &want));
        }
    }

    #[test]
    fn object_arithmetic_matches_i128(a in any::<i64>(), b in any::<i64>()) {
        let (x, y) = (CborObject::from(a), CborObject::from(b));
        let (a, b) = (i128::from(a), i128::from(b));
        prop_assert_eq!(x.addition(&y).unwrap(), CborObject::from(a + b));
        prop_assert_eq!(x.subtract(&y).unwrap(), CborObject::from(a - b));
        prop_assert_eq!(x.multiply(&y).unwrap(), CborObject::from(a * b));
        if b != 0 {
            prop_assert_eq!(x.remainder(&y).unwrap(), CborObject::from(a % b));
            let q = x.divide(&y).unwrap();
            prop_assert_eq!(q.multiply(&y).unwrap().compare_to(&x), Ordering::Equal);
        }
    }

    #[test]
    fn json_roundtrip(v in arb_json_value()) {
        let text = v.to_json_string();
        let back = CborObject::from_json_str(&text).unwrap();
        prop_assert_eq!(back, v);
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 5000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn f64_survives_extended_float(x in any::<f64>()) {
        let ef = ExtendedFloat::from_f64(x);
        prop_assert_eq!(ef.to_f64().to_bits(), x.to_bits());
        if x.is_finite() {
            let ed = ExtendedDecimal::from_f64(x);
            prop_assert_eq!(ed.to_f64().to_bits(), x.to_bits());
            prop_assert_eq!(ed.to_extended_float().compare_to(&ef), Ordering::Equal);
        }
    }

    #[test]
    fn f32_survives_extended_float(x in any::<f32>()) {
        prop_assert_eq!(ExtendedFloat::from_f32(x).to_f32().to_bits(), x.to_bits());
        if x.is_finite() {
            let ed = ExtendedDecimal::from_f32(x);
            prop_assert_eq!(ed.to_f32().to_bits(), x.to_bits());
            prop_assert_eq!(ed.to_f64().to_bits(), f64::from(x).to_bits());
        }
    }
}
