#![allow(clippy::unwrap_used, clippy::expect_used)]

use core::cmp::Ordering;

use extcbor::{
    Base10, BigInt, CborObject, ErrorCode, ExtendedDecimal, ExtendedFloat, ExtendedRational,
    Flags, PrecisionContext, Rounding,
};

fn dec(s: &str) -> ExtendedDecimal {
    s.parse().unwrap()
}

#[test]
fn rounding_modes_at_one_digit() {
    let modes = [
        Rounding::HalfEven,
        Rounding::HalfUp,
        Rounding::HalfDown,
        Rounding::Up,
        Rounding::Down,
        Rounding::Ceiling,
        Rounding::Floor,
    ];
    let table: [(&str, [i64; 7]); 6] = [
        ("5.5", [6, 6, 5, 6, 5, 6, 5]),
        ("2.5", [2, 3, 2, 3, 2, 3, 2]),
        ("1.6", [2, 2, 2, 2, 1, 2, 1]),
        ("1.1", [1, 1, 1, 2, 1, 2, 1]),
        ("-1.1", [-1, -1, -1, -2, -1, -1, -2]),
        ("-2.5", [-2, -3, -2, -3, -2, -2, -3]),
    ];
    for (input, expected) in table {
        for (mode, want) in modes.iter().zip(expected) {
            let ctx = PrecisionContext::for_precision_and_rounding(1, *mode);
            let got = dec(input).round_to_precision(&ctx).unwrap();
            assert_eq!(
                got.compare_to(&ExtendedDecimal::from(want)),
                Ordering::Equal,
                "{input} {mode:?} gave {got}"
            );
        }
    }
}

#[test]
fn round_reports_flags() {
    let ctx = PrecisionContext::for_precision(2);
    let r = ctx.round::<Base10>(false, &BigInt::from(125), &BigInt::from(-2));
    assert_eq!(r.mantissa, BigInt::from(12));
    assert_eq!(r.exponent, BigInt::from(-1));
    assert!(r.is_inexact());
    assert!(r.flags.contains(Flags::ROUNDED));
    assert!(!r.infinite);

    let r = ctx.round::<Base10>(false, &BigInt::from(1200), &BigInt::from(0));
    assert_eq!(r.mantissa, BigInt::from(12));
    assert_eq!(r.exponent, BigInt::from(2));
    assert!(!r.is_inexact());
    assert!(r.flags.contains(Flags::ROUNDED));
}

#[test]
fn standard_contexts() {
    let third = ExtendedDecimal::one()
        .divide_with(&dec("3"), &PrecisionContext::DECIMAL128)
        .unwrap();
    assert_eq!(third.to_string(), format!("0.{}", "3".repeat(34)));

    let huge = dec("9.999999E+96");
    let over = huge
        .multiply_with(&ExtendedDecimal::ten(), &PrecisionContext::DECIMAL32)
        .unwrap();
    assert!(over.is_positive_infinity());

    let down = PrecisionContext::DECIMAL32.with_rounding(Rounding::Down);
    let capped = huge.multiply_with(&ExtendedDecimal::ten(), &down).unwrap();
    assert_eq!(capped.compare_to(&huge), Ordering::Equal);

    let f = ExtendedFloat::from_f64(0.1)
        .round_to_precision(&PrecisionContext::BINARY32)
        .unwrap();
    assert_eq!(f.to_f32(), 0.1f32);
}

#[test]
fn traps_become_errors() {
    let ctx = PrecisionContext::for_precision(5).with_traps(Flags::INEXACT);
    let err = ExtendedDecimal::one().divide_with(&dec("3"), &ctx).unwrap_err();
    assert!(err.is_arithmetic());
    assert!(matches!(err.code, ErrorCode::Trapped(f) if f.contains(Flags::INEXACT)));

    assert!(dec("1").divide_with(&dec("4"), &ctx).is_ok());
}

#[test]
fn exact_division_needs_a_terminating_expansion() {
    let err = ExtendedDecimal::one().divide(&dec("3")).unwrap_err();
    assert_eq!(err.code, ErrorCode::NonTerminatingDivision);

    let quarter = ExtendedFloat::one().divide(&ExtendedFloat::from(4)).unwrap();
    assert_eq!(quarter.to_f64(), 0.25);
    let fifth = ExtendedFloat::one().divide(&ExtendedFloat::from(5)).unwrap_err();
    assert_eq!(fifth.code, ErrorCode::NonTerminatingDivision);
    assert_eq!(dec("1").divide(&dec("5")).unwrap().to_string(), "0.2");

    let inf = dec("1").divide(&dec("0")).unwrap();
    assert!(inf.is_positive_infinity());
    assert!(dec("0").divide(&dec("0")).unwrap().is_nan());
}

#[test]
fn binary_and_decimal_conversions() {
    assert_eq!(dec("0.1").to_f64(), 0.1);
    assert_eq!(
        ExtendedFloat::from_f64(0.1).to_extended_decimal().to_string(),
        "0.1000000000000000055511151231257827021181583404541015625"
    );
    assert_eq!(ExtendedDecimal::from_f64(-0.0).to_f64().to_bits(), (-0.0f64).to_bits());
    assert_eq!(dec("1E+400").to_f64(), f64::INFINITY);
    assert_eq!(dec("-1E-400").to_f64().to_bits(), (-0.0f64).to_bits());

    let nan = dec("-NaN42");
    assert!(nan.is_quiet_nan());
    assert!(nan.is_negative());
    assert_eq!(nan.to_string(), "-NaN42");
    assert!(dec("sNaN").is_signaling_nan());
}

fn adjusted_bits(f: &ExtendedFloat) -> BigInt {
    f.exponent() + BigInt::from(f.unsigned_mantissa().bit_length()) - BigInt::one()
}

#[test]
fn huge_exponents_convert_without_exact_powers() {
    let k = 1_099_511_627_776i64;
    let tiny = ExtendedDecimal::new(BigInt::one(), BigInt::from(-k));
    let f = tiny.to_extended_float();
    assert!(f.is_finite() && !f.is_zero() && !f.is_negative());
    // log2(10^-k) = -3652498566964.43...
    assert_eq!(adjusted_bits(&f), BigInt::from(-3_652_498_566_965i64));
    assert!(f.unsigned_mantissa().bit_length() <= 113);
    assert_eq!(tiny.to_f64(), 0.0);

    let wire = CborObject::decode(&hex::decode("c4823b000000ffffffffff01").unwrap()).unwrap();
    assert_eq!(wire.as_extended_float().unwrap(), f);

    let huge = ExtendedDecimal::new(BigInt::from(3), BigInt::from(k));
    let f = huge.to_extended_float();
    assert_eq!(adjusted_bits(&f), BigInt::from(3_652_498_566_966i64));
    assert_eq!(huge.to_f64(), f64::INFINITY);

    let binary = ExtendedFloat::new(BigInt::one(), BigInt::from(k));
    let text = binary.to_string();
    assert!(text.starts_with("8.05723224506582382563102683907876"), "{text}");
    assert!(text.ends_with("E+330985980541"), "{text}");

    let ctx = PrecisionContext::BINARY64;
    let rounded =
        ExtendedFloat::from_extended_decimal_with(&dec("1E-1000000000"), &ctx.with_unlimited_exponents())
            .unwrap();
    assert_eq!(rounded.unsigned_mantissa().bit_length(), 53);
}

#[test]
fn rationals() {
    let half = ExtendedRational::new(BigInt::from(2), BigInt::from(4)).unwrap();
    assert_eq!(half.to_string(), "2/4");
    assert_eq!(half.reduce().to_string(), "1/2");
    assert_eq!(half.compare_to(&half.reduce()), Ordering::Equal);

    let third = ExtendedRational::new(BigInt::from(1), BigInt::from(3)).unwrap();
    assert_eq!(third.to_f64(), 1.0 / 3.0);
    let sum = half.add(&third).reduce();
    assert_eq!(sum.to_string(), "5/6");
    assert_eq!(sum.subtract(&third).compare_to(&half), Ordering::Equal);

    let err = ExtendedRational::new(BigInt::from(1), BigInt::zero()).unwrap_err();
    assert_eq!(err.code, ErrorCode::DivideByZero);

    assert_eq!(
        ExtendedRational::from_f64(0.375).to_extended_decimal(&PrecisionContext::UNLIMITED).unwrap(),
        dec("0.375")
    );
}

#[test]
fn bigints() {
    let two_200 = BigInt::one().shl(200);
    assert_eq!(
        two_200.to_string(),
        "1606938044258990275541962092341162602522202993782792835301376"
    );
    assert_eq!(two_200.bit_length(), 201);
    assert_eq!(
        BigInt::from_str_radix(&two_200.to_string_radix(16), 16).unwrap(),
        two_200
    );
    assert_eq!((&two_200 - &BigInt::one()).to_string_radix(2), "1".repeat(200));
    assert_eq!(BigInt::from(-7).modulo(&BigInt::from(3)).unwrap(), BigInt::from(2));
    assert_eq!(BigInt::from(12).gcd(&BigInt::from(-18)), BigInt::from(6));
    assert!(BigInt::from_str_radix("12z", 10).is_err());
}

#[test]
fn object_arithmetic_mixes_representations() {
    let one = CborObject::from(1);
    let half = CborObject::Decimal(dec("0.5"));
    let sum = one.addition(&half).unwrap();
    assert!(matches!(sum, CborObject::Decimal(_)));
    assert_eq!(sum.compare_to(&CborObject::Decimal(dec("1.5"))), Ordering::Equal);

    let quarter = one.divide(&CborObject::from(4)).unwrap();
    let expected = ExtendedRational::new(BigInt::from(1), BigInt::from(4)).unwrap();
    assert_eq!(quarter.compare_to(&CborObject::Rational(expected)), Ordering::Equal);
    assert_eq!(
        CborObject::from(8).divide(&CborObject::from(4)).unwrap().compare_to(&2.into()),
        Ordering::Equal
    );

    let err = one.divide(&CborObject::from(0)).unwrap_err();
    assert_eq!(err.code, ErrorCode::DivideByZero);
    assert!(CborObject::from(1.0).divide(&CborObject::from(0.0)).unwrap().is_positive_infinity());

    assert_eq!(
        CborObject::from(7).remainder(&CborObject::from(-2)).unwrap(),
        CborObject::Integer(1)
    );
    assert_eq!(
        CborObject::from(i64::MIN).negate().unwrap(),
        CborObject::from(9_223_372_036_854_775_808u64)
    );
    assert_eq!(
        CborObject::from(-3).abs().unwrap(),
        CborObject::Integer(3)
    );

    let err = CborObject::from("1").addition(&one).unwrap_err();
    assert_eq!(err.code, ErrorCode::TypeMismatch);
}
