//! Numeric dispatch across the representations a [`CborObject`] can hold.
//!
//! Binary operations widen both operands to the wider of their tiers
//! (integer, binary float, decimal, rational) and compute exactly there.

use core::cmp::Ordering;

use crate::bigint::BigInt;
use crate::context::PrecisionContext;
use crate::extended::{ExtendedDecimal, ExtendedFloat, Kind};
use crate::rational::ExtendedRational;
use crate::{CborError, CborObject, ErrorCode};

/// Precision for binary quotients with no finite expansion.
pub(crate) const BINARY_DIVISION: PrecisionContext = PrecisionContext::for_precision(113);

/// Precision for decimal quotients with no finite expansion.
pub(crate) const DECIMAL_DIVISION: PrecisionContext = PrecisionContext::for_precision(34);

#[derive(Debug, Clone)]
pub(crate) enum Number {
    Int(BigInt),
    Float(ExtendedFloat),
    Decimal(ExtendedDecimal),
    Rational(ExtendedRational),
}

impl Number {
    pub(crate) fn of(obj: &CborObject) -> Option<Self> {
        Some(match obj.untag() {
            CborObject::Integer(v) => Self::Int(BigInt::from(*v)),
            CborObject::BigInteger(b) => Self::Int(b.clone()),
            CborObject::Double(v) => Self::Float(ExtendedFloat::from_f64(*v)),
            CborObject::Single(v) => Self::Float(ExtendedFloat::from_f32(*v)),
            CborObject::Decimal(d) => Self::Decimal(d.clone()),
            CborObject::Float(f) => Self::Float(f.clone()),
            CborObject::Rational(r) => Self::Rational(r.clone()),
            _ => return None,
        })
    }

    pub(crate) fn into_object(self) -> CborObject {
        match self {
            Self::Int(b) => CborObject::from_bigint(b),
            Self::Float(f) => f.into(),
            Self::Decimal(d) => d.into(),
            Self::Rational(r) => r.into(),
        }
    }

    const fn tier(&self) -> u8 {
        match self {
            Self::Int(_) => 0,
            Self::Float(_) => 1,
            Self::Decimal(_) => 2,
            Self::Rational(_) => 3,
        }
    }

    fn widen(self, tier: u8) -> Self {
        match (self, tier) {
            (Self::Int(b), 1) => Self::Float(ExtendedFloat::from(b)),
            (Self::Int(b), 2) => Self::Decimal(ExtendedDecimal::from(b)),
            (Self::Int(b), 3) => Self::Rational(ExtendedRational::from_bigint(b)),
            (Self::Float(f), 2) => Self::Decimal(ExtendedDecimal::from_extended_float(&f)),
            (Self::Float(f), 3) => Self::Rational(ExtendedRational::from_extended_float(&f)),
            (Self::Decimal(d), 3) => Self::Rational(ExtendedRational::from_extended_decimal(&d)),
            (n, _) => n,
        }
    }

    fn widen_pair(self, other: Self) -> (Self, Self) {
        let t = self.tier().max(other.tier());
        (self.widen(t), other.widen(t))
    }

    pub(crate) fn kind(&self) -> Kind {
        match self {
            Self::Int(_) => Kind::Finite,
            Self::Float(f) => f.kind(),
            Self::Decimal(d) => d.kind(),
            Self::Rational(r) => r.kind(),
        }
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.kind() == Kind::Finite
    }

    pub(crate) fn is_infinity(&self) -> bool {
        self.kind() == Kind::Infinity
    }

    pub(crate) fn is_nan(&self) -> bool {
        matches!(self.kind(), Kind::QuietNaN | Kind::SignalingNaN)
    }

    /// Sign of the value; NaN reports its sign bit.
    pub(crate) fn signum(&self) -> i32 {
        match self {
            Self::Int(b) => b.signum(),
            Self::Float(f) if f.is_nan() => nan_sign(f.is_negative()),
            Self::Decimal(d) if d.is_nan() => nan_sign(d.is_negative()),
            Self::Rational(r) if r.is_nan() => nan_sign(r.is_negative()),
            Self::Float(f) => f.signum(),
            Self::Decimal(d) => d.signum(),
            Self::Rational(r) => r.signum(),
        }
    }

    pub(crate) fn is_integral(&self) -> bool {
        match self {
            Self::Int(_) => true,
            Self::Float(f) => f.is_integral(),
            Self::Decimal(d) => d.is_integral(),
            Self::Rational(r) => r.to_bigint_exact().is_ok(),
        }
    }

    pub(crate) fn truncate(&self) -> Result<BigInt, CborError> {
        match self {
            Self::Int(b) => Ok(b.clone()),
            Self::Float(f) => f.to_bigint(),
            Self::Decimal(d) => d.to_bigint(),
            Self::Rational(r) => r.to_bigint(),
        }
    }

    /// Bounds `(lo, hi)` with `2^lo <= |x| < 2^hi` for a finite nonzero value.
    pub(crate) fn log2_bounds(&self) -> Option<(i64, i64)> {
        if !self.is_finite() || self.signum() == 0 {
            return None;
        }
        let bits = |b: &BigInt| i64::try_from(b.magnitude_bits()).unwrap_or(i64::MAX / 4);
        let exp = |e: &BigInt| e.to_i64().map_or_else(|| saturate(e), |v| v.clamp(-LIMIT, LIMIT));
        Some(match self {
            Self::Int(b) => {
                let n = bits(b);
                (n - 1, n)
            }
            Self::Float(f) => {
                let n = bits(f.unsigned_mantissa());
                let e = exp(f.exponent());
                (n - 1 + e, n + e)
            }
            Self::Decimal(d) => {
                let n = bits(d.unsigned_mantissa());
                let e = i128::from(exp(d.exponent()));
                // log2(10) ~= 3.321928095, with slack for the truncated constant.
                let scaled = e * 3_321_928_095 / 1_000_000_000;
                let scaled = i64::try_from(scaled).unwrap_or(if e < 0 { -LIMIT * 4 } else { LIMIT * 4 });
                (n - 1 + scaled - 2, n + scaled + 2)
            }
            Self::Rational(r) => {
                let d = bits(r.unsigned_numerator()) - bits(r.denominator());
                (d - 1, d + 1)
            }
        })
    }

    pub(crate) fn to_f64(&self) -> f64 {
        match self {
            Self::Int(b) => ExtendedFloat::from(b).to_f64(),
            Self::Float(f) => f.to_f64(),
            Self::Decimal(d) => d.to_f64(),
            Self::Rational(r) => r.to_f64(),
        }
    }

    pub(crate) fn to_f32(&self) -> f32 {
        match self {
            Self::Int(b) => ExtendedFloat::from(b).to_f32(),
            Self::Float(f) => f.to_f32(),
            Self::Decimal(d) => d.to_f32(),
            Self::Rational(r) => r.to_f32(),
        }
    }

    pub(crate) fn to_decimal(&self, ctx: &PrecisionContext) -> Result<ExtendedDecimal, CborError> {
        Ok(match self {
            Self::Int(b) => ExtendedDecimal::from(b),
            Self::Float(f) => ExtendedDecimal::from_extended_float(f),
            Self::Decimal(d) => d.clone(),
            Self::Rational(r) => r.to_extended_decimal_exact_if_possible(ctx)?,
        })
    }

    pub(crate) fn to_float(&self, ctx: &PrecisionContext) -> Result<ExtendedFloat, CborError> {
        Ok(match self {
            Self::Int(b) => ExtendedFloat::from(b),
            Self::Float(f) => f.clone(),
            Self::Decimal(d) => ExtendedFloat::from_extended_decimal(d),
            Self::Rational(r) => r.to_extended_float_exact_if_possible(ctx)?,
        })
    }

    pub(crate) fn to_rational(&self) -> ExtendedRational {
        match self {
            Self::Int(b) => ExtendedRational::from_bigint(b.clone()),
            Self::Float(f) => ExtendedRational::from_extended_float(f),
            Self::Decimal(d) => ExtendedRational::from_extended_decimal(d),
            Self::Rational(r) => r.clone(),
        }
    }

    fn add(self, other: Self) -> Self {
        match self.widen_pair(other) {
            (Self::Int(a), Self::Int(b)) => Self::Int(a + b),
            (Self::Float(a), Self::Float(b)) => Self::Float(a.add(&b)),
            (Self::Decimal(a), Self::Decimal(b)) => Self::Decimal(a.add(&b)),
            (a, b) => Self::Rational(a.to_rational().add(&b.to_rational())),
        }
    }

    fn subtract(self, other: Self) -> Self {
        match self.widen_pair(other) {
            (Self::Int(a), Self::Int(b)) => Self::Int(a - b),
            (Self::Float(a), Self::Float(b)) => Self::Float(a.subtract(&b)),
            (Self::Decimal(a), Self::Decimal(b)) => Self::Decimal(a.subtract(&b)),
            (a, b) => Self::Rational(a.to_rational().subtract(&b.to_rational())),
        }
    }

    fn multiply(self, other: Self) -> Self {
        match self.widen_pair(other) {
            (Self::Int(a), Self::Int(b)) => Self::Int(a * b),
            (Self::Float(a), Self::Float(b)) => Self::Float(a.multiply(&b)),
            (Self::Decimal(a), Self::Decimal(b)) => Self::Decimal(a.multiply(&b)),
            (a, b) => Self::Rational(a.to_rational().multiply(&b.to_rational())),
        }
    }

    fn divide(self, other: Self) -> Result<Self, CborError> {
        Ok(match self.widen_pair(other) {
            (Self::Int(a), Self::Int(b)) => {
                let (q, r) = a.div_rem(&b)?;
                if r.is_zero() {
                    Self::Int(q)
                } else {
                    Self::Rational(ExtendedRational::new(a, b)?.reduce())
                }
            }
            (Self::Float(a), Self::Float(b)) => Self::Float(exact_or(&a, &b, &BINARY_DIVISION)?),
            (Self::Decimal(a), Self::Decimal(b)) => {
                Self::Decimal(exact_or(&a, &b, &DECIMAL_DIVISION)?)
            }
            (a, b) => Self::Rational(a.to_rational().divide(&b.to_rational())),
        })
    }

    /// `a - b * trunc(a / b)`, computed in the tier of the operands.
    fn remainder(self, other: Self) -> Result<Self, CborError> {
        if other.is_finite() && other.signum() == 0 {
            return Err(CborError::arithmetic(ErrorCode::DivideByZero));
        }
        let tier = self.tier().max(other.tier());
        if let (Self::Int(a), Self::Int(b)) = (&self, &other) {
            return Ok(Self::Int(a.remainder(b)?));
        }
        if self.is_nan() || other.is_nan() || self.is_infinity() {
            return Ok(Self::Float(ExtendedFloat::nan()));
        }
        if other.is_infinity() {
            return Ok(self.widen(tier));
        }
        let a = self.to_rational();
        let b = other.to_rational();
        let q = ExtendedRational::from_bigint(a.divide(&b).to_bigint()?);
        let r = a.subtract(&b.multiply(&q));
        // The remainder of two terminating values terminates in the same radix.
        Ok(match tier {
            1 => Self::Float(r.to_extended_float_exact_if_possible(&BINARY_DIVISION)?),
            2 => Self::Decimal(r.to_extended_decimal_exact_if_possible(&DECIMAL_DIVISION)?),
            _ => Self::Rational(r),
        })
    }

    fn negate(self) -> Self {
        match self {
            Self::Int(b) => Self::Int(b.negate()),
            Self::Float(f) => Self::Float(f.negate()),
            Self::Decimal(d) => Self::Decimal(d.negate()),
            Self::Rational(r) => Self::Rational(r.negate()),
        }
    }

    fn abs(self) -> Self {
        match self {
            Self::Int(b) => Self::Int(b.abs()),
            Self::Float(f) => Self::Float(f.abs()),
            Self::Decimal(d) => Self::Decimal(d.abs()),
            Self::Rational(r) => Self::Rational(r.abs()),
        }
    }

    /// Exact comparison of two finite values.
    pub(crate) fn cmp_finite(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Int(_), Self::Float(_)) | (Self::Float(_), Self::Int(_)) => {
                let (a, b) = self.clone().widen_pair(other.clone());
                a.cmp_finite(&b)
            }
            (Self::Int(_) | Self::Decimal(_), Self::Decimal(_)) | (Self::Decimal(_), Self::Int(_)) => {
                self.to_decimal(&PrecisionContext::UNLIMITED)
                    .ok()
                    .zip(other.to_decimal(&PrecisionContext::UNLIMITED).ok())
                    .map_or(Ordering::Equal, |(a, b)| a.compare_to(&b))
            }
            (Self::Float(a), Self::Float(b)) => a.compare_to(b),
            _ => self.to_rational().compare_to(&other.to_rational()),
        }
    }
}

const LIMIT: i64 = 1 << 60;

fn saturate(e: &BigInt) -> i64 {
    if e.is_negative() {
        -LIMIT
    } else {
        LIMIT
    }
}

const fn nan_sign(negative: bool) -> i32 {
    if negative {
        -1
    } else {
        1
    }
}

fn exact_or<R: crate::extended::Radix>(
    a: &crate::extended::Extended<R>,
    b: &crate::extended::Extended<R>,
    ctx: &PrecisionContext,
) -> Result<crate::extended::Extended<R>, CborError> {
    match a.divide(b) {
        Err(e) if e.code == ErrorCode::NonTerminatingDivision => a.divide_with(b, ctx),
        other => other,
    }
}

impl CborObject {
    fn binary(
        &self,
        other: &Self,
        op: impl FnOnce(Number, Number) -> Result<Number, CborError>,
    ) -> Result<Self, CborError> {
        let a = self.number()?;
        let b = other.number()?;
        op(a, b).map(Number::into_object)
    }

    /// The exact sum, in the wider representation of the two operands.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if either operand is not a number.
    pub fn addition(&self, other: &Self) -> Result<Self, CborError> {
        self.binary(other, |a, b| Ok(a.add(b)))
    }

    /// The exact difference.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if either operand is not a number.
    pub fn subtract(&self, other: &Self) -> Result<Self, CborError> {
        self.binary(other, |a, b| Ok(a.subtract(b)))
    }

    /// The exact product.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if either operand is not a number.
    pub fn multiply(&self, other: &Self) -> Result<Self, CborError> {
        self.binary(other, |a, b| Ok(a.multiply(b)))
    }

    /// The quotient.
    ///
    /// Integers that do not divide evenly give a rational. Binary and decimal quotients are
    /// exact when they terminate, otherwise rounded half-even to 113 bits or 34 digits.
    /// Non-integer division by zero gives a signed infinity (or NaN for `0/0`).
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if either operand is not a number, or `DivideByZero` for an
    /// integer divided by integer zero.
    pub fn divide(&self, other: &Self) -> Result<Self, CborError> {
        self.binary(other, Number::divide)
    }

    /// The truncated-division remainder, carrying the dividend's sign.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if either operand is not a number, or `DivideByZero` if the divisor
    /// is zero.
    pub fn remainder(&self, other: &Self) -> Result<Self, CborError> {
        self.binary(other, Number::remainder)
    }

    /// The value with its sign flipped.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if this is not a number.
    pub fn negate(&self) -> Result<Self, CborError> {
        Ok(self.number()?.negate().into_object())
    }

    /// The absolute value.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if this is not a number.
    pub fn abs(&self) -> Result<Self, CborError> {
        Ok(self.number()?.abs().into_object())
    }
}
