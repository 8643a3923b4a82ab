//! Arbitrary-precision floating point in radix 2 and radix 10.
//!
//! Both [`ExtendedDecimal`] and [`ExtendedFloat`] are instances of one generic type,
//! [`Extended<R>`], whose rounding, arithmetic and comparison algorithms are written once against
//! the [`Radix`] trait. A value is `(-1)^sign * mantissa * R^exponent` with an unsigned mantissa
//! and an unbounded exponent, or one of the special kinds.
//!
//! Zero keeps its sign and its exponent: `0.000` and `0E+2` are different representations of the
//! same number. `Eq` and `Hash` are representational; use [`Extended::compare_to`] for numeric
//! order.

use core::fmt;
use core::hash::Hash;
use core::marker::PhantomData;

use crate::bigint::BigInt;
use crate::{CborError, ErrorCode};

mod decimal;
mod float;
pub(crate) mod math;

mod private {
    pub trait Sealed {}
}

/// A numeric base for [`Extended`] values.
///
/// Implemented only by [`Base2`] and [`Base10`].
pub trait Radix:
    private::Sealed + Copy + Clone + fmt::Debug + Default + PartialEq + Eq + Hash + Send + Sync + 'static
{
    /// The base.
    const RADIX: u32;

    /// `RADIX^n`.
    fn pow(n: u64) -> BigInt;

    /// Number of base-`RADIX` digits in `m` (1 for zero).
    fn digit_count(m: &BigInt) -> u64;
}

/// Radix 2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Base2;

/// Radix 10.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Base10;

impl private::Sealed for Base2 {}
impl private::Sealed for Base10 {}

fn clamp_u32(n: u64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

impl Radix for Base2 {
    const RADIX: u32 = 2;

    fn pow(n: u64) -> BigInt {
        BigInt::one().shl(usize::try_from(n).unwrap_or(usize::MAX))
    }

    fn digit_count(m: &BigInt) -> u64 {
        m.magnitude_bits().max(1)
    }
}

impl Radix for Base10 {
    const RADIX: u32 = 10;

    fn pow(n: u64) -> BigInt {
        BigInt::from(10u32).pow(clamp_u32(n))
    }

    fn digit_count(m: &BigInt) -> u64 {
        let bits = m.magnitude_bits();
        if bits <= 1 {
            return 1;
        }
        // 1233/4096 is just below log10(2), so 10^d <= 2^(bits-1) <= |m|.
        let mut d = (bits - 1) * 1233 / 4096 + 1;
        let abs = m.abs();
        while abs >= Self::pow(d) {
            d += 1;
        }
        d
    }
}

/// What an [`Extended`] value represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A finite number.
    Finite,
    /// Positive or negative infinity.
    Infinity,
    /// A quiet NaN.
    QuietNaN,
    /// A signaling NaN.
    SignalingNaN,
}

/// An arbitrary-precision floating-point number in radix `R`.
pub struct Extended<R: Radix> {
    pub(crate) negative: bool,
    pub(crate) mantissa: BigInt,
    pub(crate) exponent: BigInt,
    pub(crate) kind: Kind,
    radix: PhantomData<R>,
}

/// An arbitrary-precision decimal floating-point number.
pub type ExtendedDecimal = Extended<Base10>;

/// An arbitrary-precision binary floating-point number.
pub type ExtendedFloat = Extended<Base2>;

impl<R: Radix> Clone for Extended<R> {
    fn clone(&self) -> Self {
        Self {
            negative: self.negative,
            mantissa: self.mantissa.clone(),
            exponent: self.exponent.clone(),
            kind: self.kind,
            radix: PhantomData,
        }
    }
}

impl<R: Radix> PartialEq for Extended<R> {
    fn eq(&self, other: &Self) -> bool {
        self.negative == other.negative
            && self.kind == other.kind
            && self.mantissa == other.mantissa
            && self.exponent == other.exponent
    }
}

impl<R: Radix> Eq for Extended<R> {}

impl<R: Radix> Hash for Extended<R> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.negative.hash(state);
        self.kind.hash(state);
        self.mantissa.hash(state);
        self.exponent.hash(state);
    }
}

impl<R: Radix> fmt::Debug for Extended<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.negative { "-" } else { "" };
        match self.kind {
            Kind::Finite => write!(f, "{sign}{}*{}^{}", self.mantissa, R::RADIX, self.exponent),
            Kind::Infinity => write!(f, "{sign}Infinity"),
            Kind::QuietNaN => write!(f, "{sign}NaN({})", self.mantissa),
            Kind::SignalingNaN => write!(f, "{sign}sNaN({})", self.mantissa),
        }
    }
}

impl<R: Radix> Default for Extended<R> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<R: Radix> Extended<R> {
    pub(crate) const fn raw(negative: bool, mantissa: BigInt, exponent: BigInt, kind: Kind) -> Self {
        Self {
            negative,
            mantissa,
            exponent,
            kind,
            radix: PhantomData,
        }
    }

    pub(crate) fn finite(negative: bool, mantissa: BigInt, exponent: BigInt) -> Self {
        Self::raw(negative, mantissa.abs(), exponent, Kind::Finite)
    }

    /// Construct `mantissa * R^exponent` from a signed mantissa.
    #[must_use]
    pub fn new(mantissa: BigInt, exponent: BigInt) -> Self {
        Self::finite(mantissa.is_negative(), mantissa, exponent)
    }

    /// Construct from an explicit sign, an unsigned mantissa and an exponent.
    ///
    /// The sign of `mantissa` is ignored.
    #[must_use]
    pub fn from_parts(negative: bool, mantissa: BigInt, exponent: BigInt) -> Self {
        Self::finite(negative, mantissa, exponent)
    }

    /// Positive zero with exponent 0.
    #[must_use]
    pub const fn zero() -> Self {
        Self::raw(false, BigInt::zero(), BigInt::zero(), Kind::Finite)
    }

    /// Negative zero with exponent 0.
    #[must_use]
    pub const fn negative_zero() -> Self {
        Self::raw(true, BigInt::zero(), BigInt::zero(), Kind::Finite)
    }

    /// The value one.
    #[must_use]
    pub fn one() -> Self {
        Self::from(1i64)
    }

    /// The value ten.
    #[must_use]
    pub fn ten() -> Self {
        Self::from(10i64)
    }

    /// Positive infinity.
    #[must_use]
    pub const fn positive_infinity() -> Self {
        Self::raw(false, BigInt::zero(), BigInt::zero(), Kind::Infinity)
    }

    /// Negative infinity.
    #[must_use]
    pub const fn negative_infinity() -> Self {
        Self::raw(true, BigInt::zero(), BigInt::zero(), Kind::Infinity)
    }

    /// Signed infinity.
    #[must_use]
    pub const fn infinity(negative: bool) -> Self {
        Self::raw(negative, BigInt::zero(), BigInt::zero(), Kind::Infinity)
    }

    /// A quiet NaN with no payload.
    #[must_use]
    pub const fn nan() -> Self {
        Self::raw(false, BigInt::zero(), BigInt::zero(), Kind::QuietNaN)
    }

    /// A signaling NaN with no payload.
    #[must_use]
    pub const fn signaling_nan() -> Self {
        Self::raw(false, BigInt::zero(), BigInt::zero(), Kind::SignalingNaN)
    }

    /// A NaN carrying a diagnostic payload.
    #[must_use]
    pub fn nan_with_payload(negative: bool, payload: BigInt, signaling: bool) -> Self {
        let kind = if signaling {
            Kind::SignalingNaN
        } else {
            Kind::QuietNaN
        };
        Self::raw(negative, payload.abs(), BigInt::zero(), kind)
    }

    /// The kind of value.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        self.kind
    }

    /// Returns true iff the value is finite.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        matches!(self.kind, Kind::Finite)
    }

    /// Returns true iff the value is an infinity of either sign.
    #[must_use]
    pub const fn is_infinity(&self) -> bool {
        matches!(self.kind, Kind::Infinity)
    }

    /// Returns true iff the value is positive infinity.
    #[must_use]
    pub const fn is_positive_infinity(&self) -> bool {
        self.is_infinity() && !self.negative
    }

    /// Returns true iff the value is negative infinity.
    #[must_use]
    pub const fn is_negative_infinity(&self) -> bool {
        self.is_infinity() && self.negative
    }

    /// Returns true iff the value is a NaN of either kind.
    #[must_use]
    pub const fn is_nan(&self) -> bool {
        matches!(self.kind, Kind::QuietNaN | Kind::SignalingNaN)
    }

    /// Returns true iff the value is a quiet NaN.
    #[must_use]
    pub const fn is_quiet_nan(&self) -> bool {
        matches!(self.kind, Kind::QuietNaN)
    }

    /// Returns true iff the value is a signaling NaN.
    #[must_use]
    pub const fn is_signaling_nan(&self) -> bool {
        matches!(self.kind, Kind::SignalingNaN)
    }

    /// Returns true iff the sign bit is set (including negative zero and negative NaN).
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.negative
    }

    /// Returns true iff the value is a finite zero of either sign.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.is_finite() && self.mantissa.is_zero()
    }

    /// `-1`, `0` or `1`. NaN yields 0.
    #[must_use]
    pub fn signum(&self) -> i32 {
        match self.kind {
            Kind::QuietNaN | Kind::SignalingNaN => 0,
            _ if self.is_zero() => 0,
            _ if self.negative => -1,
            _ => 1,
        }
    }

    /// The signed mantissa (NaN payloads and infinities report their stored magnitude).
    #[must_use]
    pub fn mantissa(&self) -> BigInt {
        if self.negative {
            self.mantissa.negate()
        } else {
            self.mantissa.clone()
        }
    }

    /// The mantissa magnitude.
    #[must_use]
    pub const fn unsigned_mantissa(&self) -> &BigInt {
        &self.mantissa
    }

    /// The exponent.
    #[must_use]
    pub const fn exponent(&self) -> &BigInt {
        &self.exponent
    }

    /// Absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        let mut out = self.clone();
        out.negative = false;
        out
    }

    /// Flip the sign.
    #[must_use]
    pub fn negate(&self) -> Self {
        let mut out = self.clone();
        out.negative = !out.negative;
        out
    }

    /// Remove trailing zero digits from the mantissa, raising the exponent to match.
    ///
    /// Zero reduces to exponent 0. Non-finite values are returned unchanged.
    #[must_use]
    pub fn reduce(&self) -> Self {
        if !self.is_finite() {
            return self.clone();
        }
        if self.mantissa.is_zero() {
            return Self::finite(self.negative, BigInt::zero(), BigInt::zero());
        }
        let (m, stripped) = math::strip_trailing_zeros::<R>(&self.mantissa, None);
        Self::finite(self.negative, m, &self.exponent + BigInt::from(stripped))
    }

    /// Truncate toward zero to an integer.
    ///
    /// # Errors
    ///
    /// Returns `NotFinite` for infinities and NaNs.
    pub fn to_bigint(&self) -> Result<BigInt, CborError> {
        let (q, _) = self.integer_part()?;
        Ok(q)
    }

    /// Convert to an integer only if the value has no fractional part.
    ///
    /// # Errors
    ///
    /// Returns `NotFinite` for infinities and NaNs, `NotIntegral` if a fractional part exists.
    pub fn to_bigint_exact(&self) -> Result<BigInt, CborError> {
        let (q, exact) = self.integer_part()?;
        if exact {
            Ok(q)
        } else {
            Err(CborError::arithmetic(ErrorCode::NotIntegral))
        }
    }

    fn integer_part(&self) -> Result<(BigInt, bool), CborError> {
        if !self.is_finite() {
            return Err(CborError::arithmetic(ErrorCode::NotFinite));
        }
        let (mag, exact) = if !self.exponent.is_negative() {
            let e = self
                .exponent
                .to_u64()
                .ok_or_else(|| CborError::arithmetic(ErrorCode::Overflow))?;
            if self.mantissa.is_zero() {
                (BigInt::zero(), true)
            } else {
                (&self.mantissa * R::pow(e), true)
            }
        } else {
            let shift = self.exponent.negate();
            let digits = R::digit_count(&self.mantissa);
            match shift.to_u64() {
                Some(s) if s <= digits => {
                    let (q, r) = self.mantissa.div_rem_nonzero(&R::pow(s));
                    (q, r.is_zero())
                }
                _ => (BigInt::zero(), self.mantissa.is_zero()),
            }
        };
        let q = if self.negative { mag.negate() } else { mag };
        Ok((q, exact))
    }

    /// Returns true iff the value is finite with no fractional part.
    #[must_use]
    pub fn is_integral(&self) -> bool {
        if self.is_finite() && !self.exponent.is_negative() {
            return true;
        }
        self.integer_part().is_ok_and(|(_, exact)| exact)
    }
}

impl<R: Radix> From<i64> for Extended<R> {
    fn from(v: i64) -> Self {
        Self::new(BigInt::from(v), BigInt::zero())
    }
}

impl<R: Radix> From<BigInt> for Extended<R> {
    fn from(v: BigInt) -> Self {
        Self::new(v, BigInt::zero())
    }
}

impl<R: Radix> From<&BigInt> for Extended<R> {
    fn from(v: &BigInt) -> Self {
        Self::new(v.clone(), BigInt::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_digit_count() {
        for (s, d) in [("0", 1), ("9", 1), ("10", 2), ("999999999999", 12), ("1000000000000", 13)] {
            let v: BigInt = s.parse().unwrap();
            assert_eq!(Base10::digit_count(&v), d, "{s}");
        }
        assert_eq!(Base2::digit_count(&BigInt::from(8)), 4);
    }

    #[test]
    fn truncation_to_integer() {
        let d = ExtendedDecimal::new(BigInt::from(-12345), BigInt::from(-2));
        assert_eq!(d.to_bigint().unwrap(), BigInt::from(-123));
        assert_eq!(
            d.to_bigint_exact().unwrap_err().code,
            ErrorCode::NotIntegral
        );
        let tiny = ExtendedDecimal::new(BigInt::from(5), BigInt::from(-400));
        assert_eq!(tiny.to_bigint().unwrap(), BigInt::zero());
        assert_eq!(
            ExtendedDecimal::nan().to_bigint().unwrap_err().code,
            ErrorCode::NotFinite
        );
    }

    #[test]
    fn integral_with_huge_exponent() {
        let d = ExtendedDecimal::new(BigInt::from(3), BigInt::from(1_099_511_627_776i64));
        assert!(d.is_integral());
        let tiny = ExtendedDecimal::new(BigInt::from(3), BigInt::from(-1_099_511_627_776i64));
        assert!(!tiny.is_integral());
        assert!(!ExtendedDecimal::infinity(false).is_integral());
    }

    #[test]
    fn reduce_strips_zeros() {
        let d = ExtendedDecimal::new(BigInt::from(12300), BigInt::from(-1));
        let r = d.reduce();
        assert_eq!(r.unsigned_mantissa(), &BigInt::from(123));
        assert_eq!(r.exponent(), &BigInt::from(1));
    }
}
