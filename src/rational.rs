//! Arbitrary-precision rational numbers.

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use crate::bigint::BigInt;
use crate::context::PrecisionContext;
use crate::extended::{Extended, ExtendedDecimal, ExtendedFloat, Kind, Radix};
use crate::ieee::{self, Format};
use crate::{CborError, ErrorCode};

/// A rational number `(-1)^sign * numerator / denominator`.
///
/// Fractions are not kept in lowest terms; [`ExtendedRational::reduce`] normalizes explicitly.
/// Infinity has a zero denominator. `Eq`/`Hash` are representational (`1/2 != 2/4`); numeric
/// comparison is [`ExtendedRational::compare_to`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtendedRational {
    negative: bool,
    numerator: BigInt,
    denominator: BigInt,
    kind: Kind,
}

impl Default for ExtendedRational {
    fn default() -> Self {
        Self::zero()
    }
}

impl ExtendedRational {
    fn finite(negative: bool, numerator: BigInt, denominator: BigInt) -> Self {
        Self {
            negative,
            numerator: numerator.abs(),
            denominator: denominator.abs(),
            kind: Kind::Finite,
        }
    }

    /// Construct `numerator / denominator` from signed integers.
    ///
    /// # Errors
    ///
    /// Returns `DivideByZero` if `denominator` is zero.
    pub fn new(numerator: BigInt, denominator: BigInt) -> Result<Self, CborError> {
        if denominator.is_zero() {
            return Err(CborError::arithmetic(ErrorCode::DivideByZero));
        }
        let negative = numerator.is_negative() != denominator.is_negative();
        Ok(Self::finite(negative, numerator, denominator))
    }

    /// An integer as `n/1`.
    #[must_use]
    pub fn from_bigint(n: BigInt) -> Self {
        Self::finite(n.is_negative(), n, BigInt::one())
    }

    /// An integer as `n/1`.
    #[must_use]
    pub fn from_i64(n: i64) -> Self {
        Self::from_bigint(BigInt::from(n))
    }

    /// Positive zero.
    #[must_use]
    pub fn zero() -> Self {
        Self::finite(false, BigInt::zero(), BigInt::one())
    }

    /// Negative zero.
    #[must_use]
    pub fn negative_zero() -> Self {
        Self::finite(true, BigInt::zero(), BigInt::one())
    }

    /// Signed infinity.
    #[must_use]
    pub const fn infinity(negative: bool) -> Self {
        Self {
            negative,
            numerator: BigInt::zero(),
            denominator: BigInt::zero(),
            kind: Kind::Infinity,
        }
    }

    /// Positive infinity.
    #[must_use]
    pub const fn positive_infinity() -> Self {
        Self::infinity(false)
    }

    /// Negative infinity.
    #[must_use]
    pub const fn negative_infinity() -> Self {
        Self::infinity(true)
    }

    /// A quiet NaN.
    #[must_use]
    pub const fn nan() -> Self {
        Self {
            negative: false,
            numerator: BigInt::zero(),
            denominator: BigInt::zero(),
            kind: Kind::QuietNaN,
        }
    }

    fn from_extended<R: Radix>(x: &Extended<R>) -> Self {
        match x.kind() {
            Kind::Infinity => return Self::infinity(x.is_negative()),
            Kind::QuietNaN | Kind::SignalingNaN => {
                return Self {
                    negative: x.is_negative(),
                    numerator: x.unsigned_mantissa().clone(),
                    denominator: BigInt::zero(),
                    kind: x.kind(),
                }
            }
            Kind::Finite => {}
        }
        let m = x.unsigned_mantissa();
        let e = x.exponent();
        let scale = |n: &BigInt| R::pow(n.to_u64().unwrap_or(u64::MAX));
        if e.is_negative() {
            Self::finite(x.is_negative(), m.clone(), scale(&e.negate()))
        } else if m.is_zero() {
            Self::finite(x.is_negative(), BigInt::zero(), BigInt::one())
        } else {
            Self::finite(x.is_negative(), m * scale(e), BigInt::one())
        }
    }

    /// The exact value of a decimal.
    #[must_use]
    pub fn from_extended_decimal(d: &ExtendedDecimal) -> Self {
        Self::from_extended(d)
    }

    /// The exact value of a binary float.
    #[must_use]
    pub fn from_extended_float(f: &ExtendedFloat) -> Self {
        Self::from_extended(f)
    }

    /// The exact value of a double.
    #[must_use]
    pub fn from_f64(v: f64) -> Self {
        Self::from_extended(&ExtendedFloat::from_f64(v))
    }

    /// The exact value of a single.
    #[must_use]
    pub fn from_f32(v: f32) -> Self {
        Self::from_extended(&ExtendedFloat::from_f32(v))
    }

    /// The signed numerator.
    #[must_use]
    pub fn numerator(&self) -> BigInt {
        if self.negative {
            self.numerator.negate()
        } else {
            self.numerator.clone()
        }
    }

    /// The numerator magnitude.
    #[must_use]
    pub const fn unsigned_numerator(&self) -> &BigInt {
        &self.numerator
    }

    /// The denominator (zero for infinities and NaN).
    #[must_use]
    pub const fn denominator(&self) -> &BigInt {
        &self.denominator
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

    /// Returns true iff the value is an infinity.
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

    /// Returns true iff the value is NaN.
    #[must_use]
    pub const fn is_nan(&self) -> bool {
        matches!(self.kind, Kind::QuietNaN | Kind::SignalingNaN)
    }

    /// Returns true iff the sign bit is set.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.negative
    }

    /// Returns true iff the value is a finite zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.is_finite() && self.numerator.is_zero()
    }

    /// `-1`, `0` or `1`; NaN yields 0.
    #[must_use]
    pub fn signum(&self) -> i32 {
        if self.is_nan() || self.is_zero() {
            0
        } else if self.negative {
            -1
        } else {
            1
        }
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

    /// Lowest terms (zero becomes `0/1`).
    #[must_use]
    pub fn reduce(&self) -> Self {
        if !self.is_finite() {
            return self.clone();
        }
        if self.numerator.is_zero() {
            return Self::finite(self.negative, BigInt::zero(), BigInt::one());
        }
        let g = self.numerator.gcd(&self.denominator);
        Self::finite(
            self.negative,
            self.numerator.div_rem_nonzero(&g).0,
            self.denominator.div_rem_nonzero(&g).0,
        )
    }

    fn nan_operand(&self, other: &Self) -> Option<Self> {
        if self.is_nan() {
            Some(self.clone())
        } else if other.is_nan() {
            Some(other.clone())
        } else {
            None
        }
    }

    /// Exact sum.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn add(&self, other: &Self) -> Self {
        if let Some(nan) = self.nan_operand(other) {
            return nan;
        }
        match (self.is_infinity(), other.is_infinity()) {
            (true, true) if self.negative != other.negative => return Self::nan(),
            (true, _) => return self.clone(),
            (false, true) => return other.clone(),
            _ => {}
        }
        if self.is_zero() && other.is_zero() {
            return Self::finite(self.negative && other.negative, BigInt::zero(), BigInt::one());
        }
        let a = &self.numerator() * &other.denominator;
        let b = &other.numerator() * &self.denominator;
        let sum = a + b;
        Self::finite(sum.is_negative(), sum, &self.denominator * &other.denominator)
    }

    /// Exact difference.
    #[must_use]
    pub fn subtract(&self, other: &Self) -> Self {
        if other.is_nan() {
            return self.add(other);
        }
        self.add(&other.negate())
    }

    /// Exact product.
    #[must_use]
    pub fn multiply(&self, other: &Self) -> Self {
        if let Some(nan) = self.nan_operand(other) {
            return nan;
        }
        let negative = self.negative != other.negative;
        if self.is_infinity() || other.is_infinity() {
            if self.is_zero() || other.is_zero() {
                return Self::nan();
            }
            return Self::infinity(negative);
        }
        Self::finite(
            negative,
            &self.numerator * &other.numerator,
            &self.denominator * &other.denominator,
        )
    }

    /// Exact quotient: a nonzero value over zero is a signed infinity, zero over zero is NaN.
    #[must_use]
    pub fn divide(&self, other: &Self) -> Self {
        if let Some(nan) = self.nan_operand(other) {
            return nan;
        }
        let negative = self.negative != other.negative;
        match (self.is_infinity(), other.is_infinity()) {
            (true, true) => return Self::nan(),
            (true, false) => return Self::infinity(negative),
            (false, true) => return Self::finite(negative, BigInt::zero(), BigInt::one()),
            _ => {}
        }
        if other.is_zero() {
            if self.is_zero() {
                return Self::nan();
            }
            return Self::infinity(negative);
        }
        Self::finite(
            negative,
            &self.numerator * &other.denominator,
            &self.denominator * &other.numerator,
        )
    }

    /// Numeric total order: `-Infinity < finite < +Infinity < NaN`.
    #[must_use]
    pub fn compare_to(&self, other: &Self) -> Ordering {
        match (self.is_nan(), other.is_nan()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            _ => {}
        }
        let (sa, sb) = (self.signum(), other.signum());
        match sa.cmp(&sb) {
            Ordering::Equal if sa == 0 => return Ordering::Equal,
            Ordering::Equal => {}
            other => return other,
        }
        let mag = match (self.is_infinity(), other.is_infinity()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                (&self.numerator * &other.denominator).cmp(&(&other.numerator * &self.denominator))
            }
        };
        if sa < 0 {
            mag.reverse()
        } else {
            mag
        }
    }

    /// Truncate toward zero.
    ///
    /// # Errors
    ///
    /// Returns `NotFinite` for infinities and NaN.
    pub fn to_bigint(&self) -> Result<BigInt, CborError> {
        if !self.is_finite() {
            return Err(CborError::arithmetic(ErrorCode::NotFinite));
        }
        let q = self.numerator.div_rem_nonzero(&self.denominator).0;
        Ok(if self.negative { q.negate() } else { q })
    }

    /// Convert to an integer only if the value is integral.
    ///
    /// # Errors
    ///
    /// Returns `NotFinite` for infinities and NaN, `NotIntegral` otherwise if there is a
    /// fractional part.
    pub fn to_bigint_exact(&self) -> Result<BigInt, CborError> {
        if !self.is_finite() {
            return Err(CborError::arithmetic(ErrorCode::NotFinite));
        }
        let (q, r) = self.numerator.div_rem_nonzero(&self.denominator);
        if !r.is_zero() {
            return Err(CborError::arithmetic(ErrorCode::NotIntegral));
        }
        Ok(if self.negative { q.negate() } else { q })
    }

    fn to_ieee(&self, fmt: Format) -> u64 {
        match self.kind {
            Kind::Infinity => fmt.infinity(self.negative),
            Kind::QuietNaN => fmt.nan(self.negative, &self.numerator, false),
            Kind::SignalingNaN => fmt.nan(self.negative, &self.numerator, true),
            Kind::Finite => ieee::from_ratio(fmt, self.negative, &self.numerator, &self.denominator),
        }
    }

    /// The nearest double (ties to even).
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        f64::from_bits(self.to_ieee(ieee::DOUBLE))
    }

    /// The nearest single (ties to even).
    #[must_use]
    pub fn to_f32(&self) -> f32 {
        f32::from_bits(self.to_ieee(ieee::SINGLE) as u32)
    }

    fn to_extended<R: Radix>(&self, ctx: &PrecisionContext, exact_first: bool) -> Result<Extended<R>, CborError> {
        match self.kind {
            Kind::Infinity => return Ok(Extended::infinity(self.negative)),
            Kind::QuietNaN | Kind::SignalingNaN => {
                return Ok(Extended::nan_with_payload(
                    self.negative,
                    self.numerator.clone(),
                    self.kind == Kind::SignalingNaN,
                ))
            }
            Kind::Finite => {}
        }
        let num = Extended::<R>::from_parts(self.negative, self.numerator.clone(), BigInt::zero());
        let den = Extended::<R>::from(self.denominator.clone());
        if exact_first {
            match num.divide(&den) {
                Ok(exact) => return Ok(exact),
                Err(e) if e.code != ErrorCode::NonTerminatingDivision => return Err(e),
                Err(_) => {}
            }
        }
        num.divide_with(&den, ctx)
    }

    /// The quotient as a decimal rounded to `ctx`.
    ///
    /// # Errors
    ///
    /// Returns `NonTerminatingDivision` if `ctx` is unlimited and the decimal expansion does not
    /// terminate, or `Trapped` for a trapped condition.
    pub fn to_extended_decimal(&self, ctx: &PrecisionContext) -> Result<ExtendedDecimal, CborError> {
        self.to_extended(ctx, false)
    }

    /// The exact decimal value when it terminates, otherwise the quotient rounded to `ctx`.
    ///
    /// # Errors
    ///
    /// Returns `NonTerminatingDivision` if the expansion does not terminate and `ctx` is
    /// unlimited, or `Trapped` for a trapped condition.
    pub fn to_extended_decimal_exact_if_possible(
        &self,
        ctx: &PrecisionContext,
    ) -> Result<ExtendedDecimal, CborError> {
        self.to_extended(ctx, true)
    }

    /// The quotient as a binary float rounded to `ctx`.
    ///
    /// # Errors
    ///
    /// Returns `NonTerminatingDivision` if `ctx` is unlimited and the binary expansion does not
    /// terminate, or `Trapped` for a trapped condition.
    pub fn to_extended_float(&self, ctx: &PrecisionContext) -> Result<ExtendedFloat, CborError> {
        self.to_extended(ctx, false)
    }

    /// The exact binary value when it terminates, otherwise the quotient rounded to `ctx`.
    ///
    /// # Errors
    ///
    /// Returns `NonTerminatingDivision` if the expansion does not terminate and `ctx` is
    /// unlimited, or `Trapped` for a trapped condition.
    pub fn to_extended_float_exact_if_possible(
        &self,
        ctx: &PrecisionContext,
    ) -> Result<ExtendedFloat, CborError> {
        self.to_extended(ctx, true)
    }
}

impl From<i64> for ExtendedRational {
    fn from(v: i64) -> Self {
        Self::from_i64(v)
    }
}

impl From<BigInt> for ExtendedRational {
    fn from(v: BigInt) -> Self {
        Self::from_bigint(v)
    }
}

impl FromStr for ExtendedRational {
    type Err = CborError;

    /// Parse `n/d`, a bare integer `n`, or `Infinity`/`-Infinity`/`NaN`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        if body.eq_ignore_ascii_case("infinity") || body.eq_ignore_ascii_case("inf") {
            return Ok(Self::infinity(negative));
        }
        if body.eq_ignore_ascii_case("nan") {
            let mut nan = Self::nan();
            nan.negative = negative;
            return Ok(nan);
        }
        let invalid = || CborError::new(ErrorCode::InvalidNumber, 0);
        if body.starts_with(['-', '+']) {
            return Err(invalid());
        }
        let (num, den) = match body.split_once('/') {
            Some((n, d)) => (n, d),
            None => (body, "1"),
        };
        if num.starts_with(['-', '+']) || den.starts_with(['-', '+']) {
            return Err(invalid());
        }
        let numerator = BigInt::from_str_radix(num, 10).map_err(|_| invalid())?;
        let denominator = BigInt::from_str_radix(den, 10).map_err(|_| invalid())?;
        if denominator.is_zero() {
            return Err(CborError::arithmetic(ErrorCode::DivideByZero));
        }
        Ok(Self::finite(negative, numerator, denominator))
    }
}

impl fmt::Display for ExtendedRational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.negative { "-" } else { "" };
        match self.kind {
            Kind::Finite => write!(f, "{sign}{}/{}", self.numerator, self.denominator),
            Kind::Infinity => write!(f, "{sign}Infinity"),
            Kind::QuietNaN => write!(f, "{sign}NaN"),
            Kind::SignalingNaN => write!(f, "{sign}sNaN"),
        }
    }
}
