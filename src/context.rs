//! Rounding modes and precision contexts.
//!
//! A [`PrecisionContext`] is a small `Copy` policy value passed explicitly into every rounded
//! operation. There is no ambient rounding state.

use core::fmt;
use core::ops::{BitAnd, BitOr, BitOrAssign};

use crate::bigint::BigInt;
use crate::{CborError, ErrorCode};

/// How a result is rounded when digits must be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rounding {
    /// Round to nearest; ties go to the even last digit.
    #[default]
    HalfEven,
    /// Round to nearest; ties go away from zero.
    HalfUp,
    /// Round to nearest; ties go toward zero.
    HalfDown,
    /// Round away from zero.
    Up,
    /// Round toward zero (truncate).
    Down,
    /// Round toward positive infinity.
    Ceiling,
    /// Round toward negative infinity.
    Floor,
}

impl Rounding {
    /// Whether this mode never increases the magnitude of a value with the given sign.
    #[must_use]
    pub const fn is_toward_zero(self, negative: bool) -> bool {
        match self {
            Self::Down => true,
            Self::Ceiling => negative,
            Self::Floor => !negative,
            _ => false,
        }
    }
}

/// A set of conditions raised by a rounded operation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Flags(u32);

impl Flags {
    /// No conditions.
    pub const EMPTY: Self = Self(0);
    /// Nonzero digits were discarded.
    pub const INEXACT: Self = Self(1);
    /// Digits were discarded (possibly all zero).
    pub const ROUNDED: Self = Self(1 << 1);
    /// The result's adjusted exponent is below `emin`.
    pub const SUBNORMAL: Self = Self(1 << 2);
    /// The result is subnormal and inexact.
    pub const UNDERFLOW: Self = Self(1 << 3);
    /// The result's adjusted exponent exceeded `emax`.
    pub const OVERFLOW: Self = Self(1 << 4);
    /// The exponent was altered to fit the context's exponent range.
    pub const CLAMPED: Self = Self(1 << 5);
    /// The operation was invalid (for example, infinity minus infinity or a signaling NaN operand).
    pub const INVALID: Self = Self(1 << 6);
    /// A finite nonzero value was divided by zero.
    pub const DIVIDE_BY_ZERO: Self = Self(1 << 7);

    const NAMES: [(Self, &'static str); 8] = [
        (Self::INEXACT, "INEXACT"),
        (Self::ROUNDED, "ROUNDED"),
        (Self::SUBNORMAL, "SUBNORMAL"),
        (Self::UNDERFLOW, "UNDERFLOW"),
        (Self::OVERFLOW, "OVERFLOW"),
        (Self::CLAMPED, "CLAMPED"),
        (Self::INVALID, "INVALID"),
        (Self::DIVIDE_BY_ZERO, "DIVIDE_BY_ZERO"),
    ];

    /// Raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns true iff no flag is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true iff every flag in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true iff any flag in `other` is set.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for Flags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Flags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                set.entry(&format_args!("{name}"));
            }
        }
        set.finish()
    }
}

/// Precision, rounding and exponent-range policy for arithmetic.
///
/// `precision == 0` means unlimited. Exponent limits follow the General Decimal Arithmetic
/// conventions: `emax` and `emin` bound the *adjusted* exponent (the exponent of the most
/// significant digit), and subnormal results are rounded at `etiny = emin - (precision - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrecisionContext {
    precision: u64,
    precision_in_bits: bool,
    rounding: Rounding,
    exponent_range: Option<(i64, i64)>,
    clamp_normal_exponents: bool,
    traps: Flags,
}

impl Default for PrecisionContext {
    fn default() -> Self {
        Self::UNLIMITED
    }
}

impl PrecisionContext {
    /// Unlimited precision, no exponent range, half-even rounding.
    pub const UNLIMITED: Self = Self::for_precision(0);

    /// IEEE 754 binary16 (11 bits, adjusted exponent -14..=15).
    pub const BINARY16: Self = Self::ieee(11, true, -14, 15, false);
    /// IEEE 754 binary32 (24 bits, adjusted exponent -126..=127).
    pub const BINARY32: Self = Self::ieee(24, true, -126, 127, false);
    /// IEEE 754 binary64 (53 bits, adjusted exponent -1022..=1023).
    pub const BINARY64: Self = Self::ieee(53, true, -1022, 1023, false);
    /// IEEE 754 decimal32 (7 digits, adjusted exponent -95..=96).
    pub const DECIMAL32: Self = Self::ieee(7, false, -95, 96, true);
    /// IEEE 754 decimal64 (16 digits, adjusted exponent -383..=384).
    pub const DECIMAL64: Self = Self::ieee(16, false, -383, 384, true);
    /// IEEE 754 decimal128 (34 digits, adjusted exponent -6143..=6144).
    pub const DECIMAL128: Self = Self::ieee(34, false, -6143, 6144, true);
    /// The .NET `System.Decimal` range: a 96-bit coefficient scaled by `10^-28..=10^0`.
    pub const CLI_DECIMAL: Self = Self::ieee(96, true, 0, 28, true);

    const fn ieee(precision: u64, in_bits: bool, emin: i64, emax: i64, clamp: bool) -> Self {
        Self {
            precision,
            precision_in_bits: in_bits,
            rounding: Rounding::HalfEven,
            exponent_range: Some((emin, emax)),
            clamp_normal_exponents: clamp,
            traps: Flags::EMPTY,
        }
    }

    /// A context with the given precision (0 = unlimited), half-even rounding and no exponent
    /// range.
    #[must_use]
    pub const fn for_precision(precision: u64) -> Self {
        Self {
            precision,
            precision_in_bits: false,
            rounding: Rounding::HalfEven,
            exponent_range: None,
            clamp_normal_exponents: false,
            traps: Flags::EMPTY,
        }
    }

    /// A context with the given precision and rounding mode.
    #[must_use]
    pub const fn for_precision_and_rounding(precision: u64, rounding: Rounding) -> Self {
        Self::for_precision(precision).with_rounding(rounding)
    }

    /// Replace the precision (0 = unlimited).
    #[must_use]
    pub const fn with_precision(mut self, precision: u64) -> Self {
        self.precision = precision;
        self
    }

    /// Count precision in bits rather than radix digits.
    #[must_use]
    pub const fn with_precision_in_bits(mut self, in_bits: bool) -> Self {
        self.precision_in_bits = in_bits;
        self
    }

    /// Replace the rounding mode.
    #[must_use]
    pub const fn with_rounding(mut self, rounding: Rounding) -> Self {
        self.rounding = rounding;
        self
    }

    /// Set the adjusted-exponent range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPrecision` if `emin > emax`.
    pub const fn with_exponent_range(mut self, emin: i64, emax: i64) -> Result<Self, CborError> {
        if emin > emax {
            return Err(CborError::new(ErrorCode::InvalidPrecision, 0));
        }
        self.exponent_range = Some((emin, emax));
        Ok(self)
    }

    /// Remove the exponent range.
    #[must_use]
    pub const fn with_unlimited_exponents(mut self) -> Self {
        self.exponent_range = None;
        self
    }

    /// Pad coefficients with zeros so that exponents never exceed `emax - (precision - 1)`.
    #[must_use]
    pub const fn with_clamp_normal_exponents(mut self, clamp: bool) -> Self {
        self.clamp_normal_exponents = clamp;
        self
    }

    /// Conditions that turn into an error instead of a value.
    #[must_use]
    pub const fn with_traps(mut self, traps: Flags) -> Self {
        self.traps = traps;
        self
    }

    /// Maximum number of digits (or bits); 0 means unlimited.
    #[must_use]
    pub const fn precision(&self) -> u64 {
        self.precision
    }

    /// Whether precision counts bits.
    #[must_use]
    pub const fn precision_in_bits(&self) -> bool {
        self.precision_in_bits
    }

    /// Rounding mode.
    #[must_use]
    pub const fn rounding(&self) -> Rounding {
        self.rounding
    }

    /// Smallest adjusted exponent of a normal number, if the range is limited.
    #[must_use]
    pub const fn emin(&self) -> Option<i64> {
        match self.exponent_range {
            Some((emin, _)) => Some(emin),
            None => None,
        }
    }

    /// Largest adjusted exponent, if the range is limited.
    #[must_use]
    pub const fn emax(&self) -> Option<i64> {
        match self.exponent_range {
            Some((_, emax)) => Some(emax),
            None => None,
        }
    }

    /// Whether normal exponents are clamped.
    #[must_use]
    pub const fn clamp_normal_exponents(&self) -> bool {
        self.clamp_normal_exponents
    }

    /// Trapped conditions.
    #[must_use]
    pub const fn traps(&self) -> Flags {
        self.traps
    }

    /// Returns true iff precision is unlimited.
    #[must_use]
    pub const fn is_unlimited(&self) -> bool {
        self.precision == 0
    }

    /// Turn raised flags into a trap error if any of them is trapped.
    pub(crate) fn check_traps(&self, flags: Flags) -> Result<(), CborError> {
        let hit = flags & self.traps;
        if hit.is_empty() {
            return Ok(());
        }
        tracing::trace!(flags = ?hit, "precision context trap");
        Err(CborError::arithmetic(ErrorCode::Trapped(hit)))
    }
}

/// The outcome of rounding a finite `(sign, mantissa, exponent)` triple under a context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundResult {
    /// Rounded mantissa (non-negative). Meaningless when `infinite` is set.
    pub mantissa: BigInt,
    /// Rounded exponent.
    pub exponent: BigInt,
    /// Conditions raised.
    pub flags: Flags,
    /// The value overflowed to infinity.
    pub infinite: bool,
}

impl RoundResult {
    /// Returns true iff nonzero digits were discarded.
    #[must_use]
    pub const fn is_inexact(&self) -> bool {
        self.flags.contains(Flags::INEXACT)
    }
}
