//! IEEE 754 binary interchange formats: decomposition into integer fields and correctly rounded
//! (ties-to-even) composition from exact values.

use crate::bigint::BigInt;

/// A binary interchange format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Format {
    /// Significand bits including the hidden bit.
    precision: u32,
    exp_bits: u32,
}

pub(crate) const HALF: Format = Format {
    precision: 11,
    exp_bits: 5,
};
pub(crate) const SINGLE: Format = Format {
    precision: 24,
    exp_bits: 8,
};
pub(crate) const DOUBLE: Format = Format {
    precision: 53,
    exp_bits: 11,
};

impl Format {
    const fn frac_bits(self) -> u32 {
        self.precision - 1
    }

    const fn bias(self) -> i64 {
        (1i64 << (self.exp_bits - 1)) - 1
    }

    const fn exp_mask(self) -> u64 {
        (1u64 << self.exp_bits) - 1
    }

    const fn frac_mask(self) -> u64 {
        (1u64 << self.frac_bits()) - 1
    }

    const fn sign_bit(self) -> u64 {
        1u64 << (self.frac_bits() + self.exp_bits)
    }

    /// Exponent of the least significant bit of a subnormal.
    const fn min_lsb(self) -> i64 {
        1 - self.bias() - self.frac_bits() as i64
    }

    /// Largest unbiased exponent of a finite value.
    const fn max_exp(self) -> i64 {
        self.bias()
    }

    const fn signed_zero(self, negative: bool) -> u64 {
        if negative {
            self.sign_bit()
        } else {
            0
        }
    }

    pub(crate) const fn infinity(self, negative: bool) -> u64 {
        self.signed_zero(negative) | (self.exp_mask() << self.frac_bits())
    }

    /// A NaN with the given payload, or the default quiet NaN if the payload does not fit.
    pub(crate) fn nan(self, negative: bool, payload: &BigInt, signaling: bool) -> u64 {
        let quiet_bit = 1u64 << (self.frac_bits() - 1);
        let payload = payload.to_u64().filter(|&p| p < quiet_bit);
        let frac = match (payload, signaling) {
            (Some(0) | None, true) => 1,
            (Some(p), true) => p,
            (Some(p), false) => quiet_bit | p,
            (None, false) => quiet_bit,
        };
        self.infinity(negative) | frac
    }
}

/// The fields of an IEEE value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Parts {
    /// `(-1)^negative * mantissa * 2^exponent`.
    Finite {
        negative: bool,
        mantissa: u64,
        exponent: i64,
    },
    Infinity {
        negative: bool,
    },
    NaN {
        negative: bool,
        payload: u64,
        quiet: bool,
    },
}

pub(crate) fn decompose(fmt: Format, bits: u64) -> Parts {
    let frac_bits = fmt.frac_bits();
    let negative = bits & fmt.sign_bit() != 0;
    let biased = (bits >> frac_bits) & fmt.exp_mask();
    let frac = bits & fmt.frac_mask();
    if biased == fmt.exp_mask() {
        if frac == 0 {
            return Parts::Infinity { negative };
        }
        let quiet_bit = 1u64 << (frac_bits - 1);
        return Parts::NaN {
            negative,
            payload: frac & (quiet_bit - 1),
            quiet: frac & quiet_bit != 0,
        };
    }
    if biased == 0 {
        return Parts::Finite {
            negative,
            mantissa: frac,
            exponent: fmt.min_lsb(),
        };
    }
    Parts::Finite {
        negative,
        mantissa: frac | (1u64 << frac_bits),
        exponent: biased as i64 - fmt.bias() - i64::from(frac_bits),
    }
}

/// Round `(-1)^negative * (q + s) * 2^exp2` to `fmt`, where `s` is a positive amount below one
/// unit of `q` when `sticky` is set. `q` must have at least two more bits than will be kept when
/// `sticky` is set.
fn compose(fmt: Format, negative: bool, q: &BigInt, exp2: i64, sticky: bool) -> u64 {
    if q.is_zero() {
        return fmt.signed_zero(negative);
    }
    let precision = i64::from(fmt.precision);
    let len = i64::try_from(q.magnitude_bits()).unwrap_or(i64::MAX);
    let mut lsb = exp2.saturating_add(len).saturating_sub(precision).max(fmt.min_lsb());
    let drop = lsb.saturating_sub(exp2);
    let mut m = if drop <= 0 {
        q.shl(usize::try_from(-drop).unwrap_or(0)).to_u64().unwrap_or(0)
    } else {
        let d = u64::try_from(drop).unwrap_or(u64::MAX);
        let kept = q.shr(usize::try_from(d).unwrap_or(usize::MAX)).to_u64().unwrap_or(0);
        let half = q.test_bit(d - 1);
        let below = sticky || q.lowest_set_bit().is_some_and(|low| low < d - 1);
        if half && (below || kept & 1 == 1) {
            kept + 1
        } else {
            kept
        }
    };
    if m == 1u64 << fmt.precision {
        m >>= 1;
        lsb += 1;
    }
    if lsb + precision - 1 > fmt.max_exp() {
        return fmt.infinity(negative);
    }
    let sign = fmt.signed_zero(negative);
    if m < 1u64 << fmt.frac_bits() {
        return sign | m;
    }
    let biased = (lsb + i64::from(fmt.frac_bits()) + fmt.bias()) as u64;
    sign | (biased << fmt.frac_bits()) | (m & fmt.frac_mask())
}

/// Round `(-1)^negative * m * 2^e` to `fmt`.
pub(crate) fn from_binary(fmt: Format, negative: bool, m: &BigInt, e: &BigInt) -> u64 {
    if m.is_zero() {
        return fmt.signed_zero(negative);
    }
    let len = BigInt::from(m.magnitude_bits());
    let top = e + &len;
    if top > BigInt::from(fmt.max_exp() + 2) {
        return fmt.infinity(negative);
    }
    if top < BigInt::from(fmt.min_lsb()) {
        return fmt.signed_zero(negative);
    }
    let Some(exp2) = e.to_i64() else {
        return fmt.signed_zero(negative);
    };
    compose(fmt, negative, m, exp2, false)
}

/// Round `(-1)^negative * n / d` to `fmt`. `d` must be nonzero.
pub(crate) fn from_ratio(fmt: Format, negative: bool, n: &BigInt, d: &BigInt) -> u64 {
    if n.is_zero() || d.is_zero() {
        return fmt.signed_zero(negative);
    }
    let nb = i64::try_from(n.magnitude_bits()).unwrap_or(i64::MAX);
    let db = i64::try_from(d.magnitude_bits()).unwrap_or(i64::MAX);
    let b = nb - db;
    if b > fmt.max_exp() + 2 {
        return fmt.infinity(negative);
    }
    if b + 1 < fmt.min_lsb() {
        return fmt.signed_zero(negative);
    }
    let shift = i64::from(fmt.precision) + 3 - b;
    let (num, den) = if shift >= 0 {
        (n.abs().shl(shift as usize), d.abs())
    } else {
        (n.abs(), d.abs().shl((-shift) as usize))
    };
    let (q, r) = num.div_rem_nonzero(&den);
    compose(fmt, negative, &q, -shift, !r.is_zero())
}

/// Round `(-1)^negative * m * 10^e` to `fmt`.
pub(crate) fn from_decimal(fmt: Format, negative: bool, m: &BigInt, e: &BigInt, digits: u64) -> u64 {
    if m.is_zero() {
        return fmt.signed_zero(negative);
    }
    let top10 = e + BigInt::from(digits);
    if top10 > BigInt::from(310) {
        return fmt.infinity(negative);
    }
    if top10 < BigInt::from(-330) {
        return fmt.signed_zero(negative);
    }
    let Some(e) = e.to_i64() else {
        return fmt.signed_zero(negative);
    };
    let ten = BigInt::from(10u32);
    if e >= 0 {
        let n = m * ten.pow(e as u32);
        from_ratio(fmt, negative, &n, &BigInt::one())
    } else {
        let d = ten.pow(e.unsigned_abs() as u32);
        from_ratio(fmt, negative, m, &d)
    }
}

/// Widen a binary16 value to `f32` exactly.
pub(crate) fn half_to_f32(bits: u16) -> f32 {
    let out = match decompose(HALF, u64::from(bits)) {
        Parts::Finite {
            negative,
            mantissa,
            exponent,
        } => compose(SINGLE, negative, &BigInt::from(mantissa), exponent, false),
        Parts::Infinity { negative } => SINGLE.infinity(negative),
        Parts::NaN {
            negative,
            payload,
            quiet,
        } => {
            // Payload moves to the top of the wider fraction.
            let shifted = payload << (SINGLE.frac_bits() - HALF.frac_bits());
            SINGLE.nan(negative, &BigInt::from(shifted), !quiet)
        }
    };
    f32::from_bits(out as u32)
}
