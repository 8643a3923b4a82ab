use core::cmp::Ordering;

use crate::bigint::BigInt;
use crate::context::{Flags, PrecisionContext, RoundResult, Rounding};
use crate::{CborError, ErrorCode};

use super::{Base2, Extended, Kind, Radix};

/// Divide out factors of `R` from `m`, at most `limit` of them. Returns the reduced mantissa and
/// the number of digits removed.
pub(crate) fn strip_trailing_zeros<R: Radix>(m: &BigInt, limit: Option<u64>) -> (BigInt, u64) {
    let mut out = m.clone();
    let mut count = 0u64;
    if out.is_zero() {
        return (out, 0);
    }
    let cap = limit.unwrap_or(u64::MAX);
    if R::RADIX == Base2::RADIX {
        let tz = out.lowest_set_bit().unwrap_or(0).min(cap);
        return (out.shr(usize::try_from(tz).unwrap_or(usize::MAX)), tz);
    }
    while count < cap {
        let (q, r) = out.div_rem_small_abs(R::RADIX);
        if r != 0 {
            break;
        }
        out = q;
        count += 1;
    }
    (out, count)
}

/// Discard the `k` least significant digits of `m`, rounding the remaining digits.
///
/// Returns the rounded quotient and whether nonzero digits were discarded.
fn drop_digits<R: Radix>(m: &BigInt, k: u64, negative: bool, mode: Rounding) -> (BigInt, bool) {
    if k == 0 || m.is_zero() {
        return (m.clone(), false);
    }
    let digits = R::digit_count(m);
    let (q, half_cmp) = if k > digits {
        (BigInt::zero(), Ordering::Less)
    } else {
        let div = R::pow(k);
        let (q, r) = m.div_rem_nonzero(&div);
        if r.is_zero() {
            return (q, false);
        }
        (q, r.shl(1).cmp(&div))
    };
    let increment = match mode {
        Rounding::HalfEven => {
            half_cmp == Ordering::Greater || (half_cmp == Ordering::Equal && !q.is_even())
        }
        Rounding::HalfUp => half_cmp != Ordering::Less,
        Rounding::HalfDown => half_cmp == Ordering::Greater,
        Rounding::Up => true,
        Rounding::Down => false,
        Rounding::Ceiling => !negative,
        Rounding::Floor => negative,
    };
    if increment {
        (q + BigInt::one(), true)
    } else {
        (q, true)
    }
}

/// The precision of `ctx` expressed in radix-`R` digits, plus an exclusive mantissa bound when
/// the precision counts bits of a decimal coefficient.
fn ctx_digits<R: Radix>(ctx: &PrecisionContext) -> Option<(u64, Option<BigInt>)> {
    if ctx.is_unlimited() {
        return None;
    }
    let p = ctx.precision();
    if ctx.precision_in_bits() && R::RADIX != Base2::RADIX {
        let limit = Base2::pow(p);
        let digits = R::digit_count(&(&limit - BigInt::one()));
        Some((digits, Some(limit)))
    } else {
        Some((p, None))
    }
}

fn fits<R: Radix>(q: &BigInt, p: u64, limit: Option<&BigInt>) -> bool {
    match limit {
        Some(l) => q < l,
        None => R::digit_count(q) <= p,
    }
}

fn big(v: i64) -> BigInt {
    BigInt::from(v)
}

fn big_u(v: u64) -> BigInt {
    BigInt::from(v)
}

/// Round `(-1)^negative * mantissa * R^exponent` to the precision and exponent range of `ctx`.
pub(crate) fn round<R: Radix>(
    negative: bool,
    mantissa: &BigInt,
    exponent: &BigInt,
    ctx: &PrecisionContext,
) -> RoundResult {
    let exact = RoundResult {
        mantissa: mantissa.abs(),
        exponent: exponent.clone(),
        flags: Flags::EMPTY,
        infinite: false,
    };
    let Some((p, limit)) = ctx_digits::<R>(ctx) else {
        return exact;
    };
    let range = ctx.emin().zip(ctx.emax());
    let p_big = big_u(p);
    let etiny = range.map(|(emin, _)| big(emin) - &p_big + BigInt::one());
    let e_top = range.map(|(_, emax)| {
        if ctx.clamp_normal_exponents() {
            big(emax) - &p_big + BigInt::one()
        } else {
            big(emax)
        }
    });

    let mut flags = Flags::EMPTY;

    if mantissa.is_zero() {
        let mut e = exponent.clone();
        if let Some(t) = &etiny {
            if &e < t {
                e = t.clone();
                flags |= Flags::CLAMPED;
            }
        }
        if let Some(top) = &e_top {
            if &e > top {
                e = top.clone();
                flags |= Flags::CLAMPED;
            }
        }
        return RoundResult {
            mantissa: BigInt::zero(),
            exponent: e,
            flags,
            infinite: false,
        };
    }

    let m = mantissa.abs();
    let digits = R::digit_count(&m);
    let orig_adjusted = exponent + big_u(digits) - BigInt::one();

    let mut k = if digits > p { big_u(digits - p) } else { BigInt::zero() };
    if let Some(t) = &etiny {
        if &(exponent + &k) < t {
            k = t - exponent;
        }
    }

    let (mut q, inexact, mut new_e) = loop {
        let k_small = k.to_u64().filter(|&v| v <= digits + 1).unwrap_or(digits + 1);
        let (rq, rinexact) = drop_digits::<R>(&m, k_small, negative, ctx.rounding());
        if fits::<R>(&rq, p, limit.as_ref()) {
            break (rq, rinexact, exponent + &k);
        }
        k = k + BigInt::one();
    };
    if !k.is_zero() {
        flags |= Flags::ROUNDED;
    }
    if inexact {
        flags |= Flags::INEXACT;
    }

    if let Some((emin, emax)) = range {
        if orig_adjusted < big(emin) {
            flags |= Flags::SUBNORMAL;
            if inexact {
                flags |= Flags::UNDERFLOW;
            }
        }
        if !q.is_zero() {
            let adjusted = &new_e + big_u(R::digit_count(&q)) - BigInt::one();
            let mut overflow = adjusted > big(emax);
            if let Some(top) = e_top.as_ref().filter(|_| !overflow) {
                if ctx.clamp_normal_exponents() && &new_e > top {
                    let pad = (&new_e - top).to_u64().unwrap_or(0);
                    q = &q * R::pow(pad);
                    new_e = top.clone();
                    flags |= Flags::CLAMPED;
                    overflow = !fits::<R>(&q, p, limit.as_ref());
                }
            }
            if overflow {
                flags |= Flags::OVERFLOW | Flags::INEXACT | Flags::ROUNDED;
                if ctx.rounding().is_toward_zero(negative) {
                    let largest = match &limit {
                        Some(l) => l - BigInt::one(),
                        None => R::pow(p) - BigInt::one(),
                    };
                    return RoundResult {
                        mantissa: largest,
                        exponent: big(emax) - &p_big + BigInt::one(),
                        flags,
                        infinite: false,
                    };
                }
                return RoundResult {
                    mantissa: BigInt::zero(),
                    exponent: BigInt::zero(),
                    flags,
                    infinite: true,
                };
            }
        }
    }

    RoundResult {
        mantissa: q,
        exponent: new_e,
        flags,
        infinite: false,
    }
}

/// Outcome of an operation before trap checking.
struct Outcome<R: Radix> {
    value: Extended<R>,
    flags: Flags,
}

impl<R: Radix> Outcome<R> {
    const fn plain(value: Extended<R>) -> Self {
        Self {
            value,
            flags: Flags::EMPTY,
        }
    }
}

fn finish<R: Radix>(
    negative: bool,
    mantissa: &BigInt,
    exponent: &BigInt,
    ctx: &PrecisionContext,
    mut flags: Flags,
) -> Outcome<R> {
    let r = round::<R>(negative, mantissa, exponent, ctx);
    flags |= r.flags;
    let value = if r.infinite {
        Extended::infinity(negative)
    } else {
        Extended::finite(negative, r.mantissa, r.exponent)
    };
    Outcome { value, flags }
}

fn checked<R: Radix>(out: Outcome<R>, ctx: &PrecisionContext) -> Result<Extended<R>, CborError> {
    ctx.check_traps(out.flags)?;
    Ok(out.value)
}

fn adjusted<R: Radix>(x: &Extended<R>) -> BigInt {
    &x.exponent + big_u(R::digit_count(&x.mantissa)) - BigInt::one()
}

/// Propagate NaN operands: a signaling NaN wins over a quiet one and raises `INVALID`.
fn propagate_nan<R: Radix>(a: &Extended<R>, b: Option<&Extended<R>>) -> Option<Outcome<R>> {
    let candidates = [Some(a), b];
    let pick = candidates
        .iter()
        .flatten()
        .find(|x| x.is_signaling_nan())
        .or_else(|| candidates.iter().flatten().find(|x| x.is_quiet_nan()))?;
    let flags = if pick.is_signaling_nan() {
        Flags::INVALID
    } else {
        Flags::EMPTY
    };
    let value = Extended::raw(pick.negative, pick.mantissa.clone(), BigInt::zero(), Kind::QuietNaN);
    Some(Outcome { value, flags })
}

fn invalid<R: Radix>() -> Outcome<R> {
    Outcome {
        value: Extended::nan(),
        flags: Flags::INVALID,
    }
}

fn scale_to<R: Radix>(m: &BigInt, from: &BigInt, to: &BigInt) -> BigInt {
    let diff = (from - to).to_u64().unwrap_or(u64::MAX);
    if diff == 0 || m.is_zero() {
        m.clone()
    } else {
        m * R::pow(diff)
    }
}

/// If `small` lies entirely more than two digits below the rounding position of `large`, a single
/// unit at that position rounds identically in any sum with `large`.
fn sticky_operand<R: Radix>(large: &Extended<R>, small: &Extended<R>, p: u64) -> Option<Extended<R>> {
    let floor_pos = (&adjusted(large) - big_u(p)).min(large.exponent.clone());
    let t = floor_pos - big(2);
    if adjusted(small) < t {
        Some(Extended::finite(small.negative, BigInt::one(), t))
    } else {
        None
    }
}

fn add_core<R: Radix>(
    a: &Extended<R>,
    b: &Extended<R>,
    ctx: &PrecisionContext,
) -> Outcome<R> {
    if let Some(nan) = propagate_nan(a, Some(b)) {
        return nan;
    }
    match (a.is_infinity(), b.is_infinity()) {
        (true, true) if a.negative != b.negative => return invalid(),
        (true, _) => return Outcome::plain(a.clone()),
        (false, true) => return Outcome::plain(b.clone()),
        _ => {}
    }

    let floor = ctx.rounding() == Rounding::Floor;
    if a.mantissa.is_zero() && b.mantissa.is_zero() {
        let negative = if a.negative == b.negative {
            a.negative
        } else {
            floor
        };
        let e = (&a.exponent).min(&b.exponent).clone();
        return finish(negative, &BigInt::zero(), &e, ctx, Flags::EMPTY);
    }

    let mut a = a.clone();
    let mut b = b.clone();
    if let Some((p, _)) = ctx_digits::<R>(ctx) {
        if !a.mantissa.is_zero() && !b.mantissa.is_zero() {
            if adjusted(&a) >= adjusted(&b) {
                if let Some(s) = sticky_operand(&a, &b, p) {
                    b = s;
                }
            } else if let Some(s) = sticky_operand(&b, &a, p) {
                a = s;
            }
        }
    }

    let e = (&a.exponent).min(&b.exponent).clone();
    let ma = scale_to::<R>(&a.mantissa, &a.exponent, &e);
    let mb = scale_to::<R>(&b.mantissa, &b.exponent, &e);
    let sa = if a.negative { ma.negate() } else { ma };
    let sb = if b.negative { mb.negate() } else { mb };
    let sum = sa + sb;
    let negative = if sum.is_zero() {
        if a.negative && b.negative {
            true
        } else {
            floor
        }
    } else {
        sum.is_negative()
    };
    finish(negative, &sum, &e, ctx, Flags::EMPTY)
}

fn multiply_core<R: Radix>(
    a: &Extended<R>,
    b: &Extended<R>,
    ctx: &PrecisionContext,
) -> Outcome<R> {
    if let Some(nan) = propagate_nan(a, Some(b)) {
        return nan;
    }
    let negative = a.negative != b.negative;
    if a.is_infinity() || b.is_infinity() {
        if a.is_zero() || b.is_zero() {
            return invalid();
        }
        return Outcome::plain(Extended::infinity(negative));
    }
    let m = &a.mantissa * &b.mantissa;
    let e = &a.exponent + &b.exponent;
    finish(negative, &m, &e, ctx, Flags::EMPTY)
}

fn factor_out(d: &BigInt, f: u32) -> (BigInt, u64) {
    let mut d = d.clone();
    let mut n = 0u64;
    loop {
        let (q, r) = d.div_rem_small_abs(f);
        if r != 0 || d.is_zero() {
            return (d, n);
        }
        d = q;
        n += 1;
    }
}

fn divide_core<R: Radix>(
    a: &Extended<R>,
    b: &Extended<R>,
    ctx: &PrecisionContext,
) -> Result<Outcome<R>, CborError> {
    if let Some(nan) = propagate_nan(a, Some(b)) {
        return Ok(nan);
    }
    let negative = a.negative != b.negative;
    match (a.is_infinity(), b.is_infinity()) {
        (true, true) => return Ok(invalid()),
        (true, false) => return Ok(Outcome::plain(Extended::infinity(negative))),
        (false, true) => {
            return Ok(Outcome::plain(Extended::finite(
                negative,
                BigInt::zero(),
                BigInt::zero(),
            )))
        }
        _ => {}
    }
    if b.mantissa.is_zero() {
        if a.mantissa.is_zero() {
            return Ok(invalid());
        }
        return Ok(Outcome {
            value: Extended::infinity(negative),
            flags: Flags::DIVIDE_BY_ZERO,
        });
    }
    let ideal = &a.exponent - &b.exponent;
    if a.mantissa.is_zero() {
        return Ok(finish(negative, &BigInt::zero(), &ideal, ctx, Flags::EMPTY));
    }

    let Some((p, _)) = ctx_digits::<R>(ctx) else {
        let (m, e) = exact_quotient::<R>(&a.mantissa, &b.mantissa, &ideal)?;
        return Ok(finish(negative, &m, &e, ctx, Flags::EMPTY));
    };

    let da = R::digit_count(&a.mantissa);
    let db = R::digit_count(&b.mantissa);
    let shift = (p + 1 + db).saturating_sub(da) + 1;
    let (q, r) = (&a.mantissa * R::pow(shift)).div_rem_nonzero(&b.mantissa);
    let e = &ideal - big_u(shift);
    let (m, e) = if r.is_zero() {
        let room = (&ideal - &e).to_u64();
        let (m, stripped) = strip_trailing_zeros::<R>(&q, room);
        (m, e + big_u(stripped))
    } else {
        let radix_sq = BigInt::from(R::RADIX * R::RADIX);
        (&q * &radix_sq + BigInt::one(), e - big(2))
    };
    Ok(finish(negative, &m, &e, ctx, Flags::EMPTY))
}

/// Exact `na / nb` scaled by `R^ideal`, or `NonTerminatingDivision`.
fn exact_quotient<R: Radix>(
    na: &BigInt,
    nb: &BigInt,
    ideal: &BigInt,
) -> Result<(BigInt, BigInt), CborError> {
    let g = na.gcd(nb);
    let n = na.div_rem_nonzero(&g).0;
    let d = nb.div_rem_nonzero(&g).0;
    let twos = d.lowest_set_bit().unwrap_or(0);
    let d = d.shr(usize::try_from(twos).unwrap_or(usize::MAX));
    let (d, fives) = if R::RADIX == Base2::RADIX {
        (d, 0)
    } else {
        factor_out(&d, 5)
    };
    if d != BigInt::one() {
        return Err(CborError::arithmetic(ErrorCode::NonTerminatingDivision));
    }
    let (m, k) = if R::RADIX == Base2::RADIX {
        (n, twos)
    } else {
        let k = twos.max(fives);
        let m = n.shl(usize::try_from(k - twos).unwrap_or(usize::MAX))
            * BigInt::from(5u32).pow(u32::try_from(k - fives).unwrap_or(u32::MAX));
        (m, k)
    };
    let e = ideal - big_u(k);
    let (m, stripped) = strip_trailing_zeros::<R>(&m, Some(k));
    Ok((m, e + big_u(stripped)))
}

/// `base^n` by square-and-multiply, rounding every product to `ctx`. The relative error stays
/// below `2 * bit_length(n)` units in the last place.
pub(crate) fn pow_rounded<R: Radix>(
    base: &Extended<R>,
    n: &BigInt,
    ctx: &PrecisionContext,
) -> Extended<R> {
    let mut acc = Extended::<R>::one();
    for i in (0..n.magnitude_bits()).rev() {
        acc = multiply_core(&acc, &acc, ctx).value;
        if n.test_bit(i) {
            acc = multiply_core(&acc, base, ctx).value;
        }
    }
    acc
}

/// `m * base^n` (or `m / base^n` when `divide` is set) rounded to `ctx`, which must have a
/// finite precision.
///
/// The power is never formed exactly: it is built with [`pow_rounded`] at `guard` extra units
/// of precision, so the cost grows with the bit length of `n` rather than with `n`.
pub(crate) fn scale_by_power<R: Radix>(
    m: &Extended<R>,
    base: &Extended<R>,
    n: &BigInt,
    divide: bool,
    ctx: &PrecisionContext,
    guard: u64,
) -> Result<Extended<R>, CborError> {
    let work = PrecisionContext::for_precision(ctx.precision() + guard)
        .with_precision_in_bits(ctx.precision_in_bits());
    let power = pow_rounded(base, n, &work);
    let out = if divide {
        divide_core(m, &power, &work)?
    } else {
        multiply_core(m, &power, &work)
    };
    let v = out.value;
    let flags = out.flags | Flags::INEXACT | Flags::ROUNDED;
    checked(finish(v.negative, &v.mantissa, &v.exponent, ctx, flags), ctx)
}

fn compare_finite_magnitude<R: Radix>(a: &Extended<R>, b: &Extended<R>) -> Ordering {
    match (a.mantissa.is_zero(), b.mantissa.is_zero()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }
    let (adj_a, adj_b) = (adjusted(a), adjusted(b));
    match adj_a.cmp(&adj_b) {
        Ordering::Equal => {}
        other => return other,
    }
    let e = (&a.exponent).min(&b.exponent).clone();
    let ma = scale_to::<R>(&a.mantissa, &a.exponent, &e);
    let mb = scale_to::<R>(&b.mantissa, &b.exponent, &e);
    ma.cmp(&mb)
}

impl<R: Radix> Extended<R> {
    /// Exact sum.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn add(&self, other: &Self) -> Self {
        add_core(self, other, &PrecisionContext::UNLIMITED).value
    }

    /// Sum rounded to `ctx`.
    ///
    /// # Errors
    ///
    /// Returns `Trapped` if a raised condition is trapped by `ctx`.
    pub fn add_with(&self, other: &Self, ctx: &PrecisionContext) -> Result<Self, CborError> {
        checked(add_core(self, other, ctx), ctx)
    }

    /// Exact difference.
    #[must_use]
    pub fn subtract(&self, other: &Self) -> Self {
        self.add(&other.negate_for_subtract())
    }

    /// Difference rounded to `ctx`.
    ///
    /// # Errors
    ///
    /// Returns `Trapped` if a raised condition is trapped by `ctx`.
    pub fn subtract_with(&self, other: &Self, ctx: &PrecisionContext) -> Result<Self, CborError> {
        self.add_with(&other.negate_for_subtract(), ctx)
    }

    fn negate_for_subtract(&self) -> Self {
        if self.is_nan() {
            self.clone()
        } else {
            self.negate()
        }
    }

    /// Exact product.
    #[must_use]
    pub fn multiply(&self, other: &Self) -> Self {
        multiply_core(self, other, &PrecisionContext::UNLIMITED).value
    }

    /// Product rounded to `ctx`.
    ///
    /// # Errors
    ///
    /// Returns `Trapped` if a raised condition is trapped by `ctx`.
    pub fn multiply_with(&self, other: &Self, ctx: &PrecisionContext) -> Result<Self, CborError> {
        checked(multiply_core(self, other, ctx), ctx)
    }

    /// Exact quotient.
    ///
    /// A nonzero value divided by zero is a signed infinity; zero divided by zero is NaN.
    ///
    /// # Errors
    ///
    /// Returns `NonTerminatingDivision` if the quotient has no finite expansion in radix `R`.
    pub fn divide(&self, other: &Self) -> Result<Self, CborError> {
        divide_core(self, other, &PrecisionContext::UNLIMITED).map(|o| o.value)
    }

    /// Quotient rounded to `ctx`.
    ///
    /// # Errors
    ///
    /// Returns `NonTerminatingDivision` if `ctx` has unlimited precision and the quotient does not
    /// terminate, or `Trapped` if a raised condition is trapped by `ctx`.
    pub fn divide_with(&self, other: &Self, ctx: &PrecisionContext) -> Result<Self, CborError> {
        checked(divide_core(self, other, ctx)?, ctx)
    }

    /// Round to the precision and exponent range of `ctx`.
    ///
    /// # Errors
    ///
    /// Returns `Trapped` if a raised condition is trapped by `ctx`.
    pub fn round_to_precision(&self, ctx: &PrecisionContext) -> Result<Self, CborError> {
        if let Some(nan) = propagate_nan(self, None) {
            return checked(nan, ctx);
        }
        if self.is_infinity() {
            return Ok(self.clone());
        }
        checked(
            finish(self.negative, &self.mantissa, &self.exponent, ctx, Flags::EMPTY),
            ctx,
        )
    }

    /// Round with the precision of `ctx` counted in bits, whatever the radix.
    ///
    /// # Errors
    ///
    /// Returns `Trapped` if a raised condition is trapped by `ctx`.
    pub fn round_to_binary_precision(&self, ctx: &PrecisionContext) -> Result<Self, CborError> {
        self.round_to_precision(&ctx.with_precision_in_bits(true))
    }

    /// Rescale to `exponent`, rounding with `rounding` if digits are discarded.
    #[must_use]
    pub fn round_to_exponent(&self, exponent: &BigInt, rounding: Rounding) -> Self {
        if !self.is_finite() {
            return self.clone();
        }
        if &self.exponent >= exponent {
            let m = scale_to::<R>(&self.mantissa, &self.exponent, exponent);
            return Self::finite(self.negative, m, exponent.clone());
        }
        let digits = R::digit_count(&self.mantissa);
        let k = (exponent - &self.exponent)
            .to_u64()
            .filter(|&v| v <= digits + 1)
            .unwrap_or(digits + 1);
        let (q, _) = drop_digits::<R>(&self.mantissa, k, self.negative, rounding);
        Self::finite(self.negative, q, exponent.clone())
    }

    /// Numeric total order: `-Infinity < finite < +Infinity < NaN`, with all NaNs equal and
    /// `-0 == +0`.
    #[must_use]
    pub fn compare_to(&self, other: &Self) -> Ordering {
        match (self.is_nan(), other.is_nan()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            _ => {}
        }
        let sa = self.signum();
        let sb = other.signum();
        match sa.cmp(&sb) {
            Ordering::Equal => {}
            other => return other,
        }
        if sa == 0 {
            return Ordering::Equal;
        }
        let mag = match (self.is_infinity(), other.is_infinity()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => compare_finite_magnitude(self, other),
        };
        if sa < 0 {
            mag.reverse()
        } else {
            mag
        }
    }

    /// The numerically smaller value; a NaN operand loses to a number.
    #[must_use]
    pub fn min(&self, other: &Self) -> Self {
        if self.is_nan() {
            return other.clone();
        }
        if other.is_nan() || self.compare_to(other) != Ordering::Greater {
            self.clone()
        } else {
            other.clone()
        }
    }

    /// The numerically larger value; a NaN operand loses to a number.
    #[must_use]
    pub fn max(&self, other: &Self) -> Self {
        if self.is_nan() {
            return other.clone();
        }
        if other.is_nan() || self.compare_to(other) != Ordering::Less {
            self.clone()
        } else {
            other.clone()
        }
    }
}

impl PrecisionContext {
    /// Round `(-1)^negative * mantissa * R^exponent` under this context.
    ///
    /// The sign of `mantissa` is ignored.
    #[must_use]
    pub fn round<R: Radix>(&self, negative: bool, mantissa: &BigInt, exponent: &BigInt) -> RoundResult {
        round::<R>(negative, mantissa, exponent, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extended::{Base10, ExtendedDecimal, ExtendedFloat};

    fn dec(m: i64, e: i64) -> ExtendedDecimal {
        ExtendedDecimal::new(BigInt::from(m), BigInt::from(e))
    }

    #[test]
    fn rounded_power_matches_exact_power() {
        let wide = PrecisionContext::for_precision(60);
        let p = pow_rounded(&dec(3, 0), &BigInt::from(100), &wide);
        assert_eq!(p.unsigned_mantissa(), &BigInt::from(3).pow(100));
        assert!(p.exponent().is_zero());

        let narrow = PrecisionContext::for_precision(20);
        let approx = pow_rounded(&dec(2, 0), &BigInt::from(1000), &PrecisionContext::for_precision(40));
        let exact = ExtendedDecimal::new(BigInt::one().shl(1000), BigInt::zero());
        assert_eq!(
            approx.round_to_precision(&narrow).unwrap(),
            exact.round_to_precision(&narrow).unwrap()
        );
    }

    #[test]
    fn scaling_by_a_power_rounds_once() {
        let ctx = PrecisionContext::for_precision(34);
        let scaled = scale_by_power(&dec(7, 0), &dec(2, 0), &BigInt::from(3000), false, &ctx, 20).unwrap();
        let exact = ExtendedDecimal::new(BigInt::from(7).shl(3000), BigInt::zero());
        assert_eq!(scaled, exact.round_to_precision(&ctx).unwrap());

        let bits = PrecisionContext::for_precision(53);
        let one = ExtendedFloat::from(1i64);
        let five = ExtendedFloat::from(5i64);
        let q = scale_by_power(&one, &five, &BigInt::from(30), true, &bits, 64).unwrap();
        let den = ExtendedFloat::from(BigInt::from(5).pow(30));
        assert_eq!(q, one.divide_with(&den, &bits).unwrap());
    }

    #[test]
    fn half_even_ties() {
        let ctx = PrecisionContext::for_precision(2);
        let r = round::<Base10>(false, &BigInt::from(125), &BigInt::zero(), &ctx);
        assert_eq!(r.mantissa, BigInt::from(12));
        assert_eq!(r.exponent, BigInt::from(1));
        assert!(r.is_inexact());
        let r = round::<Base10>(false, &BigInt::from(135), &BigInt::zero(), &ctx);
        assert_eq!(r.mantissa, BigInt::from(14));
    }

    #[test]
    fn carry_adds_a_digit() {
        let ctx = PrecisionContext::for_precision(3);
        let r = round::<Base10>(false, &BigInt::from(9996), &BigInt::zero(), &ctx);
        assert_eq!(r.mantissa, BigInt::from(100));
        assert_eq!(r.exponent, BigInt::from(2));
    }

    #[test]
    fn directed_modes_respect_sign() {
        let m = BigInt::from(121);
        let e = BigInt::zero();
        let up = PrecisionContext::for_precision_and_rounding(2, Rounding::Ceiling);
        assert_eq!(round::<Base10>(false, &m, &e, &up).mantissa, BigInt::from(13));
        assert_eq!(round::<Base10>(true, &m, &e, &up).mantissa, BigInt::from(12));
        let floor = up.with_rounding(Rounding::Floor);
        assert_eq!(round::<Base10>(true, &m, &e, &floor).mantissa, BigInt::from(13));
    }

    #[test]
    fn overflow_goes_infinite_unless_toward_zero() {
        let ctx = PrecisionContext::DECIMAL32;
        let r = round::<Base10>(false, &BigInt::from(1), &BigInt::from(97), &ctx);
        assert!(r.infinite);
        assert!(r.flags.contains(Flags::OVERFLOW));
        let down = ctx.with_rounding(Rounding::Down);
        let r = round::<Base10>(false, &BigInt::from(1), &BigInt::from(97), &down);
        assert!(!r.infinite);
        assert_eq!(r.mantissa, BigInt::from(9_999_999));
        assert_eq!(r.exponent, BigInt::from(90));
    }

    #[test]
    fn subnormal_rounds_at_etiny() {
        let ctx = PrecisionContext::DECIMAL32;
        let r = round::<Base10>(false, &BigInt::from(123_456), &BigInt::from(-105), &ctx);
        assert_eq!(r.exponent, BigInt::from(-101));
        assert_eq!(r.mantissa, BigInt::from(12));
        assert!(r.flags.contains(Flags::SUBNORMAL | Flags::UNDERFLOW));
    }

    #[test]
    fn clamp_pads_coefficient() {
        let ctx = PrecisionContext::DECIMAL32;
        let r = round::<Base10>(false, &BigInt::from(1), &BigInt::from(96), &ctx);
        assert_eq!(r.exponent, BigInt::from(90));
        assert_eq!(r.mantissa, BigInt::from(1_000_000));
        assert!(r.flags.contains(Flags::CLAMPED));
    }

    #[test]
    fn bit_precision_for_decimals() {
        let ctx = PrecisionContext::CLI_DECIMAL;
        // 2^96 has 29 digits; a 29-digit coefficient of 2^96 or more loses one more digit.
        let m: BigInt = "79228162514264337593543950336".parse().unwrap();
        let r = round::<Base10>(false, &m, &BigInt::from(-1), &ctx);
        assert_eq!(r.mantissa, "7922816251426433759354395034".parse::<BigInt>().unwrap());
        assert_eq!(r.exponent, BigInt::zero());
        let at_limit = round::<Base10>(false, &m, &BigInt::zero(), &ctx);
        assert!(at_limit.infinite);
        let over = round::<Base10>(false, &BigInt::from(1), &BigInt::from(29), &ctx);
        assert!(over.infinite);
        let max: BigInt = "79228162514264337593543950335".parse().unwrap();
        let fits = round::<Base10>(true, &max, &BigInt::zero(), &ctx);
        assert!(!fits.infinite);
        assert_eq!(fits.mantissa, max);
    }

    #[test]
    fn add_and_cancel() {
        assert_eq!(dec(15, -1).add(&dec(25, -2)), dec(175, -2));
        let z = dec(1, 0).subtract(&dec(1, 0));
        assert!(z.is_zero());
        assert!(!z.is_negative());
        let inf = ExtendedDecimal::positive_infinity();
        assert!(inf.add(&ExtendedDecimal::negative_infinity()).is_nan());
    }

    #[test]
    fn rounded_add_with_huge_gap() {
        let ctx = PrecisionContext::for_precision(5);
        let a = dec(1, 1_000_000);
        let b = dec(1, -1_000_000);
        let up = ctx.with_rounding(Rounding::Up);
        let r = a.add_with(&b, &up).unwrap();
        assert_eq!(r, dec(10001, 999_996));
        let down = a.add_with(&b, &ctx).unwrap();
        assert_eq!(down, dec(10000, 999_996));
        let sub = a.subtract_with(&b, &PrecisionContext::for_precision_and_rounding(5, Rounding::Down))
            .unwrap();
        assert_eq!(sub, dec(99999, 999_995));
    }

    #[test]
    fn exact_division() {
        assert_eq!(dec(1, 0).divide(&dec(4, 0)).unwrap(), dec(25, -2));
        assert_eq!(dec(10, 0).divide(&dec(5, 0)).unwrap(), dec(2, 0));
        let err = dec(1, 0).divide(&dec(3, 0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::NonTerminatingDivision);
        let third = dec(1, 0)
            .divide_with(&dec(3, 0), &PrecisionContext::for_precision(5))
            .unwrap();
        assert_eq!(third, dec(33333, -5));
        assert!(dec(1, 0).divide(&dec(0, 0)).unwrap().is_positive_infinity());
        assert!(dec(0, 0).divide(&dec(0, 0)).unwrap().is_nan());
        let f = ExtendedFloat::from(3).divide(&ExtendedFloat::from(8)).unwrap();
        assert_eq!(f, ExtendedFloat::new(BigInt::from(3), BigInt::from(-3)));
    }

    #[test]
    fn traps_turn_into_errors() {
        let ctx = PrecisionContext::for_precision(2).with_traps(Flags::INEXACT);
        let err = dec(123, 0).round_to_precision(&ctx).unwrap_err();
        assert_eq!(err.code, ErrorCode::Trapped(Flags::INEXACT));
        assert!(dec(120, 0).round_to_precision(&ctx).is_ok());
    }

    #[test]
    fn quantize() {
        assert_eq!(
            dec(12345, -3).round_to_exponent(&BigInt::from(-1), Rounding::HalfEven),
            dec(123, -1)
        );
        assert_eq!(
            dec(5, 0).round_to_exponent(&BigInt::from(-2), Rounding::HalfEven),
            dec(500, -2)
        );
    }

    #[test]
    fn ordering() {
        assert_eq!(dec(1, 1).compare_to(&dec(10, 0)), Ordering::Equal);
        assert_eq!(dec(-5, 0).compare_to(&dec(3, 0)), Ordering::Less);
        assert_eq!(
            ExtendedDecimal::nan().compare_to(&ExtendedDecimal::positive_infinity()),
            Ordering::Greater
        );
        assert_eq!(
            ExtendedDecimal::negative_zero().compare_to(&ExtendedDecimal::zero()),
            Ordering::Equal
        );
        assert_eq!(dec(-11, -1).compare_to(&dec(-1, 0)), Ordering::Less);
    }
}
