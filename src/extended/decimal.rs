use core::fmt;
use core::str::FromStr;

use crate::bigint::BigInt;
use crate::context::{PrecisionContext, Rounding};
use crate::ieee::{self, Format};
use crate::{CborError, ErrorCode};

use super::math::scale_by_power;
use super::{Base10, Extended, ExtendedDecimal, ExtendedFloat, Kind, Radix};

/// Precision used when a decimal has no finite binary expansion.
const BINARY_FALLBACK_BITS: u64 = 113;

/// Largest exponent magnitude for which a radix conversion forms the power of 5 or 2 exactly.
/// Beyond it the result is rounded, since the exact digits would not fit in memory.
const EXACT_EXPONENT_LIMIT: u64 = 1 << 14;

/// Decimal digits kept when a binary value with a huge exponent is converted to decimal.
const DECIMAL_FALLBACK_DIGITS: u64 = 34;

const GUARD_BITS: u64 = 64;
const GUARD_DIGITS: u64 = 20;

fn exceeds_exact_limit(e: &BigInt) -> bool {
    !matches!(e.to_u64(), Some(e) if e <= EXACT_EXPONENT_LIMIT)
}

fn invalid(offset: usize) -> CborError {
    CborError::new(ErrorCode::InvalidNumber, offset)
}

fn parse_special(body: &str, negative: bool) -> Option<Result<ExtendedDecimal, CborError>> {
    let lower = body.to_ascii_lowercase();
    if lower == "infinity" || lower == "inf" {
        return Some(Ok(ExtendedDecimal::infinity(negative)));
    }
    let (signaling, rest) = if let Some(rest) = lower.strip_prefix("snan") {
        (true, rest)
    } else if let Some(rest) = lower.strip_prefix("nan") {
        (false, rest)
    } else {
        return None;
    };
    if rest.is_empty() {
        return Some(Ok(ExtendedDecimal::nan_with_payload(
            negative,
            BigInt::zero(),
            signaling,
        )));
    }
    if !rest.bytes().all(|b| b.is_ascii_digit()) {
        return Some(Err(invalid(0)));
    }
    Some(
        rest.parse::<BigInt>()
            .map(|payload| ExtendedDecimal::nan_with_payload(negative, payload, signaling)),
    )
}

impl FromStr for ExtendedDecimal {
    type Err = CborError;

    /// Parse `[-] digits [. digits] [(E|e) [+|-] digits]`, `Infinity`, `NaN` or `sNaN` (the last
    /// two with an optional decimal payload). Either the integer or the fraction digits may be
    /// omitted, but not both.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, body, base) = match s.strip_prefix('-') {
            Some(rest) => (true, rest, 1),
            None => (false, s, 0),
        };
        if let Some(special) = parse_special(body, negative) {
            return special;
        }
        let bytes = body.as_bytes();
        let mut pos = 0;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        let int_digits = &body[..pos];
        let mut frac_digits = "";
        if pos < bytes.len() && bytes[pos] == b'.' {
            let start = pos + 1;
            pos = start;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            frac_digits = &body[start..pos];
        }
        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(invalid(base + pos));
        }
        let mut exponent = BigInt::zero();
        if pos < bytes.len() {
            if bytes[pos] != b'e' && bytes[pos] != b'E' {
                return Err(invalid(base + pos));
            }
            pos += 1;
            let exp_start = pos;
            let exp_negative = match bytes.get(pos) {
                Some(b'-') => {
                    pos += 1;
                    true
                }
                Some(b'+') => {
                    pos += 1;
                    false
                }
                _ => false,
            };
            let digits = &body[pos..];
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid(base + exp_start));
            }
            exponent = digits.parse::<BigInt>()?;
            if exp_negative {
                exponent = exponent.negate();
            }
        }
        let mut coefficient = String::with_capacity(int_digits.len() + frac_digits.len());
        coefficient.push_str(int_digits);
        coefficient.push_str(frac_digits);
        let mantissa = coefficient
            .parse::<BigInt>()
            .map_err(|e| invalid(base + e.offset))?;
        let exponent = exponent - BigInt::from(frac_digits.len());
        Ok(Self::finite(negative, mantissa, exponent))
    }
}

fn push_exponent(out: &mut String, e: &BigInt) {
    out.push('E');
    if !e.is_negative() {
        out.push('+');
    }
    out.push_str(&e.to_string());
}

/// Place a decimal point `point` digits from the left of `coeff` (which may be before the first
/// digit or after the last).
fn place_point(out: &mut String, coeff: &str, point: i64) {
    let len = coeff.len() as i64;
    if point <= 0 {
        out.push_str("0.");
        for _ in 0..(-point) {
            out.push('0');
        }
        out.push_str(coeff);
    } else if point >= len {
        out.push_str(coeff);
        for _ in 0..(point - len) {
            out.push('0');
        }
    } else {
        let (head, tail) = coeff.split_at(point as usize);
        out.push_str(head);
        out.push('.');
        out.push_str(tail);
    }
}

impl<R: Radix> Extended<R> {
    fn special_string(&self) -> Option<String> {
        let sign = if self.negative { "-" } else { "" };
        match self.kind {
            Kind::Finite => None,
            Kind::Infinity => Some(format!("{sign}Infinity")),
            Kind::QuietNaN | Kind::SignalingNaN => {
                let name = if self.is_signaling_nan() { "sNaN" } else { "NaN" };
                if self.mantissa.is_zero() {
                    Some(format!("{sign}{name}"))
                } else {
                    Some(format!("{sign}{name}{}", self.mantissa))
                }
            }
        }
    }
}

impl ExtendedDecimal {
    /// Plain notation is used when the exponent is not positive and the adjusted exponent is at
    /// least -6; scientific notation otherwise.
    fn format(&self, engineering: bool) -> String {
        if let Some(s) = self.special_string() {
            return s;
        }
        let coeff = self.mantissa.to_string();
        let digits = coeff.len() as i64;
        let adjusted = &self.exponent + BigInt::from(digits - 1);
        let mut out = String::with_capacity(coeff.len() + 8);
        if self.negative {
            out.push('-');
        }
        if self.exponent.is_zero() {
            out.push_str(&coeff);
            return out;
        }
        let plain_ok = self.exponent.is_negative() && adjusted >= BigInt::from(-6);
        if plain_ok {
            let e = self.exponent.to_i64().unwrap_or(0);
            place_point(&mut out, &coeff, digits + e);
            return out;
        }
        if !engineering {
            out.push(coeff.as_bytes()[0] as char);
            if digits > 1 {
                out.push('.');
                out.push_str(&coeff[1..]);
            }
            push_exponent(&mut out, &adjusted);
            return out;
        }
        let three = BigInt::from(3);
        let rem = adjusted.modulo(&three).ok().and_then(|r| r.to_i64()).unwrap_or(0);
        if self.mantissa.is_zero() {
            // Raise the exponent to a multiple of three, adding zeros after the point.
            let zeros = (3 - rem) % 3;
            out.push('0');
            if zeros > 0 {
                out.push('.');
                for _ in 0..zeros {
                    out.push('0');
                }
            }
            push_exponent(&mut out, &(adjusted + BigInt::from(zeros)));
            return out;
        }
        place_point(&mut out, &coeff, rem + 1);
        let exponent = adjusted - BigInt::from(rem);
        if !exponent.is_zero() {
            push_exponent(&mut out, &exponent);
        }
        out
    }

    /// Scientific or plain notation per the General Decimal Arithmetic `to-scientific-string`.
    #[must_use]
    pub fn to_scientific_string(&self) -> String {
        self.format(false)
    }

    /// Like the scientific form, but with an exponent that is a multiple of three.
    #[must_use]
    pub fn to_engineering_string(&self) -> String {
        self.format(true)
    }

    /// Non-exponential notation, expanding the exponent into zeros.
    #[must_use]
    pub fn to_plain_string(&self) -> String {
        if let Some(s) = self.special_string() {
            return s;
        }
        let coeff = self.mantissa.to_string();
        let mut out = String::with_capacity(coeff.len() + 8);
        if self.negative {
            out.push('-');
        }
        if self.mantissa.is_zero() && !self.exponent.is_negative() {
            out.push('0');
            return out;
        }
        match self.exponent.to_i64() {
            Some(e) => place_point(&mut out, &coeff, coeff.len() as i64 + e),
            // An exponent outside i64 cannot be written out in memory anyway.
            None => out.push_str(&self.format(false)),
        }
        out
    }

    /// The exact decimal value of a double.
    #[must_use]
    pub fn from_f64(v: f64) -> Self {
        Self::from_extended_float(&ExtendedFloat::from_f64(v))
    }

    /// The exact decimal value of a single.
    #[must_use]
    pub fn from_f32(v: f32) -> Self {
        Self::from_extended_float(&ExtendedFloat::from_f32(v))
    }

    /// The exact decimal value of a binary float.
    ///
    /// Exponents beyond 2^14 in magnitude would need millions of digits; those values are
    /// rounded half-even to enough digits (at least 34) to identify the binary value.
    #[must_use]
    pub fn from_extended_float(f: &ExtendedFloat) -> Self {
        if !f.is_finite() {
            return Self::raw(f.negative, f.mantissa.clone(), BigInt::zero(), f.kind);
        }
        if f.mantissa.is_zero() {
            let e = if f.exponent.is_negative() { f.exponent.clone() } else { BigInt::zero() };
            return Self::finite(f.negative, BigInt::zero(), e);
        }
        let k = f.exponent.abs();
        if exceeds_exact_limit(&k) {
            let digits =
                (f.mantissa.magnitude_bits() * 30_103 / 100_000 + 3).max(DECIMAL_FALLBACK_DIGITS);
            let ctx = PrecisionContext::for_precision(digits);
            let m = Self::finite(f.negative, f.mantissa.clone(), BigInt::zero());
            // 2^-k = 5^k * 10^-k
            let (base, exponent) = if f.exponent.is_negative() {
                (Self::from(5i64), f.exponent.clone())
            } else {
                (Self::from(2i64), BigInt::zero())
            };
            return match scale_by_power(&m, &base, &k, false, &ctx, GUARD_DIGITS) {
                Ok(v) => Self::finite(v.negative, v.mantissa, v.exponent + exponent),
                Err(_) => Self::nan(),
            };
        }
        if !f.exponent.is_negative() {
            let shift = usize::try_from(f.exponent.to_u64().unwrap_or(0)).unwrap_or(usize::MAX);
            return Self::finite(f.negative, f.mantissa.shl(shift), BigInt::zero());
        }
        let k = k.to_u64().unwrap_or(u64::MAX);
        let five = BigInt::from(5u32).pow(u32::try_from(k).unwrap_or(u32::MAX));
        Self::finite(f.negative, &f.mantissa * five, f.exponent.clone())
    }

    /// Convert to binary: exact when the value has a finite binary expansion, otherwise rounded
    /// half-even to 113 significant bits.
    #[must_use]
    pub fn to_extended_float(&self) -> ExtendedFloat {
        ExtendedFloat::from_extended_decimal(self)
    }

    fn to_ieee(&self, fmt: Format) -> u64 {
        match self.kind {
            Kind::Infinity => fmt.infinity(self.negative),
            Kind::QuietNaN => fmt.nan(self.negative, &self.mantissa, false),
            Kind::SignalingNaN => fmt.nan(self.negative, &self.mantissa, true),
            Kind::Finite => ieee::from_decimal(
                fmt,
                self.negative,
                &self.mantissa,
                &self.exponent,
                Base10::digit_count(&self.mantissa),
            ),
        }
    }

    /// The nearest double (ties to even), saturating to infinity and underflowing to signed zero.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        f64::from_bits(self.to_ieee(ieee::DOUBLE))
    }

    /// The nearest single (ties to even), saturating to infinity and underflowing to signed zero.
    #[must_use]
    pub fn to_f32(&self) -> f32 {
        f32::from_bits(self.to_ieee(ieee::SINGLE) as u32)
    }
}

impl ExtendedFloat {
    /// Convert a decimal to binary: exact when possible, otherwise rounded half-even to 113
    /// significant bits with an unbounded exponent.
    #[must_use]
    pub fn from_extended_decimal(d: &ExtendedDecimal) -> Self {
        let ctx = PrecisionContext::for_precision_and_rounding(BINARY_FALLBACK_BITS, Rounding::HalfEven);
        Self::from_extended_decimal_with(d, &ctx).unwrap_or_else(|_| Self::nan())
    }

    /// Convert a decimal to binary, rounding to `ctx` when the value has no finite binary
    /// expansion or exceeds the context's precision.
    ///
    /// # Errors
    ///
    /// Returns `Trapped` if a raised condition is trapped by `ctx`.
    pub fn from_extended_decimal_with(
        d: &ExtendedDecimal,
        ctx: &PrecisionContext,
    ) -> Result<Self, CborError> {
        if !d.is_finite() {
            return Ok(Self::raw(d.negative, d.mantissa.clone(), BigInt::zero(), d.kind));
        }
        if d.mantissa.is_zero() {
            return Ok(Self::finite(d.negative, BigInt::zero(), BigInt::zero()));
        }
        let binary_ctx = ctx.with_precision_in_bits(false);
        let k = d.exponent.abs();
        // 5^k cannot divide a mantissa shorter than 2k bits, so no exact quotient exists.
        let no_exact_quotient = d.exponent.is_negative()
            && BigInt::from(d.mantissa.magnitude_bits()) < &k + &k;
        if exceeds_exact_limit(&k) && (no_exact_quotient || !d.exponent.is_negative()) {
            let rounding_ctx = if binary_ctx.is_unlimited() {
                binary_ctx.with_precision(BINARY_FALLBACK_BITS)
            } else {
                binary_ctx
            };
            let m = Self::finite(d.negative, d.mantissa.clone(), BigInt::zero());
            let v = scale_by_power(
                &m,
                &Self::from(5i64),
                &k,
                d.exponent.is_negative(),
                &rounding_ctx.with_unlimited_exponents(),
                GUARD_BITS,
            )?;
            // 10^e = 5^e * 2^e
            let scaled = Self::finite(v.negative, v.mantissa, v.exponent + &d.exponent);
            return scaled.round_to_precision(&rounding_ctx);
        }
        if !d.exponent.is_negative() {
            let e = d.exponent.to_u64().unwrap_or(u64::MAX);
            let five = BigInt::from(5u32).pow(u32::try_from(e).unwrap_or(u32::MAX));
            let exact = Self::finite(d.negative, &d.mantissa * five, d.exponent.clone());
            return exact.round_to_precision(&binary_ctx);
        }
        let k = k.to_u64().unwrap_or(u64::MAX);
        let five = BigInt::from(5u32).pow(u32::try_from(k).unwrap_or(u32::MAX));
        let num = Self::finite(d.negative, d.mantissa.clone(), d.exponent.clone());
        let den = Self::finite(false, five, BigInt::zero());
        match num.divide(&den) {
            Ok(exact) => exact.round_to_precision(&binary_ctx),
            Err(_) => num.divide_with(&den, &binary_ctx),
        }
    }

    /// The exact decimal value.
    #[must_use]
    pub fn to_extended_decimal(&self) -> ExtendedDecimal {
        ExtendedDecimal::from_extended_float(self)
    }

    /// Parse a decimal string and convert it to binary under `ctx`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNumber` for malformed input, or `Trapped` if a raised condition is trapped
    /// by `ctx`.
    pub fn from_string_with(s: &str, ctx: &PrecisionContext) -> Result<Self, CborError> {
        let d: ExtendedDecimal = s.parse()?;
        if ctx.is_unlimited() {
            return Ok(Self::from_extended_decimal(&d));
        }
        Self::from_extended_decimal_with(&d, ctx)
    }
}

impl fmt::Display for ExtendedDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_scientific_string())
    }
}

impl fmt::Display for ExtendedFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_extended_decimal().to_scientific_string())
    }
}

impl ExtendedFloat {
    /// Scientific form of the exact decimal value.
    #[must_use]
    pub fn to_scientific_string(&self) -> String {
        self.to_extended_decimal().to_scientific_string()
    }

    /// Engineering form of the exact decimal value.
    #[must_use]
    pub fn to_engineering_string(&self) -> String {
        self.to_extended_decimal().to_engineering_string()
    }

    /// Plain form of the exact decimal value.
    #[must_use]
    pub fn to_plain_string(&self) -> String {
        self.to_extended_decimal().to_plain_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> ExtendedDecimal {
        s.parse().unwrap()
    }

    #[test]
    fn grammar() {
        assert_eq!(d("12.50"), ExtendedDecimal::new(BigInt::from(1250), BigInt::from(-2)));
        assert_eq!(d("-1E+3"), ExtendedDecimal::new(BigInt::from(-1), BigInt::from(3)));
        assert_eq!(d(".5"), ExtendedDecimal::new(BigInt::from(5), BigInt::from(-1)));
        assert!(d("-Infinity").is_negative_infinity());
        assert!(d("NaN").is_quiet_nan());
        assert!(d("sNaN12").is_signaling_nan());
        for bad in ["", "-", ".", "1e", "1e+", "+1", "+Infinity", "1.2.3", "12a", "NaNx", " 1"] {
            assert!(bad.parse::<ExtendedDecimal>().is_err(), "{bad:?}");
        }
    }

    #[test]
    fn scientific_threshold() {
        assert_eq!(d("123").to_string(), "123");
        assert_eq!(d("-123").to_string(), "-123");
        assert_eq!(d("1.23E+3").to_string(), "1.23E+3");
        assert_eq!(d("123E+3").to_string(), "1.23E+5");
        assert_eq!(d("12.3E-9").to_string(), "1.23E-8");
        assert_eq!(d("-0.00123").to_string(), "-0.00123");
        assert_eq!(d("0.000001").to_string(), "0.000001");
        assert_eq!(d("0.0000001").to_string(), "1E-7");
        assert_eq!(d("0E+2").to_string(), "0E+2");
        assert_eq!(d("-0").to_string(), "-0");
        assert_eq!(d("0.00").to_string(), "0.00");
    }

    #[test]
    fn engineering() {
        assert_eq!(d("229.18E5").to_engineering_string(), "22.918E+6");
        assert_eq!(d("55.0E6").to_engineering_string(), "55.0E+6");
        assert_eq!(d("317.7E-9").to_engineering_string(), "317.7E-9");
        assert_eq!(d("1E+1").to_engineering_string(), "10");
        assert_eq!(d("0E+2").to_engineering_string(), "0.0E+3");
        assert_eq!(d("0E-7").to_engineering_string(), "0.0E-6");
        assert_eq!(d("0E+1").to_engineering_string(), "0.00E+3");
        assert_eq!(d("1E-7").to_engineering_string(), "100E-9");
        assert_eq!(d("10E+1").to_engineering_string(), "100");
    }

    #[test]
    fn plain() {
        assert_eq!(d("277.22E9").to_plain_string(), "277220000000");
        assert_eq!(d("391.19E4").to_plain_string(), "3911900");
        assert_eq!(d("383.27E-9").to_plain_string(), "0.00000038327");
        assert_eq!(d("-1.5").to_plain_string(), "-1.5");
    }

    #[test]
    fn exact_from_double() {
        assert_eq!(
            ExtendedDecimal::from_f64(0.2133).to_string(),
            "0.213299999999999989608312489508534781634807586669921875"
        );
        assert_eq!(ExtendedDecimal::from_f64(100.0).to_string(), "100");
        assert_eq!(ExtendedDecimal::from_f64(-0.0).to_string(), "-0");
        assert!(ExtendedDecimal::from_f64(f64::NAN).is_nan());
    }

    #[test]
    fn nearest_double() {
        for s in ["0.1", "2.2250738585072011E-308", "1.7976931348623157E308", "123456789012345678901234567890"] {
            assert_eq!(d(s).to_f64(), s.parse::<f64>().unwrap(), "{s}");
        }
        assert_eq!(d("1E+400").to_f64(), f64::INFINITY);
        assert_eq!(d("-1E-400").to_f64().to_bits(), (-0.0f64).to_bits());
        assert_eq!(d("3.4028235E38").to_f32(), f32::MAX);
        assert_eq!(d("4.9E-324").to_f64(), f64::from_bits(1));
    }

    #[test]
    fn decimal_to_binary() {
        let f = d("0.375").to_extended_float();
        assert_eq!(f, ExtendedFloat::new(BigInt::from(3), BigInt::from(-3)));
        let tenth = d("0.1").to_extended_float();
        assert_eq!(tenth.unsigned_mantissa().magnitude_bits(), 113);
        assert_eq!(tenth.to_f64(), 0.1);
    }
}
