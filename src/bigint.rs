//! Arbitrary-precision signed integers.
//!
//! [`BigInt`] is an immutable value type: every operation returns a new value. The magnitude is
//! kept as base-2^32 digits, least significant digit first, with no high zero digits, so two equal
//! integers always have identical representations and the derived `Eq`/`Hash` are numeric.

use core::cmp::Ordering;
use core::fmt;
use core::ops::{Add, Mul, Neg, Sub};
use core::str::FromStr;

use crate::{CborError, ErrorCode};

const DIGIT_BITS: usize = 32;
const CHUNK_DIVISOR: u32 = 1_000_000_000;
const CHUNK_DIGITS: usize = 9;

/// An arbitrary-precision signed integer.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct BigInt {
    negative: bool,
    digits: Vec<u32>,
}

fn trim(v: &mut Vec<u32>) {
    while v.last() == Some(&0) {
        v.pop();
    }
}

fn mag_cmp(a: &[u32], b: &[u32]) -> Ordering {
    match a.len().cmp(&b.len()) {
        Ordering::Equal => {}
        other => return other,
    }
    for (x, y) in a.iter().rev().zip(b.iter().rev()) {
        match x.cmp(y) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    Ordering::Equal
}

fn mag_add(a: &[u32], b: &[u32]) -> Vec<u32> {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut out = Vec::with_capacity(long.len() + 1);
    let mut carry = 0u64;
    for (i, &d) in long.iter().enumerate() {
        let s = u64::from(d) + u64::from(short.get(i).copied().unwrap_or(0)) + carry;
        out.push(s as u32);
        carry = s >> DIGIT_BITS;
    }
    if carry != 0 {
        out.push(carry as u32);
    }
    out
}

/// `a - b`, requires `a >= b`.
fn mag_sub(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut out = Vec::with_capacity(a.len());
    let mut borrow = 0i64;
    for (i, &d) in a.iter().enumerate() {
        let mut t = i64::from(d) - i64::from(b.get(i).copied().unwrap_or(0)) - borrow;
        if t < 0 {
            t += 1 << DIGIT_BITS;
            borrow = 1;
        } else {
            borrow = 0;
        }
        out.push(t as u32);
    }
    debug_assert_eq!(borrow, 0);
    trim(&mut out);
    out
}

fn mag_mul(a: &[u32], b: &[u32]) -> Vec<u32> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0u32; a.len() + b.len()];
    for (i, &x) in a.iter().enumerate() {
        if x == 0 {
            continue;
        }
        let mut carry = 0u64;
        for (j, &y) in b.iter().enumerate() {
            let t = u64::from(x) * u64::from(y) + u64::from(out[i + j]) + carry;
            out[i + j] = t as u32;
            carry = t >> DIGIT_BITS;
        }
        let mut k = i + b.len();
        while carry != 0 {
            let t = u64::from(out[k]) + carry;
            out[k] = t as u32;
            carry = t >> DIGIT_BITS;
            k += 1;
        }
    }
    trim(&mut out);
    out
}

fn mag_mul_small_add(a: &mut Vec<u32>, mul: u32, add: u32) {
    let mut carry = u64::from(add);
    for d in a.iter_mut() {
        let t = u64::from(*d) * u64::from(mul) + carry;
        *d = t as u32;
        carry = t >> DIGIT_BITS;
    }
    if carry != 0 {
        a.push(carry as u32);
    }
    trim(a);
}

fn mag_div_rem_small(a: &[u32], d: u32) -> (Vec<u32>, u32) {
    let mut q = vec![0u32; a.len()];
    let mut rem = 0u64;
    for i in (0..a.len()).rev() {
        let cur = (rem << DIGIT_BITS) | u64::from(a[i]);
        q[i] = (cur / u64::from(d)) as u32;
        rem = cur % u64::from(d);
    }
    trim(&mut q);
    (q, rem as u32)
}

fn shl_bits(a: &[u32], s: u32, extra: usize) -> Vec<u32> {
    let mut out = Vec::with_capacity(a.len() + extra);
    if s == 0 {
        out.extend_from_slice(a);
        out.resize(a.len() + extra, 0);
        return out;
    }
    let mut carry = 0u32;
    for &d in a {
        out.push((d << s) | carry);
        carry = d >> (32 - s);
    }
    out.push(carry);
    out.resize(a.len() + extra.max(1), 0);
    out
}

// Knuth, TAOCP vol. 2, 4.3.1, Algorithm D. Requires a non-empty divisor.
fn mag_div_rem(u: &[u32], v: &[u32]) -> (Vec<u32>, Vec<u32>) {
    debug_assert!(!v.is_empty());
    if mag_cmp(u, v) == Ordering::Less {
        return (Vec::new(), u.to_vec());
    }
    if v.len() == 1 {
        let (q, r) = mag_div_rem_small(u, v[0]);
        let r = if r == 0 { Vec::new() } else { vec![r] };
        return (q, r);
    }

    let n = v.len();
    let m = u.len() - n;
    let s = v[n - 1].leading_zeros();
    let vn = shl_bits(v, s, 0);
    let mut un = shl_bits(u, s, 1);
    let mut q = vec![0u32; m + 1];

    let base = 1u128 << DIGIT_BITS;
    let vtop = u128::from(vn[n - 1]);
    let vsec = u128::from(vn[n - 2]);

    for j in (0..=m).rev() {
        let num = (u128::from(un[j + n]) << DIGIT_BITS) | u128::from(un[j + n - 1]);
        let mut qhat = num / vtop;
        let mut rhat = num % vtop;
        while qhat >= base || qhat * vsec > ((rhat << DIGIT_BITS) | u128::from(un[j + n - 2])) {
            qhat -= 1;
            rhat += vtop;
            if rhat >= base {
                break;
            }
        }
        let qhat = qhat as u64;

        let mut k = 0i64;
        for i in 0..n {
            let p = qhat * u64::from(vn[i]);
            let t = i64::from(un[i + j]) - k - (p & 0xffff_ffff) as i64;
            un[i + j] = t as u32;
            k = (p >> DIGIT_BITS) as i64 - (t >> DIGIT_BITS);
        }
        let t = i64::from(un[j + n]) - k;
        un[j + n] = t as u32;

        if t < 0 {
            q[j] = (qhat - 1) as u32;
            let mut carry = 0u64;
            for i in 0..n {
                let t = u64::from(un[i + j]) + u64::from(vn[i]) + carry;
                un[i + j] = t as u32;
                carry = t >> DIGIT_BITS;
            }
            un[j + n] = un[j + n].wrapping_add(carry as u32);
        } else {
            q[j] = qhat as u32;
        }
    }

    let mut r = vec![0u32; n];
    if s == 0 {
        r.copy_from_slice(&un[..n]);
    } else {
        for i in 0..n {
            r[i] = (un[i] >> s) | (un[i + 1] << (32 - s));
        }
    }
    trim(&mut q);
    trim(&mut r);
    (q, r)
}

fn mag_shl(a: &[u32], n: usize) -> Vec<u32> {
    if a.is_empty() {
        return Vec::new();
    }
    let whole = n / DIGIT_BITS;
    let bits = (n % DIGIT_BITS) as u32;
    let mut out = vec![0u32; whole];
    out.extend(shl_bits(a, bits, 0));
    trim(&mut out);
    out
}

fn mag_shr(a: &[u32], n: usize) -> Vec<u32> {
    let whole = n / DIGIT_BITS;
    if whole >= a.len() {
        return Vec::new();
    }
    let bits = (n % DIGIT_BITS) as u32;
    let src = &a[whole..];
    let mut out = Vec::with_capacity(src.len());
    for i in 0..src.len() {
        let lo = src[i] >> bits;
        let hi = if bits == 0 {
            0
        } else {
            src.get(i + 1).map_or(0, |&d| d << (32 - bits))
        };
        out.push(lo | hi);
    }
    trim(&mut out);
    out
}

fn mag_bit_length(a: &[u32]) -> u64 {
    match a.last() {
        None => 0,
        Some(&top) => (a.len() as u64 - 1) * DIGIT_BITS as u64 + u64::from(32 - top.leading_zeros()),
    }
}

fn mag_from_u128(mut v: u128) -> Vec<u32> {
    let mut out = Vec::new();
    while v != 0 {
        out.push(v as u32);
        v >>= DIGIT_BITS;
    }
    out
}

impl BigInt {
    /// The integer zero.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            negative: false,
            digits: Vec::new(),
        }
    }

    /// The integer one.
    #[must_use]
    pub fn one() -> Self {
        Self::from(1u32)
    }

    fn from_mag(negative: bool, mut digits: Vec<u32>) -> Self {
        trim(&mut digits);
        let negative = negative && !digits.is_empty();
        Self { negative, digits }
    }

    /// Construct from an unsigned big-endian magnitude (as carried by CBOR tags 2 and 3).
    #[must_use]
    pub fn from_be_magnitude(bytes: &[u8]) -> Self {
        let mut digits = Vec::with_capacity(bytes.len() / 4 + 1);
        for chunk in bytes.rchunks(4) {
            let mut d = 0u32;
            for &b in chunk {
                d = (d << 8) | u32::from(b);
            }
            digits.push(d);
        }
        Self::from_mag(false, digits)
    }

    /// Return the magnitude as unsigned big-endian bytes with no leading zero byte.
    ///
    /// Zero yields an empty vector.
    #[must_use]
    pub fn to_be_magnitude(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.digits.len() * 4);
        for d in self.digits.iter().rev() {
            out.extend_from_slice(&d.to_be_bytes());
        }
        let lead = out.iter().take_while(|&&b| b == 0).count();
        out.drain(..lead);
        out
    }

    /// Construct from two's-complement bytes.
    ///
    /// The most significant bit of the most significant byte is the sign. An empty slice is zero.
    #[must_use]
    pub fn from_bytes(bytes: &[u8], little_endian: bool) -> Self {
        let mut be: Vec<u8> = bytes.to_vec();
        if little_endian {
            be.reverse();
        }
        let Some(&first) = be.first() else {
            return Self::zero();
        };
        if first & 0x80 == 0 {
            return Self::from_be_magnitude(&be);
        }
        for b in &mut be {
            *b = !*b;
        }
        let mag = Self::from_be_magnitude(&be);
        -(mag + Self::one())
    }

    /// Encode as minimal-length two's-complement bytes (always at least one byte).
    #[must_use]
    pub fn to_bytes(&self, little_endian: bool) -> Vec<u8> {
        let len = usize::try_from(self.bit_length() / 8 + 1).unwrap_or(usize::MAX);
        let mut out = if self.negative {
            let mut mag = (self.abs() - Self::one()).to_be_magnitude();
            for b in &mut mag {
                *b = !*b;
            }
            let mut v = vec![0xffu8; len.saturating_sub(mag.len())];
            v.extend_from_slice(&mag);
            v
        } else {
            let mag = self.to_be_magnitude();
            let mut v = vec![0u8; len.saturating_sub(mag.len())];
            v.extend_from_slice(&mag);
            v
        };
        if little_endian {
            out.reverse();
        }
        out
    }

    /// Parse a number in the given radix (2..=36) with an optional leading `-`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNumber` for an empty string, a bad digit, or an unsupported radix.
    pub fn from_str_radix(s: &str, radix: u32) -> Result<Self, CborError> {
        if !(2..=36).contains(&radix) {
            return Err(CborError::new(ErrorCode::InvalidNumber, 0));
        }
        let (negative, body, start) = match s.strip_prefix('-') {
            Some(rest) => (true, rest, 1),
            None => (false, s, 0),
        };
        if body.is_empty() {
            return Err(CborError::new(ErrorCode::InvalidNumber, start));
        }
        let mut digits = Vec::new();
        if radix == 10 {
            let bytes = body.as_bytes();
            let head = bytes.len() % CHUNK_DIGITS;
            let mut pos = 0;
            let mut first = if head == 0 { CHUNK_DIGITS } else { head };
            while pos < bytes.len() {
                let mut chunk = 0u32;
                for (i, &b) in bytes[pos..pos + first].iter().enumerate() {
                    if !b.is_ascii_digit() {
                        return Err(CborError::new(ErrorCode::InvalidNumber, start + pos + i));
                    }
                    chunk = chunk * 10 + u32::from(b - b'0');
                }
                let scale = 10u32.pow(first as u32);
                mag_mul_small_add(&mut digits, scale, chunk);
                pos += first;
                first = CHUNK_DIGITS;
            }
        } else {
            for (i, c) in body.char_indices() {
                let d = c
                    .to_digit(radix)
                    .ok_or_else(|| CborError::new(ErrorCode::InvalidNumber, start + i))?;
                mag_mul_small_add(&mut digits, radix, d);
            }
        }
        Ok(Self::from_mag(negative, digits))
    }

    /// Format in the given radix (2..=36, lowercase letters). Unsupported radixes fall back to 10.
    #[must_use]
    pub fn to_string_radix(&self, radix: u32) -> String {
        let radix = if (2..=36).contains(&radix) { radix } else { 10 };
        if self.digits.is_empty() {
            return String::from("0");
        }
        let (chunk_div, chunk_len) = if radix == 10 {
            (CHUNK_DIVISOR, CHUNK_DIGITS)
        } else {
            (radix, 1)
        };
        let mut chunks = Vec::new();
        let mut mag = self.digits.clone();
        while !mag.is_empty() {
            let (q, r) = mag_div_rem_small(&mag, chunk_div);
            chunks.push(r);
            mag = q;
        }
        let mut out = String::with_capacity(chunks.len() * chunk_len + 1);
        if self.negative {
            out.push('-');
        }
        for (i, chunk) in chunks.iter().rev().enumerate() {
            let mut buf = [b'0'; CHUNK_DIGITS];
            let mut c = *chunk;
            let mut j = chunk_len;
            while j > 0 {
                j -= 1;
                let d = c % radix;
                buf[j] = char::from_digit(d, radix).map_or(b'0', |ch| ch as u8);
                c /= radix;
            }
            let digits = &buf[..chunk_len];
            let text = if i == 0 {
                let lead = digits.iter().take_while(|&&b| b == b'0').count();
                &digits[lead.min(chunk_len - 1)..]
            } else {
                digits
            };
            out.extend(text.iter().map(|&b| char::from(b)));
        }
        out
    }

    /// Returns `true` iff this is zero.
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.digits.is_empty()
    }

    /// Returns `true` iff this is strictly negative.
    #[inline]
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.negative
    }

    /// Returns `-1`, `0` or `1`.
    #[must_use]
    pub fn signum(&self) -> i32 {
        if self.digits.is_empty() {
            0
        } else if self.negative {
            -1
        } else {
            1
        }
    }

    /// Returns `true` iff the value is even.
    #[must_use]
    pub fn is_even(&self) -> bool {
        self.digits.first().map_or(true, |d| d & 1 == 0)
    }

    /// Absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self {
            negative: false,
            digits: self.digits.clone(),
        }
    }

    /// Arithmetic negation.
    #[must_use]
    pub fn negate(&self) -> Self {
        Self::from_mag(!self.negative, self.digits.clone())
    }

    /// Compare absolute values.
    #[must_use]
    pub fn cmp_abs(&self, other: &Self) -> Ordering {
        mag_cmp(&self.digits, &other.digits)
    }

    /// Number of bits in the minimal two's-complement representation, excluding the sign bit.
    ///
    /// For negative values this is the bit length of `|self| - 1`, so `-1` has length 0 and
    /// `-128` has length 7.
    #[must_use]
    pub fn bit_length(&self) -> u64 {
        if self.negative {
            mag_bit_length(&(self.abs() - Self::one()).digits)
        } else {
            mag_bit_length(&self.digits)
        }
    }

    /// Number of significant bits in the magnitude (0 for zero).
    #[must_use]
    pub fn magnitude_bits(&self) -> u64 {
        mag_bit_length(&self.digits)
    }

    /// Returns bit `n` of the magnitude.
    #[must_use]
    pub fn test_bit(&self, n: u64) -> bool {
        let Ok(idx) = usize::try_from(n / DIGIT_BITS as u64) else {
            return false;
        };
        self.digits
            .get(idx)
            .is_some_and(|d| (d >> (n % DIGIT_BITS as u64)) & 1 == 1)
    }

    /// Index of the lowest set bit of the magnitude, or `None` for zero.
    #[must_use]
    pub fn lowest_set_bit(&self) -> Option<u64> {
        self.digits
            .iter()
            .enumerate()
            .find(|(_, &d)| d != 0)
            .map(|(i, &d)| i as u64 * DIGIT_BITS as u64 + u64::from(d.trailing_zeros()))
    }

    /// Returns `true` iff the value fits in an `i32`.
    #[must_use]
    pub fn can_fit_in_i32(&self) -> bool {
        self.to_i32().is_some()
    }

    /// Returns `true` iff the value fits in an `i64`.
    #[must_use]
    pub fn can_fit_in_i64(&self) -> bool {
        self.to_i64().is_some()
    }

    fn low_u128(&self) -> Option<u128> {
        if self.digits.len() > 4 {
            return None;
        }
        let mut v = 0u128;
        for d in self.digits.iter().rev() {
            v = (v << DIGIT_BITS) | u128::from(*d);
        }
        Some(v)
    }

    /// Convert to `i128` if in range.
    #[must_use]
    pub fn to_i128(&self) -> Option<i128> {
        let mag = self.low_u128()?;
        if self.negative {
            if mag <= i128::MAX as u128 + 1 {
                Some((mag as i128).wrapping_neg())
            } else {
                None
            }
        } else {
            i128::try_from(mag).ok()
        }
    }

    /// Convert to `u128` if in range.
    #[must_use]
    pub fn to_u128(&self) -> Option<u128> {
        if self.negative {
            return None;
        }
        self.low_u128()
    }

    /// Convert to `i64` if in range.
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        self.to_i128().and_then(|v| i64::try_from(v).ok())
    }

    /// Convert to `u64` if in range.
    #[must_use]
    pub fn to_u64(&self) -> Option<u64> {
        self.to_u128().and_then(|v| u64::try_from(v).ok())
    }

    /// Convert to `i32` if in range.
    #[must_use]
    pub fn to_i32(&self) -> Option<i32> {
        self.to_i128().and_then(|v| i32::try_from(v).ok())
    }

    /// Truncating division and remainder; the remainder takes the sign of `self`.
    ///
    /// # Errors
    ///
    /// Returns `DivideByZero` if `divisor` is zero.
    pub fn div_rem(&self, divisor: &Self) -> Result<(Self, Self), CborError> {
        if divisor.is_zero() {
            return Err(CborError::new(ErrorCode::DivideByZero, 0));
        }
        Ok(self.div_rem_nonzero(divisor))
    }

    pub(crate) fn div_rem_nonzero(&self, divisor: &Self) -> (Self, Self) {
        let (q, r) = mag_div_rem(&self.digits, &divisor.digits);
        (
            Self::from_mag(self.negative != divisor.negative, q),
            Self::from_mag(self.negative, r),
        )
    }

    /// Truncating division (rounds toward zero).
    ///
    /// # Errors
    ///
    /// Returns `DivideByZero` if `divisor` is zero.
    pub fn divide(&self, divisor: &Self) -> Result<Self, CborError> {
        self.div_rem(divisor).map(|(q, _)| q)
    }

    /// Remainder of truncating division (sign follows `self`).
    ///
    /// # Errors
    ///
    /// Returns `DivideByZero` if `divisor` is zero.
    pub fn remainder(&self, divisor: &Self) -> Result<Self, CborError> {
        self.div_rem(divisor).map(|(_, r)| r)
    }

    /// Modulus with a result in `[0, |divisor|)`.
    ///
    /// # Errors
    ///
    /// Returns `DivideByZero` if `divisor` is zero.
    pub fn modulo(&self, divisor: &Self) -> Result<Self, CborError> {
        let r = self.remainder(divisor)?;
        if r.negative {
            Ok(r + divisor.abs())
        } else {
            Ok(r)
        }
    }

    /// Raise to a non-negative power.
    #[must_use]
    pub fn pow(&self, mut exp: u32) -> Self {
        let mut base = self.clone();
        let mut acc = Self::one();
        while exp > 0 {
            if exp & 1 == 1 {
                acc = &acc * &base;
            }
            exp >>= 1;
            if exp > 0 {
                base = &base * &base;
            }
        }
        acc
    }

    /// Shift left by `n` bits (multiply by `2^n`).
    #[must_use]
    pub fn shl(&self, n: usize) -> Self {
        Self::from_mag(self.negative, mag_shl(&self.digits, n))
    }

    /// Shift right by `n` bits, rounding toward negative infinity.
    #[must_use]
    pub fn shr(&self, n: usize) -> Self {
        if !self.negative {
            return Self::from_mag(false, mag_shr(&self.digits, n));
        }
        let a = self.abs() - Self::one();
        let shifted = Self::from_mag(false, mag_shr(&a.digits, n));
        -(shifted + Self::one())
    }

    /// Greatest common divisor of the absolute values (`gcd(0, 0) == 0`).
    #[must_use]
    pub fn gcd(&self, other: &Self) -> Self {
        let mut a = self.digits.clone();
        let mut b = other.digits.clone();
        while !b.is_empty() {
            let (_, r) = mag_div_rem(&a, &b);
            a = b;
            b = r;
        }
        Self::from_mag(false, a)
    }

    /// Magnitude divided by a small divisor; returns `(quotient, remainder)` on magnitudes.
    pub(crate) fn div_rem_small_abs(&self, d: u32) -> (Self, u32) {
        let (q, r) = mag_div_rem_small(&self.digits, d);
        (Self::from_mag(false, q), r)
    }
}

impl From<u128> for BigInt {
    fn from(v: u128) -> Self {
        Self::from_mag(false, mag_from_u128(v))
    }
}

impl From<i128> for BigInt {
    fn from(v: i128) -> Self {
        Self::from_mag(v < 0, mag_from_u128(v.unsigned_abs()))
    }
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {$(
        impl From<$t> for BigInt {
            fn from(v: $t) -> Self {
                Self::from(u128::from(v))
            }
        }
    )*};
}

macro_rules! from_signed {
    ($($t:ty),*) => {$(
        impl From<$t> for BigInt {
            fn from(v: $t) -> Self {
                Self::from(i128::from(v))
            }
        }
    )*};
}

from_unsigned!(u8, u16, u32, u64);
from_signed!(i8, i16, i32, i64);

impl From<usize> for BigInt {
    fn from(v: usize) -> Self {
        Self::from(v as u128)
    }
}

impl FromStr for BigInt {
    type Err = CborError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_radix(s, 10)
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_radix(10))
    }
}

impl fmt::Debug for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BigInt({self})")
    }
}

impl Ord for BigInt {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => mag_cmp(&self.digits, &other.digits),
            (true, true) => mag_cmp(&other.digits, &self.digits),
        }
    }
}

impl PartialOrd for BigInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn signed_add(a_neg: bool, a: &[u32], b_neg: bool, b: &[u32]) -> BigInt {
    if a_neg == b_neg {
        return BigInt::from_mag(a_neg, mag_add(a, b));
    }
    match mag_cmp(a, b) {
        Ordering::Equal => BigInt::zero(),
        Ordering::Greater => BigInt::from_mag(a_neg, mag_sub(a, b)),
        Ordering::Less => BigInt::from_mag(b_neg, mag_sub(b, a)),
    }
}

impl Add<&BigInt> for &BigInt {
    type Output = BigInt;

    fn add(self, rhs: &BigInt) -> BigInt {
        signed_add(self.negative, &self.digits, rhs.negative, &rhs.digits)
    }
}

impl Sub<&BigInt> for &BigInt {
    type Output = BigInt;

    fn sub(self, rhs: &BigInt) -> BigInt {
        signed_add(self.negative, &self.digits, !rhs.negative, &rhs.digits)
    }
}

impl Mul<&BigInt> for &BigInt {
    type Output = BigInt;

    fn mul(self, rhs: &BigInt) -> BigInt {
        BigInt::from_mag(
            self.negative != rhs.negative,
            mag_mul(&self.digits, &rhs.digits),
        )
    }
}

macro_rules! forward_owned_binop {
    ($($tr:ident $m:ident),*) => {$(
        impl $tr<BigInt> for BigInt {
            type Output = BigInt;

            fn $m(self, rhs: BigInt) -> BigInt {
                (&self).$m(&rhs)
            }
        }

        impl $tr<&BigInt> for BigInt {
            type Output = BigInt;

            fn $m(self, rhs: &BigInt) -> BigInt {
                (&self).$m(rhs)
            }
        }

        impl $tr<BigInt> for &BigInt {
            type Output = BigInt;

            fn $m(self, rhs: BigInt) -> BigInt {
                self.$m(&rhs)
            }
        }
    )*};
}

forward_owned_binop!(Add add, Sub sub, Mul mul);

impl Neg for BigInt {
    type Output = BigInt;

    fn neg(self) -> BigInt {
        Self::from_mag(!self.negative, self.digits)
    }
}

impl Neg for &BigInt {
    type Output = BigInt;

    fn neg(self) -> BigInt {
        self.negate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(s: &str) -> BigInt {
        s.parse().unwrap()
    }

    #[test]
    fn parse_and_format() {
        for s in ["0", "1", "-1", "4294967296", "-18446744073709551616", "1000000000"] {
            assert_eq!(big(s).to_string(), s);
        }
        assert_eq!(big("-0").to_string(), "0");
        assert!(!big("-0").is_negative());
        assert!("".parse::<BigInt>().is_err());
        assert!("12a".parse::<BigInt>().is_err());
        assert!("-".parse::<BigInt>().is_err());
    }

    #[test]
    fn long_division_matches_multiplication() {
        let a = big("8754379457823947523947923874923874923847293847239847239847298374");
        let b = big("-23984723984723984723987492837492");
        let (q, r) = a.div_rem(&b).unwrap();
        assert_eq!(&(&q * &b) + &r, a);
        assert!(r.cmp_abs(&b) == Ordering::Less);
        assert!(q.is_negative());
        assert!(!r.is_negative());
    }

    #[test]
    fn divide_by_zero_is_arithmetic_error() {
        let err = big("5").divide(&BigInt::zero()).unwrap_err();
        assert_eq!(err.code, ErrorCode::DivideByZero);
        assert!(err.is_arithmetic());
    }

    #[test]
    fn two_complement_bytes() {
        assert_eq!(BigInt::from(-1).to_bytes(false), vec![0xff]);
        assert_eq!(BigInt::from(128).to_bytes(false), vec![0x00, 0x80]);
        assert_eq!(BigInt::from(-128).to_bytes(false), vec![0x80]);
        assert_eq!(BigInt::from(-129).to_bytes(true), vec![0x7f, 0xff]);
        assert_eq!(BigInt::from_bytes(&[0x7f, 0xff], true), BigInt::from(-129));
        assert_eq!(BigInt::from_bytes(&[0x00, 0x80], false), BigInt::from(128));
        assert_eq!(BigInt::from_bytes(&[], false), BigInt::zero());
    }

    #[test]
    fn shifts_floor_for_negatives() {
        assert_eq!(BigInt::from(-5).shr(1), BigInt::from(-3));
        assert_eq!(BigInt::from(5).shr(1), BigInt::from(2));
        assert_eq!(BigInt::from(3).shl(70).shr(70), BigInt::from(3));
    }

    #[test]
    fn bit_length_follows_twos_complement() {
        assert_eq!(BigInt::zero().bit_length(), 0);
        assert_eq!(BigInt::from(-1).bit_length(), 0);
        assert_eq!(BigInt::from(255).bit_length(), 8);
        assert_eq!(BigInt::from(-128).bit_length(), 7);
        assert_eq!(BigInt::from(-129).bit_length(), 8);
    }

    #[test]
    fn fits_and_pow() {
        assert!(BigInt::from(i64::MIN).can_fit_in_i64());
        assert!(!(BigInt::from(i64::MIN) - BigInt::one()).can_fit_in_i64());
        assert_eq!(BigInt::from(10).pow(20).to_string(), "100000000000000000000");
        assert_eq!(BigInt::from_str_radix("ff", 16).unwrap(), BigInt::from(255));
        assert_eq!(BigInt::from(-255).to_string_radix(16), "-ff");
    }
}
