//! Interpretation of the numeric tags.

use crate::bigint::BigInt;
use crate::extended::{Extended, Radix};
use crate::rational::ExtendedRational;
use crate::{CborObject, ErrorCode};

/// Unsigned bignum: byte string holding a big-endian magnitude.
pub const POSITIVE_BIGNUM: u64 = 2;
/// Negative bignum: byte string holding `-1 - n`.
pub const NEGATIVE_BIGNUM: u64 = 3;
/// Decimal fraction `[exponent, mantissa]` with a 64-bit exponent.
pub const DECIMAL_FRACTION: u64 = 4;
/// Bigfloat `[exponent, mantissa]` with a 64-bit exponent.
pub const BIGFLOAT: u64 = 5;
/// Expected conversion to base64url in JSON.
pub const BASE64URL: u64 = 21;
/// Expected conversion to base64 in JSON.
pub const BASE64: u64 = 22;
/// Expected conversion to base16 in JSON.
pub const BASE16: u64 = 23;
/// Rational number `[numerator, denominator]`.
pub const RATIONAL: u64 = 30;
/// Decimal fraction whose exponent may be a bignum.
pub const EXTENDED_DECIMAL_FRACTION: u64 = 264;
/// Bigfloat whose exponent may be a bignum.
pub const EXTENDED_BIGFLOAT: u64 = 265;

/// Returns true iff `tag` is interpreted as a number rather than kept as [`CborObject::Tagged`].
#[must_use]
pub const fn is_numeric(tag: u64) -> bool {
    matches!(
        tag,
        POSITIVE_BIGNUM
            | NEGATIVE_BIGNUM
            | DECIMAL_FRACTION
            | BIGFLOAT
            | RATIONAL
            | EXTENDED_DECIMAL_FRACTION
            | EXTENDED_BIGFLOAT
    )
}

fn integer(v: &CborObject) -> Option<BigInt> {
    match v {
        CborObject::Integer(i) => Some(BigInt::from(*i)),
        CborObject::BigInteger(b) => Some(b.clone()),
        _ => None,
    }
}

fn pair(v: &CborObject) -> Option<(BigInt, BigInt)> {
    match v {
        CborObject::Array(items) if items.len() == 2 => Some((integer(&items[0])?, integer(&items[1])?)),
        _ => None,
    }
}

fn fraction<R: Radix>(v: &CborObject, wide_exponent: bool) -> Option<Extended<R>> {
    if !wide_exponent && !matches!(v.get_index(0), Some(CborObject::Integer(_))) {
        return None;
    }
    let (exponent, mantissa) = pair(v)?;
    Some(Extended::new(mantissa, exponent))
}

/// Apply `tag` to `value`, interpreting the numeric tags.
pub(crate) fn apply(tag: u64, value: CborObject) -> Result<CborObject, ErrorCode> {
    let malformed = ErrorCode::MalformedNumericTag;
    Ok(match tag {
        POSITIVE_BIGNUM | NEGATIVE_BIGNUM => {
            let CborObject::ByteString(bytes) = &value else {
                return Err(malformed);
            };
            let n = BigInt::from_be_magnitude(bytes);
            CborObject::from_bigint(if tag == NEGATIVE_BIGNUM { -(n + BigInt::one()) } else { n })
        }
        DECIMAL_FRACTION | EXTENDED_DECIMAL_FRACTION => CborObject::Decimal(
            fraction(&value, tag == EXTENDED_DECIMAL_FRACTION).ok_or(malformed)?,
        ),
        BIGFLOAT | EXTENDED_BIGFLOAT => {
            CborObject::Float(fraction(&value, tag == EXTENDED_BIGFLOAT).ok_or(malformed)?)
        }
        RATIONAL => {
            let (num, den) = pair(&value).ok_or(malformed)?;
            if den.signum() <= 0 {
                return Err(malformed);
            }
            CborObject::Rational(ExtendedRational::new(num, den).map_err(|_| malformed)?)
        }
        _ => CborObject::Tagged(tag, Box::new(value)),
    })
}
