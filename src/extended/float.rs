use crate::bigint::BigInt;
use crate::ieee::{self, Format, Parts};

use super::math::strip_trailing_zeros;
use super::{Base2, ExtendedFloat, Kind};

impl ExtendedFloat {
    fn from_ieee(fmt: Format, bits: u64) -> Self {
        match ieee::decompose(fmt, bits) {
            Parts::Finite {
                negative,
                mantissa,
                exponent,
            } => {
                if mantissa == 0 {
                    return Self::finite(negative, BigInt::zero(), BigInt::zero());
                }
                let (m, tz) = strip_trailing_zeros::<Base2>(&BigInt::from(mantissa), None);
                Self::finite(negative, m, BigInt::from(exponent) + BigInt::from(tz))
            }
            Parts::Infinity { negative } => Self::infinity(negative),
            Parts::NaN {
                negative,
                payload,
                quiet,
            } => Self::nan_with_payload(negative, BigInt::from(payload), !quiet),
        }
    }

    /// The exact value of a double, read from its bit fields.
    ///
    /// Trailing zero bits of the significand are folded into the exponent. NaN payloads and the
    /// quiet/signaling distinction are preserved.
    #[must_use]
    pub fn from_f64(v: f64) -> Self {
        Self::from_ieee(ieee::DOUBLE, v.to_bits())
    }

    /// The exact value of a single, read from its bit fields.
    #[must_use]
    pub fn from_f32(v: f32) -> Self {
        Self::from_ieee(ieee::SINGLE, u64::from(v.to_bits()))
    }

    fn to_ieee(&self, fmt: Format) -> u64 {
        match self.kind {
            Kind::Infinity => fmt.infinity(self.negative),
            Kind::QuietNaN => fmt.nan(self.negative, &self.mantissa, false),
            Kind::SignalingNaN => fmt.nan(self.negative, &self.mantissa, true),
            Kind::Finite => ieee::from_binary(fmt, self.negative, &self.mantissa, &self.exponent),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_exact() {
        let f = ExtendedFloat::from_f64(1.5);
        assert_eq!(f.unsigned_mantissa(), &BigInt::from(3));
        assert_eq!(f.exponent(), &BigInt::from(-1));
        let tiny = ExtendedFloat::from_f64(f64::from_bits(1));
        assert_eq!(tiny.exponent(), &BigInt::from(-1074));
        assert!(ExtendedFloat::from_f64(-0.0).is_negative());
        assert!(ExtendedFloat::from_f64(-0.0).is_zero());
    }

    #[test]
    fn specials_round_trip() {
        for v in [f64::INFINITY, f64::NEG_INFINITY, f64::MAX, f64::MIN_POSITIVE, -0.0] {
            assert_eq!(ExtendedFloat::from_f64(v).to_f64().to_bits(), v.to_bits());
        }
        let nan = f64::from_bits(0x7ff8_0000_0000_0042);
        assert_eq!(ExtendedFloat::from_f64(nan).to_f64().to_bits(), nan.to_bits());
        assert_eq!(ExtendedFloat::from_f32(f32::MIN).to_f32(), f32::MIN);
    }

    #[test]
    fn narrowing_rounds() {
        let f = ExtendedFloat::from_f64(1.0 + f64::EPSILON);
        assert_eq!(f.to_f32(), 1.0);
        let third = ExtendedFloat::from_f64(1.0 / 3.0);
        assert_eq!(third.to_f32(), 1.0f32 / 3.0);
    }
}
