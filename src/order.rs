use core::cmp::Ordering;

use crate::arith::Number;
use crate::extended::Kind;
use crate::{utf8, CborMap, CborObject};

/// Compare two byte strings: shorter sorts first, then lexicographic byte comparison.
#[inline]
#[must_use]
pub fn cmp_bytes_length_first(a: &[u8], b: &[u8]) -> Ordering {
    match a.len().cmp(&b.len()) {
        Ordering::Equal => a.cmp(b),
        other => other,
    }
}

fn rank(v: &CborObject) -> u8 {
    match v {
        CborObject::Undefined => 0,
        CborObject::Null => 1,
        CborObject::Bool(false) => 2,
        CborObject::Bool(true) => 3,
        CborObject::Simple(_) => 4,
        CborObject::Integer(_)
        | CborObject::BigInteger(_)
        | CborObject::Double(_)
        | CborObject::Single(_)
        | CborObject::Decimal(_)
        | CborObject::Float(_)
        | CborObject::Rational(_) => 5,
        CborObject::ByteString(_) => 6,
        CborObject::TextString(_) => 7,
        CborObject::Array(_) => 8,
        CborObject::Map(_) => 9,
        CborObject::Tagged(_, inner) => rank(inner),
    }
}

/// `-Infinity < finite < +Infinity < NaN`.
fn class(n: &Number) -> u8 {
    match n.kind() {
        Kind::QuietNaN | Kind::SignalingNaN => 3,
        Kind::Infinity if n.signum() < 0 => 0,
        Kind::Infinity => 2,
        Kind::Finite => 1,
    }
}

pub(crate) fn cmp_numbers(a: &Number, b: &Number) -> Ordering {
    let (ca, cb) = (class(a), class(b));
    if ca != 1 || cb != 1 {
        return ca.cmp(&cb);
    }
    let sa = a.signum();
    match sa.cmp(&b.signum()) {
        Ordering::Equal => {}
        other => return other,
    }
    if sa == 0 {
        return Ordering::Equal;
    }
    let magnitude = match (a.log2_bounds(), b.log2_bounds()) {
        (Some((lo_a, hi_a)), Some((lo_b, hi_b))) if lo_a >= hi_b || lo_b >= hi_a => {
            lo_a.cmp(&lo_b)
        }
        _ => a.abs_cmp(b),
    };
    if sa < 0 {
        magnitude.reverse()
    } else {
        magnitude
    }
}

impl Number {
    fn abs_cmp(&self, other: &Self) -> Ordering {
        // Operands share a sign.
        let ord = self.cmp_finite(other);
        if self.signum() < 0 {
            ord.reverse()
        } else {
            ord
        }
    }
}

fn cmp_maps(a: &CborMap, b: &CborMap) -> Ordering {
    match a.len().cmp(&b.len()) {
        Ordering::Equal => {}
        other => return other,
    }
    fn sorted(m: &CborMap) -> Vec<(&CborObject, &CborObject)> {
        let mut entries: Vec<_> = m.iter().collect();
        entries.sort_by(|x, y| x.0.compare_to(y.0));
        entries
    }
    for ((ka, va), (kb, vb)) in sorted(a).into_iter().zip(sorted(b)) {
        match ka.compare_to(kb).then_with(|| va.compare_to(vb)) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    Ordering::Equal
}

fn cmp_untagged(a: &CborObject, b: &CborObject) -> Ordering {
    match rank(a).cmp(&rank(b)) {
        Ordering::Equal => {}
        other => return other,
    }
    match (a, b) {
        (CborObject::Simple(x), CborObject::Simple(y)) => x.cmp(y),
        (CborObject::ByteString(x), CborObject::ByteString(y)) => cmp_bytes_length_first(x, y),
        (CborObject::TextString(x), CborObject::TextString(y)) => utf8::cmp_utf16(x, y),
        (CborObject::Array(x), CborObject::Array(y)) => x.len().cmp(&y.len()).then_with(|| {
            x.iter()
                .zip(y)
                .map(|(p, q)| p.compare_to(q))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        }),
        (CborObject::Map(x), CborObject::Map(y)) => cmp_maps(x, y),
        _ => match (Number::of(a), Number::of(b)) {
            (Some(x), Some(y)) => cmp_numbers(&x, &y),
            _ => Ordering::Equal,
        },
    }
}

impl CborObject {
    /// Total order over all values:
    /// `undefined < null < false < true < other simple values < numbers < byte strings < text
    /// strings < arrays < maps`.
    ///
    /// Numbers compare by exact value whatever their representation, with
    /// `-Infinity < finite < +Infinity < NaN`. Byte strings and arrays order by length first;
    /// text orders by UTF-16 code units. Maps order by size, then by their entries sorted by key.
    /// Tagged values order by content, then by their tag numbers.
    ///
    /// This order is reciprocal (`a.compare_to(b) == b.compare_to(a).reverse()`) but is coarser
    /// than `==`: `1` and `1.0` compare equal without being equal.
    #[must_use]
    pub fn compare_to(&self, other: &Self) -> Ordering {
        cmp_untagged(self.untag(), other.untag()).then_with(|| self.tags().cmp(&other.tags()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bigint::BigInt;
    use crate::extended::ExtendedDecimal;
    use crate::rational::ExtendedRational;

    #[test]
    fn byte_strings_order_by_length_first() {
        assert_eq!(cmp_bytes_length_first(&[0xff], &[0, 0]), Ordering::Less);
        assert_eq!(cmp_bytes_length_first(&[1, 2], &[1, 3]), Ordering::Less);
    }

    #[test]
    fn mixed_numbers_compare_exactly() {
        let third = CborObject::Rational(ExtendedRational::new(BigInt::from(1), BigInt::from(3)).unwrap());
        let d: ExtendedDecimal = "0.3333333333333333333333333333".parse().unwrap();
        assert_eq!(third.compare_to(&CborObject::Decimal(d)), Ordering::Greater);
        assert_eq!(
            CborObject::from(1).compare_to(&CborObject::from(1.0)),
            Ordering::Equal
        );
        assert_eq!(
            CborObject::from(0.1).compare_to(&CborObject::Decimal("0.1".parse().unwrap())),
            Ordering::Greater
        );
        assert_eq!(
            CborObject::from(f64::NAN).compare_to(&CborObject::from(f64::INFINITY)),
            Ordering::Greater
        );
        assert_eq!(
            CborObject::from(f64::NEG_INFINITY).compare_to(&CborObject::from(i64::MIN)),
            Ordering::Less
        );
        let huge = CborObject::Decimal("1E+1000".parse().unwrap());
        assert_eq!(huge.compare_to(&CborObject::from(f64::MAX)), Ordering::Greater);
        assert_eq!(
            CborObject::from(-0.0).compare_to(&CborObject::from(0)),
            Ordering::Equal
        );
    }

    #[test]
    fn types_are_ranked() {
        let ladder = [
            CborObject::Undefined,
            CborObject::Null,
            CborObject::FALSE,
            CborObject::TRUE,
            CborObject::Simple(16),
            CborObject::from(-1e300),
            CborObject::from(vec![0u8]),
            CborObject::from(""),
            CborObject::new_array(),
            CborObject::new_map(),
        ];
        for (i, a) in ladder.iter().enumerate() {
            for (j, b) in ladder.iter().enumerate() {
                assert_eq!(a.compare_to(b), i.cmp(&j), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn text_orders_by_utf16() {
        let astral = CborObject::from("\u{10000}");
        let bmp = CborObject::from("\u{ffff}");
        assert_eq!(astral.compare_to(&bmp), Ordering::Less);
    }

    #[test]
    fn maps_ignore_insertion_order() {
        let entry = |k: &str, v: i64| (CborObject::from(k), CborObject::from(v));
        let a: CborObject = [entry("a", 1), entry("b", 2)].into_iter().collect();
        let b: CborObject = [entry("b", 2), entry("a", 1)].into_iter().collect();
        assert_eq!(a.compare_to(&b), Ordering::Equal);
        assert_eq!(a, b);
    }

    #[test]
    fn maps_compare_by_sorted_entries() {
        let entry = |k: &str, v: i64| (CborObject::from(k), CborObject::from(v));
        let low: CborObject = [entry("b", 2), entry("a", 1)].into_iter().collect();
        let high: CborObject = [entry("a", 1), entry("b", 3)].into_iter().collect();
        assert_eq!(low.compare_to(&high), Ordering::Less);
        assert_eq!(high.compare_to(&low), Ordering::Greater);
        let shorter: CborObject = [entry("z", 9)].into_iter().collect();
        assert_eq!(shorter.compare_to(&low), Ordering::Less);
    }
}
