use core::hash::{Hash, Hasher};

use indexmap::IndexMap;

use crate::arith::Number;
use crate::bigint::BigInt;
use crate::extended::{ExtendedDecimal, ExtendedFloat};
use crate::rational::ExtendedRational;
use crate::{tags, CborError, ErrorCode};

/// An insertion-ordered CBOR map.
pub type CborMap = IndexMap<CborObject, CborObject>;

/// A CBOR data item.
///
/// Numbers keep the representation they were built or decoded with, so an `ExtendedDecimal`
/// stays a decimal through a round trip. Equality and hashing are representational (a
/// `Double` never equals an `Integer`); the heterogeneous numeric order is
/// [`CborObject::compare_to`].
///
/// `BigInteger` normally holds values outside the `i64` range. Constructors and the decoder
/// normalize to `Integer` when the value fits, and equality treats the two as the same number.
#[derive(Debug, Clone)]
pub enum CborObject {
    /// An integer in the `i64` range.
    Integer(i64),
    /// An integer outside the `i64` range.
    BigInteger(BigInt),
    /// A double-precision float.
    Double(f64),
    /// A single-precision float (also used for decoded half-precision values).
    Single(f32),
    /// An arbitrary-precision decimal (tag 4 / 264).
    Decimal(ExtendedDecimal),
    /// An arbitrary-precision binary float (tag 5 / 265).
    Float(ExtendedFloat),
    /// A rational number (tag 30).
    Rational(ExtendedRational),
    /// `true` or `false`.
    Bool(bool),
    /// `null`.
    Null,
    /// `undefined`.
    Undefined,
    /// Any other simple value (0..=19 or 32..=255).
    Simple(u8),
    /// A byte string.
    ByteString(Vec<u8>),
    /// A UTF-8 text string.
    TextString(String),
    /// An array.
    Array(Vec<CborObject>),
    /// A map with insertion order preserved.
    Map(CborMap),
    /// A tag other than the numeric tags, wrapping its content.
    Tagged(u64, Box<CborObject>),
}

/// The broad type of a [`CborObject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CborType {
    /// Any numeric representation.
    Number,
    /// `true` or `false`.
    Boolean,
    /// `null`, `undefined`, or another simple value.
    SimpleValue,
    /// A byte string.
    ByteString,
    /// A text string.
    TextString,
    /// An array.
    Array,
    /// A map.
    Map,
}

impl PartialEq for CborObject {
    fn eq(&self, other: &Self) -> bool {
        use CborObject as O;
        match (self, other) {
            (O::Integer(a), O::Integer(b)) => a == b,
            (O::Integer(a), O::BigInteger(b)) | (O::BigInteger(b), O::Integer(a)) => {
                b.to_i64() == Some(*a)
            }
            (O::BigInteger(a), O::BigInteger(b)) => a == b,
            (O::Double(a), O::Double(b)) => a.to_bits() == b.to_bits(),
            (O::Single(a), O::Single(b)) => a.to_bits() == b.to_bits(),
            (O::Decimal(a), O::Decimal(b)) => a == b,
            (O::Float(a), O::Float(b)) => a == b,
            (O::Rational(a), O::Rational(b)) => a == b,
            (O::Bool(a), O::Bool(b)) => a == b,
            (O::Null, O::Null) | (O::Undefined, O::Undefined) => true,
            (O::Simple(a), O::Simple(b)) => a == b,
            (O::ByteString(a), O::ByteString(b)) => a == b,
            (O::TextString(a), O::TextString(b)) => a == b,
            (O::Array(a), O::Array(b)) => a == b,
            (O::Map(a), O::Map(b)) => a == b,
            (O::Tagged(t, a), O::Tagged(u, b)) => t == u && a == b,
            _ => false,
        }
    }
}

impl Eq for CborObject {}

impl Hash for CborObject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Integer(v) => {
                0u8.hash(state);
                v.hash(state);
            }
            Self::BigInteger(b) => match b.to_i64() {
                Some(v) => {
                    0u8.hash(state);
                    v.hash(state);
                }
                None => {
                    1u8.hash(state);
                    b.hash(state);
                }
            },
            Self::Double(v) => {
                2u8.hash(state);
                v.to_bits().hash(state);
            }
            Self::Single(v) => {
                3u8.hash(state);
                v.to_bits().hash(state);
            }
            Self::Decimal(d) => {
                4u8.hash(state);
                d.hash(state);
            }
            Self::Float(f) => {
                5u8.hash(state);
                f.hash(state);
            }
            Self::Rational(r) => {
                6u8.hash(state);
                r.hash(state);
            }
            Self::Bool(b) => {
                7u8.hash(state);
                b.hash(state);
            }
            Self::Null => 8u8.hash(state),
            Self::Undefined => 9u8.hash(state),
            Self::Simple(v) => {
                10u8.hash(state);
                v.hash(state);
            }
            Self::ByteString(b) => {
                11u8.hash(state);
                b.hash(state);
            }
            Self::TextString(s) => {
                12u8.hash(state);
                s.hash(state);
            }
            Self::Array(items) => {
                13u8.hash(state);
                items.hash(state);
            }
            // Map equality ignores entry order.
            Self::Map(m) => {
                14u8.hash(state);
                m.len().hash(state);
            }
            Self::Tagged(t, inner) => {
                15u8.hash(state);
                t.hash(state);
                inner.hash(state);
            }
        }
    }
}

impl Default for CborObject {
    fn default() -> Self {
        Self::Null
    }
}

impl CborObject {
    /// `null`.
    pub const NULL: Self = Self::Null;
    /// `undefined`.
    pub const UNDEFINED: Self = Self::Undefined;
    /// `true`.
    pub const TRUE: Self = Self::Bool(true);
    /// `false`.
    pub const FALSE: Self = Self::Bool(false);

    /// An empty array.
    #[must_use]
    pub const fn new_array() -> Self {
        Self::Array(Vec::new())
    }

    /// An empty map.
    #[must_use]
    pub fn new_map() -> Self {
        Self::Map(CborMap::new())
    }

    /// A simple value. 20..=23 map to `false`, `true`, `null` and `undefined`.
    ///
    /// # Errors
    ///
    /// Returns `SimpleValueOutOfRange` for 24..=31, which have no valid encoding.
    pub const fn from_simple_value(v: u8) -> Result<Self, CborError> {
        match v {
            20 => Ok(Self::Bool(false)),
            21 => Ok(Self::Bool(true)),
            22 => Ok(Self::Null),
            23 => Ok(Self::Undefined),
            24..=31 => Err(CborError::new(ErrorCode::SimpleValueOutOfRange, 0)),
            _ => Ok(Self::Simple(v)),
        }
    }

    /// Wrap `value` in `tag`.
    ///
    /// Numeric tags (2, 3, 4, 5, 30, 264, 265) are interpreted immediately, so tagging a byte
    /// string with 2 yields an integer.
    ///
    /// # Errors
    ///
    /// Returns `MalformedNumericTag` if a numeric tag's content has the wrong shape.
    pub fn tagged(tag: u64, value: Self) -> Result<Self, CborError> {
        tags::apply(tag, value).map_err(|code| CborError::new(code, 0))
    }

    /// Like [`CborObject::tagged`] with an arbitrary-precision tag number.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTag` if `tag` is negative or not below 2^64, or `MalformedNumericTag` as
    /// for [`CborObject::tagged`].
    pub fn tagged_bigint(tag: &BigInt, value: Self) -> Result<Self, CborError> {
        let tag = tag
            .to_u64()
            .ok_or_else(|| CborError::new(ErrorCode::InvalidTag, 0))?;
        Self::tagged(tag, value)
    }

    /// An integer, normalized to `Integer` when it fits in `i64`.
    #[must_use]
    pub fn from_bigint(v: BigInt) -> Self {
        match v.to_i64() {
            Some(i) => Self::Integer(i),
            None => Self::BigInteger(v),
        }
    }

    /// The broad type.
    #[must_use]
    pub fn cbor_type(&self) -> CborType {
        match self {
            Self::Integer(_)
            | Self::BigInteger(_)
            | Self::Double(_)
            | Self::Single(_)
            | Self::Decimal(_)
            | Self::Float(_)
            | Self::Rational(_) => CborType::Number,
            Self::Bool(_) => CborType::Boolean,
            Self::Null | Self::Undefined | Self::Simple(_) => CborType::SimpleValue,
            Self::ByteString(_) => CborType::ByteString,
            Self::TextString(_) => CborType::TextString,
            Self::Array(_) => CborType::Array,
            Self::Map(_) => CborType::Map,
            Self::Tagged(_, inner) => inner.cbor_type(),
        }
    }

    /// Returns true iff this is `null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true iff this is `undefined`.
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Returns true iff this is `true`.
    #[must_use]
    pub const fn is_true(&self) -> bool {
        matches!(self, Self::Bool(true))
    }

    /// Returns true iff this is `false`.
    #[must_use]
    pub const fn is_false(&self) -> bool {
        matches!(self, Self::Bool(false))
    }

    /// Returns true iff this is a number (looking through tags).
    #[must_use]
    pub fn is_number(&self) -> bool {
        Number::of(self).is_some()
    }

    /// Returns true iff this is a finite number without a fractional part.
    #[must_use]
    pub fn is_integral(&self) -> bool {
        Number::of(self).is_some_and(|n| n.is_integral())
    }

    /// Returns true iff this is a finite number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        Number::of(self).is_some_and(|n| n.is_finite())
    }

    /// Returns true iff this is a numeric infinity.
    #[must_use]
    pub fn is_infinity(&self) -> bool {
        Number::of(self).is_some_and(|n| n.is_infinity())
    }

    /// Returns true iff this is positive infinity.
    #[must_use]
    pub fn is_positive_infinity(&self) -> bool {
        Number::of(self).is_some_and(|n| n.is_infinity() && n.signum() > 0)
    }

    /// Returns true iff this is negative infinity.
    #[must_use]
    pub fn is_negative_infinity(&self) -> bool {
        Number::of(self).is_some_and(|n| n.is_infinity() && n.signum() < 0)
    }

    /// Returns true iff this is a NaN.
    #[must_use]
    pub fn is_nan(&self) -> bool {
        Number::of(self).is_some_and(|n| n.is_nan())
    }

    /// Returns true iff this is a numeric zero of either sign.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        Number::of(self).is_some_and(|n| n.is_finite() && n.signum() == 0)
    }

    /// The sign of a number: `-1`, `0` or `1`.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` for non-numbers and `NotFinite` for NaN.
    pub fn signum(&self) -> Result<i32, CborError> {
        let n = self.number()?;
        if n.is_nan() {
            return Err(CborError::arithmetic(ErrorCode::NotFinite));
        }
        Ok(n.signum())
    }

    /// The outermost tag, if any.
    #[must_use]
    pub const fn tag(&self) -> Option<u64> {
        match self {
            Self::Tagged(t, _) => Some(*t),
            _ => None,
        }
    }

    /// All tags, outermost first.
    #[must_use]
    pub fn tags(&self) -> Vec<u64> {
        let mut out = Vec::new();
        let mut cur = self;
        while let Self::Tagged(t, inner) = cur {
            out.push(*t);
            cur = inner;
        }
        out
    }

    /// Returns true iff `tag` appears anywhere in the tag chain.
    #[must_use]
    pub fn has_tag(&self, tag: u64) -> bool {
        let mut cur = self;
        while let Self::Tagged(t, inner) = cur {
            if *t == tag {
                return true;
            }
            cur = inner;
        }
        false
    }

    /// The content beneath all tags.
    #[must_use]
    pub fn untag(&self) -> &Self {
        let mut cur = self;
        while let Self::Tagged(_, inner) = cur {
            cur = inner;
        }
        cur
    }

    fn untag_mut(&mut self) -> &mut Self {
        let mut cur = self;
        while let Self::Tagged(_, inner) = cur {
            cur = inner;
        }
        cur
    }

    /// Drop all tags, returning the content.
    #[must_use]
    pub fn into_untagged(self) -> Self {
        let mut cur = self;
        while let Self::Tagged(_, inner) = cur {
            cur = *inner;
        }
        cur
    }

    pub(crate) fn number(&self) -> Result<Number, CborError> {
        Number::of(self).ok_or_else(|| CborError::new(ErrorCode::TypeMismatch, 0))
    }

    /// Truncate toward zero, rejecting values that cannot fit in `max_bits` before expanding them.
    fn truncated(&self, max_bits: Option<u64>) -> Result<BigInt, CborError> {
        let overflow = || CborError::arithmetic(ErrorCode::Overflow);
        if let Self::Integer(v) = self.untag() {
            return Ok(BigInt::from(*v));
        }
        let n = self.number()?;
        if !n.is_finite() {
            return Err(overflow());
        }
        if let Some(bits) = max_bits {
            if n.log2_bounds().is_some_and(|(lo, _)| lo > i64::try_from(bits).unwrap_or(i64::MAX)) {
                return Err(overflow());
            }
        }
        n.truncate().map_err(|_| overflow())
    }

    fn as_ranged<T: TryFrom<i64>>(&self) -> Result<T, CborError> {
        let overflow = || CborError::arithmetic(ErrorCode::Overflow);
        let v = self.truncated(Some(64))?.to_i64().ok_or_else(overflow)?;
        T::try_from(v).map_err(|_| overflow())
    }

    /// Truncate to an integer and check it fits in `u8`.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` for non-numbers and `Overflow` if the truncated value is out of
    /// range or the number is not finite.
    pub fn as_u8(&self) -> Result<u8, CborError> {
        self.as_ranged()
    }

    /// Truncate to an integer and check it fits in `i16`.
    ///
    /// # Errors
    ///
    /// As for [`CborObject::as_u8`].
    pub fn as_i16(&self) -> Result<i16, CborError> {
        self.as_ranged()
    }

    /// Truncate to an integer and check it fits in `i32`.
    ///
    /// # Errors
    ///
    /// As for [`CborObject::as_u8`].
    pub fn as_i32(&self) -> Result<i32, CborError> {
        self.as_ranged()
    }

    /// Truncate to an integer and check it fits in `i64`.
    ///
    /// # Errors
    ///
    /// As for [`CborObject::as_u8`].
    pub fn as_i64(&self) -> Result<i64, CborError> {
        self.as_ranged()
    }

    /// Truncate to an integer and check it fits in `u64`.
    ///
    /// # Errors
    ///
    /// As for [`CborObject::as_u8`].
    pub fn as_u64(&self) -> Result<u64, CborError> {
        self.truncated(Some(64))?
            .to_u64()
            .ok_or_else(|| CborError::arithmetic(ErrorCode::Overflow))
    }

    /// Truncate to an arbitrary-precision integer.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` for non-numbers and `Overflow` for infinities and NaN.
    pub fn as_bigint(&self) -> Result<BigInt, CborError> {
        self.truncated(None)
    }

    /// The nearest double.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` for non-numbers.
    pub fn as_f64(&self) -> Result<f64, CborError> {
        Ok(self.number()?.to_f64())
    }

    /// The nearest single.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` for non-numbers.
    pub fn as_f32(&self) -> Result<f32, CborError> {
        Ok(self.number()?.to_f32())
    }

    /// The value as a decimal: exact for integers, floats and decimals; rationals with no finite
    /// decimal expansion are rounded to 34 digits.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` for non-numbers.
    pub fn as_extended_decimal(&self) -> Result<ExtendedDecimal, CborError> {
        self.number()?.to_decimal(&crate::arith::DECIMAL_DIVISION)
    }

    /// The value as a binary float: exact where a finite binary expansion exists, otherwise
    /// rounded to 113 bits.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` for non-numbers.
    pub fn as_extended_float(&self) -> Result<ExtendedFloat, CborError> {
        self.number()?.to_float(&crate::arith::BINARY_DIVISION)
    }

    /// The exact value as a rational.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` for non-numbers.
    pub fn as_extended_rational(&self) -> Result<ExtendedRational, CborError> {
        Ok(self.number()?.to_rational())
    }

    /// The boolean value.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` unless this is `true` or `false`.
    pub fn as_bool(&self) -> Result<bool, CborError> {
        match self.untag() {
            Self::Bool(b) => Ok(*b),
            _ => Err(CborError::new(ErrorCode::TypeMismatch, 0)),
        }
    }

    /// The text content.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` unless this is a text string.
    pub fn as_str(&self) -> Result<&str, CborError> {
        match self.untag() {
            Self::TextString(s) => Ok(s),
            _ => Err(CborError::new(ErrorCode::TypeMismatch, 0)),
        }
    }

    /// The byte content.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` unless this is a byte string.
    pub fn as_bytes(&self) -> Result<&[u8], CborError> {
        match self.untag() {
            Self::ByteString(b) => Ok(b),
            _ => Err(CborError::new(ErrorCode::TypeMismatch, 0)),
        }
    }

    /// The array items.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` unless this is an array.
    pub fn as_array(&self) -> Result<&[Self], CborError> {
        match self.untag() {
            Self::Array(items) => Ok(items),
            _ => Err(CborError::new(ErrorCode::TypeMismatch, 0)),
        }
    }

    /// The map entries.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` unless this is a map.
    pub fn as_map(&self) -> Result<&CborMap, CborError> {
        match self.untag() {
            Self::Map(m) => Ok(m),
            _ => Err(CborError::new(ErrorCode::TypeMismatch, 0)),
        }
    }

    /// The simple value number (`false` is 20, `true` 21, `null` 22, `undefined` 23).
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` for anything else.
    pub fn simple_value(&self) -> Result<u8, CborError> {
        match self.untag() {
            Self::Bool(false) => Ok(20),
            Self::Bool(true) => Ok(21),
            Self::Null => Ok(22),
            Self::Undefined => Ok(23),
            Self::Simple(v) => Ok(*v),
            _ => Err(CborError::new(ErrorCode::TypeMismatch, 0)),
        }
    }

    /// Append to an array.
    ///
    /// # Errors
    ///
    /// Returns `NotAContainer` unless this is an array.
    pub fn add(&mut self, value: impl Into<Self>) -> Result<(), CborError> {
        match self.untag_mut() {
            Self::Array(items) => {
                items.push(value.into());
                Ok(())
            }
            _ => Err(CborError::new(ErrorCode::NotAContainer, 0)),
        }
    }

    /// Add a new map entry.
    ///
    /// # Errors
    ///
    /// Returns `NotAContainer` unless this is a map, or `KeyAlreadyExists` if the key is
    /// present (the map is left unchanged).
    pub fn insert(&mut self, key: impl Into<Self>, value: impl Into<Self>) -> Result<(), CborError> {
        let Self::Map(m) = self.untag_mut() else {
            return Err(CborError::new(ErrorCode::NotAContainer, 0));
        };
        let key = key.into();
        if m.contains_key(&key) {
            return Err(CborError::new(ErrorCode::KeyAlreadyExists, 0));
        }
        m.insert(key, value.into());
        Ok(())
    }

    /// Insert or replace a map entry, returning the previous value.
    ///
    /// # Errors
    ///
    /// Returns `NotAContainer` unless this is a map.
    pub fn set(
        &mut self,
        key: impl Into<Self>,
        value: impl Into<Self>,
    ) -> Result<Option<Self>, CborError> {
        match self.untag_mut() {
            Self::Map(m) => Ok(m.insert(key.into(), value.into())),
            _ => Err(CborError::new(ErrorCode::NotAContainer, 0)),
        }
    }

    /// Replace an array element, returning the previous value.
    ///
    /// # Errors
    ///
    /// Returns `NotAContainer` unless this is an array, or `IndexOutOfRange`.
    pub fn set_index(&mut self, index: usize, value: impl Into<Self>) -> Result<Self, CborError> {
        let Self::Array(items) = self.untag_mut() else {
            return Err(CborError::new(ErrorCode::NotAContainer, 0));
        };
        let slot = items
            .get_mut(index)
            .ok_or_else(|| CborError::new(ErrorCode::IndexOutOfRange, 0))?;
        Ok(core::mem::replace(slot, value.into()))
    }

    /// Remove a map entry by key, or the first array element equal to `key`.
    ///
    /// # Errors
    ///
    /// Returns `NotAContainer` unless this is an array or map.
    pub fn remove(&mut self, key: &Self) -> Result<Option<Self>, CborError> {
        match self.untag_mut() {
            Self::Map(m) => Ok(m.shift_remove(key)),
            Self::Array(items) => Ok(items
                .iter()
                .position(|item| item == key)
                .map(|i| items.remove(i))),
            _ => Err(CborError::new(ErrorCode::NotAContainer, 0)),
        }
    }

    /// Look up a map value.
    #[must_use]
    pub fn get(&self, key: &Self) -> Option<&Self> {
        match self.untag() {
            Self::Map(m) => m.get(key),
            _ => None,
        }
    }

    /// Look up a map value by text key.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&Self> {
        self.get(&Self::TextString(key.to_owned()))
    }

    /// Look up an array element.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&Self> {
        match self.untag() {
            Self::Array(items) => items.get(index),
            _ => None,
        }
    }

    /// Mutable lookup of a map value.
    pub fn get_mut(&mut self, key: &Self) -> Option<&mut Self> {
        match self.untag_mut() {
            Self::Map(m) => m.get_mut(key),
            _ => None,
        }
    }

    /// Returns true iff this is a map containing `key`.
    #[must_use]
    pub fn contains_key(&self, key: &Self) -> bool {
        self.get(key).is_some()
    }

    /// Number of array items or map entries; zero for anything else.
    #[must_use]
    pub fn len(&self) -> usize {
        match self.untag() {
            Self::Array(items) => items.len(),
            Self::Map(m) => m.len(),
            _ => 0,
        }
    }

    /// Returns true iff [`CborObject::len`] is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The map keys in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `NotAContainer` unless this is a map.
    pub fn keys(&self) -> Result<indexmap::map::Keys<'_, Self, Self>, CborError> {
        match self.untag() {
            Self::Map(m) => Ok(m.keys()),
            _ => Err(CborError::new(ErrorCode::NotAContainer, 0)),
        }
    }

    /// Array items or map values, in order.
    ///
    /// # Errors
    ///
    /// Returns `NotAContainer` unless this is an array or map.
    pub fn values(&self) -> Result<Values<'_>, CborError> {
        match self.untag() {
            Self::Array(items) => Ok(Values::Array(items.iter())),
            Self::Map(m) => Ok(Values::Map(m.values())),
            _ => Err(CborError::new(ErrorCode::NotAContainer, 0)),
        }
    }

    /// SHA-256 of the encoded bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be encoded.
    #[cfg(feature = "sha2")]
    #[cfg_attr(docsrs, doc(cfg(feature = "sha2")))]
    pub fn sha256(&self) -> Result<[u8; 32], CborError> {
        use sha2::{Digest, Sha256};
        let bytes = self.encode_to_bytes()?;
        let mut h = Sha256::new();
        h.update(&bytes);
        let out = h.finalize();
        let mut digest = [0u8; 32];
        digest.copy_from_slice(out.as_slice());
        Ok(digest)
    }
}

/// Iterator over array items or map values.
#[derive(Debug, Clone)]
pub enum Values<'a> {
    /// Array items.
    Array(core::slice::Iter<'a, CborObject>),
    /// Map values.
    Map(indexmap::map::Values<'a, CborObject, CborObject>),
}

impl<'a> Iterator for Values<'a> {
    type Item = &'a CborObject;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Array(it) => it.next(),
            Self::Map(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Array(it) => it.size_hint(),
            Self::Map(it) => it.size_hint(),
        }
    }
}

macro_rules! from_small_int {
    ($($t:ty),*) => {$(
        impl From<$t> for CborObject {
            fn from(v: $t) -> Self {
                Self::Integer(i64::from(v))
            }
        }
    )*};
}

from_small_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! from_wide_int {
    ($($t:ty),*) => {$(
        impl From<$t> for CborObject {
            fn from(v: $t) -> Self {
                match i64::try_from(v) {
                    Ok(i) => Self::Integer(i),
                    Err(_) => Self::BigInteger(BigInt::from(v)),
                }
            }
        }
    )*};
}

from_wide_int!(u64, i128, u128, usize);

impl From<isize> for CborObject {
    fn from(v: isize) -> Self {
        Self::from(v as i128)
    }
}

impl From<bool> for CborObject {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for CborObject {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<f32> for CborObject {
    fn from(v: f32) -> Self {
        Self::Single(v)
    }
}

impl From<&str> for CborObject {
    fn from(v: &str) -> Self {
        Self::TextString(v.to_owned())
    }
}

impl From<String> for CborObject {
    fn from(v: String) -> Self {
        Self::TextString(v)
    }
}

impl From<char> for CborObject {
    fn from(v: char) -> Self {
        Self::TextString(v.to_string())
    }
}

impl From<&[u8]> for CborObject {
    fn from(v: &[u8]) -> Self {
        Self::ByteString(v.to_vec())
    }
}

impl From<Vec<u8>> for CborObject {
    fn from(v: Vec<u8>) -> Self {
        Self::ByteString(v)
    }
}

impl From<BigInt> for CborObject {
    fn from(v: BigInt) -> Self {
        Self::from_bigint(v)
    }
}

impl From<ExtendedDecimal> for CborObject {
    fn from(v: ExtendedDecimal) -> Self {
        if v.is_finite() {
            Self::Decimal(v)
        } else {
            Self::Double(v.to_f64())
        }
    }
}

impl From<ExtendedFloat> for CborObject {
    fn from(v: ExtendedFloat) -> Self {
        if v.is_finite() {
            Self::Float(v)
        } else {
            Self::Double(v.to_f64())
        }
    }
}

impl From<ExtendedRational> for CborObject {
    fn from(v: ExtendedRational) -> Self {
        if v.is_finite() {
            Self::Rational(v)
        } else {
            Self::Double(v.to_f64())
        }
    }
}

impl<T: Into<Self>> From<Option<T>> for CborObject {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl From<Vec<Self>> for CborObject {
    fn from(v: Vec<Self>) -> Self {
        Self::Array(v)
    }
}

impl From<CborMap> for CborObject {
    fn from(v: CborMap) -> Self {
        Self::Map(v)
    }
}

impl FromIterator<Self> for CborObject {
    fn from_iter<I: IntoIterator<Item = Self>>(iter: I) -> Self {
        Self::Array(iter.into_iter().collect())
    }
}

impl FromIterator<(Self, Self)> for CborObject {
    fn from_iter<I: IntoIterator<Item = (Self, Self)>>(iter: I) -> Self {
        Self::Map(iter.into_iter().collect())
    }
}
