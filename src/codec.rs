//! Conversions between Rust types and [`CborObject`].

use std::collections::BTreeMap;

use crate::bigint::BigInt;
use crate::extended::{ExtendedDecimal, ExtendedFloat};
use crate::rational::ExtendedRational;
use crate::{CborError, CborMap, CborObject, DecodeLimits, ErrorCode};

/// A CBOR map represented as ordered key/value entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntries<K, V>(pub Vec<(K, V)>);

impl<K, V> MapEntries<K, V> {
    /// Wrap an existing vector of entries.
    #[must_use]
    pub const fn new(entries: Vec<(K, V)>) -> Self {
        Self(entries)
    }
}

/// Convert a Rust value into a [`CborObject`].
pub trait ToCbor {
    /// Build the value tree for `self`.
    ///
    /// # Errors
    ///
    /// Returns an error if `self` has no CBOR form, such as a map with repeated keys.
    fn to_cbor(&self) -> Result<CborObject, CborError>;
}

/// Read a Rust value out of a [`CborObject`].
pub trait FromCbor: Sized {
    /// Convert from a value tree.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if the value has the wrong shape, `Overflow` if a number does not
    /// fit, and `MissingKey` or `LengthMismatch` for incomplete structures.
    fn from_cbor(value: &CborObject) -> Result<Self, CborError>;
}

/// Marker trait for values that can appear as CBOR array elements.
///
/// `u8` is left out so that `Vec<u8>` stays a byte string.
pub trait CborArrayElem {}

/// Encode any [`ToCbor`] value to bytes.
///
/// # Errors
///
/// Returns an error if conversion or encoding fails.
pub fn to_vec<T: ToCbor + ?Sized>(value: &T) -> Result<Vec<u8>, CborError> {
    value.to_cbor()?.encode_to_bytes()
}

/// Decode exactly one item and convert it with [`FromCbor`].
///
/// # Errors
///
/// Returns a format error for malformed input, or the conversion error.
pub fn from_slice<T: FromCbor>(bytes: &[u8], limits: &DecodeLimits) -> Result<T, CborError> {
    T::from_cbor(&CborObject::decode_with_limits(bytes, limits)?)
}

const fn mismatch() -> CborError {
    CborError::new(ErrorCode::TypeMismatch, 0)
}

impl ToCbor for () {
    fn to_cbor(&self) -> Result<CborObject, CborError> {
        Ok(CborObject::Null)
    }
}

impl FromCbor for () {
    fn from_cbor(value: &CborObject) -> Result<Self, CborError> {
        if value.is_null() {
            Ok(())
        } else {
            Err(mismatch())
        }
    }
}

impl ToCbor for bool {
    fn to_cbor(&self) -> Result<CborObject, CborError> {
        Ok(CborObject::Bool(*self))
    }
}

impl FromCbor for bool {
    fn from_cbor(value: &CborObject) -> Result<Self, CborError> {
        value.as_bool()
    }
}

macro_rules! int_codec {
    ($($t:ty),*) => {$(
        impl ToCbor for $t {
            fn to_cbor(&self) -> Result<CborObject, CborError> {
                Ok(CborObject::from(*self))
            }
        }

        impl FromCbor for $t {
            fn from_cbor(value: &CborObject) -> Result<Self, CborError> {
                if !value.is_integral() {
                    return Err(mismatch());
                }
                let n = value.as_bigint()?;
                <$t>::try_from(n.to_i128().ok_or_else(|| CborError::arithmetic(ErrorCode::Overflow))?)
                    .map_err(|_| CborError::arithmetic(ErrorCode::Overflow))
            }
        }
    )*};
}

int_codec!(i8, i16, i32, i64, isize, i128, u8, u16, u32, u64, usize);

impl ToCbor for u128 {
    fn to_cbor(&self) -> Result<CborObject, CborError> {
        Ok(CborObject::from(*self))
    }
}

impl FromCbor for u128 {
    fn from_cbor(value: &CborObject) -> Result<Self, CborError> {
        if !value.is_integral() {
            return Err(mismatch());
        }
        value
            .as_bigint()?
            .to_u128()
            .ok_or_else(|| CborError::arithmetic(ErrorCode::Overflow))
    }
}

impl ToCbor for f64 {
    fn to_cbor(&self) -> Result<CborObject, CborError> {
        Ok(CborObject::Double(*self))
    }
}

impl FromCbor for f64 {
    fn from_cbor(value: &CborObject) -> Result<Self, CborError> {
        value.as_f64()
    }
}

impl ToCbor for f32 {
    fn to_cbor(&self) -> Result<CborObject, CborError> {
        Ok(CborObject::Single(*self))
    }
}

impl FromCbor for f32 {
    fn from_cbor(value: &CborObject) -> Result<Self, CborError> {
        value.as_f32()
    }
}

impl ToCbor for str {
    fn to_cbor(&self) -> Result<CborObject, CborError> {
        Ok(CborObject::from(self))
    }
}

impl ToCbor for String {
    fn to_cbor(&self) -> Result<CborObject, CborError> {
        Ok(CborObject::TextString(self.clone()))
    }
}

impl FromCbor for String {
    fn from_cbor(value: &CborObject) -> Result<Self, CborError> {
        value.as_str().map(str::to_owned)
    }
}

impl ToCbor for [u8] {
    fn to_cbor(&self) -> Result<CborObject, CborError> {
        Ok(CborObject::from(self))
    }
}

impl<const N: usize> ToCbor for [u8; N] {
    fn to_cbor(&self) -> Result<CborObject, CborError> {
        Ok(CborObject::ByteString(self.to_vec()))
    }
}

impl ToCbor for Vec<u8> {
    fn to_cbor(&self) -> Result<CborObject, CborError> {
        Ok(CborObject::ByteString(self.clone()))
    }
}

impl FromCbor for Vec<u8> {
    fn from_cbor(value: &CborObject) -> Result<Self, CborError> {
        value.as_bytes().map(<[u8]>::to_vec)
    }
}

impl ToCbor for BigInt {
    fn to_cbor(&self) -> Result<CborObject, CborError> {
        Ok(CborObject::from(self.clone()))
    }
}

impl FromCbor for BigInt {
    fn from_cbor(value: &CborObject) -> Result<Self, CborError> {
        if !value.is_integral() {
            return Err(mismatch());
        }
        value.as_bigint()
    }
}

macro_rules! extended_codec {
    ($($t:ty => $as:ident),*) => {$(
        impl ToCbor for $t {
            fn to_cbor(&self) -> Result<CborObject, CborError> {
                Ok(CborObject::from(self.clone()))
            }
        }

        impl FromCbor for $t {
            fn from_cbor(value: &CborObject) -> Result<Self, CborError> {
                value.$as()
            }
        }
    )*};
}

extended_codec!(
    ExtendedDecimal => as_extended_decimal,
    ExtendedFloat => as_extended_float,
    ExtendedRational => as_extended_rational
);

impl ToCbor for CborObject {
    fn to_cbor(&self) -> Result<CborObject, CborError> {
        Ok(self.clone())
    }
}

impl FromCbor for CborObject {
    fn from_cbor(value: &CborObject) -> Result<Self, CborError> {
        Ok(value.clone())
    }
}

impl<T: ToCbor + ?Sized> ToCbor for &T {
    fn to_cbor(&self) -> Result<CborObject, CborError> {
        (**self).to_cbor()
    }
}

impl<T: ToCbor + ?Sized> ToCbor for Box<T> {
    fn to_cbor(&self) -> Result<CborObject, CborError> {
        (**self).to_cbor()
    }
}

impl<T: FromCbor> FromCbor for Box<T> {
    fn from_cbor(value: &CborObject) -> Result<Self, CborError> {
        T::from_cbor(value).map(Self::new)
    }
}

impl<T: ToCbor> ToCbor for Option<T> {
    fn to_cbor(&self) -> Result<CborObject, CborError> {
        match self {
            Some(v) => v.to_cbor(),
            None => Ok(CborObject::Null),
        }
    }
}

impl<T: FromCbor> FromCbor for Option<T> {
    fn from_cbor(value: &CborObject) -> Result<Self, CborError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_cbor(value).map(Some)
        }
    }
}

impl<T: ToCbor + CborArrayElem> ToCbor for [T] {
    fn to_cbor(&self) -> Result<CborObject, CborError> {
        self.iter().map(ToCbor::to_cbor).collect::<Result<Vec<_>, _>>().map(CborObject::Array)
    }
}

impl<T: ToCbor + CborArrayElem> ToCbor for Vec<T> {
    fn to_cbor(&self) -> Result<CborObject, CborError> {
        self.as_slice().to_cbor()
    }
}

impl<T: FromCbor + CborArrayElem> FromCbor for Vec<T> {
    fn from_cbor(value: &CborObject) -> Result<Self, CborError> {
        value.as_array()?.iter().map(T::from_cbor).collect()
    }
}

fn map_from_pairs<'a, K, V, I>(pairs: I, len: usize) -> Result<CborObject, CborError>
where
    K: ToCbor + 'a,
    V: ToCbor + 'a,
    I: Iterator<Item = (&'a K, &'a V)>,
{
    let mut m = CborMap::with_capacity(len);
    for (k, v) in pairs {
        let key = k.to_cbor()?;
        if m.contains_key(&key) {
            return Err(CborError::new(ErrorCode::DuplicateMapKey, 0));
        }
        m.insert(key, v.to_cbor()?);
    }
    Ok(CborObject::Map(m))
}

impl<K: ToCbor, V: ToCbor> ToCbor for BTreeMap<K, V> {
    fn to_cbor(&self) -> Result<CborObject, CborError> {
        map_from_pairs(self.iter(), self.len())
    }
}

impl<K: FromCbor + Ord, V: FromCbor> FromCbor for BTreeMap<K, V> {
    fn from_cbor(value: &CborObject) -> Result<Self, CborError> {
        value
            .as_map()?
            .iter()
            .map(|(k, v)| Ok((K::from_cbor(k)?, V::from_cbor(v)?)))
            .collect()
    }
}

impl<K: ToCbor, V: ToCbor> ToCbor for MapEntries<K, V> {
    fn to_cbor(&self) -> Result<CborObject, CborError> {
        map_from_pairs(self.0.iter().map(|(k, v)| (k, v)), self.0.len())
    }
}

impl<K: FromCbor, V: FromCbor> FromCbor for MapEntries<K, V> {
    fn from_cbor(value: &CborObject) -> Result<Self, CborError> {
        value
            .as_map()?
            .iter()
            .map(|(k, v)| Ok((K::from_cbor(k)?, V::from_cbor(v)?)))
            .collect::<Result<Vec<_>, CborError>>()
            .map(Self)
    }
}

macro_rules! array_elem {
    ($($t:ty),*) => {$(impl CborArrayElem for $t {})*};
}

array_elem!(
    bool, i8, i16, i32, i64, isize, i128, u16, u32, u64, usize, u128, f32, f64, String, BigInt,
    ExtendedDecimal, ExtendedFloat, ExtendedRational, CborObject
);

impl CborArrayElem for &str {}
impl<T: CborArrayElem + ?Sized> CborArrayElem for Box<T> {}
impl<T: CborArrayElem> CborArrayElem for Option<T> {}
impl<T> CborArrayElem for Vec<T> {}
impl<K, V> CborArrayElem for BTreeMap<K, V> {}
impl<K, V> CborArrayElem for MapEntries<K, V> {}
