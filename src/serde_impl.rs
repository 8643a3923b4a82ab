use core::fmt;
use core::str::FromStr;

use serde::de::{DeserializeOwned, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::bigint::BigInt;
use crate::codec::FromCbor;
use crate::extended::{ExtendedDecimal, ExtendedFloat};
use crate::rational::ExtendedRational;
use crate::{CborError, CborMap, CborObject, DecodeLimits, ErrorCode};

fn serialize_bigint<S: Serializer>(b: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
    if let Some(v) = b.to_i128() {
        serializer.serialize_i128(v)
    } else if let Some(v) = b.to_u128() {
        serializer.serialize_u128(v)
    } else {
        serializer.collect_str(b)
    }
}

impl Serialize for CborObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::BigInteger(b) => serialize_bigint(b, serializer),
            Self::Double(d) => serializer.serialize_f64(*d),
            Self::Single(f) => serializer.serialize_f32(*f),
            Self::Decimal(d) => serializer.collect_str(d),
            Self::Float(f) => serializer.collect_str(f),
            Self::Rational(r) => serializer.collect_str(r),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Null | Self::Undefined => serializer.serialize_unit(),
            Self::Simple(v) => serializer.serialize_u8(*v),
            Self::ByteString(b) => serializer.serialize_bytes(b),
            Self::TextString(s) => serializer.serialize_str(s),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(map) => {
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    m.serialize_entry(k, v)?;
                }
                m.end()
            }
            Self::Tagged(_, inner) => inner.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for CborObject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CborObjectVisitor)
    }
}

struct CborObjectVisitor;

impl<'de> Visitor<'de> for CborObjectVisitor {
    type Value = CborObject;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any CBOR value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E> {
        Ok(CborObject::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
        Ok(CborObject::Integer(v))
    }

    fn visit_i128<E>(self, v: i128) -> Result<Self::Value, E> {
        Ok(CborObject::from(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
        Ok(CborObject::from(v))
    }

    fn visit_u128<E>(self, v: u128) -> Result<Self::Value, E> {
        Ok(CborObject::from(v))
    }

    fn visit_f32<E>(self, v: f32) -> Result<Self::Value, E> {
        Ok(CborObject::Single(v))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
        Ok(CborObject::Double(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
        Ok(CborObject::from(v))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E> {
        Ok(CborObject::TextString(v))
    }

    fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E> {
        Ok(CborObject::from(v))
    }

    fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Self::Value, E> {
        Ok(CborObject::ByteString(v))
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E> {
        Ok(CborObject::Null)
    }

    fn visit_none<E>(self) -> Result<Self::Value, E> {
        Ok(CborObject::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        CborObject::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        while let Some(v) = seq.next_element::<CborObject>()? {
            items.push(v);
        }
        Ok(CborObject::Array(items))
    }

    fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
    where
        M: serde::de::MapAccess<'de>,
    {
        let mut entries = CborMap::new();
        while let Some((k, v)) = map.next_entry::<CborObject, CborObject>()? {
            if entries.contains_key(&k) {
                return Err(serde::de::Error::custom("duplicate map key"));
            }
            entries.insert(k, v);
        }
        Ok(CborObject::Map(entries))
    }
}

macro_rules! string_form {
    ($($t:ty => $what:literal),*) => {$(
        impl Serialize for $t {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $t {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
                parse_string_form::<Self>(&s)
                    .map_err(|_| serde::de::Error::custom(concat!("invalid ", $what)))
            }
        }
    )*};
}

trait StringForm: Sized {
    fn parse(s: &str) -> Result<Self, CborError>;
}

impl StringForm for BigInt {
    fn parse(s: &str) -> Result<Self, CborError> {
        Self::from_str(s)
    }
}

impl StringForm for ExtendedDecimal {
    fn parse(s: &str) -> Result<Self, CborError> {
        Self::from_str(s)
    }
}

impl StringForm for ExtendedFloat {
    // The string form is the exact decimal expansion, which converts back without rounding.
    fn parse(s: &str) -> Result<Self, CborError> {
        ExtendedDecimal::from_str(s).map(|d| d.to_extended_float())
    }
}

impl StringForm for ExtendedRational {
    fn parse(s: &str) -> Result<Self, CborError> {
        Self::from_str(s)
    }
}

fn parse_string_form<T: StringForm>(s: &str) -> Result<T, CborError> {
    T::parse(s)
}

string_form!(
    BigInt => "integer",
    ExtendedDecimal => "decimal",
    ExtendedFloat => "binary float",
    ExtendedRational => "rational"
);

/// Serialize a Rust value to CBOR bytes through [`to_object`].
///
/// # Errors
///
/// Returns an error if the value cannot be represented.
pub fn serialize_to_vec<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CborError> {
    to_object(value)?.encode_to_bytes()
}

/// Deserialize a Rust value from CBOR bytes.
///
/// # Errors
///
/// Returns a format error for malformed input, or `SerdeError` if the decoded value doesn't
/// match the target type.
pub fn deserialize_from_slice<T: DeserializeOwned>(bytes: &[u8], limits: &DecodeLimits) -> Result<T, CborError> {
    let v = CborObject::decode_with_limits(bytes, limits)?;
    from_object(&v)
}

/// Convert a Rust value into a [`CborObject`].
///
/// # Errors
///
/// Returns an error if the value cannot be represented, such as a map with repeated keys.
pub fn to_object<T: Serialize + ?Sized>(value: &T) -> Result<CborObject, CborError> {
    value
        .serialize(ObjectSerializer)
        .map_err(|err| CborError::new(err.code, 0))
}

/// Deserialize a Rust value from a [`CborObject`].
///
/// # Errors
///
/// Returns `SerdeError` (or the conversion's own code) if the value doesn't match the target type.
pub fn from_object<'de, T: Deserialize<'de>>(value: &'de CborObject) -> Result<T, CborError> {
    T::deserialize(ObjectDeserializer::new(value)).map_err(|err| CborError::new(err.code, 0))
}

#[derive(Debug, Clone, Copy)]
struct SerdeError {
    code: ErrorCode,
}

impl SerdeError {
    const fn with_code(code: ErrorCode) -> Self {
        Self { code }
    }

    const fn mismatch() -> Self {
        Self::with_code(ErrorCode::SerdeError)
    }
}

impl From<CborError> for SerdeError {
    fn from(err: CborError) -> Self {
        Self::with_code(err.code)
    }
}

impl fmt::Display for SerdeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&CborError::new(self.code, 0), f)
    }
}

impl std::error::Error for SerdeError {}

impl serde::ser::Error for SerdeError {
    fn custom<T: fmt::Display>(_msg: T) -> Self {
        Self::mismatch()
    }
}

impl serde::de::Error for SerdeError {
    fn custom<T: fmt::Display>(_msg: T) -> Self {
        Self::mismatch()
    }
}

struct ObjectSerializer;

impl Serializer for ObjectSerializer {
    type Ok = CborObject;
    type Error = SerdeError;

    type SerializeSeq = SeqSerializer;
    type SerializeTuple = SeqSerializer;
    type SerializeTupleStruct = SeqSerializer;
    type SerializeTupleVariant = SeqSerializer;
    type SerializeMap = MapSerializer;
    type SerializeStruct = MapSerializer;
    type SerializeStructVariant = MapSerializer;

    fn serialize_bool(self, v: bool) -> Result<Self::Ok, Self::Error> {
        Ok(CborObject::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Self::Ok, Self::Error> {
        Ok(CborObject::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Self::Ok, Self::Error> {
        Ok(CborObject::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Self::Ok, Self::Error> {
        Ok(CborObject::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Self::Ok, Self::Error> {
        Ok(CborObject::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Self::Ok, Self::Error> {
        Ok(CborObject::from(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Self::Ok, Self::Error> {
        Ok(CborObject::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Self::Ok, Self::Error> {
        Ok(CborObject::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Self::Ok, Self::Error> {
        Ok(CborObject::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Self::Ok, Self::Error> {
        Ok(CborObject::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Self::Ok, Self::Error> {
        Ok(CborObject::from(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Self::Ok, Self::Error> {
        Ok(CborObject::Single(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Self::Ok, Self::Error> {
        Ok(CborObject::Double(v))
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok, Self::Error> {
        Ok(CborObject::from(v))
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok, Self::Error> {
        Ok(CborObject::from(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok, Self::Error> {
        Ok(CborObject::from(v))
    }

    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        Ok(CborObject::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Self::Ok, Self::Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        Ok(CborObject::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok, Self::Error> {
        Ok(CborObject::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        Ok(CborObject::from(variant))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        Ok(enum_map(variant, value.serialize(Self)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Ok(SeqSerializer::new(None, len))
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Ok(SeqSerializer::new(None, Some(len)))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Ok(SeqSerializer::new(None, Some(len)))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Ok(SeqSerializer::new(Some(variant), Some(len)))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Ok(MapSerializer::new(None))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Ok(MapSerializer::new(None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Ok(MapSerializer::new(Some(variant)))
    }
}

fn enum_map(variant: &str, value: CborObject) -> CborObject {
    let mut m = CborMap::with_capacity(1);
    m.insert(CborObject::from(variant), value);
    CborObject::Map(m)
}

/// Collects sequence-like data; a set `variant` wraps the result as `{variant: [...]}`.
struct SeqSerializer {
    variant: Option<&'static str>,
    items: Vec<CborObject>,
}

impl SeqSerializer {
    fn new(variant: Option<&'static str>, len: Option<usize>) -> Self {
        let items = len.map_or_else(Vec::new, |n| Vec::with_capacity(n.min(4096)));
        Self { variant, items }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SerdeError> {
        self.items.push(value.serialize(ObjectSerializer)?);
        Ok(())
    }

    fn finish(self) -> CborObject {
        let array = CborObject::Array(self.items);
        match self.variant {
            Some(variant) => enum_map(variant, array),
            None => array,
        }
    }
}

impl SerializeSeq for SeqSerializer {
    type Ok = CborObject;
    type Error = SerdeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(self.finish())
    }
}

impl serde::ser::SerializeTuple for SeqSerializer {
    type Ok = CborObject;
    type Error = SerdeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(self.finish())
    }
}

impl serde::ser::SerializeTupleStruct for SeqSerializer {
    type Ok = CborObject;
    type Error = SerdeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(self.finish())
    }
}

impl serde::ser::SerializeTupleVariant for SeqSerializer {
    type Ok = CborObject;
    type Error = SerdeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(self.finish())
    }
}

/// Collects map-like data; a set `variant` wraps the result as `{variant: {...}}`.
struct MapSerializer {
    variant: Option<&'static str>,
    entries: CborMap,
    next_key: Option<CborObject>,
}

impl MapSerializer {
    fn new(variant: Option<&'static str>) -> Self {
        Self {
            variant,
            entries: CborMap::new(),
            next_key: None,
        }
    }

    fn put(&mut self, key: CborObject, value: CborObject) -> Result<(), SerdeError> {
        if self.entries.contains_key(&key) {
            return Err(SerdeError::with_code(ErrorCode::DuplicateMapKey));
        }
        self.entries.insert(key, value);
        Ok(())
    }

    fn finish(self) -> CborObject {
        let map = CborObject::Map(self.entries);
        match self.variant {
            Some(variant) => enum_map(variant, map),
            None => map,
        }
    }
}

impl SerializeMap for MapSerializer {
    type Ok = CborObject;
    type Error = SerdeError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), Self::Error> {
        self.next_key = Some(key.serialize(ObjectSerializer)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        let key = self.next_key.take().ok_or_else(SerdeError::mismatch)?;
        let value = value.serialize(ObjectSerializer)?;
        self.put(key, value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(self.finish())
    }
}

impl serde::ser::SerializeStruct for MapSerializer {
    type Ok = CborObject;
    type Error = SerdeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        let value = value.serialize(ObjectSerializer)?;
        self.put(CborObject::from(key), value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(self.finish())
    }
}

impl serde::ser::SerializeStructVariant for MapSerializer {
    type Ok = CborObject;
    type Error = SerdeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        serde::ser::SerializeStruct::serialize_field(self, key, value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(self.finish())
    }
}

struct ObjectDeserializer<'de> {
    value: &'de CborObject,
}

impl<'de> ObjectDeserializer<'de> {
    const fn new(value: &'de CborObject) -> Self {
        Self { value }
    }

    fn convert<T: FromCbor>(&self) -> Result<T, SerdeError> {
        T::from_cbor(self.value).map_err(SerdeError::from)
    }
}

macro_rules! deserialize_via_from_cbor {
    ($($method:ident => $t:ty, $visit:ident;)*) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
            visitor.$visit(self.convert::<$t>()?)
        }
    )*};
}

impl<'de> Deserializer<'de> for ObjectDeserializer<'de> {
    type Error = SerdeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value {
            CborObject::Integer(i) => visitor.visit_i64(*i),
            CborObject::BigInteger(b) => {
                if let Some(v) = b.to_i128() {
                    visitor.visit_i128(v)
                } else if let Some(v) = b.to_u128() {
                    visitor.visit_u128(v)
                } else {
                    visitor.visit_string(b.to_string())
                }
            }
            CborObject::Double(d) => visitor.visit_f64(*d),
            CborObject::Single(f) => visitor.visit_f32(*f),
            CborObject::Decimal(d) => visitor.visit_string(d.to_string()),
            CborObject::Float(f) => visitor.visit_string(f.to_string()),
            CborObject::Rational(r) => visitor.visit_string(r.to_string()),
            CborObject::Bool(b) => visitor.visit_bool(*b),
            CborObject::Null | CborObject::Undefined => visitor.visit_unit(),
            CborObject::Simple(v) => visitor.visit_u8(*v),
            CborObject::ByteString(b) => visitor.visit_borrowed_bytes(b),
            CborObject::TextString(s) => visitor.visit_borrowed_str(s),
            CborObject::Array(items) => visitor.visit_seq(SeqAccess { items, idx: 0 }),
            CborObject::Map(map) => visitor.visit_map(MapAccess::new(map)),
            CborObject::Tagged(_, inner) => Self::new(inner).deserialize_any(visitor),
        }
    }

    deserialize_via_from_cbor! {
        deserialize_bool => bool, visit_bool;
        deserialize_i8 => i8, visit_i8;
        deserialize_i16 => i16, visit_i16;
        deserialize_i32 => i32, visit_i32;
        deserialize_i64 => i64, visit_i64;
        deserialize_i128 => i128, visit_i128;
        deserialize_u8 => u8, visit_u8;
        deserialize_u16 => u16, visit_u16;
        deserialize_u32 => u32, visit_u32;
        deserialize_u64 => u64, visit_u64;
        deserialize_u128 => u128, visit_u128;
        deserialize_f32 => f32, visit_f32;
        deserialize_f64 => f64, visit_f64;
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        let s = self.value.as_str()?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(SerdeError::mismatch()),
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value.untag() {
            CborObject::TextString(s) => visitor.visit_borrowed_str(s),
            CborObject::BigInteger(_)
            | CborObject::Decimal(_)
            | CborObject::Float(_)
            | CborObject::Rational(_) => self.deserialize_any(visitor),
            _ => Err(SerdeError::mismatch()),
        }
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value.untag() {
            CborObject::ByteString(b) => visitor.visit_borrowed_bytes(b),
            CborObject::Array(items) => visitor.visit_seq(SeqAccess { items, idx: 0 }),
            _ => Err(SerdeError::mismatch()),
        }
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        if self.value.is_null() || self.value.is_undefined() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        if self.value.is_null() || self.value.is_undefined() {
            visitor.visit_unit()
        } else {
            Err(SerdeError::mismatch())
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_seq(SeqAccess {
            items: self.value.as_array()?,
            idx: 0,
        })
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_map(MapAccess::new(self.value.as_map()?))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self.value.untag() {
            CborObject::TextString(variant) => visitor.visit_enum(EnumAccess {
                variant,
                value: None,
            }),
            CborObject::Map(map) => visitor.visit_enum(EnumAccess::from_map(map)?),
            _ => Err(SerdeError::mismatch()),
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }
}

impl From<SerdeError> for CborError {
    fn from(err: SerdeError) -> Self {
        Self::new(err.code, 0)
    }
}

struct SeqAccess<'de> {
    items: &'de [CborObject],
    idx: usize,
}

impl<'de> serde::de::SeqAccess<'de> for SeqAccess<'de> {
    type Error = SerdeError;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: serde::de::DeserializeSeed<'de>,
    {
        let Some(value) = self.items.get(self.idx) else {
            return Ok(None);
        };
        self.idx += 1;
        seed.deserialize(ObjectDeserializer::new(value)).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len() - self.idx)
    }
}

struct MapAccess<'de> {
    iter: indexmap::map::Iter<'de, CborObject, CborObject>,
    pending: Option<&'de CborObject>,
}

impl<'de> MapAccess<'de> {
    fn new(map: &'de CborMap) -> Self {
        Self {
            iter: map.iter(),
            pending: None,
        }
    }
}

impl<'de> serde::de::MapAccess<'de> for MapAccess<'de> {
    type Error = SerdeError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: serde::de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            None => Ok(None),
            Some((key, value)) => {
                self.pending = Some(value);
                seed.deserialize(ObjectDeserializer::new(key)).map(Some)
            }
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::DeserializeSeed<'de>,
    {
        let value = self.pending.take().ok_or_else(SerdeError::mismatch)?;
        seed.deserialize(ObjectDeserializer::new(value))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct EnumAccess<'de> {
    variant: &'de str,
    value: Option<&'de CborObject>,
}

impl<'de> EnumAccess<'de> {
    fn from_map(map: &'de CborMap) -> Result<Self, SerdeError> {
        if map.len() != 1 {
            return Err(SerdeError::mismatch());
        }
        let (variant, value) = map.iter().next().ok_or_else(SerdeError::mismatch)?;
        Ok(Self {
            variant: variant.as_str()?,
            value: Some(value),
        })
    }
}

impl<'de> serde::de::EnumAccess<'de> for EnumAccess<'de> {
    type Error = SerdeError;
    type Variant = VariantAccess<'de>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant), Self::Error>
    where
        V: serde::de::DeserializeSeed<'de>,
    {
        let key = serde::de::value::BorrowedStrDeserializer::<SerdeError>::new(self.variant);
        let val = seed.deserialize(key)?;
        Ok((val, VariantAccess { value: self.value }))
    }
}

struct VariantAccess<'de> {
    value: Option<&'de CborObject>,
}

impl<'de> serde::de::VariantAccess<'de> for VariantAccess<'de> {
    type Error = SerdeError;

    fn unit_variant(self) -> Result<(), Self::Error> {
        match self.value {
            None => Ok(()),
            Some(v) if v.is_null() => Ok(()),
            _ => Err(SerdeError::mismatch()),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value, Self::Error>
    where
        T: serde::de::DeserializeSeed<'de>,
    {
        let value = self.value.ok_or_else(SerdeError::mismatch)?;
        seed.deserialize(ObjectDeserializer::new(value))
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error> {
        let value = self.value.ok_or_else(SerdeError::mismatch)?;
        ObjectDeserializer::new(value).deserialize_seq(visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        let value = self.value.ok_or_else(SerdeError::mismatch)?;
        ObjectDeserializer::new(value).deserialize_map(visitor)
    }
}
