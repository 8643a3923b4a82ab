use std::io::Write;

use crate::alloc_util::try_reserve;
use crate::bigint::BigInt;
use crate::extended::{Extended, Radix};
use crate::rational::ExtendedRational;
use crate::{tags, CborError, CborObject, ErrorCode};

trait Sink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), CborError>;

    fn write_u8(&mut self, byte: u8) -> Result<(), CborError> {
        self.write(&[byte])
    }

    fn position(&self) -> usize;
}

struct VecSink {
    buf: Vec<u8>,
}

impl VecSink {
    const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    fn with_capacity(capacity: usize) -> Self {
        let mut buf = Vec::new();
        let _ = buf.try_reserve(capacity);
        Self { buf }
    }

    #[inline]
    fn reserve(&mut self, additional: usize) -> Result<(), CborError> {
        let available = self.buf.capacity().saturating_sub(self.buf.len());
        if additional <= available {
            return Ok(());
        }
        let offset = self.buf.len();
        try_reserve(&mut self.buf, additional, offset)
    }
}

impl Sink for VecSink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), CborError> {
        self.reserve(bytes.len())?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn write_u8(&mut self, byte: u8) -> Result<(), CborError> {
        if self.buf.len() == self.buf.capacity() {
            self.reserve(1)?;
        }
        self.buf.push(byte);
        Ok(())
    }

    fn position(&self) -> usize {
        self.buf.len()
    }
}

fn err_at<S: Sink>(sink: &S, code: ErrorCode) -> CborError {
    CborError::new(code, sink.position())
}

fn encode_int<S: Sink>(sink: &mut S, v: i64) -> Result<(), CborError> {
    match u64::try_from(v) {
        Ok(u) => encode_major_uint(sink, 0, u),
        // -1 - v never overflows for negative v.
        Err(_) => encode_major_uint(sink, 1, (-1 - i128::from(v)) as u64),
    }
}

/// Major 0/1 when the value fits in 64 bits, otherwise a tag 2/3 bignum.
fn encode_bigint<S: Sink>(sink: &mut S, v: &BigInt) -> Result<(), CborError> {
    if let Some(u) = v.to_u64() {
        return encode_major_uint(sink, 0, u);
    }
    let (major, tag, n) = if v.is_negative() {
        (1, tags::NEGATIVE_BIGNUM, v.abs() - BigInt::one())
    } else {
        (0, tags::POSITIVE_BIGNUM, v.clone())
    };
    if let Some(u) = n.to_u64() {
        return encode_major_uint(sink, major, u);
    }
    encode_major_uint(sink, 6, tag)?;
    encode_bytes(sink, &n.to_be_magnitude())
}

fn encode_bytes<S: Sink>(sink: &mut S, bytes: &[u8]) -> Result<(), CborError> {
    encode_major_len(sink, 2, bytes.len())?;
    sink.write(bytes)
}

fn encode_text<S: Sink>(sink: &mut S, s: &str) -> Result<(), CborError> {
    let b = s.as_bytes();
    encode_major_len(sink, 3, b.len())?;
    sink.write(b)
}

fn encode_f64<S: Sink>(sink: &mut S, v: f64) -> Result<(), CborError> {
    let mut buf = [0u8; 9];
    buf[0] = 0xfb;
    buf[1..9].copy_from_slice(&v.to_bits().to_be_bytes());
    sink.write(&buf)
}

fn encode_f32<S: Sink>(sink: &mut S, v: f32) -> Result<(), CborError> {
    let mut buf = [0u8; 5];
    buf[0] = 0xfa;
    buf[1..5].copy_from_slice(&v.to_bits().to_be_bytes());
    sink.write(&buf)
}

fn encode_simple<S: Sink>(sink: &mut S, v: u8) -> Result<(), CborError> {
    match v {
        0..=23 => sink.write_u8(0xe0 | v),
        24..=31 => Err(err_at(sink, ErrorCode::SimpleValueOutOfRange)),
        _ => sink.write(&[0xf8, v]),
    }
}

fn encode_major_len<S: Sink>(sink: &mut S, major: u8, len: usize) -> Result<(), CborError> {
    let len_u64 = u64::try_from(len).map_err(|_| err_at(sink, ErrorCode::LengthOverflow))?;
    encode_major_uint(sink, major, len_u64)
}

fn encode_major_uint<S: Sink>(sink: &mut S, major: u8, value: u64) -> Result<(), CborError> {
    debug_assert!(major <= 7);
    if let Ok(v8) = u8::try_from(value) {
        if v8 < 24 {
            return sink.write_u8((major << 5) | v8);
        }
        sink.write_u8((major << 5) | 24)?;
        return sink.write_u8(v8);
    }
    if let Ok(v16) = u16::try_from(value) {
        sink.write_u8((major << 5) | 25)?;
        return sink.write(&v16.to_be_bytes());
    }
    if let Ok(v32) = u32::try_from(value) {
        sink.write_u8((major << 5) | 26)?;
        return sink.write(&v32.to_be_bytes());
    }
    sink.write_u8((major << 5) | 27)?;
    sink.write(&value.to_be_bytes())
}

/// `[exponent, mantissa]` under the 64-bit or the bignum-exponent tag.
fn encode_fraction<S: Sink, R: Radix>(
    sink: &mut S,
    v: &Extended<R>,
    narrow: u64,
    wide: u64,
) -> Result<(), CborError> {
    let tag = if v.exponent().to_i64().is_some() { narrow } else { wide };
    encode_major_uint(sink, 6, tag)?;
    sink.write_u8(0x82)?;
    encode_bigint(sink, v.exponent())?;
    encode_bigint(sink, &v.mantissa())
}

fn encode_rational<S: Sink>(sink: &mut S, r: &ExtendedRational) -> Result<(), CborError> {
    encode_major_uint(sink, 6, tags::RATIONAL)?;
    sink.write_u8(0x82)?;
    encode_bigint(sink, &r.numerator())?;
    encode_bigint(sink, r.denominator())
}

fn encode_value<S: Sink>(sink: &mut S, v: &CborObject) -> Result<(), CborError> {
    match v {
        CborObject::Integer(i) => encode_int(sink, *i),
        CborObject::BigInteger(b) => encode_bigint(sink, b),
        CborObject::Double(d) => encode_f64(sink, *d),
        CborObject::Single(f) => encode_f32(sink, *f),
        CborObject::Decimal(d) if d.is_finite() => {
            encode_fraction(sink, d, tags::DECIMAL_FRACTION, tags::EXTENDED_DECIMAL_FRACTION)
        }
        CborObject::Decimal(d) => encode_f64(sink, d.to_f64()),
        CborObject::Float(f) if f.is_finite() => {
            encode_fraction(sink, f, tags::BIGFLOAT, tags::EXTENDED_BIGFLOAT)
        }
        CborObject::Float(f) => encode_f64(sink, f.to_f64()),
        CborObject::Rational(r) if r.is_finite() => encode_rational(sink, r),
        CborObject::Rational(r) => encode_f64(sink, r.to_f64()),
        CborObject::Bool(b) => sink.write_u8(if *b { 0xf5 } else { 0xf4 }),
        CborObject::Null => sink.write_u8(0xf6),
        CborObject::Undefined => sink.write_u8(0xf7),
        CborObject::Simple(s) => encode_simple(sink, *s),
        CborObject::ByteString(b) => encode_bytes(sink, b),
        CborObject::TextString(s) => encode_text(sink, s),
        CborObject::Array(items) => {
            encode_major_len(sink, 4, items.len())?;
            items.iter().try_for_each(|item| encode_value(sink, item))
        }
        CborObject::Map(entries) => {
            encode_major_len(sink, 5, entries.len())?;
            entries.iter().try_for_each(|(k, v)| {
                encode_value(sink, k)?;
                encode_value(sink, v)
            })
        }
        CborObject::Tagged(tag, inner) => {
            encode_major_uint(sink, 6, *tag)?;
            encode_value(sink, inner)
        }
    }
}

/// Streaming encoder that writes CBOR directly into a `Vec<u8>`.
///
/// All lengths are definite and every argument uses its shortest form.
pub struct Encoder {
    sink: VecSink,
}

impl Encoder {
    /// Create a new encoder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sink: VecSink::new(),
        }
    }

    /// Create an encoder with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sink: VecSink::with_capacity(capacity),
        }
    }

    /// Return the number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sink.buf.len()
    }

    /// Returns `true` if no bytes have been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sink.buf.is_empty()
    }

    /// Consume and return the encoded bytes.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.sink.buf
    }

    /// Borrow the bytes emitted so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.sink.buf
    }

    /// Encode `null`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying buffer fails.
    pub fn null(&mut self) -> Result<(), CborError> {
        self.sink.write_u8(0xf6)
    }

    /// Encode `undefined`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying buffer fails.
    pub fn undefined(&mut self) -> Result<(), CborError> {
        self.sink.write_u8(0xf7)
    }

    /// Encode a boolean.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying buffer fails.
    pub fn bool(&mut self, v: bool) -> Result<(), CborError> {
        self.sink.write_u8(if v { 0xf5 } else { 0xf4 })
    }

    /// Encode a simple value.
    ///
    /// # Errors
    ///
    /// Returns `SimpleValueOutOfRange` for 24..=31.
    pub fn simple(&mut self, v: u8) -> Result<(), CborError> {
        encode_simple(&mut self.sink, v)
    }

    /// Encode an integer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying buffer fails.
    pub fn int(&mut self, v: i64) -> Result<(), CborError> {
        encode_int(&mut self.sink, v)
    }

    /// Encode an unsigned integer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying buffer fails.
    pub fn uint(&mut self, v: u64) -> Result<(), CborError> {
        encode_major_uint(&mut self.sink, 0, v)
    }

    /// Encode an arbitrary-precision integer, as a bignum when it needs more than 64 bits.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying buffer fails.
    pub fn bigint(&mut self, v: &BigInt) -> Result<(), CborError> {
        encode_bigint(&mut self.sink, v)
    }

    /// Encode a double-precision float.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying buffer fails.
    pub fn f64(&mut self, v: f64) -> Result<(), CborError> {
        encode_f64(&mut self.sink, v)
    }

    /// Encode a single-precision float.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying buffer fails.
    pub fn f32(&mut self, v: f32) -> Result<(), CborError> {
        encode_f32(&mut self.sink, v)
    }

    /// Encode a byte string.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn bytes(&mut self, b: &[u8]) -> Result<(), CborError> {
        encode_bytes(&mut self.sink, b)
    }

    /// Encode a text string.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn text(&mut self, s: &str) -> Result<(), CborError> {
        encode_text(&mut self.sink, s)
    }

    /// Write a tag header. The next item written is its content.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the underlying buffer fails.
    pub fn tag(&mut self, tag: u64) -> Result<(), CborError> {
        encode_major_uint(&mut self.sink, 6, tag)
    }

    /// Encode a whole value tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree holds an unencodable simple value; nothing is written then.
    pub fn value(&mut self, v: &CborObject) -> Result<(), CborError> {
        self.rollback_on_err(|enc| encode_value(&mut enc.sink, v))
    }

    /// Run `f`, dropping everything it wrote if it fails.
    fn rollback_on_err<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, CborError>,
    ) -> Result<T, CborError> {
        let start = self.sink.buf.len();
        f(self).inspect_err(|_| self.sink.buf.truncate(start))
    }

    fn unfilled(&self, remaining: usize) -> Result<(), CborError> {
        match remaining {
            0 => Ok(()),
            _ => Err(CborError::new(ErrorCode::LengthMismatch, self.sink.position())),
        }
    }

    /// Encode a definite-length array of `len` items written by `f`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or if `f` fills a different number of slots
    /// (`LengthMismatch`). Nothing is written on error.
    pub fn array<F>(&mut self, len: usize, f: F) -> Result<(), CborError>
    where
        F: FnOnce(&mut ArrayEncoder<'_>) -> Result<(), CborError>,
    {
        self.rollback_on_err(|enc| {
            encode_major_len(&mut enc.sink, 4, len)?;
            let mut a = ArrayEncoder {
                enc: &mut *enc,
                remaining: len,
            };
            f(&mut a)?;
            let remaining = a.remaining;
            enc.unfilled(remaining)
        })
    }

    /// Encode a definite-length map of `len` entries written by `f`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails, if `f` writes a different number of entries
    /// (`LengthMismatch`), or if a key repeats (`DuplicateMapKey`). Nothing is written on error.
    pub fn map<F>(&mut self, len: usize, f: F) -> Result<(), CborError>
    where
        F: FnOnce(&mut MapEncoder<'_>) -> Result<(), CborError>,
    {
        self.rollback_on_err(|enc| {
            encode_major_len(&mut enc.sink, 5, len)?;
            let mut m = MapEncoder {
                enc: &mut *enc,
                remaining: len,
                keys: Vec::new(),
            };
            f(&mut m)?;
            let remaining = m.remaining;
            enc.unfilled(remaining)
        })
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for writing array elements.
///
/// Each call fills one of the slots declared in [`Encoder::array`].
pub struct ArrayEncoder<'a> {
    enc: &'a mut Encoder,
    remaining: usize,
}

impl ArrayEncoder<'_> {
    /// Fill the next slot with whatever `f` writes, which must be exactly one item.
    ///
    /// # Errors
    ///
    /// Returns `LengthMismatch` once every slot is filled, or the error from `f`.
    pub fn item<F>(&mut self, f: F) -> Result<(), CborError>
    where
        F: FnOnce(&mut Encoder) -> Result<(), CborError>,
    {
        if self.remaining == 0 {
            return Err(CborError::new(ErrorCode::LengthMismatch, self.enc.len()));
        }
        f(&mut *self.enc)?;
        self.remaining -= 1;
        Ok(())
    }

    /// Shorthand for `item(|e| e.null())`.
    ///
    /// # Errors
    ///
    /// As for [`ArrayEncoder::item`].
    pub fn null(&mut self) -> Result<(), CborError> {
        self.item(Encoder::null)
    }

    /// Shorthand for `item(|e| e.int(v))`.
    ///
    /// # Errors
    ///
    /// As for [`ArrayEncoder::item`].
    pub fn int(&mut self, v: i64) -> Result<(), CborError> {
        self.item(|e| e.int(v))
    }

    /// Shorthand for `item(|e| e.text(s))`.
    ///
    /// # Errors
    ///
    /// As for [`ArrayEncoder::item`].
    pub fn text(&mut self, s: &str) -> Result<(), CborError> {
        self.item(|e| e.text(s))
    }

    /// Shorthand for `item(|e| e.value(v))`.
    ///
    /// # Errors
    ///
    /// As for [`ArrayEncoder::item`].
    pub fn value(&mut self, v: &CborObject) -> Result<(), CborError> {
        self.item(|e| e.value(v))
    }

    /// Fill the next slot with a nested array.
    ///
    /// # Errors
    ///
    /// As for [`ArrayEncoder::item`] and [`Encoder::array`].
    pub fn array<F>(&mut self, len: usize, f: F) -> Result<(), CborError>
    where
        F: FnOnce(&mut ArrayEncoder<'_>) -> Result<(), CborError>,
    {
        self.item(|e| e.array(len, f))
    }

    /// Fill the next slot with a nested map.
    ///
    /// # Errors
    ///
    /// As for [`ArrayEncoder::item`] and [`Encoder::map`].
    pub fn map<F>(&mut self, len: usize, f: F) -> Result<(), CborError>
    where
        F: FnOnce(&mut MapEncoder<'_>) -> Result<(), CborError>,
    {
        self.item(|e| e.map(len, f))
    }
}

/// Builder for writing map entries.
pub struct MapEncoder<'a> {
    enc: &'a mut Encoder,
    remaining: usize,
    keys: Vec<(usize, usize)>,
}

impl MapEncoder<'_> {
    fn write_entry<K, F>(&mut self, write_key: K, f: F) -> Result<(), CborError>
    where
        K: FnOnce(&mut VecSink) -> Result<(), CborError>,
        F: FnOnce(&mut Encoder) -> Result<(), CborError>,
    {
        if self.remaining == 0 {
            return Err(CborError::new(
                ErrorCode::LengthMismatch,
                self.enc.sink.position(),
            ));
        }

        let key_start = self.enc.sink.buf.len();
        if let Err(err) = write_key(&mut self.enc.sink) {
            return self.fail_entry(key_start, err);
        }
        let key_end = self.enc.sink.buf.len();
        let buf = &self.enc.sink.buf;
        if self.keys.iter().any(|&(s, e)| buf[s..e] == buf[key_start..key_end]) {
            let err = CborError::new(ErrorCode::DuplicateMapKey, key_start);
            return self.fail_entry(key_start, err);
        }
        if let Err(err) = f(&mut *self.enc) {
            return self.fail_entry(key_start, err);
        }
        try_reserve(&mut self.keys, 1, key_start)?;
        self.keys.push((key_start, key_end));
        self.remaining -= 1;
        Ok(())
    }

    fn fail_entry<T>(&mut self, entry_start: usize, err: CborError) -> Result<T, CborError> {
        self.enc.sink.buf.truncate(entry_start);
        Err(err)
    }

    /// Insert an entry with a text key.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails, the entry count is exceeded, or the key repeats.
    pub fn entry<F>(&mut self, key: &str, f: F) -> Result<(), CborError>
    where
        F: FnOnce(&mut Encoder) -> Result<(), CborError>,
    {
        self.write_entry(|sink| encode_text(sink, key), f)
    }

    /// Insert an entry with an arbitrary key.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails, the entry count is exceeded, or the key repeats.
    pub fn entry_value<F>(&mut self, key: &CborObject, f: F) -> Result<(), CborError>
    where
        F: FnOnce(&mut Encoder) -> Result<(), CborError>,
    {
        self.write_entry(|sink| encode_value(sink, key), f)
    }
}

impl CborObject {
    /// Encode to bytes. Numbers keep their representation: extended numbers use their numeric
    /// tags, and non-finite extended numbers become doubles.
    ///
    /// # Errors
    ///
    /// Returns `SimpleValueOutOfRange` if the tree holds a simple value in 24..=31.
    pub fn encode_to_bytes(&self) -> Result<Vec<u8>, CborError> {
        let mut sink = VecSink::new();
        encode_value(&mut sink, self)?;
        Ok(sink.buf)
    }

    /// Encode and write to `w`.
    ///
    /// # Errors
    ///
    /// As for [`CborObject::encode_to_bytes`], plus `Io` if writing fails.
    pub fn write_to<W: Write>(&self, mut w: W) -> Result<(), CborError> {
        let bytes = self.encode_to_bytes()?;
        w.write_all(&bytes).map_err(CborError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extended::ExtendedDecimal;

    fn hex(v: &CborObject) -> String {
        hex::encode(v.encode_to_bytes().unwrap())
    }

    #[test]
    fn integers_use_shortest_form() {
        assert_eq!(hex(&CborObject::from(0)), "00");
        assert_eq!(hex(&CborObject::from(24)), "1818");
        assert_eq!(hex(&CborObject::from(-1)), "20");
        assert_eq!(hex(&CborObject::from(-1000)), "3903e7");
        assert_eq!(hex(&CborObject::from(u64::MAX)), "1bffffffffffffffff");
        assert_eq!(hex(&CborObject::from(-18_446_744_073_709_551_616_i128)), "3bffffffffffffffff");
        assert_eq!(hex(&CborObject::from(18_446_744_073_709_551_616_u128)), "c249010000000000000000");
        assert_eq!(hex(&CborObject::from(-18_446_744_073_709_551_617_i128)), "c349010000000000000000");
    }

    #[test]
    fn numeric_tags() {
        let d: ExtendedDecimal = "273.15".parse().unwrap();
        assert_eq!(hex(&CborObject::Decimal(d)), "c48221196ab3");
        let f = crate::extended::ExtendedFloat::from_f64(1.5);
        assert_eq!(hex(&CborObject::Float(f)), "c5822003");
        let r = ExtendedRational::new(BigInt::from(1), BigInt::from(3)).unwrap();
        assert_eq!(hex(&CborObject::Rational(r)), "d81e820103");
        let wide = ExtendedDecimal::new(BigInt::one(), BigInt::one().shl(64));
        assert!(hex(&CborObject::Decimal(wide)).starts_with("d90108"));
        assert_eq!(hex(&CborObject::Decimal(ExtendedDecimal::positive_infinity())), "fb7ff0000000000000");
    }

    #[test]
    fn floats_and_simples() {
        assert_eq!(hex(&CborObject::from(1.5)), "fb3ff8000000000000");
        assert_eq!(hex(&CborObject::from(1.5f32)), "fa3fc00000");
        assert_eq!(hex(&CborObject::Undefined), "f7");
        assert_eq!(hex(&CborObject::Simple(255)), "f8ff");
        assert_eq!(
            CborObject::Simple(25).encode_to_bytes().unwrap_err().code,
            ErrorCode::SimpleValueOutOfRange
        );
    }

    #[test]
    fn builders_check_counts() {
        let mut enc = Encoder::new();
        enc.array(2, |a| {
            a.int(1)?;
            a.map(1, |m| m.entry("k", |e| e.text("v")))
        })
        .unwrap();
        assert_eq!(hex::encode(enc.as_bytes()), "8201a1616b6176");

        let mut enc = Encoder::new();
        let err = enc.array(2, |a| a.int(1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::LengthMismatch);
        assert!(enc.is_empty());

        let err = enc
            .map(2, |m| {
                m.entry("a", |e| e.int(1))?;
                m.entry("a", |e| e.int(2))
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateMapKey);
        assert!(enc.is_empty());
    }

    #[test]
    fn write_to_matches_bytes() {
        let v = CborObject::from(vec![CborObject::from("x"), CborObject::Null]);
        let mut out = Vec::new();
        v.write_to(&mut out).unwrap();
        assert_eq!(out, v.encode_to_bytes().unwrap());
    }
}
