//! JSON text to and from [`CborObject`].
//!
//! Parsing is strict RFC 8259: no comments, no trailing commas, no leading zeros, no `NaN` or
//! `Infinity` literals and no bare control characters inside strings. Integers keep their exact
//! value as `Integer` or `BigInteger`; other numbers become exact decimals.

use core::fmt::Write as _;

use base64ct::{Base64, Base64UrlUnpadded, Encoding};

use crate::alloc_util::try_reserve;
use crate::arith::DECIMAL_DIVISION;
use crate::bigint::BigInt;
use crate::extended::ExtendedDecimal;
use crate::{tags, utf8, CborError, CborMap, CborObject, DecodeLimits, ErrorCode};

const BOM: &[u8] = b"\xef\xbb\xbf";

enum Frame {
    Array(Vec<CborObject>),
    Map {
        entries: CborMap,
        key: Option<(CborObject, usize)>,
    },
}

struct Parser<'a, 'l> {
    text: &'a str,
    input: &'a [u8],
    pos: usize,
    limits: &'l DecodeLimits,
}

impl<'a, 'l> Parser<'a, 'l> {
    const fn new(text: &'a str, pos: usize, limits: &'l DecodeLimits) -> Self {
        Self {
            text,
            input: text.as_bytes(),
            pos,
            limits,
        }
    }

    fn err(&self, code: ErrorCode) -> CborError {
        CborError::new(code, self.pos)
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    fn expect_literal(&mut self, lit: &[u8]) -> Result<(), CborError> {
        if self.input[self.pos..].starts_with(lit) {
            self.pos += lit.len();
            Ok(())
        } else {
            Err(self.err(ErrorCode::InvalidJson))
        }
    }

    fn parse_document(&mut self) -> Result<CborObject, CborError> {
        let value = self.parse_value()?;
        self.skip_ws();
        if self.pos != self.input.len() {
            return Err(self.err(ErrorCode::InvalidJson));
        }
        Ok(value)
    }

    fn parse_value(&mut self) -> Result<CborObject, CborError> {
        let mut stack: Vec<Frame> = Vec::new();
        loop {
            self.skip_ws();
            let start = self.pos;
            let mut value = match self.peek() {
                Some(b'[') => {
                    self.open(&mut stack, Frame::Array(Vec::new()))?;
                    self.skip_ws();
                    if self.peek() == Some(b']') {
                        self.pos += 1;
                        stack.pop();
                        CborObject::new_array()
                    } else {
                        continue;
                    }
                }
                Some(b'{') => {
                    self.open(
                        &mut stack,
                        Frame::Map {
                            entries: CborMap::new(),
                            key: None,
                        },
                    )?;
                    self.skip_ws();
                    if self.peek() == Some(b'}') {
                        self.pos += 1;
                        stack.pop();
                        CborObject::new_map()
                    } else {
                        self.parse_key(&mut stack)?;
                        continue;
                    }
                }
                Some(b'"') => CborObject::TextString(self.parse_string()?),
                Some(b't') => {
                    self.expect_literal(b"true")?;
                    CborObject::TRUE
                }
                Some(b'f') => {
                    self.expect_literal(b"false")?;
                    CborObject::FALSE
                }
                Some(b'n') => {
                    self.expect_literal(b"null")?;
                    CborObject::Null
                }
                Some(b'-' | b'0'..=b'9') => self.parse_number()?,
                None => return Err(self.err(ErrorCode::UnexpectedEof)),
                Some(_) => return Err(self.err(ErrorCode::InvalidJson)),
            };

            // Attach the finished value to its parent, closing containers as they end.
            loop {
                let Some(frame) = stack.last_mut() else {
                    return Ok(value);
                };
                match frame {
                    Frame::Array(items) => {
                        if items.len() >= self.limits.max_array_len {
                            return Err(CborError::new(ErrorCode::ArrayLenLimitExceeded, start));
                        }
                        try_reserve(items, 1, start)?;
                        items.push(value);
                    }
                    Frame::Map { entries, key } => {
                        let Some((k, key_off)) = key.take() else {
                            return Err(self.err(ErrorCode::InvalidJson));
                        };
                        if entries.len() >= self.limits.max_map_len {
                            return Err(CborError::new(ErrorCode::MapLenLimitExceeded, key_off));
                        }
                        entries.insert(k, value);
                    }
                }
                self.skip_ws();
                let is_array = matches!(frame, Frame::Array(_));
                match (self.peek(), is_array) {
                    (Some(b','), _) => {
                        self.pos += 1;
                        if !is_array {
                            self.skip_ws();
                            self.parse_key(&mut stack)?;
                        }
                        break;
                    }
                    (Some(b']'), true) | (Some(b'}'), false) => {
                        self.pos += 1;
                        value = match stack.pop() {
                            Some(Frame::Array(items)) => CborObject::Array(items),
                            Some(Frame::Map { entries, .. }) => CborObject::Map(entries),
                            None => return Err(self.err(ErrorCode::InvalidJson)),
                        };
                    }
                    (None, _) => return Err(self.err(ErrorCode::UnexpectedEof)),
                    _ => return Err(self.err(ErrorCode::InvalidJson)),
                }
            }
        }
    }

    fn open(&mut self, stack: &mut Vec<Frame>, frame: Frame) -> Result<(), CborError> {
        if stack.len() + 1 > self.limits.max_depth {
            return Err(self.err(ErrorCode::DepthLimitExceeded));
        }
        try_reserve(stack, 1, self.pos)?;
        self.pos += 1;
        stack.push(frame);
        Ok(())
    }

    /// Read `"key" :` into the innermost map frame.
    fn parse_key(&mut self, stack: &mut [Frame]) -> Result<(), CborError> {
        let key_off = self.pos;
        match self.peek() {
            Some(b'"') => {}
            None => return Err(self.err(ErrorCode::UnexpectedEof)),
            Some(_) => return Err(self.err(ErrorCode::InvalidJson)),
        }
        let k = CborObject::TextString(self.parse_string()?);
        self.skip_ws();
        match self.peek() {
            Some(b':') => self.pos += 1,
            None => return Err(self.err(ErrorCode::UnexpectedEof)),
            Some(_) => return Err(self.err(ErrorCode::InvalidJson)),
        }
        let Some(Frame::Map { entries, key }) = stack.last_mut() else {
            return Err(self.err(ErrorCode::InvalidJson));
        };
        if entries.contains_key(&k) {
            return Err(CborError::new(ErrorCode::DuplicateMapKey, key_off));
        }
        *key = Some((k, key_off));
        Ok(())
    }

    fn parse_string(&mut self) -> Result<String, CborError> {
        let open = self.pos;
        self.pos += 1;
        let mut out = String::new();
        loop {
            let run_start = self.pos;
            while let Some(b) = self.peek() {
                if b == b'"' || b == b'\\' || b < 0x20 {
                    break;
                }
                self.pos += 1;
            }
            // Runs start and stop at ASCII bytes, so both ends are char boundaries.
            out.push_str(&self.text[run_start..self.pos]);
            if out.len() > self.limits.max_text_len {
                return Err(CborError::new(ErrorCode::TextLenLimitExceeded, open));
            }
            match self.peek() {
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    self.pos += 1;
                    let c = self.parse_escape()?;
                    out.push(c);
                }
                None => return Err(self.err(ErrorCode::UnexpectedEof)),
                Some(_) => return Err(self.err(ErrorCode::InvalidJson)),
            }
        }
    }

    fn parse_escape(&mut self) -> Result<char, CborError> {
        let off = self.pos;
        let Some(b) = self.peek() else {
            return Err(self.err(ErrorCode::UnexpectedEof));
        };
        self.pos += 1;
        Ok(match b {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => {
                let hi = self.parse_hex4()?;
                let code = match hi {
                    0xd800..=0xdbff => {
                        if !self.input[self.pos..].starts_with(b"\\u") {
                            return Err(CborError::new(ErrorCode::InvalidJson, off));
                        }
                        self.pos += 2;
                        let lo = self.parse_hex4()?;
                        if !(0xdc00..=0xdfff).contains(&lo) {
                            return Err(CborError::new(ErrorCode::InvalidJson, off));
                        }
                        0x10000 + ((hi - 0xd800) << 10) + (lo - 0xdc00)
                    }
                    0xdc00..=0xdfff => return Err(CborError::new(ErrorCode::InvalidJson, off)),
                    _ => hi,
                };
                char::from_u32(code).ok_or_else(|| CborError::new(ErrorCode::InvalidJson, off))?
            }
            _ => return Err(CborError::new(ErrorCode::InvalidJson, off)),
        })
    }

    fn parse_hex4(&mut self) -> Result<u32, CborError> {
        let digits = self
            .input
            .get(self.pos..self.pos + 4)
            .ok_or_else(|| self.err(ErrorCode::UnexpectedEof))?;
        let mut v = 0u32;
        for &d in digits {
            let nibble = char::from(d)
                .to_digit(16)
                .ok_or_else(|| self.err(ErrorCode::InvalidJson))?;
            v = (v << 4) | nibble;
        }
        self.pos += 4;
        Ok(v)
    }

    fn scan_digits(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn parse_number(&mut self) -> Result<CborObject, CborError> {
        let start = self.pos;
        let negative = self.peek() == Some(b'-');
        if negative {
            self.pos += 1;
        }
        let int_start = self.pos;
        match self.scan_digits() {
            0 => return Err(self.err(ErrorCode::InvalidNumber)),
            1 => {}
            _ if self.input[int_start] == b'0' => {
                return Err(CborError::new(ErrorCode::InvalidNumber, int_start));
            }
            _ => {}
        }
        let mut integral = true;
        if self.peek() == Some(b'.') {
            self.pos += 1;
            integral = false;
            if self.scan_digits() == 0 {
                return Err(self.err(ErrorCode::InvalidNumber));
            }
        }
        if let Some(b'e' | b'E') = self.peek() {
            self.pos += 1;
            integral = false;
            if let Some(b'+' | b'-') = self.peek() {
                self.pos += 1;
            }
            if self.scan_digits() == 0 {
                return Err(self.err(ErrorCode::InvalidNumber));
            }
        }

        let text = &self.text[start..self.pos];
        let relocate = |e: CborError| CborError::new(e.code, start + e.offset);
        if !integral {
            return text
                .parse::<ExtendedDecimal>()
                .map(CborObject::Decimal)
                .map_err(relocate);
        }
        if text == "-0" {
            return Ok(CborObject::Double(-0.0));
        }
        if let Ok(i) = text.parse::<i64>() {
            return Ok(CborObject::Integer(i));
        }
        text.parse::<BigInt>()
            .map(CborObject::BigInteger)
            .map_err(relocate)
    }
}

fn parse(input: &str, start: usize, limits: &DecodeLimits) -> Result<CborObject, CborError> {
    limits.validate()?;
    if input.len() > limits.max_input_bytes {
        return Err(CborError::new(ErrorCode::MessageLenLimitExceeded, 0));
    }
    Parser::new(input, start, limits).parse_document()
}

fn traced<T>(result: Result<T, CborError>) -> Result<T, CborError> {
    if let Err(err) = &result {
        tracing::debug!(code = ?err.code, offset = err.offset, "JSON parse failed");
    }
    result
}

/// How a byte string is spelled in JSON output.
#[derive(Clone, Copy)]
enum ByteEncoding {
    Base64Url,
    Base64,
    Base16,
}

impl ByteEncoding {
    const fn for_tag(tag: u64) -> Option<Self> {
        match tag {
            tags::BASE64URL => Some(Self::Base64Url),
            tags::BASE64 => Some(Self::Base64),
            tags::BASE16 => Some(Self::Base16),
            _ => None,
        }
    }

    fn encode(self, bytes: &[u8]) -> String {
        match self {
            Self::Base64Url => Base64UrlUnpadded::encode_string(bytes),
            Self::Base64 => Base64::encode_string(bytes),
            Self::Base16 => hex::encode(bytes),
        }
    }
}

fn write_escaped(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if u32::from(c) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Shortest round-trip spelling, without a `.0` suffix on integral values.
fn write_binary_float(out: &mut String, repr: &str) {
    out.push_str(repr.strip_suffix(".0").unwrap_or(repr));
}

fn write_decimal(out: &mut String, d: &ExtendedDecimal) {
    if d.is_finite() {
        out.push_str(&d.to_scientific_string());
    } else {
        out.push_str("null");
    }
}

fn write_value(out: &mut String, v: &CborObject, bytes_as: ByteEncoding) {
    match v {
        CborObject::Integer(i) => {
            let _ = write!(out, "{i}");
        }
        CborObject::BigInteger(b) => {
            let _ = write!(out, "{b}");
        }
        CborObject::Double(d) if d.is_finite() => write_binary_float(out, &format!("{d:?}")),
        CborObject::Single(f) if f.is_finite() => write_binary_float(out, &format!("{f:?}")),
        CborObject::Decimal(d) => write_decimal(out, d),
        CborObject::Float(f) => write_decimal(out, &f.to_extended_decimal()),
        CborObject::Rational(r) if r.is_finite() => {
            match r.to_extended_decimal_exact_if_possible(&DECIMAL_DIVISION) {
                Ok(d) => write_decimal(out, &d),
                Err(_) => write_binary_float(out, &format!("{:?}", r.to_f64())),
            }
        }
        CborObject::Bool(true) => out.push_str("true"),
        CborObject::Bool(false) => out.push_str("false"),
        CborObject::Double(_)
        | CborObject::Single(_)
        | CborObject::Rational(_)
        | CborObject::Null
        | CborObject::Undefined
        | CborObject::Simple(_) => out.push_str("null"),
        CborObject::ByteString(b) => {
            out.push('"');
            out.push_str(&bytes_as.encode(b));
            out.push('"');
        }
        CborObject::TextString(s) => write_escaped(out, s),
        CborObject::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item, ByteEncoding::Base64Url);
            }
            out.push(']');
        }
        CborObject::Map(entries) => {
            out.push('{');
            for (i, (k, v)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                match k.untag() {
                    CborObject::TextString(s) => write_escaped(out, s),
                    other => {
                        let mut key = String::new();
                        write_value(&mut key, other, ByteEncoding::Base64Url);
                        write_escaped(out, &key);
                    }
                }
                out.push(':');
                write_value(out, v, ByteEncoding::Base64Url);
            }
            out.push('}');
        }
        CborObject::Tagged(tag, inner) => {
            write_value(out, inner, ByteEncoding::for_tag(*tag).unwrap_or(bytes_as));
        }
    }
}

impl CborObject {
    /// Parse JSON text under default limits. A leading U+FEFF is skipped.
    ///
    /// # Errors
    ///
    /// Returns `InvalidJson` or `InvalidNumber` for malformed text, `UnexpectedEof` for truncated
    /// text, `DuplicateMapKey` for repeated object keys, and limit errors.
    pub fn from_json_str(s: &str) -> Result<Self, CborError> {
        Self::from_json_str_with_limits(s, &DecodeLimits::default())
    }

    /// Parse JSON text with explicit limits. A leading U+FEFF is skipped.
    ///
    /// # Errors
    ///
    /// As for [`CborObject::from_json_str`].
    pub fn from_json_str_with_limits(s: &str, limits: &DecodeLimits) -> Result<Self, CborError> {
        let start = if s.starts_with('\u{feff}') { BOM.len() } else { 0 };
        traced(parse(s, start, limits))
    }

    /// Parse UTF-8 encoded JSON under default limits. A byte order mark is accepted only as the
    /// very first bytes of input.
    ///
    /// # Errors
    ///
    /// As for [`CborObject::from_json_str`], plus `Utf8Invalid`.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, CborError> {
        Self::from_json_bytes_with_limits(bytes, &DecodeLimits::default())
    }

    /// Parse UTF-8 encoded JSON with explicit limits.
    ///
    /// # Errors
    ///
    /// As for [`CborObject::from_json_bytes`].
    pub fn from_json_bytes_with_limits(bytes: &[u8], limits: &DecodeLimits) -> Result<Self, CborError> {
        let text = utf8::validate(bytes).map_err(|()| CborError::new(ErrorCode::Utf8Invalid, 0));
        Self::from_json_str_with_limits(traced(text)?, limits)
    }

    /// Render as compact JSON.
    ///
    /// Non-finite numbers, `undefined` and simple values become `null`. Byte strings are
    /// base64url without padding unless tagged 22 (base64) or 23 (base16). Map keys that are not
    /// text are written as the quoted JSON of the key. Non-ASCII text is emitted as UTF-8.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        let mut out = String::new();
        write_value(&mut out, self, ByteEncoding::Base64Url);
        out
    }
}
