use std::io::Read;

use crate::alloc_util::{try_reserve, try_vec_for_declared};
use crate::bigint::BigInt;
use crate::ieee::half_to_f32;
use crate::wire::{ReaderSource, SliceSource, Source};
use crate::{tags, utf8, CborError, CborMap, CborObject, DecodeLimits, ErrorCode};

enum ParsedItem {
    Value(CborObject),
    ArrayStart { len: Option<usize> },
    MapStart { len: Option<usize> },
    Tag(u64),
}

enum BuildFrame {
    Array {
        items: Vec<CborObject>,
        remaining: Option<usize>,
    },
    Map {
        entries: CborMap,
        remaining_pairs: Option<usize>,
        key: Option<(CborObject, usize)>,
    },
    Tag {
        tag: u64,
        off: usize,
    },
}

struct Decoder<'l, S> {
    src: S,
    limits: &'l DecodeLimits,
    items_seen: usize,
}

impl<'l, S: Source> Decoder<'l, S> {
    const fn new(src: S, limits: &'l DecodeLimits) -> Self {
        Self {
            src,
            limits,
            items_seen: 0,
        }
    }

    fn decode_item(&mut self) -> Result<CborObject, CborError> {
        let mut stack: Vec<BuildFrame> = Vec::new();
        let mut pending: Option<(CborObject, usize)> = None;

        loop {
            if let Some((value, start)) = pending.take() {
                let Some(frame) = stack.last_mut() else {
                    return Ok(value);
                };
                match frame {
                    BuildFrame::Array { items, remaining } => {
                        if remaining.is_none() {
                            self.bump_items(1, start)?;
                        }
                        try_reserve(items, 1, start)?;
                        items.push(value);
                        if let Some(r) = remaining {
                            *r -= 1;
                            if *r == 0 {
                                let items = core::mem::take(items);
                                stack.pop();
                                pending = Some((CborObject::Array(items), start));
                            }
                        }
                    }
                    BuildFrame::Map {
                        entries,
                        remaining_pairs,
                        key,
                    } => match key.take() {
                        None => {
                            if remaining_pairs.is_none() {
                                self.bump_items(2, start)?;
                            }
                            *key = Some((value, start));
                        }
                        Some((k, key_off)) => {
                            if entries.contains_key(&k) {
                                return Err(CborError::new(ErrorCode::DuplicateMapKey, key_off));
                            }
                            entries.insert(k, value);
                            if let Some(r) = remaining_pairs {
                                *r -= 1;
                                if *r == 0 {
                                    let entries = core::mem::take(entries);
                                    stack.pop();
                                    pending = Some((CborObject::Map(entries), start));
                                }
                            }
                        }
                    },
                    BuildFrame::Tag { tag, off } => {
                        let (tag, off) = (*tag, *off);
                        stack.pop();
                        let tagged = tags::apply(tag, value).map_err(|code| CborError::new(code, off))?;
                        pending = Some((tagged, off));
                    }
                }
                continue;
            }

            let off = self.src.pos();
            let ib = self.src.read_u8()?;
            if ib == 0xff {
                pending = Some((Self::close_indefinite(&mut stack, off)?, off));
                continue;
            }

            match self.parse_item(ib, off)? {
                ParsedItem::Value(v) => pending = Some((v, off)),
                ParsedItem::ArrayStart { len: Some(0) } => {
                    pending = Some((CborObject::new_array(), off));
                }
                ParsedItem::MapStart { len: Some(0) } => {
                    pending = Some((CborObject::new_map(), off));
                }
                ParsedItem::ArrayStart { len } => {
                    self.push_frame(&mut stack, off)?;
                    stack.push(BuildFrame::Array {
                        items: try_vec_for_declared(
                            len.unwrap_or(0),
                            self.src.remaining_hint(),
                            off,
                        )?,
                        remaining: len,
                    });
                }
                ParsedItem::MapStart { len } => {
                    self.push_frame(&mut stack, off)?;
                    let mut entries = CborMap::new();
                    entries.reserve(len.unwrap_or(0).min(self.src.remaining_hint() / 2));
                    stack.push(BuildFrame::Map {
                        entries,
                        remaining_pairs: len,
                        key: None,
                    });
                }
                ParsedItem::Tag(tag) => {
                    self.push_frame(&mut stack, off)?;
                    stack.push(BuildFrame::Tag { tag, off });
                }
            }
        }
    }

    fn push_frame(&self, stack: &mut Vec<BuildFrame>, off: usize) -> Result<(), CborError> {
        if stack.len() + 1 > self.limits.max_depth {
            return Err(CborError::new(ErrorCode::DepthLimitExceeded, off));
        }
        try_reserve(stack, 1, off)
    }

    fn close_indefinite(stack: &mut Vec<BuildFrame>, off: usize) -> Result<CborObject, CborError> {
        let value = match stack.last_mut() {
            Some(BuildFrame::Array {
                items,
                remaining: None,
            }) => CborObject::Array(core::mem::take(items)),
            Some(BuildFrame::Map {
                entries,
                remaining_pairs: None,
                key: None,
            }) => CborObject::Map(core::mem::take(entries)),
            _ => return Err(CborError::new(ErrorCode::UnexpectedBreak, off)),
        };
        stack.pop();
        Ok(value)
    }

    fn parse_item(&mut self, ib: u8, off: usize) -> Result<ParsedItem, CborError> {
        let major = ib >> 5;
        let ai = ib & 0x1f;

        match major {
            0 => {
                let v = self.src.read_uint_arg(ai, off)?;
                Ok(ParsedItem::Value(match i64::try_from(v) {
                    Ok(i) => CborObject::Integer(i),
                    Err(_) => CborObject::BigInteger(BigInt::from(v)),
                }))
            }
            1 => {
                let n = self.src.read_uint_arg(ai, off)?;
                let v = -1 - i128::from(n);
                Ok(ParsedItem::Value(match i64::try_from(v) {
                    Ok(i) => CborObject::Integer(i),
                    Err(_) => CborObject::BigInteger(BigInt::from(v)),
                }))
            }
            2 => Ok(ParsedItem::Value(CborObject::ByteString(self.read_string(
                2,
                ai,
                off,
                self.limits.max_bytes_len,
                ErrorCode::BytesLenLimitExceeded,
            )?))),
            3 => {
                let bytes = self.read_string(
                    3,
                    ai,
                    off,
                    self.limits.max_text_len,
                    ErrorCode::TextLenLimitExceeded,
                )?;
                let text =
                    utf8::into_string(bytes).map_err(|()| CborError::new(ErrorCode::Utf8Invalid, off))?;
                Ok(ParsedItem::Value(CborObject::TextString(text)))
            }
            4 => {
                let len = self.read_container_len(ai, off)?;
                if let Some(len) = len {
                    Self::enforce_len(len, self.limits.max_array_len, ErrorCode::ArrayLenLimitExceeded, off)?;
                    self.bump_items(len, off)?;
                }
                Ok(ParsedItem::ArrayStart { len })
            }
            5 => {
                let len = self.read_container_len(ai, off)?;
                if let Some(len) = len {
                    Self::enforce_len(len, self.limits.max_map_len, ErrorCode::MapLenLimitExceeded, off)?;
                    let items = len
                        .checked_mul(2)
                        .ok_or_else(|| CborError::new(ErrorCode::LengthOverflow, off))?;
                    self.bump_items(items, off)?;
                }
                Ok(ParsedItem::MapStart { len })
            }
            6 => Ok(ParsedItem::Tag(self.src.read_uint_arg(ai, off)?)),
            _ => self.parse_major7(ai, off).map(ParsedItem::Value),
        }
    }

    fn parse_major7(&mut self, ai: u8, off: usize) -> Result<CborObject, CborError> {
        Ok(match ai {
            0..=19 => CborObject::Simple(ai),
            20 => CborObject::Bool(false),
            21 => CborObject::Bool(true),
            22 => CborObject::Null,
            23 => CborObject::Undefined,
            24 => {
                let v = self.src.read_u8()?;
                if v < 32 {
                    return Err(CborError::new(ErrorCode::InvalidSimpleValue, off));
                }
                CborObject::Simple(v)
            }
            25 => CborObject::Single(half_to_f32(self.src.read_be_u16()?)),
            26 => CborObject::Single(f32::from_bits(self.src.read_be_u32()?)),
            27 => CborObject::Double(f64::from_bits(self.src.read_be_u64()?)),
            _ => return Err(CborError::new(ErrorCode::ReservedAdditionalInfo, off)),
        })
    }

    fn read_container_len(&mut self, ai: u8, off: usize) -> Result<Option<usize>, CborError> {
        if ai == 31 {
            return Ok(None);
        }
        let len = self.src.read_uint_arg(ai, off)?;
        usize::try_from(len)
            .map(Some)
            .map_err(|_| CborError::new(ErrorCode::LengthOverflow, off))
    }

    fn read_definite_len(&mut self, ai: u8, off: usize) -> Result<usize, CborError> {
        let len = self.src.read_uint_arg(ai, off)?;
        usize::try_from(len).map_err(|_| CborError::new(ErrorCode::LengthOverflow, off))
    }

    /// Read a byte or text string payload, concatenating indefinite-length chunks.
    fn read_string(
        &mut self,
        major: u8,
        ai: u8,
        off: usize,
        max_len: usize,
        code: ErrorCode,
    ) -> Result<Vec<u8>, CborError> {
        let mut out = Vec::new();
        if ai != 31 {
            let len = self.read_definite_len(ai, off)?;
            Self::enforce_len(len, max_len, code, off)?;
            self.src.read_into(len, &mut out)?;
            return Ok(out);
        }
        loop {
            let chunk_off = self.src.pos();
            let ib = self.src.read_u8()?;
            if ib == 0xff {
                return Ok(out);
            }
            if ib >> 5 != major || ib & 0x1f == 31 {
                return Err(CborError::new(ErrorCode::InvalidIndefiniteChunk, chunk_off));
            }
            let len = self.read_definite_len(ib & 0x1f, chunk_off)?;
            let total = out
                .len()
                .checked_add(len)
                .ok_or_else(|| CborError::new(ErrorCode::LengthOverflow, chunk_off))?;
            Self::enforce_len(total, max_len, code, chunk_off)?;
            let start = out.len();
            self.src.read_into(len, &mut out)?;
            if major == 3 && utf8::validate(&out[start..]).is_err() {
                return Err(CborError::new(ErrorCode::Utf8Invalid, chunk_off));
            }
        }
    }

    const fn enforce_len(len: usize, max_len: usize, code: ErrorCode, off: usize) -> Result<(), CborError> {
        if len > max_len {
            return Err(CborError::new(code, off));
        }
        Ok(())
    }

    fn bump_items(&mut self, add: usize, off: usize) -> Result<(), CborError> {
        self.items_seen = self
            .items_seen
            .checked_add(add)
            .ok_or_else(|| CborError::new(ErrorCode::LengthOverflow, off))?;
        if self.items_seen > self.limits.max_total_items {
            return Err(CborError::new(ErrorCode::TotalItemsLimitExceeded, off));
        }
        Ok(())
    }
}

fn traced<T>(what: &'static str, result: Result<T, CborError>) -> Result<T, CborError> {
    if let Err(err) = &result {
        tracing::debug!(code = ?err.code, offset = err.offset, "{what} failed");
    }
    result
}

impl CborObject {
    /// Decode exactly one data item from `bytes` under default limits.
    ///
    /// # Errors
    ///
    /// Returns a format error for malformed input, trailing bytes, or exceeded limits.
    pub fn decode(bytes: &[u8]) -> Result<Self, CborError> {
        Self::decode_with_limits(bytes, &DecodeLimits::default())
    }

    /// Decode exactly one data item from `bytes`.
    ///
    /// Indefinite-length strings, arrays and maps are accepted. Numeric tags are interpreted;
    /// other tags are kept as [`CborObject::Tagged`].
    ///
    /// # Errors
    ///
    /// Returns a format error for malformed input, trailing bytes, or exceeded limits, and
    /// `InvalidLimits` if `limits` is unusable.
    pub fn decode_with_limits(bytes: &[u8], limits: &DecodeLimits) -> Result<Self, CborError> {
        tracing::trace!(len = bytes.len(), "decoding CBOR item");
        traced("CBOR decode", decode_one(bytes, limits))
    }

    /// Read one data item from a stream, pulling only the bytes it needs.
    ///
    /// # Errors
    ///
    /// As for [`CborObject::decode_with_limits`], plus `Io` for reader failures. Trailing data is
    /// left unread.
    pub fn read<R: Read>(reader: R, limits: &DecodeLimits) -> Result<Self, CborError> {
        tracing::trace!("reading CBOR item from stream");
        traced("CBOR read", read_one(reader, limits))
    }

    /// Decode a sequence of concatenated data items (RFC 8742). Empty input yields an empty
    /// sequence.
    ///
    /// # Errors
    ///
    /// Returns a format error if any item is malformed or truncated.
    pub fn decode_sequence(bytes: &[u8]) -> Result<Vec<Self>, CborError> {
        Self::decode_sequence_with_limits(bytes, &DecodeLimits::default())
    }

    /// Decode a sequence of concatenated data items, applying `limits` to each item and
    /// `max_input_bytes` to the whole input.
    ///
    /// # Errors
    ///
    /// Returns a format error if any item is malformed, truncated, or exceeds limits.
    pub fn decode_sequence_with_limits(
        bytes: &[u8],
        limits: &DecodeLimits,
    ) -> Result<Vec<Self>, CborError> {
        tracing::trace!(len = bytes.len(), "decoding CBOR sequence");
        traced("CBOR sequence decode", decode_all(bytes, limits))
    }
}

fn check_input(bytes: &[u8], limits: &DecodeLimits) -> Result<(), CborError> {
    limits.validate()?;
    if bytes.len() > limits.max_input_bytes {
        return Err(CborError::new(ErrorCode::MessageLenLimitExceeded, 0));
    }
    Ok(())
}

fn decode_one(bytes: &[u8], limits: &DecodeLimits) -> Result<CborObject, CborError> {
    check_input(bytes, limits)?;
    let mut d = Decoder::new(SliceSource::new(bytes), limits);
    let value = d.decode_item()?;
    let end = d.src.pos();
    if end != bytes.len() {
        return Err(CborError::new(ErrorCode::TrailingBytes, end));
    }
    Ok(value)
}

fn read_one<R: Read>(reader: R, limits: &DecodeLimits) -> Result<CborObject, CborError> {
    limits.validate()?;
    let mut d = Decoder::new(ReaderSource::new(reader, limits.max_input_bytes), limits);
    d.decode_item()
}

fn decode_all(bytes: &[u8], limits: &DecodeLimits) -> Result<Vec<CborObject>, CborError> {
    check_input(bytes, limits)?;
    let mut src = SliceSource::new(bytes);
    let mut out = Vec::new();
    while !src.at_end()? {
        let mut d = Decoder::new(src, limits);
        let item = d.decode_item()?;
        src = d.src;
        try_reserve(&mut out, 1, src.pos())?;
        out.push(item);
    }
    Ok(out)
}
