use std::io::{self, Read};

use crate::alloc_util::try_reserve;
use crate::{CborError, ErrorCode};

/// Largest single read issued against a stream.
const READ_CHUNK: usize = 64 * 1024;

/// A byte source the decoder pulls from.
pub trait Source {
    /// Bytes consumed so far.
    fn pos(&self) -> usize;

    /// Upper bound on the bytes still available, used to cap allocations for declared lengths.
    fn remaining_hint(&self) -> usize;

    fn read_u8(&mut self) -> Result<u8, CborError>;

    /// Append exactly `n` bytes to `out`.
    fn read_into(&mut self, n: usize, out: &mut Vec<u8>) -> Result<(), CborError>;

    /// Returns true iff no more bytes are available.
    fn at_end(&mut self) -> Result<bool, CborError>;

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CborError> {
        let mut out = [0u8; N];
        for b in &mut out {
            *b = self.read_u8()?;
        }
        Ok(out)
    }

    fn read_be_u16(&mut self) -> Result<u16, CborError> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    fn read_be_u32(&mut self) -> Result<u32, CborError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    fn read_be_u64(&mut self) -> Result<u64, CborError> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    /// Read the argument encoded by additional info `ai` (0..=27).
    fn read_uint_arg(&mut self, ai: u8, off: usize) -> Result<u64, CborError> {
        match ai {
            0..=23 => Ok(u64::from(ai)),
            24 => Ok(u64::from(self.read_u8()?)),
            25 => Ok(u64::from(self.read_be_u16()?)),
            26 => Ok(u64::from(self.read_be_u32()?)),
            27 => self.read_be_u64(),
            _ => Err(CborError::new(ErrorCode::ReservedAdditionalInfo, off)),
        }
    }
}

/// An in-memory input.
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }
}

impl Source for SliceSource<'_> {
    fn pos(&self) -> usize {
        self.pos
    }

    fn remaining_hint(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Result<u8, CborError> {
        let off = self.pos;
        let b = *self
            .data
            .get(self.pos)
            .ok_or_else(|| CborError::new(ErrorCode::UnexpectedEof, off))?;
        self.pos += 1;
        Ok(b)
    }

    fn read_into(&mut self, n: usize, out: &mut Vec<u8>) -> Result<(), CborError> {
        let off = self.pos;
        let end = self
            .pos
            .checked_add(n)
            .ok_or_else(|| CborError::new(ErrorCode::LengthOverflow, off))?;
        if end > self.data.len() {
            return Err(CborError::new(ErrorCode::UnexpectedEof, off));
        }
        try_reserve(out, n, off)?;
        out.extend_from_slice(&self.data[self.pos..end]);
        self.pos = end;
        Ok(())
    }

    fn at_end(&mut self) -> Result<bool, CborError> {
        Ok(self.pos >= self.data.len())
    }
}

/// A streaming input. Never reads past the end of the item being decoded, except for the one
/// byte held by [`Source::at_end`].
pub struct ReaderSource<R> {
    inner: R,
    pos: usize,
    max_input_bytes: usize,
    peeked: Option<u8>,
}

impl<R: Read> ReaderSource<R> {
    pub const fn new(inner: R, max_input_bytes: usize) -> Self {
        Self {
            inner,
            pos: 0,
            max_input_bytes,
            peeked: None,
        }
    }

    fn advance(&mut self, n: usize) -> Result<usize, CborError> {
        let off = self.pos;
        let end = self
            .pos
            .checked_add(n)
            .ok_or_else(|| CborError::new(ErrorCode::LengthOverflow, off))?;
        if end > self.max_input_bytes {
            return Err(CborError::new(ErrorCode::MessageLenLimitExceeded, off));
        }
        self.pos = end;
        Ok(off)
    }

    fn fill(&mut self, buf: &mut [u8], off: usize) -> Result<(), CborError> {
        self.inner.read_exact(buf).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => CborError::new(ErrorCode::UnexpectedEof, off),
            _ => CborError::new(ErrorCode::Io, off),
        })
    }
}

impl<R: Read> Source for ReaderSource<R> {
    fn pos(&self) -> usize {
        self.pos
    }

    fn remaining_hint(&self) -> usize {
        READ_CHUNK
    }

    fn read_u8(&mut self) -> Result<u8, CborError> {
        let off = self.advance(1)?;
        if let Some(b) = self.peeked.take() {
            return Ok(b);
        }
        let mut b = [0u8; 1];
        self.fill(&mut b, off)?;
        Ok(b[0])
    }

    fn read_into(&mut self, n: usize, out: &mut Vec<u8>) -> Result<(), CborError> {
        let off = self.advance(n)?;
        let mut left = n;
        if left > 0 {
            if let Some(b) = self.peeked.take() {
                try_reserve(out, 1, off)?;
                out.push(b);
                left -= 1;
            }
        }
        // Grow with the data actually received rather than the declared length.
        while left > 0 {
            let chunk = left.min(READ_CHUNK);
            try_reserve(out, chunk, off)?;
            let start = out.len();
            out.resize(start + chunk, 0);
            self.fill(&mut out[start..], off)?;
            left -= chunk;
        }
        Ok(())
    }

    fn at_end(&mut self) -> Result<bool, CborError> {
        if self.peeked.is_some() {
            return Ok(false);
        }
        let mut b = [0u8; 1];
        loop {
            match self.inner.read(&mut b) {
                Ok(0) => return Ok(true),
                Ok(_) => {
                    self.peeked = Some(b[0]);
                    return Ok(false);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(_) => return Err(CborError::new(ErrorCode::Io, self.pos)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_reads_arguments() {
        let mut s = SliceSource::new(&[0x01, 0x02, 0xff]);
        assert_eq!(s.read_uint_arg(25, 0).unwrap(), 0x0102);
        assert_eq!(s.read_u8().unwrap(), 0xff);
        let err = s.read_u8().unwrap_err();
        assert_eq!(err.code, ErrorCode::UnexpectedEof);
        assert_eq!(err.offset, 3);
        assert!(s.at_end().unwrap());
    }

    #[test]
    fn reader_peeks_one_byte() {
        let data = [7u8, 8, 9];
        let mut r = ReaderSource::new(&data[..], usize::MAX);
        assert_eq!(r.read_u8().unwrap(), 7);
        assert!(!r.at_end().unwrap());
        let mut out = Vec::new();
        r.read_into(2, &mut out).unwrap();
        assert_eq!(out, [8, 9]);
        assert!(r.at_end().unwrap());
        assert_eq!(r.pos(), 3);
    }

    #[test]
    fn reader_enforces_input_limit() {
        let data = [0u8; 8];
        let mut r = ReaderSource::new(&data[..], 4);
        let mut out = Vec::new();
        let err = r.read_into(5, &mut out).unwrap_err();
        assert_eq!(err.code, ErrorCode::MessageLenLimitExceeded);
    }

    #[test]
    fn reader_reports_truncation() {
        let data = [0u8; 2];
        let mut r = ReaderSource::new(&data[..], usize::MAX);
        let mut out = Vec::new();
        assert_eq!(r.read_into(3, &mut out).unwrap_err().code, ErrorCode::UnexpectedEof);
    }
}
