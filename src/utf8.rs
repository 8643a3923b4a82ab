#[cfg(feature = "simdutf8")]
use simdutf8::basic as simd_utf8;

/// Validates UTF-8 bytes and returns a borrowed `&str` on success.
#[inline]
pub fn validate(bytes: &[u8]) -> Result<&str, ()> {
    #[cfg(feature = "simdutf8")]
    {
        simd_utf8::from_utf8(bytes).map_err(|_| ())
    }

    #[cfg(not(feature = "simdutf8"))]
    {
        core::str::from_utf8(bytes).map_err(|_| ())
    }
}

/// Validates and takes ownership of UTF-8 bytes.
#[inline]
pub fn into_string(bytes: Vec<u8>) -> Result<String, ()> {
    validate(&bytes)?;
    String::from_utf8(bytes).map_err(|_| ())
}

/// Compare two strings by UTF-16 code units.
///
/// This differs from `str` ordering only when a supplementary-plane character (encoded as a
/// surrogate pair starting at 0xD800) meets a BMP character at or above 0xE000.
pub fn cmp_utf16(a: &str, b: &str) -> core::cmp::Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cmp::Ordering;

    #[test]
    fn surrogates_sort_below_high_bmp() {
        assert_eq!(cmp_utf16("\u{10000}", "\u{ffff}"), Ordering::Less);
        assert_eq!("\u{10000}".cmp("\u{ffff}"), Ordering::Greater);
        assert_eq!(cmp_utf16("a", "ab"), Ordering::Less);
    }
}
