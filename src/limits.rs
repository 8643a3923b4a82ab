use crate::{CborError, ErrorCode};

/// Default maximum nesting depth limit.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Default maximum container length limit for arrays/maps.
pub const DEFAULT_MAX_CONTAINER_LEN: usize = 1 << 24;

/// Default maximum byte/text string length.
pub const DEFAULT_MAX_STRING_LEN: usize = 1 << 30;

/// Decode-time resource limits.
///
/// The decoder never trusts a declared length: it checks it against these limits and against the
/// bytes actually remaining before allocating anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum total input length in bytes.
    pub max_input_bytes: usize,
    /// Maximum nesting depth (arrays, maps and tags each add one level).
    pub max_depth: usize,
    /// Maximum total count of container items:
    /// `sum(array_len) + sum(2 * map_pairs)` across the entire decoded item.
    pub max_total_items: usize,
    /// Maximum array length.
    pub max_array_len: usize,
    /// Maximum map length (pairs).
    pub max_map_len: usize,
    /// Maximum byte-string length (also applies to bignum magnitudes and to the concatenation of
    /// indefinite-length chunks).
    pub max_bytes_len: usize,
    /// Maximum text-string length in UTF-8 bytes.
    pub max_text_len: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_input_bytes: usize::MAX,
            max_depth: DEFAULT_MAX_DEPTH,
            max_total_items: usize::MAX,
            max_array_len: DEFAULT_MAX_CONTAINER_LEN,
            max_map_len: DEFAULT_MAX_CONTAINER_LEN,
            max_bytes_len: DEFAULT_MAX_STRING_LEN,
            max_text_len: DEFAULT_MAX_STRING_LEN,
        }
    }
}

impl DecodeLimits {
    /// Construct conservative limits derived from a maximum message size.
    ///
    /// The defaults are:
    /// - `max_input_bytes = max_message_bytes`
    /// - `max_total_items = max_message_bytes`
    /// - `max_bytes_len = max_message_bytes`
    /// - `max_text_len = max_message_bytes`
    /// - `max_array_len` and `max_map_len` are capped by `DEFAULT_MAX_CONTAINER_LEN`
    #[must_use]
    pub fn for_bytes(max_message_bytes: usize) -> Self {
        let max_container_len = max_message_bytes.min(DEFAULT_MAX_CONTAINER_LEN);
        Self {
            max_input_bytes: max_message_bytes,
            max_depth: DEFAULT_MAX_DEPTH,
            max_total_items: max_message_bytes,
            max_array_len: max_container_len,
            max_map_len: max_container_len,
            max_bytes_len: max_message_bytes,
            max_text_len: max_message_bytes,
        }
    }

    /// Check that the limits are usable.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLimits` if `max_depth` is zero.
    pub const fn validate(&self) -> Result<(), CborError> {
        if self.max_depth == 0 {
            return Err(CborError::new(ErrorCode::InvalidLimits, 0));
        }
        Ok(())
    }
}
