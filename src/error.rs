use core::fmt;

use crate::context::Flags;

/// The high-level class of an error.
///
/// - **Format** errors: malformed CBOR or JSON input, or input exceeding decode limits.
/// - **Arithmetic** errors: division by zero, overflow of a target range, non-terminating
///   exact division, or a trapped precision-context condition.
/// - **InvalidState** errors: an operation applied to a value of the wrong type.
/// - **InvalidArgument** errors: a caller-supplied argument outside the accepted domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or over-limit input.
    Format,
    /// Numeric failure.
    Arithmetic,
    /// Operation not valid for the value's type.
    InvalidState,
    /// Argument outside the accepted domain.
    InvalidArgument,
}

/// A structured error code identifying why an operation failed.
///
/// Codes are string-free so they can be matched on cheaply and compared in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// Unexpected end-of-input while decoding.
    UnexpectedEof,
    /// Input contains trailing bytes after the single data item.
    TrailingBytes,
    /// Arithmetic overflow while computing a length/offset.
    LengthOverflow,
    /// Memory allocation failed while decoding into owned structures.
    AllocationFailed,
    /// Total input exceeds `max_input_bytes`.
    MessageLenLimitExceeded,
    /// Nesting depth limit exceeded.
    DepthLimitExceeded,
    /// Total items limit exceeded.
    TotalItemsLimitExceeded,
    /// Array length exceeds limits.
    ArrayLenLimitExceeded,
    /// Map length exceeds limits.
    MapLenLimitExceeded,
    /// Byte string length exceeds limits.
    BytesLenLimitExceeded,
    /// Text string length exceeds limits.
    TextLenLimitExceeded,
    /// Reserved additional-info value (28..30) was used.
    ReservedAdditionalInfo,
    /// A break byte appeared outside an indefinite-length container.
    UnexpectedBreak,
    /// An indefinite-length string contained a chunk of the wrong type, a tagged chunk, or a
    /// nested indefinite-length chunk.
    InvalidIndefiniteChunk,
    /// Invalid UTF-8 in a text string.
    Utf8Invalid,
    /// Duplicate map key detected.
    DuplicateMapKey,
    /// A numeric tag (2, 3, 4, 5, 30, 264, 265) had a malformed payload.
    MalformedNumericTag,
    /// A two-byte simple value encoded a value below 32.
    InvalidSimpleValue,

    /// JSON text is not well formed.
    InvalidJson,
    /// A numeric string could not be parsed.
    InvalidNumber,
    /// An I/O error occurred while reading or writing a stream.
    Io,

    /// Division by zero.
    DivideByZero,
    /// A value does not fit in the requested range.
    Overflow,
    /// A non-finite value was used where a finite one is required.
    NotFinite,
    /// A value with a fractional part was used where an integer is required.
    NotIntegral,
    /// An exact division has a non-terminating expansion in the requested radix.
    NonTerminatingDivision,
    /// A precision-context condition was raised while it was trapped.
    Trapped(Flags),

    /// The value has the wrong type for this operation.
    TypeMismatch,
    /// The value is not an array or map.
    NotAContainer,
    /// The map already contains the key.
    KeyAlreadyExists,
    /// Index is out of range.
    IndexOutOfRange,
    /// A map lacks a key required by the target type.
    MissingKey,
    /// A container has a different number of items than expected.
    LengthMismatch,
    /// A serde data-model conversion failed.
    SerdeError,

    /// Simple value in the reserved range 24..=31.
    SimpleValueOutOfRange,
    /// A tag number was negative or otherwise unusable.
    InvalidTag,
    /// Invalid configured limits.
    InvalidLimits,
    /// A precision context was constructed with contradictory parameters.
    InvalidPrecision,
}

impl ErrorCode {
    /// Classify this code.
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        match self {
            Self::DivideByZero
            | Self::Overflow
            | Self::NotFinite
            | Self::NotIntegral
            | Self::NonTerminatingDivision
            | Self::Trapped(_) => ErrorKind::Arithmetic,
            Self::TypeMismatch
            | Self::NotAContainer
            | Self::KeyAlreadyExists
            | Self::IndexOutOfRange
            | Self::MissingKey
            | Self::LengthMismatch
            | Self::SerdeError => ErrorKind::InvalidState,
            Self::SimpleValueOutOfRange | Self::InvalidTag | Self::InvalidLimits | Self::InvalidPrecision => {
                ErrorKind::InvalidArgument
            }
            _ => ErrorKind::Format,
        }
    }
}

/// An error with a stable code and a byte offset.
///
/// Offsets are meaningful for format errors raised while reading CBOR or JSON input. All other
/// errors carry offset `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CborError {
    /// The error code.
    pub code: ErrorCode,
    /// Byte offset into the input where the error was detected.
    pub offset: usize,
}

impl CborError {
    /// Construct an error at `offset`.
    #[inline]
    #[must_use]
    pub const fn new(code: ErrorCode, offset: usize) -> Self {
        Self { code, offset }
    }

    /// Construct an error that has no meaningful input position.
    #[inline]
    #[must_use]
    pub const fn arithmetic(code: ErrorCode) -> Self {
        Self { code, offset: 0 }
    }

    /// The error class.
    #[inline]
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        self.code.kind()
    }

    /// Returns true iff this error is a format error.
    #[inline]
    #[must_use]
    pub const fn is_format(self) -> bool {
        matches!(self.kind(), ErrorKind::Format)
    }

    /// Returns true iff this error is an arithmetic error.
    #[inline]
    #[must_use]
    pub const fn is_arithmetic(self) -> bool {
        matches!(self.kind(), ErrorKind::Arithmetic)
    }
}

impl fmt::Display for CborError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self.code {
            ErrorCode::UnexpectedEof => "unexpected end of input",
            ErrorCode::TrailingBytes => "trailing bytes after single CBOR item",
            ErrorCode::LengthOverflow => "length overflow",
            ErrorCode::AllocationFailed => "allocation failed",
            ErrorCode::MessageLenLimitExceeded => "input exceeds decode limits",
            ErrorCode::DepthLimitExceeded => "nesting depth limit exceeded",
            ErrorCode::TotalItemsLimitExceeded => "total items limit exceeded",
            ErrorCode::ArrayLenLimitExceeded => "array length exceeds decode limits",
            ErrorCode::MapLenLimitExceeded => "map length exceeds decode limits",
            ErrorCode::BytesLenLimitExceeded => "byte string length exceeds decode limits",
            ErrorCode::TextLenLimitExceeded => "text string length exceeds decode limits",
            ErrorCode::ReservedAdditionalInfo => "reserved additional info value",
            ErrorCode::UnexpectedBreak => "unexpected break",
            ErrorCode::InvalidIndefiniteChunk => "invalid chunk in indefinite-length string",
            ErrorCode::Utf8Invalid => "text must be valid UTF-8",
            ErrorCode::DuplicateMapKey => "duplicate map key",
            ErrorCode::MalformedNumericTag => "malformed numeric tag payload",
            ErrorCode::InvalidSimpleValue => "invalid two-byte simple value",
            ErrorCode::InvalidJson => "invalid JSON",
            ErrorCode::InvalidNumber => "invalid number syntax",
            ErrorCode::Io => "I/O error",
            ErrorCode::DivideByZero => "division by zero",
            ErrorCode::Overflow => "value out of range",
            ErrorCode::NotFinite => "value is not finite",
            ErrorCode::NotIntegral => "value is not an integer",
            ErrorCode::NonTerminatingDivision => "result has a non-terminating expansion",
            ErrorCode::Trapped(flags) => {
                return write!(f, "arithmetic condition trapped: {flags:?}");
            }
            ErrorCode::TypeMismatch => "value has the wrong type",
            ErrorCode::NotAContainer => "value is not an array or map",
            ErrorCode::KeyAlreadyExists => "key already exists",
            ErrorCode::IndexOutOfRange => "index out of range",
            ErrorCode::MissingKey => "missing map key",
            ErrorCode::LengthMismatch => "container length mismatch",
            ErrorCode::SerdeError => "serde conversion failed",
            ErrorCode::SimpleValueOutOfRange => "simple value out of range",
            ErrorCode::InvalidTag => "invalid tag number",
            ErrorCode::InvalidLimits => "invalid decode limits",
            ErrorCode::InvalidPrecision => "invalid precision context",
        };

        match self.kind() {
            ErrorKind::Format => write!(f, "decode failed at {}: {msg}", self.offset),
            _ => f.write_str(msg),
        }
    }
}

impl std::error::Error for CborError {}

impl From<std::io::Error> for CborError {
    fn from(_: std::io::Error) -> Self {
        Self::new(ErrorCode::Io, 0)
    }
}
