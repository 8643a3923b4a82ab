//! # extcbor
//!
//! A CBOR (RFC 8949) data model and codec built on an arbitrary-precision numeric tower.
//!
//! ## Numeric tower
//!
//! - [`BigInt`]: signed integers of unbounded magnitude.
//! - [`ExtendedDecimal`] and [`ExtendedFloat`]: `mantissa * 10^exponent` and
//!   `mantissa * 2^exponent` with big exponents, signed zero, infinities and quiet/signaling NaN.
//!   Both are [`Extended`] over a [`Radix`] and share one rounding and arithmetic core.
//! - [`ExtendedRational`]: exact fractions with the same special values.
//! - [`PrecisionContext`]: precision, exponent range, [`Rounding`] mode, and the [`Flags`] raised
//!   by an operation.
//!
//! ## Value tree
//!
//! [`CborObject`] holds any CBOR data item. Numbers keep their representation (integer, bignum,
//! half/single/double float, decimal fraction, bigfloat, rational) and compare across
//! representations by numeric value through [`CborObject::compare_to`].
//!
//! - Decode with [`CborObject::decode`], [`CborObject::decode_with_limits`], [`CborObject::read`]
//!   or [`CborObject::decode_sequence`]. [`DecodeLimits`] bounds depth, lengths and input size.
//! - Encode with [`CborObject::encode_to_bytes`] or [`CborObject::write_to`], or stream items
//!   without a tree through [`Encoder`].
//! - Convert to and from JSON with [`CborObject::from_json_str`] and
//!   [`CborObject::to_json_string`]. JSON numbers with a fraction or exponent are parsed as exact
//!   decimals.
//! - Build literals with [`cbor!`], and map Rust types with [`ToCbor`] / [`FromCbor`] (derivable).
//!
//! ## Supported tags
//!
//! 2/3 (bignums), 4/5 (decimal fractions and bigfloats), 264/265 (the same with bignum
//! exponents) and 30 (rationals) decode into numeric variants. Any other tag is kept as
//! [`CborObject::Tagged`]; tags 21, 22 and 23 choose the JSON text form of a byte string. See
//! [`tags`].
//!
//! ## Feature flags
//!
//! - `sha2` *(default)*: enables [`CborObject::sha256`].
//! - `serde`: `Serialize`/`Deserialize` for the value tree and the numeric types.
//! - `simdutf8`: SIMD-accelerated UTF-8 validation where supported.
//!
//! ```
//! use extcbor::{CborObject, ExtendedDecimal};
//!
//! # fn main() -> Result<(), extcbor::CborError> {
//! let price: ExtendedDecimal = "273.15".parse()?;
//! let v = CborObject::from(price);
//! let bytes = v.encode_to_bytes()?;
//! assert_eq!(bytes, [0xc4, 0x82, 0x21, 0x19, 0x6a, 0xb3]);
//! assert_eq!(CborObject::decode(&bytes)?, v);
//! assert_eq!(v.to_json_string(), "273.15");
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

extern crate self as extcbor;

mod alloc_util;
mod arith;
mod bigint;
mod codec;
mod context;
mod decode;
mod encode;
mod error;
mod extended;
mod ieee;
mod json;
mod limits;
mod macros;
mod order;
mod rational;
#[cfg(feature = "serde")]
mod serde_impl;
pub mod tags;
pub(crate) mod utf8;
mod value;
mod wire;

pub use crate::bigint::BigInt;
pub use crate::codec::{from_slice, to_vec, CborArrayElem, FromCbor, MapEntries, ToCbor};
pub use crate::context::{Flags, PrecisionContext, RoundResult, Rounding};
pub use crate::encode::{ArrayEncoder, Encoder, MapEncoder};
pub use crate::error::{CborError, ErrorCode, ErrorKind};
pub use crate::extended::{Base10, Base2, Extended, ExtendedDecimal, ExtendedFloat, Kind, Radix};
pub use crate::limits::DecodeLimits;
#[doc(hidden)]
pub use crate::macros::__cbor_macro;
pub use crate::order::cmp_bytes_length_first;
pub use crate::rational::ExtendedRational;
pub use crate::value::{CborMap, CborObject, CborType, Values};

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
pub use crate::serde_impl::{deserialize_from_slice, from_object, serialize_to_vec, to_object};

pub use extcbor_derive::{FromCbor, ToCbor};
