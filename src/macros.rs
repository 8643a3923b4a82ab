//! CBOR construction macro.
//!
//! [`cbor!`] builds [`crate::CborObject`] trees with a JSON-like syntax. It is fallible and
//! returns `Result<CborObject, CborError>`: a map literal with a repeated key fails with
//! `DuplicateMapKey`.
//!
//! Map key rules (same ergonomics as `serde_json::json!`):
//! - `{ a: 1 }` uses the text key `"a"` (identifier stringized)
//! - `{ "a": 1 }` or `{ 7: 1 }` uses the literal as the key
//! - `{ (k): 1 }` uses the expression `k` as the key (any [`crate::ToCbor`] value)
//!
//! ```
//! # use extcbor::cbor;
//! # fn demo() -> Result<(), extcbor::CborError> {
//! let user_key = "dynamic";
//! let v = cbor!({
//!     a: 1,
//!     (user_key): [true, null, 1.5],
//! })?;
//! assert_eq!(v.len(), 2);
//! # Ok(()) }
//! # demo().unwrap();
//! ```

/// Construct a [`crate::CborObject`] using a JSON-like literal syntax.
///
/// Supported forms:
/// - `cbor!(null)`, `cbor!(undefined)`
/// - `cbor!(true)` / `cbor!(false)`
/// - `cbor!("text")`, `cbor!(b"bytes")`
/// - `cbor!([ ... ])`
/// - `cbor!({ key: value, "key": value, (expr_key): value, ... })`
/// - `cbor!(expr)` where `expr` implements [`crate::ToCbor`]
#[macro_export]
macro_rules! cbor {
    (null) => {
        ::core::result::Result::<$crate::CborObject, $crate::CborError>::Ok($crate::CborObject::Null)
    };
    (undefined) => {
        ::core::result::Result::<$crate::CborObject, $crate::CborError>::Ok(
            $crate::CborObject::Undefined,
        )
    };
    (true) => {
        ::core::result::Result::<$crate::CborObject, $crate::CborError>::Ok(
            $crate::CborObject::Bool(true),
        )
    };
    (false) => {
        ::core::result::Result::<$crate::CborObject, $crate::CborError>::Ok(
            $crate::CborObject::Bool(false),
        )
    };

    ([ $($elem:tt),* $(,)? ]) => {{
        (|| -> ::core::result::Result<$crate::CborObject, $crate::CborError> {
            let mut items = $crate::__cbor_macro::Vec::new();
            $crate::__cbor_macro::try_reserve(
                &mut items,
                0usize $(+ { let _ = stringify!($elem); 1usize })*,
            )?;
            $(
                items.push($crate::cbor!($elem)?);
            )*
            ::core::result::Result::Ok($crate::CborObject::Array(items))
        })()
    }};

    ({ $($key:tt : $value:tt),* $(,)? }) => {{
        (|| -> ::core::result::Result<$crate::CborObject, $crate::CborError> {
            let mut map = $crate::CborObject::new_map();
            $(
                $crate::__cbor_macro::insert_unique(
                    &mut map,
                    $crate::__cbor_key!($key)?,
                    $crate::cbor!($value)?,
                )?;
            )*
            ::core::result::Result::Ok(map)
        })()
    }};

    ($other:expr) => {{
        $crate::ToCbor::to_cbor(&$other)
    }};
}

/// Internal helper for map keys.
#[doc(hidden)]
#[macro_export]
macro_rules! __cbor_key {
    ($key:ident) => {{
        ::core::result::Result::<$crate::CborObject, $crate::CborError>::Ok(
            $crate::CborObject::from(::core::stringify!($key)),
        )
    }};
    (($key:expr)) => {{
        $crate::ToCbor::to_cbor(&$key)
    }};
    ($key:literal) => {{
        $crate::ToCbor::to_cbor(&$key)
    }};
}

/// Hidden support module used by `cbor!` expansions.
#[doc(hidden)]
#[allow(missing_docs)]
pub mod __cbor_macro {
    pub use std::vec::Vec;

    use crate::{CborError, CborObject, ErrorCode};

    pub fn try_reserve<T>(v: &mut Vec<T>, additional: usize) -> Result<(), CborError> {
        crate::alloc_util::try_reserve(v, additional, 0)
    }

    pub fn insert_unique(map: &mut CborObject, key: CborObject, value: CborObject) -> Result<(), CborError> {
        if map.contains_key(&key) {
            return Err(CborError::new(ErrorCode::DuplicateMapKey, 0));
        }
        map.insert(key, value)
    }
}

#[cfg(test)]
mod tests {
    use crate::{CborObject, ErrorCode};

    #[test]
    fn builds_nested_values() {
        let k = String::from("dyn");
        let v = cbor!({
            a: [1, (-2), 1.5, null, undefined],
            "b": b"\x01\x02",
            (k): { 7: "seven" },
        })
        .unwrap();
        assert_eq!(v.len(), 3);
        assert_eq!(v.get_str("a").unwrap().len(), 5);
        assert_eq!(v.get_str("b").unwrap().as_bytes().unwrap(), [1, 2]);
        let inner = v.get_str("dyn").unwrap();
        assert_eq!(inner.get(&CborObject::from(7)).unwrap().as_str().unwrap(), "seven");
    }

    #[test]
    fn duplicate_keys_fail() {
        let err = cbor!({ a: 1, "a": 2 }).unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateMapKey);
    }
}
