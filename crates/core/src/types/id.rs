//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

/// Errors that can occur when parsing an ID from untrusted text (e.g. a path segment).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdParseError {
    /// The input is not a decimal integer.
    #[error("identifier must be a decimal integer")]
    NotANumber,
    /// The input is zero or negative.
    #[error("identifier must be positive")]
    NotPositive,
}

/// Parse a strictly positive `i32` identifier.
///
/// Leading `+` signs and surrounding whitespace are rejected, matching what a
/// `[0-9]+` path pattern would accept.
///
/// # Errors
///
/// Returns [`IdParseError`] if the input is not a positive decimal integer
/// that fits in an `i32`.
pub fn parse_positive_id(s: &str) -> Result<i32, IdParseError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IdParseError::NotANumber);
    }

    let id = s.parse::<i32>().map_err(|_| IdParseError::NotANumber)?;
    if id <= 0 {
        return Err(IdParseError::NotPositive);
    }
    Ok(id)
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i32` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Ord`
/// - Conversion methods: `new()`, `as_i32()`
/// - `FromStr` accepting only positive decimal integers
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
///
/// # Example
///
/// ```rust
/// # use newsdesk_core::define_id;
/// define_id!(UserId);
/// define_id!(TagId);
///
/// let user_id = UserId::new(1);
/// let tag_id: TagId = "7".parse().unwrap();
///
/// // These are different types, so this won't compile:
/// // let _: UserId = tag_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::IdParseError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                $crate::parse_positive_id(s).map(Self)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <i32 as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_id!(UserId);
define_id!(ArticleId);
define_id!(TagId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_ids() {
        assert_eq!("1".parse::<ArticleId>().unwrap(), ArticleId::new(1));
        assert_eq!("42".parse::<TagId>().unwrap().as_i32(), 42);
        assert_eq!("007".parse::<UserId>().unwrap(), UserId::new(7));
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert_eq!("abc".parse::<TagId>(), Err(IdParseError::NotANumber));
        assert_eq!("".parse::<TagId>(), Err(IdParseError::NotANumber));
        assert_eq!("1.5".parse::<TagId>(), Err(IdParseError::NotANumber));
        assert_eq!("-3".parse::<TagId>(), Err(IdParseError::NotANumber));
        assert_eq!("+3".parse::<TagId>(), Err(IdParseError::NotANumber));
        assert_eq!(" 3".parse::<TagId>(), Err(IdParseError::NotANumber));
    }

    #[test]
    fn test_parse_rejects_overflow() {
        assert_eq!(
            "99999999999".parse::<ArticleId>(),
            Err(IdParseError::NotANumber)
        );
    }

    #[test]
    fn test_parse_rejects_zero() {
        assert_eq!("0".parse::<ArticleId>(), Err(IdParseError::NotPositive));
    }

    #[test]
    fn test_display_and_ordering() {
        assert_eq!(ArticleId::new(12).to_string(), "12");
        assert!(ArticleId::new(2) > ArticleId::new(1));
    }
}
