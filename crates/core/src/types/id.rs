//! Newtype IDs for type-safe entity references.
//!
//! Numeric database IDs are defined with the `define_id!` macro. Countdown
//! events use [`EventId`], a short random alphanumeric string, because event
//! IDs appear in shareable URLs.

use core::fmt;

use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i32` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_i32()`
/// - `From<i32>` and `Into<i32>` implementations
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
///
/// # Example
///
/// ```rust
/// # use countdown_core::define_id;
/// define_id!(UserId);
/// define_id!(MessageId);
///
/// let user_id = UserId::new(1);
/// let message_id = MessageId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: UserId = message_id;
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
define_id!(JoinRequestId);
define_id!(MessageId);
define_id!(MessageReplyId);
define_id!(AdminLogId);

/// Errors that can occur when parsing an [`EventId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EventIdError {
    /// The input has the wrong length.
    #[error("event id must be {expected} characters")]
    WrongLength {
        /// Required length.
        expected: usize,
    },
    /// The input contains a non-alphanumeric character.
    #[error("event id must be alphanumeric")]
    InvalidCharacter,
}

/// Identifier of a countdown event.
///
/// A fixed-length ASCII alphanumeric string, e.g. `"a8Kd02xZ"`. Short enough
/// to share in a URL, random enough that collisions are rare; callers that
/// insert a freshly generated ID still retry on a primary-key collision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventId(String);

impl EventId {
    /// Length of every event ID.
    pub const LENGTH: usize = 8;

    /// Generate a new random event ID.
    #[must_use]
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let id: String = rng
            .sample_iter(Alphanumeric)
            .take(Self::LENGTH)
            .map(char::from)
            .collect();
        Self(id)
    }

    /// Parse an `EventId` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly [`EventId::LENGTH`] ASCII
    /// alphanumeric characters.
    pub fn parse(s: &str) -> Result<Self, EventIdError> {
        if s.len() != Self::LENGTH {
            return Err(EventIdError::WrongLength {
                expected: Self::LENGTH,
            });
        }
        if !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(EventIdError::InvalidCharacter);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for EventId {
    type Err = EventIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for EventId {
    type Error = EventIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EventId> for String {
    fn from(id: EventId) -> Self {
        id.0
    }
}

impl AsRef<str> for EventId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for EventId {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for EventId {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for EventId {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_numeric_ids_roundtrip() {
        let id = UserId::new(42);
        assert_eq!(id.as_i32(), 42);
        assert_eq!(i32::from(id), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_generated_event_id_is_valid() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let id = EventId::generate(&mut rng);
            assert_eq!(id.as_str().len(), EventId::LENGTH);
            assert!(EventId::parse(id.as_str()).is_ok());
        }
    }

    #[test]
    fn test_generated_event_ids_are_distinct() {
        let mut rng = StdRng::seed_from_u64(11);
        let ids: HashSet<EventId> = (0..1000).map(|_| EventId::generate(&mut rng)).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_parse_event_id_rejects_bad_input() {
        assert_eq!(
            EventId::parse("short"),
            Err(EventIdError::WrongLength { expected: 8 })
        );
        assert_eq!(
            EventId::parse("abc-1234"),
            Err(EventIdError::InvalidCharacter)
        );
        assert!(EventId::parse("aB3dE5gH").is_ok());
    }

    #[test]
    fn test_event_id_serde_validates() {
        let id: EventId = serde_json::from_str("\"aB3dE5gH\"").unwrap();
        assert_eq!(id.as_str(), "aB3dE5gH");
        assert!(serde_json::from_str::<EventId>("\"../etc\"").is_err());
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"aB3dE5gH\"");
    }
}
