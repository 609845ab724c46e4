use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier for players, accounts and other platform objects.
///
/// Platform identifiers are 64-bit integers that routinely exceed the range a double can
/// represent exactly, and some are opaque strings. `ObjectId` stores the exact text so it
/// survives path templating, query strings and headers digit for digit.
///
/// ```rust
/// use beam_dispatch::ObjectId;
///
/// let id = ObjectId::from(9_007_199_254_740_993_u64);
/// assert_eq!(id.to_string(), "9007199254740993");
/// assert_eq!(id.as_u64(), Some(9_007_199_254_740_993));
/// ```
///
/// From JSON, numbers are accepted within the `i64`/`u64` range only: JSON parsers hand larger
/// numbers over as floats, which no longer hold every digit. Wider identifiers must be sent
/// as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("{_0}")]
pub struct ObjectId(String);

impl ObjectId {
    /// Creates an identifier from its textual form.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier as an unsigned 64-bit integer, if it is one.
    pub fn as_u64(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl From<u64> for ObjectId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for ObjectId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<u128> for ObjectId {
    fn from(value: u128) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for ObjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for ObjectId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ObjectIdVisitor)
    }
}

struct ObjectIdVisitor;

impl Visitor<'_> for ObjectIdVisitor {
    type Value = ObjectId;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an integer or a string identifier")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(ObjectId::from(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(ObjectId::from(value))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Err(E::custom(format!(
            "number {value} is not a 64-bit integer identifier, wider identifiers must be strings"
        )))
    }

    fn visit_u128<E: de::Error>(self, value: u128) -> Result<Self::Value, E> {
        Ok(ObjectId::from(value))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(ObjectId::from(value))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(ObjectId::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_keep_every_digit_of_large_ids() {
        let id = ObjectId::from(u64::MAX);

        assert_eq!(id.as_str(), "18446744073709551615");
        assert_eq!(id.as_u64(), Some(u64::MAX));
    }

    #[test]
    fn should_accept_ids_beyond_u64() {
        let id = ObjectId::from(u128::from(u64::MAX) + 1);

        assert_eq!(id.to_string(), "18446744073709551616");
        assert_eq!(id.as_u64(), None);
    }

    #[test]
    fn should_serialize_as_string() {
        let id = ObjectId::from(1_234_567_890_123_456_789_u64);

        let json = serde_json::to_string(&id).expect("serialize");

        insta::assert_snapshot!(json, @r#""1234567890123456789""#);
    }

    #[test]
    fn should_deserialize_from_number_or_string() {
        let from_number: ObjectId =
            serde_json::from_str("1234567890123456789").expect("from number");
        let from_string: ObjectId =
            serde_json::from_str(r#""1234567890123456789""#).expect("from string");
        let negative: ObjectId = serde_json::from_str("-42").expect("from negative");

        assert_eq!(from_number, from_string);
        assert_eq!(negative.as_str(), "-42");
    }

    #[test]
    fn should_explain_numbers_beyond_u64() {
        let error = serde_json::from_str::<ObjectId>("18446744073709551616")
            .expect_err("beyond u64");

        assert!(error.to_string().contains("wider identifiers must be strings"));

        let from_string: ObjectId =
            serde_json::from_str(r#""18446744073709551616""#).expect("from string");
        assert_eq!(from_string, ObjectId::from(u128::from(u64::MAX) + 1));
    }

    #[test]
    fn should_reject_other_json_types() {
        let result = serde_json::from_str::<ObjectId>("true");

        assert!(result.is_err());
    }
}
