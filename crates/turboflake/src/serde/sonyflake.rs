use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::SonyflakeId;

/// Serializes as the raw `u64`. Every `u64` is a valid ID, so deserializing
/// never rejects a well-typed value.
impl Serialize for SonyflakeId {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_raw().serialize(s)
    }
}

impl<'de> Deserialize<'de> for SonyflakeId {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(d).map(Self::from_raw)
    }
}

/// Serde helpers that encode a [`SonyflakeId`] as a decimal string.
///
/// Useful for JSON consumers that store numbers as doubles and would lose
/// precision above 2^53.
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use turboflake::SonyflakeId;
///
/// #[derive(Serialize, Deserialize)]
/// struct Event {
///     #[serde(with = "turboflake::as_decimal_string")]
///     id: SonyflakeId,
/// }
///
/// let event = Event { id: SonyflakeId::from_raw(u64::MAX) };
/// let json = serde_json::to_string(&event).unwrap();
/// assert_eq!(json, r#"{"id":"18446744073709551615"}"#);
/// ```
pub mod as_decimal_string {
    use super::{Deserialize, Deserializer, Serializer};
    use crate::SonyflakeId;

    /// Serialize an ID as its decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &SonyflakeId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&id.to_raw().to_string())
    }

    /// Deserialize an ID from its decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying deserializer fails or the string is
    /// not a decimal `u64`.
    pub fn deserialize<'de, D>(d: D) -> Result<SonyflakeId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(d)?;
        s.parse::<u64>()
            .map(SonyflakeId::from_raw)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use crate::SonyflakeId;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: SonyflakeId,
        #[serde(with = "crate::as_decimal_string")]
        text_id: SonyflakeId,
    }

    #[test]
    fn serializes_as_raw_integer() {
        let id = SonyflakeId::from_components(42, 0x7F7F, 7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, id.to_raw().to_string());
        assert_eq!(serde_json::from_str::<SonyflakeId>(&json).unwrap(), id);
    }

    #[test]
    fn decimal_string_helper_handles_full_range() {
        let row = Row {
            id: SonyflakeId::from_raw(1),
            text_id: SonyflakeId::from_raw(u64::MAX),
        };
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"id":1,"text_id":"18446744073709551615"}"#);
        assert_eq!(serde_json::from_str::<Row>(&json).unwrap(), row);
    }

    #[test]
    fn rejects_non_numeric_string() {
        let err = serde_json::from_str::<Row>(r#"{"id":1,"text_id":"abc"}"#);
        assert!(err.is_err());
    }
}
