//! Lenient ISO-8601 date fields.
//!
//! Use with `#[serde(with = "kipple_networking::date::safe_iso8601")]` on an
//! `OffsetDateTime` field. Strings are parsed as RFC 3339 (fractional seconds
//! optional); numbers are taken as Unix seconds. Serialization always writes
//! RFC 3339.

pub mod safe_iso8601 {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use time::format_description::well_known::Rfc3339;
    use time::OffsetDateTime;

    pub fn serialize<S: Serializer>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        let text = value.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OffsetDateTime, D::Error> {
        deserializer.deserialize_any(DateVisitor)
    }

    struct DateVisitor;

    impl<'de> Visitor<'de> for DateVisitor {
        type Value = OffsetDateTime;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an RFC 3339 date string or a Unix timestamp")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            OffsetDateTime::parse(value, &Rfc3339).map_err(E::custom)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            OffsetDateTime::from_unix_timestamp(value).map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            let seconds = i64::try_from(value).map_err(E::custom)?;
            self.visit_i64(seconds)
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
            if !value.is_finite() {
                return Err(E::custom("timestamp is not finite"));
            }
            OffsetDateTime::from_unix_timestamp_nanos((value * 1e9) as i128).map_err(E::custom)
        }
    }

    /// The same rules for `Option<OffsetDateTime>`; `null` decodes as `None`.
    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use time::OffsetDateTime;

        #[derive(Deserialize)]
        struct Wrapped(#[serde(with = "crate::date::safe_iso8601")] OffsetDateTime);

        pub fn serialize<S: Serializer>(
            value: &Option<OffsetDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => super::serialize(value, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<OffsetDateTime>, D::Error> {
            Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(value)| value))
        }
    }
}
