//! JSON decoding with descriptive errors.
//!
//! # Design
//! `serde_json` reports structural failures (syntax, type mismatch, early
//! EOF) without naming the type it was decoding into. `JsonDecoder` rewraps
//! those into `NetworkingError::UnableToDecode`, keeping the original error
//! as the cause. I/O failures are not decoding failures and pass through as
//! `NetworkingError::Io`.

use std::any;
use std::io::Read;

use serde::de::{DeserializeOwned, Error as _};
use serde_json::error::Category;
use serde_json::Value;

use crate::error::NetworkingError;

/// Decoder used by every dispatch strategy.
///
/// The default configuration is the "safe ISO-8601" decoder. Date handling
/// itself is chosen per field: annotate `OffsetDateTime` fields with
/// `#[serde(with = "kipple_networking::date::safe_iso8601")]` to accept
/// RFC 3339 strings with a Unix-timestamp fallback. The decoder's only
/// runtime setting is `empty_body_as_null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonDecoder {
    empty_body_as_null: bool,
}

impl Default for JsonDecoder {
    fn default() -> Self {
        Self::safe_iso8601()
    }
}

impl JsonDecoder {
    /// The default decoder. It does not touch dates; those decode through
    /// the `date::safe_iso8601` field helpers whichever decoder is in use.
    pub fn safe_iso8601() -> Self {
        Self {
            empty_body_as_null: true,
        }
    }

    /// Treat a zero-length payload as JSON `null`, so `()` and `Option<T>`
    /// decode from empty 204 bodies. Enabled by default.
    pub fn with_empty_body_as_null(mut self, enabled: bool) -> Self {
        self.empty_body_as_null = enabled;
        self
    }

    /// Decode `bytes` into `T`, translating structural failures.
    pub fn decode_cleaned<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, NetworkingError> {
        let bytes = self.normalize(bytes);
        serde_json::from_slice(bytes).map_err(translate::<T>)
    }

    pub fn decode_reader<T: DeserializeOwned, R: Read>(
        &self,
        reader: R,
    ) -> Result<T, NetworkingError> {
        serde_json::from_reader(reader).map_err(translate::<T>)
    }

    /// Decode `bytes` into `T` after unwrapping the member named `root_key`.
    pub fn decode_rooted<T: DeserializeOwned>(
        &self,
        bytes: &[u8],
        root_key: Option<&str>,
    ) -> Result<T, NetworkingError> {
        let Some(root_key) = root_key else {
            return self.decode_cleaned(bytes);
        };

        let mut value: Value = serde_json::from_slice(self.normalize(bytes)).map_err(translate::<T>)?;
        let nested = value
            .as_object_mut()
            .and_then(|object| object.remove(root_key))
            .ok_or_else(|| {
                translate::<T>(serde_json::Error::custom(format!(
                    "missing root response key `{root_key}`"
                )))
            })?;

        serde_json::from_value(nested).map_err(translate::<T>)
    }

    fn normalize<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        if self.empty_body_as_null && bytes.iter().all(u8::is_ascii_whitespace) {
            &b"null"[..]
        } else {
            bytes
        }
    }
}

fn translate<T>(error: serde_json::Error) -> NetworkingError {
    match error.classify() {
        Category::Io => NetworkingError::Io(error.into()),
        Category::Syntax | Category::Data | Category::Eof => NetworkingError::UnableToDecode {
            type_name: type_name::<T>(),
            source: error,
        },
    }
}

/// `any::type_name` without module paths, e.g. `Vec<User>` rather than
/// `alloc::vec::Vec<app::User>`.
pub fn type_name<T: ?Sized>() -> String {
    let full = any::type_name::<T>();
    let mut name = String::with_capacity(full.len());
    let mut segment = String::new();

    for c in full.chars() {
        if c.is_alphanumeric() || c == '_' || c == ':' {
            segment.push(c);
        } else {
            name.push_str(last_segment(&segment));
            segment.clear();
            name.push(c);
        }
    }
    name.push_str(last_segment(&segment));
    name
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use std::io;

    #[derive(Debug, Deserialize, PartialEq)]
    struct PingResponse {
        ok: bool,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        name: String,
    }

    #[test]
    fn decodes_matching_payload() {
        let ping: PingResponse = JsonDecoder::default().decode_cleaned(br#"{"ok":true}"#).unwrap();
        assert_eq!(ping, PingResponse { ok: true });
    }

    #[test]
    fn type_mismatch_names_target_type() {
        let err = JsonDecoder::default()
            .decode_cleaned::<PingResponse>(br#"{"ok":"yes"}"#)
            .unwrap_err();
        match err {
            NetworkingError::UnableToDecode { type_name, source } => {
                assert_eq!(type_name, "PingResponse");
                assert_eq!(source.classify(), Category::Data);
            }
            other => panic!("expected UnableToDecode, got {other:?}"),
        }
    }

    #[test]
    fn syntax_error_is_a_decode_failure() {
        let err = JsonDecoder::default()
            .decode_cleaned::<PingResponse>(b"not json")
            .unwrap_err();
        assert_eq!(err.decode_type_name(), Some("PingResponse"));
    }

    #[test]
    fn truncated_payload_is_a_decode_failure() {
        let err = JsonDecoder::default()
            .decode_cleaned::<PingResponse>(br#"{"ok":"#)
            .unwrap_err();
        assert_eq!(err.decode_type_name(), Some("PingResponse"));
    }

    #[test]
    fn io_failure_passes_through() {
        struct Broken;

        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            }
        }

        let err = JsonDecoder::default()
            .decode_reader::<PingResponse, _>(Broken)
            .unwrap_err();
        match err {
            NetworkingError::Io(error) => assert_eq!(error.kind(), io::ErrorKind::ConnectionReset),
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn empty_body_decodes_as_null() {
        let decoder = JsonDecoder::default();
        decoder.decode_cleaned::<()>(b"").unwrap();
        assert_eq!(decoder.decode_cleaned::<Option<User>>(b"").unwrap(), None);
    }

    #[test]
    fn empty_body_fails_when_disabled() {
        let err = JsonDecoder::default()
            .with_empty_body_as_null(false)
            .decode_cleaned::<()>(b"")
            .unwrap_err();
        assert_eq!(err.decode_type_name(), Some("()"));
    }

    #[test]
    fn root_key_unwraps_payload() {
        let users: Vec<User> = JsonDecoder::default()
            .decode_rooted(br#"{"data":[{"name":"Ann"}],"page":1}"#, Some("data"))
            .unwrap();
        assert_eq!(users, vec![User { name: "Ann".to_string() }]);
    }

    #[test]
    fn missing_root_key_is_a_decode_failure() {
        let err = JsonDecoder::default()
            .decode_rooted::<Vec<User>>(br#"{"items":[]}"#, Some("data"))
            .unwrap_err();
        assert_eq!(err.decode_type_name(), Some("Vec<User>"));
    }

    #[test]
    fn type_names_drop_module_paths() {
        assert_eq!(type_name::<PingResponse>(), "PingResponse");
        assert_eq!(type_name::<Vec<User>>(), "Vec<User>");
        assert_eq!(
            type_name::<std::collections::HashMap<String, (u8, User)>>(),
            "HashMap<String, (u8, User)>"
        );
    }
}
