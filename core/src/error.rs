//! Error types for request resolution and dispatch.
//!
//! # Design
//! `UnableToDecode` is the only variant produced by this crate's decoder and
//! always carries the original `serde_json` failure so it stays reachable via
//! `Error::source`. Transport failures from the live strategy land in
//! `Transport` with the `reqwest::Error` untouched, and non-2xx responses in
//! `UnacceptableStatus` with the raw status code and body for debugging.

use std::error::Error;
use std::fmt;
use std::io;

/// Errors returned by request resolution, dispatch and decoding.
#[derive(Debug)]
pub enum NetworkingError {
    /// The payload did not structurally match the target type.
    UnableToDecode {
        type_name: String,
        source: serde_json::Error,
    },

    /// Reading the payload failed before decoding could finish.
    Io(io::Error),

    /// The resolved URL could not be parsed.
    InvalidUrl { url: String, reason: String },

    /// Request parameters could not be encoded.
    Encoding(String),

    /// The server answered with a non-2xx status.
    UnacceptableStatus { status: u16, body: String },

    /// The transport failed before a response was received.
    Transport(reqwest::Error),

    /// The mock strategy has no response for this route.
    NoStubbedResponse { method: String, url: String },

    /// Environment variables or fixture files are missing or malformed.
    Configuration(String),
}

impl NetworkingError {
    /// Type name carried by `UnableToDecode`, if this is a decode failure.
    pub fn decode_type_name(&self) -> Option<&str> {
        match self {
            NetworkingError::UnableToDecode { type_name, .. } => Some(type_name),
            _ => None,
        }
    }
}

impl fmt::Display for NetworkingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkingError::UnableToDecode { type_name, source } => {
                write!(f, "unable to decode {type_name}: {source}")
            }
            NetworkingError::Io(error) => write!(f, "i/o failure: {error}"),
            NetworkingError::InvalidUrl { url, reason } => {
                write!(f, "invalid URL `{url}`: {reason}")
            }
            NetworkingError::Encoding(msg) => write!(f, "parameter encoding failed: {msg}"),
            NetworkingError::UnacceptableStatus { status, body } => {
                write!(f, "HTTP {status}: {body}")
            }
            NetworkingError::Transport(error) => write!(f, "transport failed: {error}"),
            NetworkingError::NoStubbedResponse { method, url } => {
                write!(f, "no stubbed response for {method} {url}")
            }
            NetworkingError::Configuration(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl Error for NetworkingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            NetworkingError::UnableToDecode { source, .. } => Some(source),
            NetworkingError::Io(error) => Some(error),
            NetworkingError::Transport(error) => Some(error),
            _ => None,
        }
    }
}

impl From<io::Error> for NetworkingError {
    fn from(error: io::Error) -> Self {
        NetworkingError::Io(error)
    }
}

impl From<reqwest::Error> for NetworkingError {
    fn from(error: reqwest::Error) -> Self {
        NetworkingError::Transport(error)
    }
}
