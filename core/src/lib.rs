//! Declarative HTTP requests with pluggable dispatch.
//!
//! # Overview
//! A `Request` describes a call abstractly: path, method, parameters,
//! headers and how the parameters are encoded. Combined with an
//! `Environment` it resolves into a plain-data `HttpRequest`, which a
//! dispatch strategy executes before the body is decoded with `JsonDecoder`.
//!
//! # Design
//! - `Request` and `Environment` are immutable values built per call site.
//! - `NetworkRequestDispatching` is the strategy seam. `LiveDispatcher` talks
//!   to the network through reqwest, `MockDispatcher` answers from stubs.
//! - `UniversalNetworkRequestDispatcher` picks one strategy at construction
//!   time via `DispatchMode` and forwards every call to it.
//! - Structural decode failures become `NetworkingError::UnableToDecode`,
//!   naming the target type and keeping the `serde_json` error as the cause.

pub mod date;
pub mod decoder;
pub mod dispatch;
pub mod dispatcher;
pub mod encoding;
pub mod environment;
pub mod error;
pub mod http;
pub mod request;
pub mod response;

pub use decoder::JsonDecoder;
pub use dispatch::{LiveDispatcher, MockDispatcher, MockResponse, NetworkRequestDispatching};
pub use dispatcher::{DispatchMode, UniversalNetworkRequestDispatcher};
pub use encoding::{KeyOrdering, ParameterEncoding, Parameters};
pub use environment::Environment;
pub use error::NetworkingError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use request::{DecodableRequest, Request, ResponseAnticipating};
pub use response::DataResponse;
