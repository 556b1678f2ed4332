//! Mock dispatch from canned responses.
//!
//! # Design
//! Stubs are plain data keyed by `(HttpMethod, url)`, so a mock can be built
//! in code or loaded from a JSON fixture file with the same result. Stubbed
//! responses go through `accept` like live ones, so a stubbed 404 fails the
//! same way a real one does.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use log::trace;
use serde::Deserialize;
use serde_json::Value;

use super::{accept, NetworkRequestDispatching};
use crate::decoder::JsonDecoder;
use crate::environment::Environment;
use crate::error::NetworkingError;
use crate::http::{set_header, HttpMethod, HttpResponse};
use crate::request::Request;
use crate::response::DataResponse;

/// A pre-programmed response returned by `MockDispatcher`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl MockResponse {
    /// A 200 response with `value` as its JSON body.
    pub fn json(value: Value) -> Self {
        Self::raw(200, value.to_string()).with_header("content-type", "application/json")
    }

    pub fn raw(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        set_header(&mut self.headers, name, value);
        self
    }

    fn to_http(&self) -> HttpResponse {
        HttpResponse {
            status: self.status,
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }
}

/// A dispatcher that answers from pre-programmed responses without touching
/// the network.
///
/// Stubs are keyed by method and absolute URL; the query string is ignored
/// when matching. Requests without a stub get the fallback response, or
/// `NoStubbedResponse` if none is set.
#[derive(Debug, Clone, Default)]
pub struct MockDispatcher {
    stubs: HashMap<(HttpMethod, String), MockResponse>,
    fallback: Option<MockResponse>,
    decoder: JsonDecoder,
}

impl MockDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock that answers every request with `response`.
    pub fn returning(response: MockResponse) -> Self {
        Self::new().with_fallback(response)
    }

    pub fn with_stub(mut self, method: HttpMethod, url: &str, response: MockResponse) -> Self {
        self.stubs.insert((method, route(url).to_string()), response);
        self
    }

    pub fn with_fallback(mut self, response: MockResponse) -> Self {
        self.fallback = Some(response);
        self
    }

    pub fn with_decoder(mut self, decoder: JsonDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    /// Load stubs from a JSON fixture file.
    ///
    /// The file holds an array of objects with `method`, `url`, and optional
    /// `status` (default 200), `headers`, `body` (any JSON value) or
    /// `raw_body` (a string sent verbatim).
    pub fn from_fixture_file(path: impl AsRef<Path>) -> Result<Self, NetworkingError> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|e| {
            NetworkingError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_fixtures(&contents)
    }

    pub fn from_fixtures(contents: &[u8]) -> Result<Self, NetworkingError> {
        let fixtures: Vec<Fixture> = serde_json::from_slice(contents)
            .map_err(|e| NetworkingError::Configuration(format!("invalid mock fixtures: {e}")))?;

        fixtures.into_iter().try_fold(Self::new(), |mock, fixture| {
            let method = fixture.method.parse::<HttpMethod>()?;
            let mut response = match (fixture.raw_body, fixture.body) {
                (Some(raw), _) => MockResponse::raw(fixture.status, raw),
                (None, Value::Null) => MockResponse::raw(fixture.status, Vec::<u8>::new()),
                (None, body) => MockResponse::json(body).with_status(fixture.status),
            };
            for (name, value) in &fixture.headers {
                response = response.with_header(name, value);
            }
            Ok(mock.with_stub(method, &fixture.url, response))
        })
    }

    fn find(&self, method: HttpMethod, url: &str) -> Option<&MockResponse> {
        self.stubs
            .get(&(method, route(url).to_string()))
            .or(self.fallback.as_ref())
    }
}

#[async_trait]
impl NetworkRequestDispatching for MockDispatcher {
    fn decoder(&self) -> &JsonDecoder {
        &self.decoder
    }

    async fn request(
        &self,
        request: &Request,
        environment: &Environment,
    ) -> Result<DataResponse<Vec<u8>>, NetworkingError> {
        let wire = request.resolve(environment)?;

        let response = self
            .find(wire.method, &wire.url)
            .ok_or_else(|| NetworkingError::NoStubbedResponse {
                method: wire.method.to_string(),
                url: wire.url.clone(),
            })?
            .to_http();

        trace!("stubbed {} response for {} {}", response.status, wire.method, wire.url);

        accept(wire.url, response)
    }
}

fn route(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

#[derive(Deserialize)]
struct Fixture {
    method: String,
    url: String,
    #[serde(default = "default_status")]
    status: u16,
    #[serde(default)]
    headers: Vec<(String, String)>,
    #[serde(default)]
    body: Value,
    #[serde(default)]
    raw_body: Option<String>,
}

fn default_status() -> u16 {
    200
}
