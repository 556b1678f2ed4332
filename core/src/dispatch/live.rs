//! Live dispatch over `reqwest`.
//!
//! # Design
//! The request is resolved to an `HttpRequest` first, so the live and mock
//! strategies see identical URLs, headers and bodies. Transport errors are
//! returned as the `reqwest::Error` they came from; status checking happens
//! afterwards in `accept`, shared with the mock strategy.

use async_trait::async_trait;
use log::trace;
use reqwest::{Client, ClientBuilder, Method};

use super::{accept, NetworkRequestDispatching};
use crate::decoder::JsonDecoder;
use crate::environment::Environment;
use crate::error::NetworkingError;
use crate::http::{HttpMethod, HttpResponse};
use crate::request::Request;
use crate::response::DataResponse;

/// A dispatcher that performs real network calls through [`reqwest`].
#[derive(Debug, Clone)]
pub struct LiveDispatcher {
    client: Client,
    decoder: JsonDecoder,
}

impl LiveDispatcher {
    pub fn new(decoder: JsonDecoder) -> Result<Self, NetworkingError> {
        Ok(Self::with_client(ClientBuilder::new().build()?, decoder))
    }

    /// Use a preconfigured client, e.g. one with timeouts or a proxy.
    pub fn with_client(client: Client, decoder: JsonDecoder) -> Self {
        Self { client, decoder }
    }
}

#[async_trait]
impl NetworkRequestDispatching for LiveDispatcher {
    fn decoder(&self) -> &JsonDecoder {
        &self.decoder
    }

    async fn request(
        &self,
        request: &Request,
        environment: &Environment,
    ) -> Result<DataResponse<Vec<u8>>, NetworkingError> {
        let wire = request.resolve(environment)?;

        trace!("sending {} request to {}", wire.method, wire.url);

        let mut builder = self.client.request(method(wire.method), &wire.url);
        for (name, value) in &wire.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = wire.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        trace!("got {status} response from {}", wire.url);

        accept(
            wire.url,
            HttpResponse {
                status,
                headers,
                body,
            },
        )
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Options => Method::OPTIONS,
    }
}
