//! Dispatch strategies: ways of executing a `Request` against an
//! `Environment`.
//!
//! # Design
//! Strategies only implement `request`, which returns the raw body. Typed
//! decoding is provided once on the trait so every strategy funnels its
//! payload through the same `JsonDecoder` and root-key unwrapping. The
//! generic methods require `Self: Sized`, which keeps the trait usable as
//! `dyn NetworkRequestDispatching` for strategy selection.

mod live;
mod mock;

pub use self::live::LiveDispatcher;
pub use self::mock::{MockDispatcher, MockResponse};

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::decoder::JsonDecoder;
use crate::environment::Environment;
use crate::error::NetworkingError;
use crate::http::HttpResponse;
use crate::request::{Request, ResponseAnticipating};
use crate::response::DataResponse;

#[async_trait]
pub trait NetworkRequestDispatching: Send + Sync {
    /// Decoder applied by `request_decoded` and `response`.
    fn decoder(&self) -> &JsonDecoder;

    /// Execute `request` and return the raw response body.
    async fn request(
        &self,
        request: &Request,
        environment: &Environment,
    ) -> Result<DataResponse<Vec<u8>>, NetworkingError>;

    /// Execute `request` and decode the body into `T`, unwrapping the
    /// request's root response key first if it has one.
    async fn request_decoded<T>(
        &self,
        request: &Request,
        environment: &Environment,
    ) -> Result<DataResponse<T>, NetworkingError>
    where
        T: DeserializeOwned + Send,
        Self: Sized,
    {
        let response = self.request(request, environment).await?;
        let decoder = self.decoder();
        response.try_map(|body| decoder.decode_rooted(&body, request.root_response_key()))
    }

    /// Execute a response-anticipating request and return only the decoded
    /// value.
    async fn response<R>(
        &self,
        request: &R,
        environment: &Environment,
    ) -> Result<R::Response, NetworkingError>
    where
        R: ResponseAnticipating,
        Self: Sized,
    {
        let response = self
            .request_decoded::<R::Response>(request.request(), environment)
            .await?;
        Ok(response.into_value())
    }
}

/// Map non-success status codes to `UnacceptableStatus`.
pub(crate) fn accept(url: String, response: HttpResponse) -> Result<DataResponse<Vec<u8>>, NetworkingError> {
    if !response.is_success() {
        return Err(NetworkingError::UnacceptableStatus {
            status: response.status,
            body: String::from_utf8_lossy(&response.body).into_owned(),
        });
    }
    Ok(DataResponse::from_http(url, response))
}
