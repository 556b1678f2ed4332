//! Responses handed back by the dispatch strategies.
//!
//! # Design
//! A `DataResponse` starts life holding the raw body bytes and is turned
//! into a typed payload with `try_map` once decoding succeeds. Status,
//! headers and the final URL travel with the payload unchanged.

use crate::http::{find_header, HttpResponse};

/// A response payload together with its transport metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataResponse<T> {
    status: u16,
    headers: Vec<(String, String)>,
    url: String,
    value: T,
}

impl DataResponse<Vec<u8>> {
    pub fn from_http(url: String, response: HttpResponse) -> Self {
        Self {
            status: response.status,
            headers: response.headers,
            url,
            value: response.body,
        }
    }
}

impl<T> DataResponse<T> {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// URL the request was sent to.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    /// Replace the payload, keeping the metadata. Stops at the first error.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<DataResponse<U>, E> {
        Ok(DataResponse {
            status: self.status,
            headers: self.headers,
            url: self.url,
            value: f(self.value)?,
        })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> DataResponse<U> {
        DataResponse {
            status: self.status,
            headers: self.headers,
            url: self.url,
            value: f(self.value),
        }
    }
}
