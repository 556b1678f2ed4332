//! Declarative request values and their resolution into wire requests.
//!
//! # Design
//! `Request` is an immutable description of a call. Nothing about the
//! target host is baked in until `resolve` combines it with an
//! `Environment`, so the same value can be sent to staging and production.
//! `ResponseAnticipating` pairs a request with the type its response decodes
//! into, letting dispatchers infer the target type from the request alone.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::encoding::{self, ParameterEncoding, Parameters};
use crate::environment::Environment;
use crate::error::NetworkingError;
use crate::http::{set_header, HttpMethod, HttpRequest};

/// Abstract description of an HTTP call.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    path: String,
    base_url: Option<String>,
    method: HttpMethod,
    parameters: Parameters,
    headers: Vec<(String, String)>,
    encoding: Option<ParameterEncoding>,
    root_response_key: Option<String>,
}

impl Request {
    pub fn new(path: &str, method: HttpMethod) -> Self {
        Self {
            path: path.to_string(),
            base_url: None,
            method,
            parameters: Parameters::new(),
            headers: Vec::new(),
            encoding: None,
            root_response_key: None,
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(path, HttpMethod::Get)
    }

    pub fn post(path: &str) -> Self {
        Self::new(path, HttpMethod::Post)
    }

    pub fn put(path: &str) -> Self {
        Self::new(path, HttpMethod::Put)
    }

    pub fn patch(path: &str) -> Self {
        Self::new(path, HttpMethod::Patch)
    }

    pub fn delete(path: &str) -> Self {
        Self::new(path, HttpMethod::Delete)
    }

    /// Overrides the environment's base URL for this request only.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.to_string());
        self
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_parameter(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.to_string(), value.into());
        self
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        set_header(&mut self.headers, name, value);
        self
    }

    /// Pins the encoding instead of deriving it from the method.
    pub fn with_encoding(mut self, encoding: ParameterEncoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn with_root_response_key(mut self, key: &str) -> Self {
        self.root_response_key = Some(key.to_string());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn encoding(&self) -> ParameterEncoding {
        self.encoding
            .unwrap_or_else(|| ParameterEncoding::default_for(self.method))
    }

    pub fn root_response_key(&self) -> Option<&str> {
        self.root_response_key.as_deref()
    }

    /// The request's own base URL if set, otherwise the environment's.
    pub fn resolved_base_url<'a>(&'a self, environment: &'a Environment) -> &'a str {
        self.base_url.as_deref().unwrap_or(environment.base_url())
    }

    /// Build the wire request this value describes against `environment`.
    pub fn resolve(&self, environment: &Environment) -> Result<HttpRequest, NetworkingError> {
        let base = self.resolved_base_url(environment).trim_end_matches('/');
        let path = self.path.trim_start_matches('/');
        let mut url = if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        };

        let encoded = encoding::encode(
            self.encoding(),
            &self.parameters,
            environment.key_ordering(),
        )?;

        if let Some(query) = encoded.query {
            let separator = if url.contains('?') { '&' } else { '?' };
            url.push(separator);
            url.push_str(&query);
        }

        Url::parse(&url).map_err(|e| NetworkingError::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        let mut headers = environment.headers().to_vec();
        if let Some(content_type) = encoded.content_type {
            set_header(&mut headers, "content-type", content_type);
        }
        for (name, value) in &self.headers {
            set_header(&mut headers, name, value);
        }

        Ok(HttpRequest {
            method: self.method,
            url,
            headers,
            body: encoded.body,
        })
    }
}

/// A request that statically declares the type its response decodes into.
pub trait ResponseAnticipating: Send + Sync {
    type Response: DeserializeOwned + Send;

    fn request(&self) -> &Request;
}

/// A GET request with no parameters or headers whose response decodes as `T`.
pub struct DecodableRequest<T> {
    request: Request,
    response: PhantomData<fn() -> T>,
}

impl<T> DecodableRequest<T> {
    pub fn new(path: &str) -> Self {
        Self {
            request: Request::get(path),
            response: PhantomData,
        }
    }
}

impl<T: DeserializeOwned + Send> ResponseAnticipating for DecodableRequest<T> {
    type Response = T;

    fn request(&self) -> &Request {
        &self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{KeyOrdering, JSON_CONTENT_TYPE};
    use pretty_assertions::assert_eq;

    fn environment() -> Environment {
        Environment::new("https://api.example.com")
    }

    #[test]
    fn get_without_parameters() {
        let req = Request::get("/users").resolve(&environment()).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://api.example.com/users");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn post_with_json_body() {
        let req = Request::post("/users")
            .with_parameter("name", "Ann")
            .resolve(&environment())
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "https://api.example.com/users");
        assert_eq!(req.body.as_deref(), Some(br#"{"name":"Ann"}"#.as_slice()));
        assert_eq!(req.header("Content-Type"), Some(JSON_CONTENT_TYPE));
    }

    #[test]
    fn get_parameters_go_to_query() {
        let req = Request::get("/search")
            .with_parameter("q", "rust lang")
            .with_parameter("page", 2)
            .resolve(&environment())
            .unwrap();
        assert_eq!(req.url, "https://api.example.com/search?q=rust+lang&page=2");
        assert!(req.body.is_none());
        assert!(req.header("content-type").is_none());
    }

    #[test]
    fn delete_parameters_go_to_body() {
        let req = Request::delete("/users/7")
            .with_parameter("force", true)
            .resolve(&environment())
            .unwrap();
        assert_eq!(req.url, "https://api.example.com/users/7");
        assert_eq!(req.body.as_deref(), Some(br#"{"force":true}"#.as_slice()));
        assert_eq!(req.header("content-type"), Some("application/json"));
    }

    #[test]
    fn delete_with_query_encoding_keeps_parameters_in_url() {
        let req = Request::delete("/users/7")
            .with_encoding(ParameterEncoding::Query)
            .with_parameter("force", true)
            .resolve(&environment())
            .unwrap();
        assert_eq!(req.url, "https://api.example.com/users/7?force=true");
        assert!(req.body.is_none());
    }

    #[test]
    fn encoding_derives_from_method_unless_pinned() {
        assert_eq!(Request::get("/").encoding(), ParameterEncoding::Query);
        assert_eq!(Request::delete("/").encoding(), ParameterEncoding::JsonBody);
        assert_eq!(
            Request::new("/", HttpMethod::Head).encoding(),
            ParameterEncoding::JsonBody
        );
        assert_eq!(Request::put("/").encoding(), ParameterEncoding::JsonBody);
        assert_eq!(
            Request::get("/").with_method(HttpMethod::Post).encoding(),
            ParameterEncoding::JsonBody
        );
        assert_eq!(
            Request::post("/")
                .with_encoding(ParameterEncoding::FormBody)
                .with_method(HttpMethod::Put)
                .encoding(),
            ParameterEncoding::FormBody
        );
    }

    #[test]
    fn request_base_url_overrides_environment() {
        let req = Request::get("users")
            .with_base_url("https://other.example.com/v2/")
            .resolve(&environment())
            .unwrap();
        assert_eq!(req.url, "https://other.example.com/v2/users");
    }

    #[test]
    fn environment_base_url_is_used_without_override() {
        let env = environment();
        let request = Request::get("/users");
        assert_eq!(request.resolved_base_url(&env), "https://api.example.com");
    }

    #[test]
    fn request_headers_override_environment_headers() {
        let env = environment()
            .with_header("Accept", "text/plain")
            .with_header("X-Client", "kipple");
        let req = Request::post("/users")
            .with_parameter("name", "Ann")
            .with_header("accept", "application/json")
            .with_header("Content-Type", "application/vnd.api+json")
            .resolve(&env)
            .unwrap();
        assert_eq!(
            req.headers,
            vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("X-Client".to_string(), "kipple".to_string()),
                ("content-type".to_string(), "application/vnd.api+json".to_string()),
            ]
        );
    }

    #[test]
    fn query_is_appended_to_existing_query() {
        let req = Request::get("/items?kind=book")
            .with_parameter("page", 1)
            .resolve(&environment())
            .unwrap();
        assert_eq!(req.url, "https://api.example.com/items?kind=book&page=1");
    }

    #[test]
    fn sorted_environment_sorts_query() {
        let env = environment().with_key_ordering(KeyOrdering::Sorted);
        let req = Request::get("/items")
            .with_parameter("b", 1)
            .with_parameter("a", 2)
            .resolve(&env)
            .unwrap();
        assert_eq!(req.url, "https://api.example.com/items?a=2&b=1");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = Request::get("/users")
            .resolve(&Environment::new("not a url"))
            .unwrap_err();
        assert!(matches!(err, NetworkingError::InvalidUrl { .. }));
    }

    #[test]
    fn decodable_request_is_plain_get() {
        let anticipating = DecodableRequest::<bool>::new("/ping");
        let request = anticipating.request();
        assert_eq!(request.method(), HttpMethod::Get);
        assert_eq!(request.path(), "/ping");
        assert!(request.parameters().is_empty());
        assert!(request.headers().is_empty());
        assert!(request.root_response_key().is_none());
    }
}
