//! Target environment: default base URL and environment-wide headers.

use std::env;

use crate::encoding::KeyOrdering;
use crate::error::NetworkingError;
use crate::http::set_header;

pub const BASE_URL_VAR: &str = "KIPPLE_BASE_URL";
pub const QUERY_ORDER_VAR: &str = "KIPPLE_QUERY_ORDER";

/// Where requests are sent when they do not override the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    base_url: String,
    headers: Vec<(String, String)>,
    key_ordering: KeyOrdering,
}

impl Environment {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            headers: Vec::new(),
            key_ordering: KeyOrdering::default(),
        }
    }

    /// Reads `KIPPLE_BASE_URL` and the optional `KIPPLE_QUERY_ORDER`
    /// (`insertion` or `sorted`).
    pub fn from_env() -> Result<Self, NetworkingError> {
        let base_url = env::var(BASE_URL_VAR)
            .map_err(|_| NetworkingError::Configuration(format!("{BASE_URL_VAR} is not set")))?;

        let key_ordering = match env::var(QUERY_ORDER_VAR).ok().as_deref() {
            None | Some("insertion") => KeyOrdering::Insertion,
            Some("sorted") => KeyOrdering::Sorted,
            Some(other) => {
                return Err(NetworkingError::Configuration(format!(
                    "{QUERY_ORDER_VAR} must be `insertion` or `sorted`, got `{other}`"
                )))
            }
        };

        Ok(Self::new(&base_url).with_key_ordering(key_ordering))
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        set_header(&mut self.headers, name, value);
        self
    }

    pub fn with_key_ordering(mut self, key_ordering: KeyOrdering) -> Self {
        self.key_ordering = key_ordering;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn key_ordering(&self) -> KeyOrdering {
        self.key_ordering
    }
}
