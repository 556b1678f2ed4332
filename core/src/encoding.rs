//! Parameter encoding: turns a parameter bag into a query suffix or a body.
//!
//! # Design
//! Parameters are a `serde_json::Map`, so every value is one of the closed
//! JSON variants and nothing needs runtime type inspection. Query and form
//! encodings flatten nested values with bracket notation (`tags[]=a`,
//! `user[name]=b`) and percent-encode through `url::form_urlencoded`.

use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::error::NetworkingError;
use crate::http::HttpMethod;

/// Parameter bag carried by a `Request`. Preserves insertion order.
pub type Parameters = Map<String, Value>;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

/// Where and how request parameters are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterEncoding {
    /// URL query string.
    Query,
    /// JSON object in the body.
    JsonBody,
    /// `application/x-www-form-urlencoded` body.
    FormBody,
}

impl ParameterEncoding {
    /// GET uses the query string; every other method sends a JSON body.
    pub fn default_for(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => ParameterEncoding::Query,
            _ => ParameterEncoding::JsonBody,
        }
    }
}

/// Order in which parameter keys are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyOrdering {
    #[default]
    Insertion,
    Sorted,
}

/// Output of `encode`. All fields are `None` for an empty parameter bag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedParameters {
    pub query: Option<String>,
    pub body: Option<Vec<u8>>,
    pub content_type: Option<&'static str>,
}

pub fn encode(
    encoding: ParameterEncoding,
    parameters: &Parameters,
    ordering: KeyOrdering,
) -> Result<EncodedParameters, NetworkingError> {
    if parameters.is_empty() {
        return Ok(EncodedParameters::default());
    }

    Ok(match encoding {
        ParameterEncoding::Query => EncodedParameters {
            query: Some(url_encode(parameters, ordering)),
            ..Default::default()
        },
        ParameterEncoding::FormBody => EncodedParameters {
            body: Some(url_encode(parameters, ordering).into_bytes()),
            content_type: Some(FORM_CONTENT_TYPE),
            ..Default::default()
        },
        ParameterEncoding::JsonBody => {
            let object = reorder(parameters, ordering);
            let body = serde_json::to_vec(&object)
                .map_err(|e| NetworkingError::Encoding(e.to_string()))?;
            EncodedParameters {
                body: Some(body),
                content_type: Some(JSON_CONTENT_TYPE),
                ..Default::default()
            }
        }
    })
}

fn url_encode(parameters: &Parameters, ordering: KeyOrdering) -> String {
    let mut pairs = Vec::new();
    for (key, value) in entries(parameters, ordering) {
        flatten(key.clone(), value, ordering, &mut pairs);
    }
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

fn flatten(key: String, value: &Value, ordering: KeyOrdering, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Null => pairs.push((key, String::new())),
        Value::Bool(flag) => pairs.push((key, flag.to_string())),
        Value::Number(number) => pairs.push((key, number.to_string())),
        Value::String(text) => pairs.push((key, text.clone())),
        Value::Array(items) => {
            for item in items {
                flatten(format!("{key}[]"), item, ordering, pairs);
            }
        }
        Value::Object(object) => {
            for (nested, item) in entries(object, ordering) {
                flatten(format!("{key}[{nested}]"), item, ordering, pairs);
            }
        }
    }
}

fn entries(object: &Map<String, Value>, ordering: KeyOrdering) -> Vec<(&String, &Value)> {
    let mut entries: Vec<_> = object.iter().collect();
    if ordering == KeyOrdering::Sorted {
        entries.sort_by(|a, b| a.0.cmp(b.0));
    }
    entries
}

fn reorder(object: &Map<String, Value>, ordering: KeyOrdering) -> Value {
    Value::Object(
        entries(object, ordering)
            .into_iter()
            .map(|(key, value)| (key.clone(), reorder_value(value, ordering)))
            .collect(),
    )
}

fn reorder_value(value: &Value, ordering: KeyOrdering) -> Value {
    match value {
        Value::Object(nested) => reorder(nested, ordering),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| reorder_value(item, ordering))
                .collect(),
        ),
        other => other.clone(),
    }
}
