//! Request options and fetch responses

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

/// Options for a single API request
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// HTTP method (GET when not set)
    pub method: Method,
    /// JSON body, sent as JSON-LD
    pub body: Option<Value>,
    /// Extra headers; `Accept` and `Content-Type` here win over the defaults
    pub headers: HeaderMap,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Attach a serializable body
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// A decoded successful response
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse<T> {
    /// Decoded (and normalized) body
    pub data: T,
    /// Raw HTTP status
    pub status: u16,
    /// Live-update hub advertised by the server, resolved to an absolute URL
    pub hub_url: Option<String>,
    /// Raw body text
    pub text: String,
}

impl<T> FetchResponse<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchResponse<U> {
        FetchResponse {
            data: f(self.data),
            status: self.status,
            hub_url: self.hub_url,
            text: self.text,
        }
    }
}
