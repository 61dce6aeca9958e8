//! Fetch error types
//!
//! Every failure of an API call surfaces as a [`FetchError`]. Only
//! [`FetchError::Http`] carries a status and, for validation failures, a
//! field map.

use crate::resource::FieldErrors;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when talking to the API
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport failure; the server never answered
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-2xx status
    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        fields: Option<FieldErrors>,
    },

    /// The body of a successful response could not be decoded
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The path could not be resolved against the entrypoint
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// HTTP status, present only for HTTP errors
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Per-field violation messages, present only for validation failures
    pub fn fields(&self) -> Option<&FieldErrors> {
        match self {
            FetchError::Http { fields, .. } => fields.as_ref(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }

    /// Build an HTTP error from a non-2xx response body
    ///
    /// Problem bodies (Hydra or RFC 7807) provide the message; a
    /// `violations` list becomes the field map. Anything else falls back to
    /// the canonical reason of the status.
    pub fn from_problem(status: StatusCode, body: &str) -> Self {
        let problem: Value = serde_json::from_str(body).unwrap_or(Value::Null);

        let text = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| problem.get(*k).and_then(Value::as_str))
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let message = text(&["hydra:description", "detail", "description"])
            .or_else(|| text(&["hydra:title", "title"]))
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            });

        let fields = problem
            .get("violations")
            .and_then(Value::as_array)
            .map(|violations| {
                violations
                    .iter()
                    .filter_map(|v| {
                        let path = v.get("propertyPath")?.as_str()?;
                        let message = v.get("message")?.as_str()?;
                        Some((path.to_string(), message.to_string()))
                    })
                    .collect::<FieldErrors>()
            });

        FetchError::Http {
            status: status.as_u16(),
            message,
            fields,
        }
    }
}
