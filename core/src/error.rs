//! Error types for the SparkPost API client.
//!
//! # Design
//! Every fault the pipeline can hit is a distinct variant so callers can
//! match on it. Records of an unhandled event type are not errors at all;
//! they show up in `EventBatch::skipped`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single error record as returned by the API in its `errors` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// Errors returned by the client's build, parse and fetch methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required config value is missing or malformed.
    #[error("invalid api config: {0}")]
    Config(String),

    /// A requested event type is not in the registry. Raised before any
    /// request is built.
    #[error("invalid event type [{0}]")]
    InvalidEventType(String),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Network or TLS failure reported by the transport, passed through as is.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response is not JSON. Checked before the body is touched.
    #[error("expected json, got [{content_type}] with code {status}")]
    NotJson { content_type: String, status: u16 },

    #[error("{noun} does not exist, {verb} failed")]
    NotFound { noun: String, verb: String },

    #[error("{noun} {verb} failed, permission denied. Check your API key")]
    Unauthorized { noun: String, verb: String },

    #[error("{noun} {verb} failed. Are you using the right API path?")]
    Forbidden { noun: String, verb: String },

    /// Any other non-2xx status, with the error records the API sent back.
    #[error("api returned status {status}: {}", describe(.errors))]
    Api { status: u16, errors: Vec<ErrorDetail> },

    /// The response body could not be deserialized into the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The envelope has no `results` field.
    #[error("response has no results")]
    MissingResults,

    /// No event type could be found in a record. Fatal for the whole batch.
    #[error("no event type found in record {index}: {record}")]
    Discriminator { index: usize, record: String },

    /// A record of a known event type did not match that type's shape.
    #[error("error parsing [{kind}]: {source}")]
    Decode {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

fn describe(errors: &[ErrorDetail]) -> String {
    if errors.is_empty() {
        return "no error details".to_string();
    }
    errors
        .iter()
        .map(|e| match e.description.as_str() {
            "" => e.message.clone(),
            description => format!("{}: {description}", e.message),
        })
        .collect::<Vec<_>>()
        .join("; ")
}
