//! Error types for the taxonomy API client.
//!
//! # Design
//! `NotFound`, `Conflict`, and `Validation` get dedicated variants because
//! callers routinely branch on them (missing row, duplicate title, bad form
//! input). All other non-2xx responses land in `Http` with the raw status and
//! a best-effort message extracted from the body. Transport failures where no
//! response was received at all are `Network`; those are the only errors the
//! retry policy considers transient alongside 5xx statuses.

use std::collections::BTreeMap;

use thiserror::Error;
use uuid::Uuid;

/// Errors returned by every client operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404; the requested entity does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned 409, e.g. a duplicate layer title.
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// The server returned 422 with field-level validation messages.
    ///
    /// Keys are dotted `loc` paths from the server's `detail` array
    /// (e.g. `body.title`), values are the messages reported for that field.
    #[error("validation failed on {} field(s)", errors.len())]
    Validation { errors: BTreeMap<String, Vec<String>> },

    /// No response was received (connect failure, timeout, aborted body).
    #[error("network error: {message}")]
    Network { message: String },

    /// Any other non-2xx response.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// Client configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// The HTTP status this error corresponds to.
    ///
    /// `Network` reports 0 (no response received); local serialization and
    /// configuration failures report 500, matching how the server would
    /// surface an equivalent fault.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::NotFound => 404,
            ApiError::Conflict { .. } => 409,
            ApiError::Validation { .. } => 422,
            ApiError::Network { .. } => 0,
            ApiError::Http { status, .. } => *status,
            ApiError::Serialization(_) | ApiError::Deserialization(_) | ApiError::Config(_) => 500,
        }
    }

    /// True for 4xx responses. The retry policy never retries these.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status())
    }
}

/// Outcome of a bulk operation where some requests failed.
///
/// Bulk deletes fan out one request per id and fan in over every outcome, so
/// callers always learn which ids completed and which failed rather than
/// getting an opaque first-failure error.
#[derive(Debug, Error)]
#[error("bulk operation: {} of {} requests failed", failed.len(), failed.len() + completed.len())]
pub struct BulkError {
    /// Ids whose delete completed despite the aggregate failing.
    pub completed: Vec<Uuid>,
    /// Ids whose delete failed, with the per-id error.
    pub failed: Vec<(Uuid, ApiError)>,
}

/// Map a non-2xx response into the error taxonomy.
pub(crate) fn classify_response(status: u16, body: &str) -> ApiError {
    match status {
        404 => ApiError::NotFound,
        409 => ApiError::Conflict {
            message: detail_message(body),
        },
        422 => ApiError::Validation {
            errors: parse_validation_detail(body),
        },
        _ => ApiError::Http {
            status,
            message: detail_message(body),
        },
    }
}

/// Extract a human-readable message from an error body.
///
/// The server wraps messages as `{"detail": "..."}` or
/// `{"detail": [{"loc": [...], "msg": "...", "type": "..."}]}`. Anything else
/// is returned verbatim.
fn detail_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.to_string();
    };
    match &value["detail"] {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item["msg"].as_str())
                .collect();
            if msgs.is_empty() {
                body.to_string()
            } else {
                msgs.join("; ")
            }
        }
        _ => body.to_string(),
    }
}

/// Parse a 422 body's `detail` array into a field → messages map.
///
/// `loc` segments join with `.`; integer segments (array indices) are
/// rendered as-is, so `["body", 0, "title"]` becomes `body.0.title`.
fn parse_validation_detail(body: &str) -> BTreeMap<String, Vec<String>> {
    let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return errors;
    };
    match &value["detail"] {
        serde_json::Value::Array(items) => {
            for item in items {
                let field = match item["loc"].as_array() {
                    Some(segments) => segments
                        .iter()
                        .map(|seg| match seg {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join("."),
                    None => "body".to_string(),
                };
                let msg = item["msg"].as_str().unwrap_or("invalid value").to_string();
                errors.entry(field).or_default().push(msg);
            }
        }
        serde_json::Value::String(s) => {
            errors.entry("body".to_string()).or_default().push(s.clone());
        }
        _ => {}
    }
    errors
}
