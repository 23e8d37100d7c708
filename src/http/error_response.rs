//! Uniform JSON error responses.
//!
//! Every request the gateway refuses ends with the same body shape:
//!
//! ```json
//! {
//!   "timestamp": "2025-10-25T00:45:30.123Z",
//!   "status": 401,
//!   "error": "Unauthorized",
//!   "message": "Token has expired",
//!   "path": "/api/orders/123"
//! }
//! ```

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Body of a terminal error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub timestamp: String,
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
}

impl ErrorBody {
    pub fn new(status: StatusCode, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Unknown").to_string(),
            message: message.into(),
            path: path.into(),
        }
    }
}

/// Build the terminal response for a rejected request.
///
/// If the body cannot be serialized the response is empty but keeps `status`.
pub fn respond(path: &str, status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorBody::new(status, message, path);

    tracing::warn!(
        status = body.status,
        path = %body.path,
        message = %body.message,
        "Gateway error"
    );

    match serde_json::to_vec(&body) {
        Ok(bytes) => json_response(status, bytes),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize error response");
            empty_response(status)
        }
    }
}

fn json_response(status: StatusCode, bytes: Vec<u8>) -> Response {
    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

fn empty_response(status: StatusCode) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}
