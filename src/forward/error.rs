//! Forwarding failures and their JSON envelope.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::forward::transport::TransportError;

/// Content type of every response the forwarder writes itself.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Message used when an upstream error has no text of its own.
pub const UPSTREAM_FALLBACK_MESSAGE: &str = "Proxy request failed";

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("Missing base or path")]
    MissingParameter,

    #[error("Invalid base URL")]
    DisallowedTarget,

    #[error("path must start with /")]
    MalformedPath,

    #[error("Invalid JSON body")]
    InvalidBody(#[source] serde_json::Error),

    /// The joined target did not parse even though `base` was allowed.
    #[error("Internal proxy error")]
    TargetUrl(#[source] url::ParseError),

    #[error("{0}")]
    Upstream(#[from] TransportError),
}

impl ForwardError {
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::MissingParameter
            | ForwardError::DisallowedTarget
            | ForwardError::MalformedPath
            | ForwardError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ForwardError::TargetUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ForwardError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Text placed in `error.message`.
    pub fn message(&self) -> String {
        let message = self.to_string();
        if message.is_empty() {
            UPSTREAM_FALLBACK_MESSAGE.to_string()
        } else {
            message
        }
    }
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    ok: bool,
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    message: &'a str,
}

/// Serialize `{"ok":false,"error":{"message":...}}`.
pub fn error_body(message: &str) -> String {
    let envelope = ErrorEnvelope {
        ok: false,
        error: ErrorDetail { message },
    };
    serde_json::to_string(&envelope).unwrap_or_default()
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        (
            self.status(),
            [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
            error_body(&self.message()),
        )
            .into_response()
    }
}
