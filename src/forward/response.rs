//! Relay of upstream responses to the caller.

use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};

use crate::forward::error::JSON_CONTENT_TYPE;
use crate::forward::transport::UpstreamResponse;

/// Copy status, content type (defaulting to JSON) and body text verbatim.
pub fn relay(upstream: UpstreamResponse) -> Response {
    let content_type = upstream
        .content_type
        .unwrap_or_else(|| HeaderValue::from_static(JSON_CONTENT_TYPE));

    (
        upstream.status,
        [(header::CONTENT_TYPE, content_type)],
        upstream.body,
    )
        .into_response()
}
