//! Forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! InboundRequest
//!     → request.rs (query params, allow_list.rs, target URL, header/body projection)
//!     → transport.rs (one outbound call)
//!     → response.rs (relay status, content type, body)
//!
//! Any failure → error.rs (JSON envelope, 400/500/502)
//! ```
//!
//! The forwarder holds no per-request state. Each call to
//! [`Forwarder::handle`] is independent of every other.

pub mod allow_list;
pub mod error;
pub mod request;
pub mod response;
pub mod transport;

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};

pub use allow_list::is_allowed_base;
pub use error::ForwardError;
pub use request::{ForwardParams, InboundRequest};
pub use transport::{OutboundRequest, ReqwestTransport, Transport, TransportError, UpstreamResponse};

/// Validates, dispatches and relays single requests over a [`Transport`].
#[derive(Debug)]
pub struct Forwarder<T> {
    transport: T,
}

impl<T: Transport> Forwarder<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Turn an inbound request into the response sent back to the caller.
    pub async fn handle(&self, inbound: InboundRequest) -> Response {
        if inbound.method == Method::OPTIONS {
            return StatusCode::NO_CONTENT.into_response();
        }

        match self.forward(&inbound).await {
            Ok(upstream) => {
                tracing::debug!(status = %upstream.status, "Relaying upstream response");
                response::relay(upstream)
            }
            Err(err) => {
                match &err {
                    ForwardError::Upstream(e) => {
                        tracing::warn!(error = %e, "Upstream request failed");
                    }
                    ForwardError::TargetUrl(e) => {
                        tracing::error!(error = %e, "Target URL did not parse after validation");
                    }
                    _ => {
                        tracing::debug!(reason = %err, "Rejected request");
                    }
                }
                err.into_response()
            }
        }
    }

    /// Validate and dispatch, returning the raw upstream response.
    pub async fn forward(&self, inbound: &InboundRequest) -> Result<UpstreamResponse, ForwardError> {
        let outbound = OutboundRequest::from_inbound(inbound)?;

        tracing::debug!(
            method = %outbound.method,
            target = %outbound.url,
            "Forwarding request"
        );

        Ok(self.transport.dispatch(outbound).await?)
    }
}
