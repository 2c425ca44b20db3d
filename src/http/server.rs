//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the forwarding handler
//! - Wire up middleware (CORS, request ID, tracing, body limit)
//! - Bind server to listener and serve until shutdown

use std::future::Future;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, RawQuery, State},
    http::{header, HeaderMap, Method},
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{EndpointConfig, ForwarderConfig};
use crate::forward::{Forwarder, InboundRequest, ReqwestTransport, Transport, TransportError};
use crate::http::cors::with_cors_headers;

/// HTTP server hosting the forwarder.
pub struct HttpServer {
    router: Router,
    config: ForwarderConfig,
}

impl HttpServer {
    /// Create a server that forwards over a fresh `reqwest` client.
    pub fn new(config: ForwarderConfig) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(&config.forwarder.user_agent)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Create a server over any transport.
    pub fn with_transport<T: Transport>(config: ForwarderConfig, transport: T) -> Self {
        let forwarder = Arc::new(Forwarder::new(transport));
        let router = build_router(&config.forwarder, forwarder);
        Self { router, config }
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mount_path = %self.config.forwarder.mount_path,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router<T: Transport>(config: &EndpointConfig, forwarder: Arc<Forwarder<T>>) -> Router {
    let router = Router::new()
        .route(&config.mount_path, any(forward_handler::<T>))
        .with_state(forwarder)
        .layer(DefaultBodyLimit::max(config.max_body_bytes));

    with_cors_headers(router)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

async fn forward_handler<T: Transport>(
    State(forwarder): State<Arc<Forwarder<T>>>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let inbound = InboundRequest {
        method,
        query,
        authorization: headers.get(header::AUTHORIZATION).cloned(),
        content_type: headers.get(header::CONTENT_TYPE).cloned(),
        body,
    };
    forwarder.handle(inbound).await
}
