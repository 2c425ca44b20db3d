//! Same-origin HTTPS forwarding endpoint.
//!
//! Browser clients call `GET|POST /api/proxy?base=<https url>&path=</path>`
//! and the service forwards the request to `base + path`, mirroring the
//! method, the `Authorization` header and the JSON body, then relays the
//! upstream status, content type and body.

pub mod config;
pub mod forward;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::ForwarderConfig;
pub use forward::{Forwarder, Transport};
pub use http::HttpServer;
