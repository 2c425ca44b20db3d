//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, body limit)
//!     → forward::Forwarder (validate, dispatch, relay)
//!     → cors.rs (Access-Control-Allow-* on every response)
//!     → Send to client
//! ```

pub mod cors;
pub mod server;

pub use server::{build_router, HttpServer};
