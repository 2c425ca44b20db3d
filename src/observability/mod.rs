//! Observability subsystem.
//!
//! Structured logs via `tracing`. Each HTTP request gets a span from
//! `TraceLayer` and an `x-request-id` that is echoed back to the caller.

pub mod logging;
