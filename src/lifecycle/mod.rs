//! Lifecycle management.
//!
//! Startup is linear in `main`: config, logging, bind, serve. Shutdown is
//! triggered by SIGINT/SIGTERM and lets in-flight requests finish.

pub mod signals;

pub use signals::shutdown_signal;
