//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. Every problem is
//! reported, not just the first one found.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ForwarderConfig;

/// A single semantic problem in a config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed config, collecting all errors.
pub fn validate_config(config: &ForwarderConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address",
            message: format!("'{}' is not a socket address", config.listener.bind_address),
        });
    }

    let mount = &config.forwarder.mount_path;
    if !mount.starts_with('/') {
        errors.push(ValidationError {
            field: "forwarder.mount_path",
            message: format!("'{}' must start with /", mount),
        });
    } else if mount.contains(['{', '}', '*', ':']) {
        errors.push(ValidationError {
            field: "forwarder.mount_path",
            message: format!("'{}' must be a literal path", mount),
        });
    }

    if config.forwarder.max_body_bytes == 0 {
        errors.push(ValidationError {
            field: "forwarder.max_body_bytes",
            message: "must be greater than zero".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
