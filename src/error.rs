//! Error types for buffer pool operations
//!
//! Per the pool's propagation policy, errors are never returned from acquire
//! or release paths; this type exists for configuration validation and is
//! otherwise reported through the log sink.

use thiserror::Error;

/// Error type for buffer pool configuration and setup
#[derive(Debug, Error)]
pub enum BufferPoolError {
    /// Configuration validation failed
    #[error("Configuration error: {field} - {reason}")]
    Config { field: String, reason: String },
}

impl BufferPoolError {
    /// Create a configuration error for a specific field
    pub fn config_error(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
