//! Configuration for the buffer pool
//!
//! Provides the pool configuration with parameter validation and a builder
//! pattern. The monitor timings default to the values used by the pool's
//! staleness reporting (100 ms hold threshold, 1 s scan interval) and are
//! configurable mainly so tests can exercise the monitor quickly.

use crate::error::BufferPoolError;
use std::time::Duration;

/// Configuration for a [`BufferPool`](crate::BufferPool)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferPoolConfig {
    /// Number of buffers under management; fixed for the pool's lifetime
    pub buffer_count: usize,
    /// Capacity in bytes each buffer is pre-grown to
    pub buffer_size: usize,
    /// How long a buffer may be held before the monitor warns about it
    pub hold_warning_threshold: Duration,
    /// How often the monitor scans leased buffers
    pub monitor_interval: Duration,
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self {
            buffer_count: 16,
            buffer_size: 8192,
            hold_warning_threshold: Duration::from_millis(100),
            monitor_interval: Duration::from_secs(1),
        }
    }
}

impl BufferPoolConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of buffers the pool manages
    pub fn buffer_count(mut self, count: usize) -> Self {
        self.buffer_count = count;
        self
    }

    /// Set the capacity each buffer is pre-grown to
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Set the hold duration past which the monitor warns about a lease
    pub fn hold_warning_threshold(mut self, threshold: Duration) -> Self {
        self.hold_warning_threshold = threshold;
        self
    }

    /// Set the interval between monitor scans
    pub fn monitor_interval(mut self, interval: Duration) -> Self {
        self.monitor_interval = interval;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), BufferPoolError> {
        if self.buffer_count == 0 {
            return Err(BufferPoolError::config_error(
                "buffer_count",
                "must be greater than 0",
            ));
        }

        if self.buffer_size == 0 {
            return Err(BufferPoolError::config_error(
                "buffer_size",
                "must be greater than 0",
            ));
        }

        if self.monitor_interval.is_zero() {
            return Err(BufferPoolError::config_error(
                "monitor_interval",
                "must be non-zero",
            ));
        }

        Ok(())
    }
}
