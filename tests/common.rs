//! Common test utilities for integration tests

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize a debug-level tracing subscriber once per test binary so the
/// pool's warnings and monitor output are visible under `--nocapture`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Test constants for consistent pool configuration across integration tests
pub mod test_constants {
    #[allow(dead_code)]
    pub const DEFAULT_POOL_COUNT: usize = 10;
    #[allow(dead_code)]
    pub const DEFAULT_BUFFER_SIZE: usize = 1000;
}
