//! Statistics for buffer pool operations

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters tracking pool activity
///
/// All counters are monotonic and updated with relaxed atomics; snapshots are
/// advisory and may lag concurrent activity. Shared via `Arc` so statistics
/// remain readable after the pool itself has been freed.
#[derive(Debug, Default)]
pub struct PoolStatistics {
    /// Number of successful buffer acquisitions
    acquires: AtomicU64,
    /// Number of buffers released back to the pool
    releases: AtomicU64,
    /// Number of over-capacity warnings emitted on release
    growth_warnings: AtomicU64,
    /// Number of held-too-long warnings emitted by the monitor
    stale_warnings: AtomicU64,
}

impl PoolStatistics {
    /// Record a successful acquisition
    pub(crate) fn record_acquire(&self) {
        self.acquires.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a buffer returned to the pool
    pub(crate) fn record_release(&self) {
        self.releases.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an over-capacity growth warning
    pub(crate) fn record_growth_warning(&self) {
        self.growth_warnings.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a held-too-long warning
    pub(crate) fn record_stale_warning(&self) {
        self.stale_warnings.fetch_add(1, Ordering::Relaxed);
    }

    /// Total successful acquisitions
    pub fn acquires(&self) -> u64 {
        self.acquires.load(Ordering::Relaxed)
    }

    /// Total buffers released back to the pool
    pub fn releases(&self) -> u64 {
        self.releases.load(Ordering::Relaxed)
    }

    /// Total over-capacity warnings emitted on release
    pub fn growth_warnings(&self) -> u64 {
        self.growth_warnings.load(Ordering::Relaxed)
    }

    /// Total held-too-long warnings emitted by the monitor
    pub fn stale_warnings(&self) -> u64 {
        self.stale_warnings.load(Ordering::Relaxed)
    }

    /// Number of buffers currently leased according to the counters
    pub fn outstanding(&self) -> u64 {
        self.acquires().saturating_sub(self.releases())
    }
}
