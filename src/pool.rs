//! Bounded pool of reusable byte buffers
//!
//! The pool owns a fixed set of [`PooledBuffer`] handles. Available handles
//! sit in a bounded channel sized to the pool; leased handles are tracked in
//! a slot table guarded by a single mutex. A background monitor thread scans
//! the slot table and warns about buffers held past the configured threshold.
//!
//! At any instant, handles in the channel plus occupied slots equal the pool
//! size, and no handle is in both places at once.

use crate::buffer::PooledBuffer;
use crate::config::BufferPoolConfig;
use crate::statistics::PoolStatistics;
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, error, warn};

/// Bookkeeping for one leased buffer, kept in the pool's slot table.
struct LeaseRecord {
    tag: String,
    acquired_at: Instant,
}

/// Shared pool state; buffers hold a `Weak` reference to this.
pub(crate) struct PoolInner {
    config: BufferPoolConfig,
    /// Number of live buffers; zeroed as the teardown signal. An inert pool
    /// (failed validation) starts at zero.
    live_count: AtomicUsize,
    available_tx: Sender<PooledBuffer>,
    available_rx: Receiver<PooledBuffer>,
    /// Slot table of current leases; `None` marks a free slot. Lowest free
    /// index wins on acquisition.
    in_use: Mutex<Vec<Option<LeaseRecord>>>,
    /// Wakes the monitor early so `free()` does not wait out a full interval.
    stopping: Mutex<bool>,
    stop_signal: Condvar,
    stats: Arc<PoolStatistics>,
}

impl PoolInner {
    pub(crate) fn requested_size(&self) -> usize {
        self.config.buffer_size
    }

    pub(crate) fn stats(&self) -> &PoolStatistics {
        &self.stats
    }

    /// Return a released handle to the pool: clear its slot, then enqueue it.
    pub(crate) fn reclaim(&self, slot: usize, handle: PooledBuffer) {
        {
            let mut in_use = self.in_use.lock();
            if let Some(entry) = in_use.get_mut(slot) {
                *entry = None;
            }
        }

        self.stats.record_release();

        // Cannot block: each handle is either queued or leased, so the
        // bounded channel never receives more than its capacity.
        let _ = self.available_tx.send(handle);
    }
}

/// A bounded pool of reusable byte buffers
///
/// Create with [`BufferPool::new`] or [`BufferPool::with_config`] and tear
/// down with [`BufferPool::free`]. Invalid construction arguments yield an
/// inert pool: [`acquire`](BufferPool::acquire) returns `None` immediately,
/// [`available_buffers`](BufferPool::available_buffers) returns zero and
/// [`free`](BufferPool::free) is a no-op.
pub struct BufferPool {
    inner: Arc<PoolInner>,
    monitor: Mutex<Option<JoinHandle<()>>>,
}

impl BufferPool {
    /// Create a pool of `count` buffers, each pre-grown to `size` bytes.
    ///
    /// Writing more than `size` bytes into a buffer is allowed, but a warning
    /// is emitted when the grown buffer is released. Invalid arguments
    /// (`count == 0` or `size == 0`) are logged as an error and produce an
    /// inert pool rather than a partial one.
    pub fn new(count: usize, size: usize) -> Self {
        Self::with_config(
            BufferPoolConfig::new()
                .buffer_count(count)
                .buffer_size(size),
        )
    }

    /// Create a pool from a full configuration.
    pub fn with_config(config: BufferPoolConfig) -> Self {
        if let Err(err) = config.validate() {
            error!(%err, "invalid buffer pool configuration");
            return Self::inert(config);
        }

        let count = config.buffer_count;
        let size = config.buffer_size;
        let (available_tx, available_rx) = bounded(count);

        let inner = Arc::new(PoolInner {
            config,
            live_count: AtomicUsize::new(count),
            available_tx,
            available_rx,
            in_use: Mutex::new(std::iter::repeat_with(|| None).take(count).collect()),
            stopping: Mutex::new(false),
            stop_signal: Condvar::new(),
            stats: Arc::new(PoolStatistics::default()),
        });

        for _ in 0..count {
            let handle = PooledBuffer::new(Arc::downgrade(&inner), size);
            let _ = inner.available_tx.send(handle);
        }

        let monitor = spawn_monitor(Arc::clone(&inner));

        Self {
            inner,
            monitor: Mutex::new(Some(monitor)),
        }
    }

    /// A pool that satisfies the API surface but holds no buffers.
    fn inert(config: BufferPoolConfig) -> Self {
        let (available_tx, available_rx) = bounded(0);
        Self {
            inner: Arc::new(PoolInner {
                config,
                live_count: AtomicUsize::new(0),
                available_tx,
                available_rx,
                in_use: Mutex::new(Vec::new()),
                stopping: Mutex::new(false),
                stop_signal: Condvar::new(),
                stats: Arc::new(PoolStatistics::default()),
            }),
            monitor: Mutex::new(None),
        }
    }

    /// Acquire a buffer, blocking until one is available.
    ///
    /// The `tag` labels the lease in monitor and growth warnings. There is no
    /// timeout: a caller acquiring from an exhausted pool waits until another
    /// caller releases. Returns `None` immediately, without blocking, if the
    /// pool is inert or has been freed.
    pub fn acquire(&self, tag: impl Into<String>) -> Option<PooledBuffer> {
        if self.inner.live_count.load(Ordering::Acquire) == 0 {
            return None;
        }

        let mut handle = self.inner.available_rx.recv().ok()?;

        let tag = tag.into();
        let now = Instant::now();

        let slot = {
            let mut in_use = self.inner.in_use.lock();
            let slot = in_use.iter().position(Option::is_none);
            if let Some(slot) = slot {
                in_use[slot] = Some(LeaseRecord {
                    tag: tag.clone(),
                    acquired_at: now,
                });
            }
            slot
        };

        debug_assert!(
            slot.is_some(),
            "a dequeued handle always has a free slot in the lease table"
        );

        if let Some(slot) = slot {
            handle.lease(slot, tag, now);
        }

        self.inner.stats.record_acquire();
        Some(handle)
    }

    /// Number of buffers not currently leased.
    ///
    /// A snapshot, not a guarantee against concurrent change. Returns zero
    /// for an inert or freed pool.
    pub fn available_buffers(&self) -> usize {
        if self.inner.live_count.load(Ordering::Acquire) == 0 {
            return 0;
        }

        self.inner
            .in_use
            .lock()
            .iter()
            .filter(|slot| slot.is_none())
            .count()
    }

    /// Counters describing the pool's activity so far.
    ///
    /// The returned handle stays valid after [`free`](Self::free).
    pub fn statistics(&self) -> Arc<PoolStatistics> {
        Arc::clone(&self.inner.stats)
    }

    /// The configuration this pool was built from.
    pub fn config(&self) -> &BufferPoolConfig {
        &self.inner.config
    }

    /// Tear down the pool, waiting for every leased buffer to be released.
    ///
    /// Stops the monitor thread and drains all buffers from the pool,
    /// releasing their memory. Blocks until every outstanding lease has been
    /// released; callers that fail to release all buffers before or during
    /// this call deadlock it. A no-op on an inert or already-freed pool.
    pub fn free(&self) {
        let count = self.inner.live_count.swap(0, Ordering::AcqRel);
        if count == 0 {
            return;
        }

        {
            let mut stopping = self.inner.stopping.lock();
            *stopping = true;
            self.inner.stop_signal.notify_all();
        }

        // Blocks until all leased handles have been returned; drained
        // handles are unleased, so dropping them here releases their memory.
        for _ in 0..count {
            let _ = self.inner.available_rx.recv();
        }

        self.inner.in_use.lock().clear();

        if let Some(monitor) = self.monitor.lock().take() {
            let _ = monitor.join();
        }
    }
}

/// Start the per-pool monitor that reports buffers held too long.
///
/// The loop is purely observational: it never reclaims a lease, only warns.
/// It exits once the pool's live count drops to zero.
fn spawn_monitor(inner: Arc<PoolInner>) -> JoinHandle<()> {
    let threshold = inner.config.hold_warning_threshold;
    let interval = inner.config.monitor_interval;

    thread::spawn(move || loop {
        if inner.live_count.load(Ordering::Acquire) == 0 {
            debug!("buffer pool monitor exiting");
            return;
        }

        {
            let in_use = inner.in_use.lock();
            let now = Instant::now();
            for lease in in_use.iter().flatten() {
                let held = now.saturating_duration_since(lease.acquired_at);
                if held > threshold {
                    warn!(
                        tag = %lease.tag,
                        held_ms = held.as_millis() as u64,
                        "buffer held past the staleness threshold"
                    );
                    inner.stats.record_stale_warning();
                }
            }
        }

        let mut stopping = inner.stopping.lock();
        if !*stopping {
            inner.stop_signal.wait_for(&mut stopping, interval);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_acquire_release_updates_availability() {
        let pool = BufferPool::new(10, 1000);
        assert_eq!(pool.available_buffers(), 10);

        let buf = pool.acquire("basic").unwrap();
        assert_eq!(pool.available_buffers(), 9);

        buf.release();
        assert_eq!(pool.available_buffers(), 10);

        pool.free();
    }

    #[test]
    fn test_partial_acquisition_counts() {
        let n = 8;
        let pool = BufferPool::new(n, 256);

        let mut held = Vec::new();
        for k in 1..=5 {
            held.push(pool.acquire("partial").unwrap());
            assert_eq!(pool.available_buffers(), n - k);
        }

        for buf in held.drain(..) {
            buf.release();
        }
        assert_eq!(pool.available_buffers(), n);

        pool.free();
    }

    #[test]
    fn test_lowest_free_slot_wins() {
        let pool = BufferPool::new(3, 64);

        let b0 = pool.acquire("a").unwrap();
        let b1 = pool.acquire("b").unwrap();
        let b2 = pool.acquire("c").unwrap();
        assert_eq!(b0.slot_index(), Some(0));
        assert_eq!(b1.slot_index(), Some(1));
        assert_eq!(b2.slot_index(), Some(2));

        // Releasing the middle lease frees its slot for the next acquisition.
        b1.release();
        let b3 = pool.acquire("d").unwrap();
        assert_eq!(b3.slot_index(), Some(1));

        b0.release();
        b2.release();
        b3.release();
        pool.free();
    }

    #[test]
    fn test_no_duplicate_slots_among_leases() {
        let pool = BufferPool::new(5, 64);

        let leases: Vec<_> = (0..5).map(|_| pool.acquire("dup").unwrap()).collect();
        let mut slots: Vec<_> = leases.iter().filter_map(|b| b.slot_index()).collect();
        slots.sort_unstable();
        slots.dedup();
        assert_eq!(slots.len(), 5);

        for buf in leases {
            buf.release();
        }
        pool.free();
    }

    #[test]
    fn test_invalid_pool_is_inert() {
        let pool = BufferPool::new(0, 1000);
        assert!(pool.acquire("invalid").is_none());
        assert_eq!(pool.available_buffers(), 0);
        pool.free();
        pool.free();

        let pool = BufferPool::new(10, 0);
        assert!(pool.acquire("invalid").is_none());
        assert_eq!(pool.available_buffers(), 0);
        pool.free();
    }

    #[test]
    fn test_acquire_after_free_returns_none() {
        let pool = BufferPool::new(2, 64);
        pool.free();
        assert!(pool.acquire("late").is_none());
        assert_eq!(pool.available_buffers(), 0);
    }

    #[test]
    fn test_statistics_track_activity() {
        let pool = BufferPool::new(4, 64);
        let stats = pool.statistics();

        let a = pool.acquire("stats").unwrap();
        let b = pool.acquire("stats").unwrap();
        assert_eq!(stats.acquires(), 2);
        assert_eq!(stats.outstanding(), 2);

        a.release();
        b.release();
        assert_eq!(stats.releases(), 2);
        assert_eq!(stats.outstanding(), 0);

        pool.free();
        // Statistics outlive the pool.
        assert_eq!(stats.acquires(), 2);
    }

    #[test]
    fn test_growth_warning_fires_once_per_new_high_water() {
        let pool = BufferPool::new(1, 16);
        let stats = pool.statistics();

        let mut buf = pool.acquire("grow").unwrap();
        buf.extend_from_slice(&[0u8; 64]);
        buf.release();
        assert_eq!(stats.growth_warnings(), 1);

        // Same grown capacity again: the raised high-water mark suppresses it.
        let mut buf = pool.acquire("grow").unwrap();
        buf.extend_from_slice(&[0u8; 64]);
        buf.release();
        assert_eq!(stats.growth_warnings(), 1);

        pool.free();
    }

    #[test]
    fn test_monitor_warns_on_stale_lease() {
        let config = BufferPoolConfig::new()
            .buffer_count(2)
            .buffer_size(64)
            .hold_warning_threshold(Duration::from_millis(10))
            .monitor_interval(Duration::from_millis(20));
        let pool = BufferPool::with_config(config);
        let stats = pool.statistics();

        let buf = pool.acquire("slow-consumer").unwrap();
        thread::sleep(Duration::from_millis(100));
        assert!(stats.stale_warnings() >= 1);

        buf.release();
        pool.free();

        // The monitor has been joined; the counter no longer moves.
        let after_free = stats.stale_warnings();
        thread::sleep(Duration::from_millis(60));
        assert_eq!(stats.stale_warnings(), after_free);
    }

    #[test]
    fn test_concurrent_acquire_release() {
        let pool = Arc::new(BufferPool::new(4, 128));
        let mut handles = Vec::new();

        for i in 0..16 {
            let pool = Arc::clone(&pool);
            handles.push(thread::spawn(move || {
                let mut buf = pool.acquire(format!("worker-{i}")).unwrap();
                buf.extend_from_slice(b"payload");
                thread::sleep(Duration::from_millis(2));
                buf.release();
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(pool.available_buffers(), 4);
        assert_eq!(pool.statistics().outstanding(), 0);
        pool.free();
    }
}
