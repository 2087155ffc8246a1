//! Pooled buffer handle
//!
//! [`PooledBuffer`] wraps a growable byte buffer together with its pool
//! membership metadata. It dereferences to `Vec<u8>` and implements
//! [`std::io::Write`], so it can be used anywhere a plain byte buffer can.
//! Handles are not created directly; they are acquired from a
//! [`BufferPool`](crate::BufferPool) and return themselves to the pool when
//! released or dropped.

use crate::pool::PoolInner;
use std::borrow::Cow;
use std::io;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::sync::Weak;
use std::time::Instant;
use tracing::warn;

/// A reusable byte buffer leased from a [`BufferPool`](crate::BufferPool)
///
/// Writing past the pool's configured buffer size is allowed; the buffer
/// simply grows, and the growth is reported once via a warning when the
/// buffer is released. Dropping a leased handle is equivalent to calling
/// [`release`](Self::release).
pub struct PooledBuffer {
    data: Vec<u8>,
    /// Non-owning back-reference; never keeps the pool alive
    pool: Weak<PoolInner>,
    /// Occupied slot in the pool's in-use table; `Some` only while leased
    slot: Option<usize>,
    /// Caller-supplied label; non-empty only while leased
    tag: String,
    acquired_at: Instant,
    /// Largest capacity this buffer has reached, starting at the requested size
    high_water: usize,
}

impl PooledBuffer {
    /// Create a fresh handle pre-grown to `size` bytes of capacity.
    pub(crate) fn new(pool: Weak<PoolInner>, size: usize) -> Self {
        Self {
            data: Vec::with_capacity(size),
            pool,
            slot: None,
            tag: String::new(),
            acquired_at: Instant::now(),
            high_water: size,
        }
    }

    /// Stamp the lease metadata on acquisition.
    pub(crate) fn lease(&mut self, slot: usize, tag: String, at: Instant) {
        self.slot = Some(slot);
        self.tag = tag;
        self.acquired_at = at;
    }

    /// The caller-supplied label attached at acquisition; empty when unleased.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Position in the pool's in-use table, or `None` when unleased.
    pub fn slot_index(&self) -> Option<usize> {
        self.slot
    }

    /// The buffer contents written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The buffer contents as a string, replacing invalid UTF-8.
    pub fn as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }

    /// Return this buffer to its pool.
    ///
    /// Equivalent to dropping the handle; provided so call sites can make the
    /// hand-back explicit. If the buffer's capacity grew past its high-water
    /// mark a warning is emitted and the mark is raised, so releasing again at
    /// the same size does not re-warn. Content is cleared but capacity is
    /// retained for the next lease.
    pub fn release(self) {}
}

impl Deref for PooledBuffer {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl io::Write for PooledBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for PooledBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledBuffer")
            .field("len", &self.data.len())
            .field("capacity", &self.data.capacity())
            .field("slot", &self.slot)
            .field("tag", &self.tag)
            .finish()
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        // Unleased handles (still queued, or already handed back) carry no
        // bookkeeping; their memory is simply dropped with them.
        let Some(slot) = self.slot.take() else {
            return;
        };

        let Some(pool) = self.pool.upgrade() else {
            return;
        };

        let capacity = self.data.capacity();
        if capacity > self.high_water {
            warn!(
                tag = %self.tag,
                allocated = capacity,
                requested = pool.requested_size(),
                "buffer grew past its requested size"
            );
            pool.stats().record_growth_warning();
            self.high_water = capacity;
        }

        self.tag.clear();
        self.data.clear();

        let handle = PooledBuffer {
            data: mem::take(&mut self.data),
            pool: mem::replace(&mut self.pool, Weak::new()),
            slot: None,
            tag: String::new(),
            acquired_at: self.acquired_at,
            high_water: self.high_water,
        };

        pool.reclaim(slot, handle);
    }
}
