//! Ephemeral buffers - a bounded pool of reusable byte buffers
//!
//! This crate provides a fixed-size pool of growable byte buffers intended for
//! short-lived use, such as building request or response bodies. Buffers are
//! allocated once at pool construction and recycled between callers, avoiding
//! allocation churn in transient I/O workloads. A background monitor thread
//! watches for buffers that are held too long, and buffers that grow past
//! their requested size are reported on release.
//!
//! # Usage
//!
//! ```
//! use ephemeral_buffers::BufferPool;
//! use std::io::Write;
//!
//! let pool = BufferPool::new(10, 1000);
//!
//! let mut buf = pool.acquire("example").expect("pool is live");
//! buf.write_all(b"Hello").unwrap();
//! assert_eq!(buf.as_str(), "Hello");
//! assert_eq!(pool.available_buffers(), 9);
//!
//! buf.release();
//! assert_eq!(pool.available_buffers(), 10);
//!
//! pool.free();
//! ```
//!
//! Acquiring from an exhausted pool blocks the calling thread until another
//! caller releases a buffer; there is no timeout. [`BufferPool::free`] blocks
//! until every outstanding buffer has been released, so callers must release
//! all buffers before or during teardown.

pub mod buffer;
pub mod config;
pub mod error;
pub mod pool;
pub mod statistics;

pub use buffer::PooledBuffer;
pub use config::BufferPoolConfig;
pub use error::BufferPoolError;
pub use pool::BufferPool;
pub use statistics::PoolStatistics;
