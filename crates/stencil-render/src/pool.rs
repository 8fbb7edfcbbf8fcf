//! Reusable scratch buffers for rendering.
//!
//! Templates render into a buffer first so that nothing reaches the client
//! when execution fails halfway. [`BufferPool`] keeps a bounded free list of
//! those buffers so steady-state rendering does not allocate.
//!
//! Buffers are handed out as [`PooledBuffer`] guards. Dropping a guard clears
//! the buffer and returns it to the pool, on success and error paths alike.
//! An empty pool allocates a fresh buffer instead of waiting, and a full pool
//! drops returned buffers instead of growing.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};

/// Default number of idle buffers kept by a pool.
pub const DEFAULT_MAX_IDLE: usize = 64;

/// Buffers that grew past this capacity are dropped rather than kept.
pub const DEFAULT_MAX_RETAINED_CAPACITY: usize = 1024 * 1024;

/// A bounded, thread-safe pool of byte buffers.
#[derive(Debug)]
pub struct BufferPool {
    idle: Mutex<Vec<Vec<u8>>>,
    max_idle: usize,
    max_retained_capacity: usize,
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferPool {
    /// Creates a pool with the default limits.
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_IDLE, DEFAULT_MAX_RETAINED_CAPACITY)
    }

    /// Creates a pool keeping at most `max_idle` buffers, each at most
    /// `max_retained_capacity` bytes of capacity.
    pub fn with_limits(max_idle: usize, max_retained_capacity: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            max_idle,
            max_retained_capacity,
        }
    }

    /// Takes a buffer from the pool, allocating one if none is idle.
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let buf = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .unwrap_or_default();
        PooledBuffer {
            buf: Some(buf),
            pool: self,
        }
    }

    /// Returns the number of idle buffers.
    pub fn idle(&self) -> usize {
        self.idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn release(&self, mut buf: Vec<u8>) {
        if buf.capacity() > self.max_retained_capacity {
            return;
        }
        buf.clear();
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() < self.max_idle {
            idle.push(buf);
        }
    }
}

/// A buffer borrowed from a [`BufferPool`]; returned on drop.
#[derive(Debug)]
pub struct PooledBuffer<'a> {
    buf: Option<Vec<u8>>,
    pool: &'a BufferPool,
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        // Only `Drop` takes the buffer out.
        self.buf.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        self.buf.as_mut().unwrap_or_else(|| unreachable!())
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.pool.release(buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_buffer_is_cleared_on_return() {
        let pool = BufferPool::new();
        {
            let mut buf = pool.acquire();
            buf.extend_from_slice(b"leftover");
        }
        let buf = pool.acquire();
        assert!(buf.is_empty());
        assert!(buf.capacity() >= 8);
    }

    #[test]
    fn test_sequential_use_reuses_one_buffer() {
        let pool = BufferPool::new();
        for i in 0..100 {
            let mut buf = pool.acquire();
            buf.extend_from_slice(format!("render {}", i).as_bytes());
        }
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_exhausted_pool_allocates() {
        let pool = BufferPool::with_limits(2, 1024);
        let a = pool.acquire();
        let b = pool.acquire();
        let c = pool.acquire();
        drop((a, b, c));
        assert_eq!(pool.idle(), 2);
    }

    #[test]
    fn test_oversized_buffers_are_dropped() {
        let pool = BufferPool::with_limits(4, 16);
        {
            let mut buf = pool.acquire();
            buf.extend_from_slice(&[0u8; 64]);
        }
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_concurrent_acquire_release() {
        let pool = Arc::new(BufferPool::with_limits(8, 1024));
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    for _ in 0..50 {
                        let mut buf = pool.acquire();
                        assert!(buf.is_empty());
                        buf.push(i as u8);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(pool.idle() <= 8);
    }
}
