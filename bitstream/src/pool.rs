//! Reuse pool for [`BitStream`] buffers.
//!
//! The pool has two tiers. The primary queue holds up to
//! [`PoolConfig::max_pooled`] ready buffers. Buffers released while it is full
//! are demoted to a bounded overflow tier that absorbs bursts; it is scavenged
//! when the primary queue runs dry and can be dropped wholesale with
//! [`BufferPool::reclaim`]. Anything past the overflow bound is freed.
//!
//! Ownership moves into the pool on release, so a buffer cannot be released
//! twice or used after release.

use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::stream::BitStream;

/// Sizing for a [`BufferPool`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolConfig {
    /// Maximum number of buffers kept in the primary queue.
    pub max_pooled: usize,
    /// Creation count at which the pool warns about a probable leak.
    pub soft_max_created: usize,
    /// Maximum number of buffers kept in the overflow tier.
    pub max_overflow: usize,
    /// Capacity in bytes of freshly allocated buffers.
    pub initial_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_pooled: 768,
            soft_max_created: 1024,
            max_overflow: 256,
            initial_capacity: 1024,
        }
    }
}

impl PoolConfig {
    /// Creates a configuration suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_pooled: 4,
            soft_max_created: 8,
            max_overflow: 2,
            initial_capacity: 32,
        }
    }
}

/// Point-in-time counters for a [`BufferPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Buffers ready in the primary queue.
    pub pooled: usize,
    /// Buffers parked in the overflow tier.
    pub overflow: usize,
    /// Buffers allocated by this pool so far.
    pub created: usize,
}

#[derive(Debug, Default)]
struct PoolState {
    ready: VecDeque<BitStream>,
    overflow: VecDeque<BitStream>,
    created: usize,
}

/// A thread-safe pool of reusable [`BitStream`] buffers.
#[derive(Debug, Default)]
pub struct BufferPool {
    config: PoolConfig,
    state: Mutex<PoolState>,
}

impl BufferPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            state: Mutex::new(PoolState::default()),
        }
    }

    /// Returns the pool configuration.
    #[must_use]
    pub const fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Takes a reset buffer from the pool, allocating one if none is ready.
    ///
    /// The buffer goes back to the pool when the returned guard is dropped.
    pub fn acquire(&self) -> PooledStream<'_> {
        let stream = self.take();
        PooledStream {
            pool: self,
            stream,
            detached: false,
        }
    }

    /// Returns a buffer to the pool.
    pub fn release(&self, stream: BitStream) {
        let mut state = self.lock();
        if state.ready.len() < self.config.max_pooled {
            state.ready.push_back(stream);
        } else if state.overflow.len() < self.config.max_overflow {
            debug!(
                overflow = state.overflow.len() + 1,
                "putting buffer into overflow pool, missing release in a hot loop?"
            );
            state.overflow.push_back(stream);
        } else {
            debug!(
                capacity = stream.capacity(),
                "overflow pool full, freeing buffer"
            );
        }
    }

    /// Drops every buffer parked in the overflow tier.
    ///
    /// Returns the number of buffers freed.
    pub fn reclaim(&self) -> usize {
        let mut state = self.lock();
        let freed = state.overflow.len();
        state.overflow.clear();
        state.overflow.shrink_to_fit();
        freed
    }

    /// Returns the current pool counters.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let state = self.lock();
        PoolStats {
            pooled: state.ready.len(),
            overflow: state.overflow.len(),
            created: state.created,
        }
    }

    fn take(&self) -> BitStream {
        let mut state = self.lock();
        if let Some(mut stream) = state.ready.pop_front() {
            stream.reset();
            return stream;
        }
        if let Some(mut stream) = state.overflow.pop_front() {
            debug!(
                remaining = state.overflow.len(),
                "retrieving buffer from overflow pool, recent burst?"
            );
            stream.reset();
            return stream;
        }

        state.created = state.created.saturating_add(1);
        if state.created == self.config.soft_max_created {
            warn!(
                created = state.created,
                "buffer pool soft limit reached, are buffers being released?"
            );
        }
        BitStream::with_capacity(self.config.initial_capacity)
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        // Pool state stays consistent across a panicking holder: every
        // mutation is a single push or pop.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A [`BitStream`] on loan from a [`BufferPool`].
///
/// Dereferences to the stream and returns it to the pool on drop.
#[derive(Debug)]
pub struct PooledStream<'a> {
    pool: &'a BufferPool,
    stream: BitStream,
    detached: bool,
}

impl PooledStream<'_> {
    /// Takes the stream out of the pool's custody.
    ///
    /// The pool will not see this buffer again.
    #[must_use]
    pub fn detach(mut self) -> BitStream {
        self.detached = true;
        std::mem::take(&mut self.stream)
    }

    /// Returns the stream to the pool now.
    pub fn release(self) {
        drop(self);
    }
}

impl Deref for PooledStream<'_> {
    type Target = BitStream;

    fn deref(&self) -> &BitStream {
        &self.stream
    }
}

impl DerefMut for PooledStream<'_> {
    fn deref_mut(&mut self) -> &mut BitStream {
        &mut self.stream
    }
}

impl Drop for PooledStream<'_> {
    fn drop(&mut self) {
        if !self.detached {
            self.pool.release(std::mem::take(&mut self.stream));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_reasonable() {
        let config = PoolConfig::default();
        assert!(config.max_pooled < config.soft_max_created);
        assert!(config.initial_capacity > 0);
    }

    #[test]
    fn testing_config_smaller() {
        let testing = PoolConfig::for_testing();
        let default = PoolConfig::default();
        assert!(testing.max_pooled < default.max_pooled);
        assert!(testing.max_overflow < default.max_overflow);
    }

    #[test]
    fn acquire_allocates_when_empty() {
        let pool = BufferPool::new(PoolConfig::for_testing());
        let stream = pool.acquire();
        assert!(stream.is_empty());
        assert_eq!(stream.capacity(), 32);
        assert_eq!(pool.stats().created, 1);
    }

    #[test]
    fn released_buffer_is_reused_and_reset() {
        let pool = BufferPool::new(PoolConfig::for_testing());
        {
            let mut stream = pool.acquire();
            stream.write_bytes(&[1, 2, 3]);
        }
        assert_eq!(pool.stats().pooled, 1);

        let stream = pool.acquire();
        assert!(stream.is_empty());
        assert_eq!(stream.position(), 0);
        assert_eq!(pool.stats().created, 1, "buffer should be recycled");
    }

    #[test]
    fn detach_keeps_buffer_out_of_pool() {
        let pool = BufferPool::new(PoolConfig::for_testing());
        let mut stream = pool.acquire();
        stream.write_byte(9);
        let owned = stream.detach();
        assert_eq!(owned.as_slice(), &[9]);
        assert_eq!(pool.stats().pooled, 0);
    }

    #[test]
    fn primary_queue_never_exceeds_max() {
        let pool = BufferPool::new(PoolConfig::for_testing());
        let streams: Vec<_> = (0..10).map(|_| pool.acquire()).collect();
        drop(streams);

        let stats = pool.stats();
        assert_eq!(stats.pooled, 4);
        assert_eq!(stats.overflow, 2);
        assert_eq!(stats.created, 10);
    }

    #[test]
    fn overflow_is_scavenged_after_primary() {
        let pool = BufferPool::new(PoolConfig::for_testing());
        let streams: Vec<_> = (0..6).map(|_| pool.acquire()).collect();
        drop(streams);

        let held: Vec<_> = (0..6).map(|_| pool.acquire()).collect();
        assert_eq!(pool.stats().created, 6, "no new allocations expected");
        assert_eq!(pool.stats().pooled, 0);
        assert_eq!(pool.stats().overflow, 0);
        drop(held);
    }

    #[test]
    fn reclaim_drops_overflow_tier() {
        let pool = BufferPool::new(PoolConfig::for_testing());
        let streams: Vec<_> = (0..6).map(|_| pool.acquire()).collect();
        drop(streams);

        assert_eq!(pool.reclaim(), 2);
        assert_eq!(pool.stats().overflow, 0);
        assert_eq!(pool.stats().pooled, 4);
    }

    #[test]
    fn pool_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BufferPool>();
    }
}
