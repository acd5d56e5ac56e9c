//! Size-bucketed free-list allocator for tensor buffers.
//!
//! Buffers are grouped by power-of-two capacity class. A request for `n`
//! elements is served from bucket `k = bit_len(n)` and, on a miss, allocates a
//! buffer of capacity `2^k`, so the wasted capacity is bounded by the request
//! size and the number of buckets by the pointer width.
//!
//! Each bucket has its own lock; there is no pool-wide lock, so concurrent
//! `get`/`put` calls on different size classes never contend.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::dense::Dense;
use crate::element::Element;
use crate::shape::Shape;

const NUM_BUCKETS: usize = usize::BITS as usize + 1;

/// Bucket index for a request of `size` elements: the bit length of `size`.
pub fn bucket_for(size: usize) -> usize {
    (usize::BITS - size.leading_zeros()) as usize
}

/// Capacity allocated for a request of `size` elements.
///
/// Always in `(size, 2 * size]`, or exactly 0 for an empty request.
pub fn capacity_for(size: usize) -> usize {
    if size == 0 {
        return 0;
    }
    1usize
        .checked_shl(bucket_for(size) as u32)
        .unwrap_or_else(|| panic!("pool: request of {size} elements overflows capacity classes"))
}

/// Tuning knobs for a [`Pool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Maximum number of idle buffers kept per bucket. Buffers returned
    /// beyond this limit are dropped.
    pub max_free_per_bucket: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_free_per_bucket: usize::MAX,
        }
    }
}

impl PoolConfig {
    pub fn max_free_per_bucket(mut self, n: usize) -> Self {
        self.max_free_per_bucket = n;
        self
    }
}

/// Counters describing pool traffic since creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Buffers allocated because the bucket was empty.
    pub allocated: usize,
    /// Requests served from a cached buffer.
    pub reused: usize,
    /// Buffers accepted back by `put`.
    pub returned: usize,
    /// Buffers dropped by `put` because their bucket was full.
    pub discarded: usize,
}

/// A pool of reusable tensor buffers for one element type.
///
/// `Pool` is an ordinary value: create one per subsystem, or use the
/// process-wide instance from [`global`].
pub struct Pool<T: Element> {
    buckets: Box<[Mutex<Vec<Vec<T>>>]>,
    config: PoolConfig,
    allocated: AtomicUsize,
    reused: AtomicUsize,
    returned: AtomicUsize,
    discarded: AtomicUsize,
}

impl<T: Element> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element> std::fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("dtype", &T::DTYPE)
            .field("config", &self.config())
            .field("stats", &self.stats())
            .finish()
    }
}

impl<T: Element> Pool<T> {
    /// Create an empty pool with the default configuration.
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Create an empty pool with the given configuration.
    pub fn with_config(config: PoolConfig) -> Self {
        let buckets = (0..NUM_BUCKETS).map(|_| Mutex::new(Vec::new())).collect();
        Self {
            buckets,
            config,
            allocated: AtomicUsize::new(0),
            reused: AtomicUsize::new(0),
            returned: AtomicUsize::new(0),
            discarded: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> PoolConfig {
        self.config
    }

    /// Check out a `rows × cols` tensor. Contents are unspecified.
    ///
    /// # Panics
    /// Panics if `rows * cols` overflows.
    pub fn get(&self, rows: usize, cols: usize) -> Dense<T> {
        let size = Shape::new(rows, cols).size();
        let mut buf = self.take(size);
        if buf.len() >= size {
            buf.truncate(size);
        } else {
            buf.resize(size, T::zero());
        }
        Dense::from_pool_parts(rows, cols, buf)
    }

    /// Check out a `rows × cols` tensor with every element set to zero.
    ///
    /// # Panics
    /// Panics if `rows * cols` overflows.
    pub fn get_empty(&self, rows: usize, cols: usize) -> Dense<T> {
        let size = Shape::new(rows, cols).size();
        let mut buf = self.take(size);
        buf.clear();
        buf.resize(size, T::zero());
        Dense::from_pool_parts(rows, cols, buf)
    }

    /// Return a tensor's buffer to the pool.
    ///
    /// The gradient slot, if any, is dropped with the tensor.
    ///
    /// # Panics
    /// Panics if the tensor was not obtained from a pool.
    pub fn put(&self, tensor: Dense<T>) {
        assert!(
            tensor.is_from_pool(),
            "pool: put of a tensor that was not obtained from a pool"
        );
        self.release(tensor.into_vec());
    }

    /// Number of idle buffers currently cached across all buckets.
    pub fn idle_buffers(&self) -> usize {
        self.buckets.iter().map(|b| b.lock().len()).sum()
    }

    /// Snapshot of the traffic counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            allocated: self.allocated.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            returned: self.returned.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }

    fn take(&self, size: usize) -> Vec<T> {
        if size == 0 {
            return Vec::new();
        }
        let bucket = bucket_for(size);
        if let Some(buf) = self.buckets[bucket].lock().pop() {
            self.reused.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(bucket, size, capacity = buf.capacity(), "pool hit");
            return buf;
        }
        let capacity = capacity_for(size);
        self.allocated.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(bucket, size, capacity, "pool miss");
        Vec::with_capacity(capacity)
    }

    fn release(&self, buf: Vec<T>) {
        let capacity = buf.capacity();
        if capacity == 0 {
            return;
        }
        // A buffer with capacity >= 2^k serves every request whose bit length is k.
        let bucket = bucket_for(capacity) - 1;
        let mut free = self.buckets[bucket].lock();
        if free.len() >= self.config.max_free_per_bucket {
            self.discarded.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(bucket, capacity, "pool bucket full, dropping buffer");
            return;
        }
        free.push(buf);
        self.returned.fetch_add(1, Ordering::Relaxed);
    }
}

/// The process-wide pool for element type `T`.
///
/// Constructors and allocating operations draw their output buffers from it.
/// Created with [`PoolConfig::default`] on first use unless
/// [`init_global`] ran earlier.
pub fn global<T: Element>() -> &'static Pool<T> {
    T::global_cell().get_or_init(Pool::new)
}

/// Install the process-wide pool for `T` with `config`.
///
/// Must run before the first tensor of type `T` is allocated. Returns `false`
/// and leaves the existing pool untouched if it is already initialised.
pub fn init_global<T: Element>(config: PoolConfig) -> bool {
    let installed = T::global_cell().set(Pool::with_config(config)).is_ok();
    if installed {
        tracing::debug!(dtype = %T::DTYPE, ?config, "global pool configured");
    }
    installed
}
