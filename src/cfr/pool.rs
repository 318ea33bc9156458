//! Reusable `f32` scratch buffers for per-node temporaries.
//!
//! A traversal needs one short-lived vector per visited player node. Over
//! millions of iterations those allocations dominate, so buffers are kept on
//! a free list bucketed by capacity and handed back out.
//!
//! Two variants exist:
//! - [`LocalSlicePool`]: single-threaded, no locking.
//! - [`SyncSlicePool`]: free list behind a `Mutex`, shareable between workers.
//!
//! Buffers are acquired through [`SlicePool::alloc`], which returns a
//! [`Scratch`] guard. The guard returns its buffer on drop, so every exit
//! path (including `?` early returns) releases it.

use std::cell::RefCell;
use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

use rustc_hash::FxHashMap;

type FreeList = FxHashMap<usize, Vec<Vec<f32>>>;

/// Bucket a request by the next power of two.
#[inline]
fn bucket(len: usize) -> usize {
    len.max(1).next_power_of_two()
}

fn pop(free: &mut FreeList, len: usize) -> Vec<f32> {
    let cap = bucket(len);
    let mut buf = free
        .get_mut(&cap)
        .and_then(Vec::pop)
        .unwrap_or_else(|| Vec::with_capacity(cap));
    // Reused contents are left as they were; only the tail is filled.
    buf.resize(len, 0.0);
    buf
}

fn push(free: &mut FreeList, buf: Vec<f32>) {
    let cap = buf.capacity();
    if cap == 0 || !cap.is_power_of_two() {
        return;
    }
    free.entry(cap).or_default().push(buf);
}

/// A free list of `f32` buffers.
///
/// Buffers handed out are at least `len` long. Their contents are
/// unspecified; callers must overwrite or clear before reading.
pub trait SlicePool {
    /// Take a buffer of length `len` off the free list, or allocate one.
    fn take(&self, len: usize) -> Vec<f32>;

    /// Return a buffer to the free list.
    fn give(&self, buf: Vec<f32>);

    /// Take a buffer wrapped in a guard that gives it back on drop.
    fn alloc(&self, len: usize) -> Scratch<'_, Self>
    where
        Self: Sized,
    {
        Scratch {
            pool: self,
            buf: self.take(len),
        }
    }
}

/// Scoped buffer borrowed from a [`SlicePool`].
pub struct Scratch<'a, P: SlicePool> {
    pool: &'a P,
    buf: Vec<f32>,
}

impl<P: SlicePool> Deref for Scratch<'_, P> {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.buf
    }
}

impl<P: SlicePool> DerefMut for Scratch<'_, P> {
    fn deref_mut(&mut self) -> &mut [f32] {
        &mut self.buf
    }
}

impl<P: SlicePool> Drop for Scratch<'_, P> {
    fn drop(&mut self) {
        self.pool.give(std::mem::take(&mut self.buf));
    }
}

/// Single-threaded pool.
#[derive(Debug, Default)]
pub struct LocalSlicePool {
    free: RefCell<FreeList>,
}

impl LocalSlicePool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buffers currently on the free list.
    pub fn available(&self) -> usize {
        self.free.borrow().values().map(Vec::len).sum()
    }
}

impl SlicePool for LocalSlicePool {
    fn take(&self, len: usize) -> Vec<f32> {
        pop(&mut self.free.borrow_mut(), len)
    }

    fn give(&self, buf: Vec<f32>) {
        push(&mut self.free.borrow_mut(), buf);
    }
}

/// Pool whose free list is guarded by a lock, for traversals running on
/// several workers at once.
#[derive(Debug, Default)]
pub struct SyncSlicePool {
    free: Mutex<FreeList>,
}

impl SyncSlicePool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buffers currently on the free list.
    pub fn available(&self) -> usize {
        self.lock().values().map(Vec::len).sum()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FreeList> {
        // A panic while holding the lock cannot leave the free list torn.
        self.free.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SlicePool for SyncSlicePool {
    fn take(&self, len: usize) -> Vec<f32> {
        pop(&mut self.lock(), len)
    }

    fn give(&self, buf: Vec<f32>) {
        push(&mut self.lock(), buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;
    use std::sync::Arc;

    #[test]
    fn test_alloc_returns_requested_length() {
        let pool = LocalSlicePool::new();
        for len in [0, 1, 2, 3, 7, 8, 100] {
            let buf = pool.alloc(len);
            assert_eq!(buf.len(), len);
        }
    }

    #[test]
    fn test_buffers_are_reused() {
        let pool = LocalSlicePool::new();
        let ptr = {
            let mut buf = pool.alloc(5);
            buf[0] = 3.0;
            buf.as_ptr()
        };
        assert_eq!(pool.available(), 1);

        // Same bucket (8) hands back the same allocation.
        let buf = pool.alloc(6);
        assert_eq!(buf.as_ptr(), ptr);
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn test_buckets_are_separate() {
        let pool = LocalSlicePool::new();
        drop(pool.alloc(3));
        drop(pool.alloc(30));
        assert_eq!(pool.available(), 2);

        let small = pool.alloc(4);
        assert!(small.len() == 4);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn test_released_on_early_return() {
        fn fails(pool: &LocalSlicePool) -> Result<(), ()> {
            let _buf = pool.alloc(4);
            Err(())
        }

        let pool = LocalSlicePool::new();
        assert!(fails(&pool).is_err());
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn test_sync_pool_shared_between_workers() {
        let pool = Arc::new(SyncSlicePool::new());
        (0..256).into_par_iter().for_each(|i| {
            let mut buf = pool.alloc(1 + i % 9);
            buf.fill(i as f32);
            assert!(buf.iter().all(|&x| x == i as f32));
        });
        assert!(pool.available() > 0);
        assert!(pool.available() <= 256);
    }
}
