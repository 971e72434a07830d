//! Reusable object pools
//!
//! Request preparation draws scratch buffers and gzip compressors from
//! pools instead of allocating per operation. Items are interchangeable,
//! reset on acquisition, and returned on every exit path; capacity grows to
//! peak concurrency and is never trimmed.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// A pooled item that can be restored to its empty state.
pub trait Reset {
    fn reset(&mut self);
}

impl Reset for Vec<u8> {
    fn reset(&mut self) {
        self.clear();
    }
}

/// Unbounded pool of reusable items, safe for concurrent get/put.
#[derive(Debug, Default)]
pub struct Pool<T> {
    idle: Mutex<Vec<T>>,
    outstanding: AtomicUsize,
}

impl<T: Reset + Default> Pool<T> {
    pub fn new() -> Self {
        Self { idle: Mutex::new(Vec::new()), outstanding: AtomicUsize::new(0) }
    }

    /// Draw an item, reset and ready for use.
    pub fn get(&self) -> T {
        self.outstanding.fetch_add(1, Ordering::Relaxed);
        let recycled = self.idle.lock().unwrap_or_else(PoisonError::into_inner).pop();
        let mut item = recycled.unwrap_or_default();
        item.reset();
        item
    }

    /// Return an item for later reuse. The caller must not keep any
    /// reference to it afterward.
    pub fn put(&self, item: T) {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).push(item);
        self.outstanding.fetch_sub(1, Ordering::Relaxed);
    }

    /// Number of items currently checked out.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Relaxed)
    }

    /// Number of idle items held for reuse.
    pub fn idle(&self) -> usize {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for pool.
    use std::sync::Arc;
    use std::thread;

    use super::*;

    /// Validates `Pool::get` behavior for the recycling scenario.
    ///
    /// Assertions:
    /// - Confirms a returned buffer is handed out again, cleared.
    /// - Confirms `outstanding` tracks the checkout balance.
    #[test]
    fn test_get_recycles_returned_items() {
        let pool: Pool<Vec<u8>> = Pool::new();
        let mut buffer = pool.get();
        buffer.extend_from_slice(b"scratch");
        assert_eq!(pool.outstanding(), 1);

        pool.put(buffer);
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pool.idle(), 1);

        let buffer = pool.get();
        assert!(buffer.is_empty());
        assert_eq!(pool.idle(), 0);
        pool.put(buffer);
    }

    /// Validates `Pool::get` behavior for the growth scenario.
    ///
    /// Assertions:
    /// - Confirms the pool grows to the number of concurrent checkouts.
    #[test]
    fn test_pool_grows_to_peak_concurrency() {
        let pool: Pool<Vec<u8>> = Pool::new();
        let buffers: Vec<Vec<u8>> = (0..4).map(|_| pool.get()).collect();
        assert_eq!(pool.outstanding(), 4);
        for buffer in buffers {
            pool.put(buffer);
        }
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pool.idle(), 4);
    }

    #[test]
    fn test_pool_is_safe_under_concurrent_use() {
        let pool: Arc<Pool<Vec<u8>>> = Arc::new(Pool::new());
        let mut handles = vec![];
        for _ in 0..8 {
            let pool = Arc::clone(&pool);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    let mut buffer = pool.get();
                    buffer.push(1);
                    pool.put(buffer);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(pool.outstanding(), 0);
    }
}
