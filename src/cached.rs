//! Lazy, explicitly-invalidated initialization cache.
//!
//! Each model's one-shot initialization constants are expensive to recompute
//! and must be invalidated whenever a mean element or gravity-constant choice
//! changes (§3 "Derived / cached"). This is the setter-invalidated analogue of
//! the time-tolerance cache this crate previously used for coordinate
//! transforms: instead of expiring after a duration, the cache is cleared
//! explicitly by whoever owns the element record.

use std::sync::{Arc, RwLock};

/// A lazily-computed value that is cleared by an explicit [`InitCache::invalidate`]
/// call rather than by a time or generation comparison.
#[derive(Debug)]
pub struct InitCache<T> {
    slot: Arc<RwLock<Option<T>>>,
}

impl<T: Clone> InitCache<T> {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: Arc::new(RwLock::new(None)),
        }
    }

    /// Return the cached value, computing and storing it via `init` on a miss.
    pub fn get_or_init<F>(&self, init: F) -> T
    where
        F: FnOnce() -> T,
    {
        if let Some(value) = self.slot.read().unwrap().as_ref() {
            return value.clone();
        }

        let value = init();
        *self.slot.write().unwrap() = Some(value.clone());
        value
    }

    /// Drop the cached value, if any. The next [`InitCache::get_or_init`]
    /// call will recompute it.
    pub fn invalidate(&self) {
        *self.slot.write().unwrap() = None;
    }

    /// Whether the cache currently holds a value.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.slot.read().unwrap().is_some()
    }
}

impl<T: Clone> Default for InitCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for InitCache<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn cache_hit_avoids_recompute() {
        let cache = InitCache::<u32>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&calls);
        let v1 = cache.get_or_init(|| {
            c.fetch_add(1, Ordering::SeqCst);
            42
        });
        let c = Arc::clone(&calls);
        let v2 = cache.get_or_init(|| {
            c.fetch_add(1, Ordering::SeqCst);
            42
        });

        assert_eq!(v1, 42);
        assert_eq!(v2, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn invalidate_forces_recompute() {
        let cache = InitCache::<u32>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&calls);
        cache.get_or_init(|| {
            c.fetch_add(1, Ordering::SeqCst);
            1
        });
        cache.invalidate();
        assert!(!cache.is_populated());

        let c = Arc::clone(&calls);
        cache.get_or_init(|| {
            c.fetch_add(1, Ordering::SeqCst);
            2
        });

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
