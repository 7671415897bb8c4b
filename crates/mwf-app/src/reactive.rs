//! # Reactive View Cells
//!
//! [`Dynamic<T>`] holds a view snapshot and a version counter. Frontends take a
//! [`Subscription<T>`] and poll it after each host event; a poll yields the
//! latest snapshot only when the cell has been written since the last poll.
//!
//! ## Design
//!
//! 1. **Pull, not push**: consumers decide when to re-render. No task is
//!    spawned and no dependency tracking happens behind their back.
//! 2. **Runtime-agnostic**: only `parking_lot` and atomics, so the cells work
//!    under any executor or in plain sync code.
//!
//! ```rust,ignore
//! let cell = Dynamic::new(0);
//! let mut sub = cell.subscribe();
//!
//! cell.set(1);
//! assert_eq!(sub.poll(), Some(1));
//! assert_eq!(sub.poll(), None);
//! ```

use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

struct DynamicInner<T> {
    value: RwLock<T>,
    /// Incremented on each write.
    version: AtomicU64,
}

/// A shared, versioned view value.
///
/// Clones share the same underlying cell.
#[derive(Clone)]
pub struct Dynamic<T> {
    inner: Arc<DynamicInner<T>>,
}

impl<T: Clone + Send + Sync + 'static> Dynamic<T> {
    /// Create a new cell holding `value` at version 0.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(DynamicInner {
                value: RwLock::new(value),
                version: AtomicU64::new(0),
            }),
        }
    }

    /// Clone out the current value.
    pub fn get(&self) -> T {
        self.inner.value.read().clone()
    }

    /// Run `f` against the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.read())
    }

    /// Current version number.
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }

    /// Replace the value and bump the version.
    pub fn set(&self, value: T) {
        {
            let mut guard = self.inner.value.write();
            *guard = value;
        }
        self.inner.version.fetch_add(1, Ordering::Release);
    }

    /// Mutate the value in place and bump the version.
    ///
    /// Returns whatever `f` returns. The write lock is held only for the
    /// duration of `f`, so `f` must not call back into this cell.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let out = {
            let mut guard = self.inner.value.write();
            f(&mut guard)
        };
        self.inner.version.fetch_add(1, Ordering::Release);
        out
    }

    /// Mutate the value in place, bumping the version only if `f` returns
    /// `true`.
    pub fn update_if(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        let changed = {
            let mut guard = self.inner.value.write();
            f(&mut guard)
        };
        if changed {
            self.inner.version.fetch_add(1, Ordering::Release);
        }
        changed
    }

    /// Subscribe to changes made after this call.
    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            source: self.inner.clone(),
            last_version: self.inner.version.load(Ordering::Acquire),
        }
    }
}

impl<T: Clone + Send + Sync + Default + 'static> Default for Dynamic<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + Send + Sync + fmt::Debug + 'static> fmt::Debug for Dynamic<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dynamic")
            .field("value", &self.get())
            .field("version", &self.version())
            .finish()
    }
}

/// A poll-based subscription to a [`Dynamic`] cell.
pub struct Subscription<T> {
    source: Arc<DynamicInner<T>>,
    last_version: u64,
}

impl<T: Clone + Send + Sync + 'static> Subscription<T> {
    /// Whether the source has been written since the last poll.
    pub fn has_changed(&self) -> bool {
        self.source.version.load(Ordering::Acquire) > self.last_version
    }

    /// Return the latest value if the source changed since the last poll.
    pub fn poll(&mut self) -> Option<T> {
        let current_version = self.source.version.load(Ordering::Acquire);
        if current_version > self.last_version {
            self.last_version = current_version;
            Some(self.source.value.read().clone())
        } else {
            None
        }
    }

    /// The current value, changed or not.
    pub fn get(&self) -> T {
        self.source.value.read().clone()
    }

    /// Last version this subscription observed.
    pub fn last_observed_version(&self) -> u64 {
        self.last_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_set_bumps_version() {
        let d = Dynamic::new(0);
        assert_eq!(d.version(), 0);

        d.set(7);
        assert_eq!(d.get(), 7);
        assert_eq!(d.version(), 1);
    }

    #[test]
    fn test_dynamic_clone_shares_state() {
        let d1 = Dynamic::new(String::new());
        let d2 = d1.clone();

        d1.set("shared".to_string());
        assert_eq!(d2.get(), "shared");
    }

    #[test]
    fn test_update_if_skips_version_when_unchanged() {
        let d = Dynamic::new(vec![1, 2]);

        assert!(!d.update_if(|_| false));
        assert_eq!(d.version(), 0);

        assert!(d.update_if(|v| {
            v.push(3);
            true
        }));
        assert_eq!(d.version(), 1);
        assert_eq!(d.get(), vec![1, 2, 3]);
    }

    #[test]
    fn test_subscription_poll() {
        let d = Dynamic::new(0);
        let mut sub = d.subscribe();

        assert!(!sub.has_changed());
        assert_eq!(sub.poll(), None);

        d.set(42);
        assert!(sub.has_changed());
        assert_eq!(sub.poll(), Some(42));
        assert_eq!(sub.poll(), None);
        assert_eq!(sub.get(), 42);
    }

    #[test]
    fn test_subscription_coalesces_writes() {
        let d = Dynamic::new(0);
        let mut sub = d.subscribe();

        d.set(1);
        d.set(2);
        d.update(|v| *v += 1);

        assert_eq!(sub.poll(), Some(3));
        assert_eq!(sub.last_observed_version(), 3);
        assert_eq!(sub.poll(), None);
    }

    #[test]
    fn test_late_subscriber_ignores_earlier_writes() {
        let d = Dynamic::new(0);
        d.set(5);

        let mut sub = d.subscribe();
        assert_eq!(sub.poll(), None);
        assert_eq!(sub.get(), 5);
    }
}
