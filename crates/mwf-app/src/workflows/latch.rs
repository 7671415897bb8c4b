//! In-flight latches for user actions.
//!
//! A latch admits one holder at a time. Acquisition fails instead of
//! waiting, so a second click while a request is pending is dropped rather
//! than queued. The holder gets a [`LatchGuard`]; dropping it releases the
//! latch on every exit path, including early returns and a cancelled future.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::{Action, AppError};

/// Boolean latch scoped to one action.
pub struct InFlightLatch {
    action: Action,
    held: AtomicBool,
}

impl InFlightLatch {
    /// Create a released latch for `action`.
    pub const fn new(action: Action) -> Self {
        Self {
            action,
            held: AtomicBool::new(false),
        }
    }

    /// Action this latch guards.
    pub fn action(&self) -> Action {
        self.action
    }

    /// Whether a holder currently exists.
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }

    /// Take the latch, or fail with [`AppError::ActionPending`].
    pub fn try_acquire(&self) -> Result<LatchGuard<'_>, AppError> {
        self.held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AppError::ActionPending {
                action: self.action,
            })?;
        Ok(LatchGuard {
            latch: self,
            on_release: None,
        })
    }
}

impl fmt::Debug for InFlightLatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InFlightLatch")
            .field("action", &self.action)
            .field("held", &self.is_held())
            .finish()
    }
}

/// Proof of holding an [`InFlightLatch`].
#[must_use = "dropping the guard releases the latch immediately"]
pub struct LatchGuard<'a> {
    latch: &'a InFlightLatch,
    on_release: Option<Box<dyn FnOnce() + Send + 'a>>,
}

impl<'a> LatchGuard<'a> {
    /// Run `f` after the latch is released, e.g. to clear a pending flag in a
    /// view.
    pub fn on_release(mut self, f: impl FnOnce() + Send + 'a) -> Self {
        self.on_release = Some(Box::new(f));
        self
    }
}

impl Drop for LatchGuard<'_> {
    fn drop(&mut self) {
        self.latch.held.store(false, Ordering::Release);
        if let Some(f) = self.on_release.take() {
            f();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_second_acquire_fails_while_held() {
        let latch = InFlightLatch::new(Action::Switch);
        let guard = latch.try_acquire().unwrap();
        assert!(latch.is_held());

        let err = latch.try_acquire().err().unwrap();
        assert_eq!(
            err,
            AppError::ActionPending {
                action: Action::Switch
            }
        );

        drop(guard);
        assert!(!latch.is_held());
        assert!(latch.try_acquire().is_ok());
    }

    #[test]
    fn test_release_on_early_return() {
        fn fails(latch: &InFlightLatch) -> Result<(), AppError> {
            let _guard = latch.try_acquire()?;
            Err(AppError::unknown_handle("x"))
        }

        let latch = InFlightLatch::new(Action::Finalize);
        assert!(fails(&latch).is_err());
        assert!(!latch.is_held());
    }

    #[test]
    fn test_on_release_runs_once() {
        let latch = InFlightLatch::new(Action::CreateOrJoin);
        let calls = AtomicUsize::new(0);
        {
            let _guard = latch.try_acquire().unwrap().on_release(|| {
                calls.fetch_add(1, Ordering::SeqCst);
            });
            assert_eq!(calls.load(Ordering::SeqCst), 0);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!latch.is_held());
    }
}
