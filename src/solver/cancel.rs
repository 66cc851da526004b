//! Cooperative cancellation
//!
//! A token is created per job and polled only between chunks of work.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Signal that a job stopped because it was canceled
///
/// Kept apart from real failures: callers report it as a "canceled" outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("computation canceled")]
pub struct Canceled;

/// Shared cancellation flag for one job
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; calling it again has no further effect
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// `Err(Canceled)` once cancellation was requested
    ///
    /// # Errors
    /// Returns `Canceled` if [`CancelToken::cancel`] was called.
    pub fn check(&self) -> Result<(), Canceled> {
        if self.is_canceled() { Err(Canceled) } else { Ok(()) }
    }
}
