//! Cancellation context shared by every backend call in a batch.

use crate::error::{Error, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cheaply clonable cancellation handle.
///
/// Cancelling never interrupts a call that is already blocked on I/O; it
/// makes every subsequent backend call fail with [`Error::Cancelled`].
///
/// # Example
///
/// ```
/// use objcp::Context;
///
/// let ctx = Context::new();
/// let handle = ctx.clone();
/// handle.cancel();
/// assert!(ctx.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancel: Arc<AtomicBool>,
}

impl Context {
    /// Create a fresh, non-cancelled context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing flag, e.g. one flipped by a signal handler.
    #[must_use]
    pub fn with_cancel_token(cancel: Arc<AtomicBool>) -> Self {
        Self { cancel }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Fail with [`Error::Cancelled`] if cancellation was requested.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] once [`cancel`](Self::cancel) was called.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}
