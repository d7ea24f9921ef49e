//! Shared cancellation signal observed by every stage.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Sticky, cooperative cancellation flag.
///
/// Clone is cheap and shares state. The flag can be raised once; later calls to
/// [`CancellationSignal::cancel`] are no-ops.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    cancelled: Arc<AtomicBool>,
}

impl CancellationSignal {
    /// Create a signal that has not been raised.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal. Returns `true` only for the call that raised it.
    pub fn cancel(&self) -> bool {
        self.cancelled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Check if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
