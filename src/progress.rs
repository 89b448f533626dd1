//! Progress observation for long-running passes.
//!
//! Listeners are injected into a kernel rather than read from ambient
//! state, so the algorithms stay free of process-wide dependencies. The
//! notification is fire-and-forget: it carries no semantic weight and must
//! not affect control flow.

use std::sync::atomic::{AtomicU64, Ordering};

/// Receives one notification per node processed within a phase (degree
/// precompute, then each iteration round).
///
/// Implementations must be cheap; the kernel calls this from its hot loop,
/// possibly from several worker threads at once.
pub trait ProgressListener: Send + Sync {
    fn node_processed(&self);
}

/// Default listener that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressListener for NoProgress {
    #[inline]
    fn node_processed(&self) {}
}

/// Counter-style listener, usable from parallel passes.
#[derive(Debug, Default)]
pub struct ProgressCounter {
    processed: AtomicU64,
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total notifications received so far.
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }
}

impl ProgressListener for ProgressCounter {
    fn node_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }
}
