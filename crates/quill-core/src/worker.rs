//! Cancellation signaling for background work.
//!
//! The engine itself is single-threaded; long-running auxiliary work (a
//! directory scan, a whole-workspace search) runs on a worker thread that
//! never touches document state. The only cross-thread contract is a
//! cancellation flag the worker polls at reasonable intervals; results are
//! applied back on the owning thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable cancellation flag shared between an owner and its workers.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    /// Create a flag in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent; never blocks.
    pub fn request_cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Non-blocking poll a worker checks between units of work.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_flag_starts_clear() {
        let flag = CancelFlag::new();
        assert!(!flag.is_cancelled());
        flag.request_cancel();
        assert!(flag.is_cancelled());
        flag.request_cancel();
        assert!(flag.is_cancelled());
    }

    #[test]
    fn test_worker_observes_cancellation() {
        let flag = CancelFlag::new();
        let worker_flag = flag.clone();
        let handle = thread::spawn(move || {
            let mut iterations = 0usize;
            while !worker_flag.is_cancelled() {
                iterations += 1;
                thread::yield_now();
            }
            iterations
        });
        flag.request_cancel();
        // The worker must terminate once the flag is set.
        let iterations = handle.join().unwrap();
        let _ = iterations;
        assert!(flag.is_cancelled());
    }
}
