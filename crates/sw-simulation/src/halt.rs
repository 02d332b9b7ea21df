use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared stop flag, set from outside and polled once per tick.
#[derive(Debug, Clone, Default)]
pub struct HaltSignal {
    flag: Arc<AtomicBool>,
}

impl HaltSignal {
    /// A fresh, unset signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop. The current tick still completes.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Return `true` once any clone has been triggered.
    pub fn is_halted(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
