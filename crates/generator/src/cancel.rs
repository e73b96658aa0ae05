use crate::error::{GeneratorError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation signal shared between a caller and an evaluation.
///
/// Work is checked against the flag between per-artifact units; a unit that
/// already started runs to completion.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// `Err(Cancelled)` once the flag has been raised
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(GeneratorError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let flag = CancellationFlag::new();
        let observer = flag.clone();
        assert!(observer.check().is_ok());

        flag.cancel();
        assert!(observer.is_cancelled());
        assert!(observer.check().unwrap_err().is_cancelled());
    }
}
