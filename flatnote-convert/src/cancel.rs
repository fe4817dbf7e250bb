//! Cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::Error;

/// A polled cancellation flag shared between a conversion and its caller.
///
/// Clones share the same flag. The conversion polls the token at the start
/// of every recursive step and loop iteration; once [`CancelToken::cancel`]
/// has been called, the next poll returns [`Error::Interrupted`] and the
/// in-progress document unwinds. No partial output is kept.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    stop: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every conversion holding this token.
    pub fn cancel(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Poll the flag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Interrupted`] once cancellation has been requested.
    pub fn check(&self) -> Result<(), Error> {
        if self.is_cancelled() {
            tracing::debug!("cancellation observed");
            Err(Error::Interrupted)
        } else {
            Ok(())
        }
    }
}
