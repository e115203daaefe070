//! Cooperative cancellation for stepwise builds.
//!
//! A [`CancellationSource`] hands out [`CancellationToken`]s. The build loop
//! polls its token before every step; an in-flight store request always runs to
//! completion.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable view of a cancellation flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

/// The control handle that triggers cancellation.
///
/// Dropping the source does not cancel its tokens.
#[derive(Debug, Default)]
pub struct CancellationSource {
    cancelled: Arc<AtomicBool>,
}

impl CancellationSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl CancellationToken {
    /// A token nobody can cancel.
    pub fn never() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_observe_their_source_only() {
        let a = CancellationSource::new();
        let b = CancellationSource::new();
        let token = a.token();
        let clone = token.clone();

        b.cancel();
        assert!(!token.is_cancelled());

        a.cancel();
        assert!(token.is_cancelled());
        assert!(clone.is_cancelled());
        assert!(!CancellationToken::never().is_cancelled());
    }
}
