//! Cancellation tokens for search sessions.
//!
//! A token is a shared one-way latch: every clone observes the same flag,
//! requesting cancellation is idempotent, and once set it never resets.
//! Workers poll it at dispatch boundaries; nothing is interrupted mid-listing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Result, SearchError};

/// A cancellation switch shared by every worker of one or more sessions.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    requested: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token in the not-requested state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Calling this more than once has no further effect.
    pub fn cancel(&self) {
        self.requested.store(true, Ordering::Release);
    }

    /// Returns true once cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Returns `Err(SearchError::Cancelled)` once cancellation has been requested.
    ///
    /// This enables use with the `?` operator at dispatch boundaries.
    #[inline]
    pub fn ensure_active(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(SearchError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Polls an optional token; an absent token is never cancelled.
#[inline]
pub(crate) fn ensure_active(token: Option<&CancellationToken>) -> Result<()> {
    token.map_or(Ok(()), CancellationToken::ensure_active)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_token_is_active() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(token.ensure_active().is_ok());
    }

    #[test]
    fn cancel_is_shared_between_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
        assert!(token.ensure_active().unwrap_err().is_cancelled());
    }

    #[test]
    fn cancel_is_idempotent() {
        let token = CancellationToken::new();
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn absent_token_is_never_cancelled() {
        assert!(ensure_active(None).is_ok());
        let token = CancellationToken::new();
        token.cancel();
        assert!(ensure_active(Some(&token)).is_err());
    }
}
