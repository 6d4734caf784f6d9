// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-operation deadline handed down from the request layer.

use crate::error::{AppError, Result};
use std::time::Duration;
use tokio::time::Instant;

/// Carries the caller's deadline into multi-step mutations.
///
/// Services call [`OperationContext::checkpoint`] before each store I/O step
/// so an expired request stops before touching the store again.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationContext {
    deadline: Option<Instant>,
}

impl OperationContext {
    /// A context with no deadline.
    pub fn unbounded() -> Self {
        Self { deadline: None }
    }

    /// A context expiring `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// A context expiring at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Fail with `DeadlineExceeded` if the deadline has passed.
    pub fn checkpoint(&self, step: &'static str) -> Result<()> {
        if self.is_expired() {
            tracing::debug!(step, "Operation deadline exceeded");
            return Err(AppError::DeadlineExceeded(step));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_never_expires() {
        assert!(OperationContext::unbounded().checkpoint("read").is_ok());
    }

    #[tokio::test]
    async fn test_expired_context_rejects_checkpoint() {
        let ctx = OperationContext::with_deadline(Instant::now());
        let err = ctx.checkpoint("write user").unwrap_err();
        assert!(matches!(err, AppError::DeadlineExceeded("write user")));
    }

    #[tokio::test]
    async fn test_future_deadline_passes() {
        let ctx = OperationContext::with_timeout(Duration::from_secs(60));
        assert!(!ctx.is_expired());
    }
}
