//! Request deadline visible to repository writes.
//!
//! The article service runs each write inside [`scope`]. Backends call
//! [`ensure_before`] as the last step before a write becomes durable, so a
//! write either lands before the deadline or fails with
//! [`RepositoryError::TimeoutError`] and leaves the store untouched. Callers
//! never drop an in-flight write to enforce the deadline.

use std::future::Future;
use std::time::{Duration, Instant};

use super::error::{ErrorContext, RepositoryError, RepositoryResult};

tokio::task_local! {
    static DEADLINE: Instant;
}

/// Run `fut` with `deadline` visible to the repositories it calls.
pub async fn scope<F: Future>(deadline: Instant, fut: F) -> F::Output {
    DEADLINE.scope(deadline, fut).await
}

/// Deadline of the surrounding [`scope`], if any.
pub fn current() -> Option<Instant> {
    DEADLINE.try_with(|deadline| *deadline).ok()
}

/// Time left before the deadline; `None` outside a scope.
pub fn remaining() -> Option<Duration> {
    current().map(|deadline| deadline.saturating_duration_since(Instant::now()))
}

/// Fail if `deadline` has passed.
pub fn check(deadline: Option<Instant>, operation: &str) -> RepositoryResult<()> {
    match deadline {
        Some(deadline) if Instant::now() >= deadline => {
            Err(RepositoryError::timeout_with_context(
                "deadline passed before the write was committed",
                ErrorContext::new(operation),
            ))
        }
        _ => Ok(()),
    }
}

/// [`check`] against the deadline of the surrounding scope.
pub fn ensure_before(operation: &str) -> RepositoryResult<()> {
    check(current(), operation)
}
