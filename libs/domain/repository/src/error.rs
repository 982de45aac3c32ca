//! [libs/domain/repository/src/error.rs]

use grievance_domain_models::CoreError;
use thiserror::Error;

/// Failures a repository implementation can surface. Deliberately small:
/// the interesting error taxonomy (`CoreError`, §7) lives above the
/// repository boundary; this one only distinguishes the handful of
/// outcomes a caller needs to react to differently (retry vs. treat as a
/// successful no-op vs. genuinely missing row).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepoError {
    #[error("[REPO_NOT_FOUND]: {0}")]
    NotFound(String),

    /// A unique-constraint or optimistic-lock collision. Per §5, callers
    /// in idempotent flows (escalation insert, pending-dispute insert) may
    /// treat this as a successful no-op rather than a hard failure.
    #[error("[REPO_CONFLICT]: {0}")]
    Conflict(String),

    /// Connection, transaction, or query failure that may succeed on
    /// retry.
    #[error("[REPO_IO]: {0}")]
    Io(String),
}

/// Lets every core service propagate a repository failure with `?`
/// without hand-translating each variant at every call site.
impl From<RepoError> for CoreError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => CoreError::TransientIo {
                reason: format!("not found: {msg}"),
            },
            RepoError::Conflict(msg) => CoreError::ConflictingUpdate { reason: msg },
            RepoError::Io(msg) => CoreError::TransientIo { reason: msg },
        }
    }
}
