//! [libs/domain/models/src/error.rs]
//!
//! The error taxonomy of §7, modelled as a tagged result rather than an
//! exception hierarchy (design note in §9: "exceptions as control flow for
//! domain errors"). `CSS`, `ES`, and `DW` all return `Result<_, CoreError>`
//! and propagate it to callers without losing the variant; batch drivers
//! (`ES::process_batch`, the scheduler) log a variant and continue instead
//! of letting one failure abort the run.

use crate::enums::{Role, Status};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// The requested complaint/signoff/event does not exist.
    #[error("[NOT_FOUND]: {entity} {id} does not exist")]
    NotFound { entity: &'static str, id: i64 },

    /// The state machine rejected `from -> to`.
    #[error("[INVALID_TRANSITION]: {from} -> {to} is not legal (legal targets: {legal_targets:?})")]
    InvalidTransition {
        from: Status,
        to: Status,
        legal_targets: Vec<Status>,
    },

    /// The caller's role may not perform this transition.
    #[error("[UNAUTHORIZED]: role {role} may not perform this transition (allowed: {allowed_roles:?})")]
    Unauthorized {
        role: Role,
        allowed_roles: Vec<Role>,
    },

    /// A citizen caller is not the complaint's owner.
    #[error("[OWNERSHIP_VIOLATION]: caller does not own complaint {complaint_id}")]
    OwnershipViolation { complaint_id: i64 },

    /// An operational-role caller belongs to a different department than
    /// the complaint.
    #[error("[DEPARTMENT_MISMATCH]: caller department {caller_department:?} does not match complaint department {complaint_department:?}")]
    DepartmentMismatch {
        caller_department: Option<i64>,
        complaint_department: Option<i64>,
    },

    /// `IN_PROGRESS -> RESOLVED` attempted without a `ResolutionProof` row
    /// (I-P1).
    #[error("[RESOLUTION_PROOF_REQUIRED]: complaint {complaint_id} has no resolution proof")]
    ResolutionProofRequired { complaint_id: i64 },

    /// `RESOLVED -> CLOSED` attempted by a human caller without an
    /// accepted `CitizenSignoff`.
    #[error("[SIGNOFF_REQUIRED]: complaint {complaint_id} has no accepted signoff")]
    SignoffRequired { complaint_id: i64 },

    /// A dispute operation was attempted on a complaint that is not
    /// `RESOLVED`, or a review targeted a dispute that was already
    /// reviewed.
    #[error("[INVALID_DISPUTE_STATE]: {reason}")]
    InvalidDisputeState { reason: String },

    /// A pending dispute already exists for the complaint (I-S3).
    #[error("[DUPLICATE_DISPUTE]: complaint {complaint_id} already has a pending dispute")]
    DuplicateDispute { complaint_id: i64 },

    /// An optimistic-lock or unique-constraint collision: idempotency won
    /// the race. Safe to treat as success in idempotent flows.
    #[error("[CONFLICTING_UPDATE]: {reason}")]
    ConflictingUpdate { reason: String },

    /// Repository or notification I/O that may succeed on retry.
    #[error("[TRANSIENT_IO]: {reason}")]
    TransientIo { reason: String },
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        CoreError::NotFound { entity, id }
    }
}
