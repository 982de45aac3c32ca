//! [libs/domain/guard/src/lib.rs]
//!
//! Guard Evaluator (§4.2): preconditions the state machine alone cannot
//! express. Every check here is pure given the repository reads it takes
//! as arguments — it never mutates, and the caller (`ComplaintStateService`)
//! decides which checks apply to which transition and role.

use grievance_domain_models::enums::{Role, Status};
use grievance_domain_models::{CallerContext, Complaint, CoreError};
use grievance_domain_repository::{
    CitizenSignoffRepository, RepoError, ResolutionProofRepository,
};

fn io_error(err: RepoError) -> CoreError {
    CoreError::TransientIo {
        reason: err.to_string(),
    }
}

/// `IN_PROGRESS -> RESOLVED` requires at least one resolution proof
/// (I-P1).
pub async fn require_resolution_proof(
    proofs: &dyn ResolutionProofRepository,
    complaint_id: i64,
) -> Result<(), CoreError> {
    if proofs.exists_for(complaint_id).await.map_err(io_error)? {
        Ok(())
    } else {
        Err(CoreError::ResolutionProofRequired { complaint_id })
    }
}

/// `RESOLVED -> CLOSED` by a human caller requires an accepted signoff.
/// SYSTEM bypasses this check (auto-close).
pub async fn require_accepted_signoff(
    signoffs: &dyn CitizenSignoffRepository,
    caller: &CallerContext,
    complaint_id: i64,
) -> Result<(), CoreError> {
    if caller.role == Role::System {
        return Ok(());
    }
    if signoffs
        .exists_accepted_for(complaint_id)
        .await
        .map_err(io_error)?
    {
        Ok(())
    } else {
        Err(CoreError::SignoffRequired { complaint_id })
    }
}

/// `-> CANCELLED` by a citizen: the caller must own the complaint.
pub fn require_ownership(caller: &CallerContext, complaint: &Complaint) -> Result<(), CoreError> {
    if caller.role != Role::Citizen || caller.user_id == Some(complaint.citizen_id) {
        Ok(())
    } else {
        Err(CoreError::OwnershipViolation {
            complaint_id: complaint.id,
        })
    }
}

/// `IN_PROGRESS -> RESOLVED` by STAFF or DEPT_HEAD: caller's department
/// must match the complaint's.
pub fn require_department_match(
    caller: &CallerContext,
    complaint: &Complaint,
) -> Result<(), CoreError> {
    if !matches!(caller.role, Role::Staff | Role::DeptHead) {
        return Ok(());
    }
    if caller.department_id == complaint.department_id {
        Ok(())
    } else {
        Err(CoreError::DepartmentMismatch {
            caller_department: caller.department_id,
            complaint_department: complaint.department_id,
        })
    }
}

/// `RESOLVED -> IN_PROGRESS`: only legal as the tail end of an approved
/// dispute review (§4.9). The most recently reviewed signoff for the
/// complaint must carry `dispute_approved = Some(true)`.
pub async fn require_approved_dispute(
    signoffs: &dyn CitizenSignoffRepository,
    complaint_id: i64,
) -> Result<(), CoreError> {
    let history = signoffs
        .find_by_complaint(complaint_id)
        .await
        .map_err(io_error)?;
    let reviewed = history.iter().rev().find(|s| s.dispute_approved.is_some());
    match reviewed {
        Some(s) if s.dispute_approved == Some(true) => Ok(()),
        _ => Err(CoreError::InvalidTransition {
            from: Status::Resolved,
            to: Status::InProgress,
            legal_targets: grievance_domain_fsm::allowed_targets(Status::Resolved),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grievance_domain_models::enums::Priority;

    fn complaint(citizen_id: i64, department_id: Option<i64>) -> Complaint {
        Complaint {
            id: 1,
            title: "t".into(),
            description: "d".into(),
            location: "l".into(),
            citizen_id,
            department_id,
            staff_id: None,
            category_id: Some(1),
            priority: Priority::Medium,
            status: Status::InProgress,
            escalation_level: 0,
            sla_deadline: Some(chrono::Utc::now()),
            created_at: chrono::Utc::now(),
            started_at: None,
            resolved_at: None,
            closed_at: None,
            needs_manual_routing: false,
            ai_confidence: 0.9,
            citizen_satisfaction: None,
        }
    }

    #[test]
    fn ownership_check_only_applies_to_citizens() {
        let c = complaint(10, None);
        assert!(require_ownership(&CallerContext::citizen(10), &c).is_ok());
        assert!(require_ownership(&CallerContext::citizen(11), &c).is_err());
        assert!(require_ownership(&CallerContext::admin(99), &c).is_ok());
    }

    #[test]
    fn department_check_only_applies_to_staff_and_dept_head() {
        let c = complaint(10, Some(5));
        assert!(require_department_match(&CallerContext::staff(1, 5), &c).is_ok());
        assert!(require_department_match(&CallerContext::staff(1, 6), &c).is_err());
        assert!(require_department_match(&CallerContext::citizen(10), &c).is_ok());
    }
}
