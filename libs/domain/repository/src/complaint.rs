//! [libs/domain/repository/src/complaint.rs]

use crate::audit_log::NewAuditEntry;
use crate::error::RepoError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use grievance_domain_models::enums::{Priority, Status};
use grievance_domain_models::Complaint;

/// The routing decision made at intake (§4.8): category, department,
/// priority, and deadline as decided by the SLA rule (or left unset, with
/// `needs_manual_routing = true`, when the classifier's confidence falls
/// below threshold).
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    pub category_id: i64,
    pub department_id: Option<i64>,
    pub priority: Priority,
    pub sla_deadline: Option<DateTime<Utc>>,
    pub needs_manual_routing: bool,
}

/// Scoped counts by status, for dashboards and administrative queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCount {
    pub status: Status,
    pub count: i64,
}

/// Domain-focused complaint queries and the handful of write operations
/// that must be atomic with an audit row (§4.3: "writes in the same
/// transaction as the business mutation it documents"). Plain CRUD is
/// deliberately absent — every write here says what business event it
/// represents.
#[async_trait]
pub trait ComplaintRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Complaint>, RepoError>;

    /// A brand-new complaint, created in FILED (§3 lifecycle). Returns the
    /// assigned id.
    async fn insert(&self, complaint: &Complaint) -> Result<i64, RepoError>;

    /// Status not in {CLOSED, CANCELLED}, `sla_deadline` non-null — the
    /// scheduler's working set (§4.7).
    async fn find_active(&self) -> Result<Vec<Complaint>, RepoError>;

    async fn find_by_citizen(&self, citizen_id: i64) -> Result<Vec<Complaint>, RepoError>;

    async fn find_by_staff(&self, staff_id: i64) -> Result<Vec<Complaint>, RepoError>;

    async fn find_by_department(&self, department_id: i64) -> Result<Vec<Complaint>, RepoError>;

    /// Active complaints in `department_id` with no assignee yet.
    async fn find_unassigned_active_by_department(
        &self,
        department_id: i64,
    ) -> Result<Vec<Complaint>, RepoError>;

    /// `escalation_level > 0`.
    async fn find_escalated(&self) -> Result<Vec<Complaint>, RepoError>;

    /// Counts by status, optionally scoped to one department.
    async fn count_by_status(
        &self,
        department_id: Option<i64>,
    ) -> Result<Vec<StatusCount>, RepoError>;

    /// Apply the routing decision made at intake, optionally also moving
    /// FILED -> IN_PROGRESS in the same write (§4.8: only when confidence
    /// clears the threshold; otherwise the complaint stays FILED with
    /// `needs_manual_routing = true` and no audit row is written here).
    async fn apply_routing(
        &self,
        complaint_id: i64,
        decision: RoutingDecision,
        now: DateTime<Utc>,
        transition_audit: Option<NewAuditEntry>,
    ) -> Result<Complaint, RepoError>;

    /// An admin assigning a department to a complaint that was flagged
    /// `needs_manual_routing` (§4.8). Does not itself change status.
    async fn assign_department(
        &self,
        complaint_id: i64,
        department_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Complaint, RepoError>;

    /// Move `from -> to`, stamping `resolved_at`/`closed_at` as the target
    /// status requires (§4.8 step 8), and insert `audit` atomically. Fails
    /// with `RepoError::Conflict` if the row is no longer in `from`
    /// (concurrent mutation lost the race).
    async fn apply_state_transition(
        &self,
        complaint_id: i64,
        from: Status,
        to: Status,
        now: DateTime<Utc>,
        audit: NewAuditEntry,
    ) -> Result<Complaint, RepoError>;

    /// I-C2/§5: `UPDATE ... WHERE escalation_level < new_level`. Returns
    /// `None` (not an error) when the row was already at or above
    /// `new_level` — a concurrent escalation already won.
    async fn raise_escalation_level(
        &self,
        complaint_id: i64,
        new_level: u8,
        now: DateTime<Utc>,
        audit: NewAuditEntry,
    ) -> Result<Option<Complaint>, RepoError>;

    /// Assign (or reassign) the staff member handling a complaint, with
    /// the ASSIGNMENT audit row in the same write (§4.3, §4.8).
    async fn assign_staff(
        &self,
        complaint_id: i64,
        staff_id: i64,
        now: DateTime<Utc>,
        audit: NewAuditEntry,
    ) -> Result<Complaint, RepoError>;

    /// Records the citizen's rating on acceptance of a resolution.
    async fn record_citizen_satisfaction(
        &self,
        complaint_id: i64,
        rating: u8,
    ) -> Result<(), RepoError>;
}
