//! [libs/domain/repository/src/escalation_event.rs]

use crate::error::RepoError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use grievance_domain_models::enums::{EscalationLevel, Role};
use grievance_domain_models::EscalationEvent;

/// Everything needed to insert one escalation event, minus the identity
/// the repository assigns.
#[derive(Debug, Clone)]
pub struct NewEscalationEvent {
    pub complaint_id: i64,
    pub previous_level: EscalationLevel,
    pub escalation_level: EscalationLevel,
    pub escalated_at: DateTime<Utc>,
    pub escalated_to_role: Role,
    pub reason: String,
    pub days_overdue: i64,
    pub sla_deadline_snapshot: DateTime<Utc>,
    pub is_automated: bool,
}

#[async_trait]
pub trait EscalationEventRepository: Send + Sync {
    async fn exists_for(&self, complaint_id: i64, level: EscalationLevel) -> Result<bool, RepoError>;

    /// I-E2: enforced by a unique constraint on `(complaint_id,
    /// escalation_level)` at the storage layer (§5), not by a
    /// check-then-insert race in application code. Returns `None` — not an
    /// error — when the unique constraint rejects a duplicate; the caller
    /// treats that as "another concurrent run already recorded this".
    async fn insert_if_absent(
        &self,
        event: NewEscalationEvent,
    ) -> Result<Option<EscalationEvent>, RepoError>;

    /// Ordered ascending by `escalated_at` (§4.3 query requirements,
    /// §6 `get_escalation_history`).
    async fn history_by_complaint(&self, complaint_id: i64) -> Result<Vec<EscalationEvent>, RepoError>;
}
