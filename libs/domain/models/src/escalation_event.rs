//! [libs/domain/models/src/escalation_event.rs]

use crate::enums::{EscalationLevel, Role};
use chrono::{DateTime, Utc};

/// Immutable audit of one escalation (§3). I-E1/I-E2/I-E3 are enforced by
/// `EscalationService` and the repository's unique constraint on
/// `(complaint_id, escalation_level)`, not by this struct.
#[derive(Debug, Clone, PartialEq)]
pub struct EscalationEvent {
    pub id: i64,
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
