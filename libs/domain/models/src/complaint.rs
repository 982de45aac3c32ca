//! [libs/domain/models/src/complaint.rs]

use crate::enums::{Priority, Status};
use chrono::{DateTime, Utc};

/// A single citizen-filed grievance (§3). Invariants I-C1..I-C5 are
/// enforced by the services that mutate this row (the state machine, the
/// guard evaluator, and `ComplaintStateService`) rather than by the
/// struct itself — this type is a plain data carrier.
#[derive(Debug, Clone, PartialEq)]
pub struct Complaint {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub citizen_id: i64,
    pub department_id: Option<i64>,
    pub staff_id: Option<i64>,
    pub category_id: Option<i64>,
    pub priority: Priority,
    pub status: Status,
    pub escalation_level: u8,
    pub sla_deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub needs_manual_routing: bool,
    pub ai_confidence: f64,
    pub citizen_satisfaction: Option<u8>,
}

impl Complaint {
    /// A complaint is created in FILED with no routing decided yet
    /// (§4.8 intake side-effect). `ai_confidence` is supplied by the
    /// external classifier and is not reinterpreted here.
    pub fn new_filed(
        id: i64,
        title: String,
        description: String,
        location: String,
        citizen_id: i64,
        ai_confidence: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            description,
            location,
            citizen_id,
            department_id: None,
            staff_id: None,
            category_id: None,
            priority: Priority::Medium,
            status: Status::Filed,
            escalation_level: 0,
            sla_deadline: None,
            created_at,
            started_at: None,
            resolved_at: None,
            closed_at: None,
            needs_manual_routing: false,
            ai_confidence,
            citizen_satisfaction: None,
        }
    }

    /// A complaint is eligible for scheduler-driven escalation while its
    /// status is FILED, IN_PROGRESS, or RESOLVED and it has a deadline
    /// (§4.7). CLOSED and CANCELLED are excluded.
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            Status::Filed | Status::InProgress | Status::Resolved
        ) && self.sla_deadline.is_some()
    }

    /// I-C2: escalation_level only rises, and only through the escalation
    /// service. Exposed so repositories can express the monotonic update
    /// (`UPDATE ... WHERE escalation_level < new_level`) without having to
    /// recompute the comparison themselves.
    pub fn would_raise_level(&self, new_level: u8) -> bool {
        new_level > self.escalation_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_complaint_starts_filed_with_no_routing() {
        let now = Utc::now();
        let complaint = Complaint::new_filed(
            1,
            "pothole".into(),
            "large pothole on main street".into(),
            "main street".into(),
            42,
            0.91,
            now,
        );
        assert_eq!(complaint.status, Status::Filed);
        assert_eq!(complaint.department_id, None);
        assert_eq!(complaint.escalation_level, 0);
        assert!(!complaint.is_active()); // no sla_deadline yet
    }

    #[test]
    fn active_requires_non_terminal_status_and_deadline() {
        let now = Utc::now();
        let mut complaint =
            Complaint::new_filed(1, "t".into(), "d".into(), "l".into(), 1, 0.9, now);
        assert!(!complaint.is_active());
        complaint.sla_deadline = Some(now);
        assert!(complaint.is_active());
        complaint.status = Status::Closed;
        assert!(!complaint.is_active());
    }
}
