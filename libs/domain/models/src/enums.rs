//! [libs/domain/models/src/enums.rs]
//!
//! Enumerated vocabulary shared by every layer of the core. Per the wire
//! notes in the specification, status/priority/role/escalation-level
//! identifiers travel as their textual names ("IN_PROGRESS", "L1") so that
//! audit history and API payloads are readable without a lookup table.
//! `Display`/`FromStr` are implemented by hand (rather than derived)
//! because the wire spelling diverges from Rust's variant casing for a
//! couple of members (`DEPT_HEAD`, escalation levels).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Complaint lifecycle state. See the transition table in the state
/// machine crate for which moves between these are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Filed,
    InProgress,
    Resolved,
    Closed,
    Cancelled,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Filed,
        Status::InProgress,
        Status::Resolved,
        Status::Closed,
        Status::Cancelled,
    ];

    /// Terminal states have no successors (§4.1).
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Closed | Status::Cancelled)
    }

    pub fn as_wire(self) -> &'static str {
        match self {
            Status::Filed => "FILED",
            Status::InProgress => "IN_PROGRESS",
            Status::Resolved => "RESOLVED",
            Status::Closed => "CLOSED",
            Status::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "FILED" => Ok(Status::Filed),
            "IN_PROGRESS" => Ok(Status::InProgress),
            "RESOLVED" => Ok(Status::Resolved),
            "CLOSED" => Ok(Status::Closed),
            "CANCELLED" => Ok(Status::Cancelled),
            other => Err(format!("unrecognised status '{other}'")),
        }
    }
}

/// Complaint priority, set by routing (either from the SLA rule's base
/// priority or overridden by the external classifier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_wire(self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "LOW" => Ok(Priority::Low),
            "MEDIUM" => Ok(Priority::Medium),
            "HIGH" => Ok(Priority::High),
            "CRITICAL" => Ok(Priority::Critical),
            other => Err(format!("unrecognised priority '{other}'")),
        }
    }
}

/// Caller role, carried by `CallerContext`. `System` denotes an automated
/// actor (the scheduler, the routing step) and never carries a `user_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Citizen,
    Staff,
    DeptHead,
    Commissioner,
    Admin,
    SuperAdmin,
    System,
}

impl Role {
    pub fn as_wire(self) -> &'static str {
        match self {
            Role::Citizen => "CITIZEN",
            Role::Staff => "STAFF",
            Role::DeptHead => "DEPT_HEAD",
            Role::Commissioner => "COMMISSIONER",
            Role::Admin => "ADMIN",
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::System => "SYSTEM",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "CITIZEN" => Ok(Role::Citizen),
            "STAFF" => Ok(Role::Staff),
            "DEPT_HEAD" => Ok(Role::DeptHead),
            "COMMISSIONER" => Ok(Role::Commissioner),
            "ADMIN" => Ok(Role::Admin),
            "SUPER_ADMIN" => Ok(Role::SuperAdmin),
            "SYSTEM" => Ok(Role::System),
            other => Err(format!("unrecognised role '{other}'")),
        }
    }
}

/// Escalation level (§Glossary): L0 is staff-owned, L1 escalates to the
/// department head, L2 to a municipal commissioner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EscalationLevel {
    L0,
    L1,
    L2,
}

impl EscalationLevel {
    pub fn as_wire(self) -> &'static str {
        match self {
            EscalationLevel::L0 => "L0",
            EscalationLevel::L1 => "L1",
            EscalationLevel::L2 => "L2",
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            EscalationLevel::L0 => 0,
            EscalationLevel::L1 => 1,
            EscalationLevel::L2 => 2,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(EscalationLevel::L0),
            1 => Some(EscalationLevel::L1),
            2 => Some(EscalationLevel::L2),
            _ => None,
        }
    }

    /// The role that an escalation event at this level is addressed to
    /// (§4.4 recipient resolution). `L0` has no escalation recipient.
    pub fn responsible_role(self) -> Option<Role> {
        match self {
            EscalationLevel::L0 => None,
            EscalationLevel::L1 => Some(Role::DeptHead),
            EscalationLevel::L2 => Some(Role::Commissioner),
        }
    }
}

impl fmt::Display for EscalationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for EscalationLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "L0" => Ok(EscalationLevel::L0),
            "L1" => Ok(EscalationLevel::L1),
            "L2" => Ok(EscalationLevel::L2),
            other => Err(format!("unrecognised escalation level '{other}'")),
        }
    }
}

/// `AuditLog.entity_type` (I-A1/I-A2 live on the `AuditLog` entity itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    Complaint,
    Escalation,
    Sla,
    User,
    Suspension,
}

impl EntityType {
    pub fn as_wire(self) -> &'static str {
        match self {
            EntityType::Complaint => "COMPLAINT",
            EntityType::Escalation => "ESCALATION",
            EntityType::Sla => "SLA",
            EntityType::User => "USER",
            EntityType::Suspension => "SUSPENSION",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "COMPLAINT" => Ok(EntityType::Complaint),
            "ESCALATION" => Ok(EntityType::Escalation),
            "SLA" => Ok(EntityType::Sla),
            "USER" => Ok(EntityType::User),
            "SUSPENSION" => Ok(EntityType::Suspension),
            other => Err(format!("unknown entity_type '{other}'")),
        }
    }
}

/// `AuditLog.action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    StateChange,
    Escalation,
    Assignment,
    SlaUpdate,
    Suspension,
    Create,
    Accept,
    Dispute,
}

impl AuditAction {
    pub fn as_wire(self) -> &'static str {
        match self {
            AuditAction::StateChange => "STATE_CHANGE",
            AuditAction::Escalation => "ESCALATION",
            AuditAction::Assignment => "ASSIGNMENT",
            AuditAction::SlaUpdate => "SLA_UPDATE",
            AuditAction::Suspension => "SUSPENSION",
            AuditAction::Create => "CREATE",
            AuditAction::Accept => "ACCEPT",
            AuditAction::Dispute => "DISPUTE",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "STATE_CHANGE" => Ok(AuditAction::StateChange),
            "ESCALATION" => Ok(AuditAction::Escalation),
            "ASSIGNMENT" => Ok(AuditAction::Assignment),
            "SLA_UPDATE" => Ok(AuditAction::SlaUpdate),
            "SUSPENSION" => Ok(AuditAction::Suspension),
            "CREATE" => Ok(AuditAction::Create),
            "ACCEPT" => Ok(AuditAction::Accept),
            "DISPUTE" => Ok(AuditAction::Dispute),
            other => Err(format!("unknown audit action '{other}'")),
        }
    }
}

/// Notification categories dispatched by the notification service (§4.4,
/// §4.8, §4.9). Kept as one enum shared by the dispatcher and its callers
/// so a typo in a notification type is a compile error, not a silent miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationType {
    ComplaintStatusChanged,
    ComplaintResolved,
    ComplaintClosed,
    ComplaintAssigned,
    RatingRequest,
    EscalationAlert,
    ResolutionDisputed,
    DisputeReceived,
    DisputeApproved,
    DisputeRejected,
    ComplaintReopened,
}

impl NotificationType {
    pub fn as_wire(self) -> &'static str {
        match self {
            NotificationType::ComplaintStatusChanged => "COMPLAINT_STATUS_CHANGED",
            NotificationType::ComplaintResolved => "COMPLAINT_RESOLVED",
            NotificationType::ComplaintClosed => "COMPLAINT_CLOSED",
            NotificationType::ComplaintAssigned => "COMPLAINT_ASSIGNED",
            NotificationType::RatingRequest => "RATING_REQUEST",
            NotificationType::EscalationAlert => "ESCALATION_ALERT",
            NotificationType::ResolutionDisputed => "RESOLUTION_DISPUTED",
            NotificationType::DisputeReceived => "DISPUTE_RECEIVED",
            NotificationType::DisputeApproved => "DISPUTE_APPROVED",
            NotificationType::DisputeRejected => "DISPUTE_REJECTED",
            NotificationType::ComplaintReopened => "COMPLAINT_REOPENED",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "COMPLAINT_STATUS_CHANGED" => Ok(NotificationType::ComplaintStatusChanged),
            "COMPLAINT_RESOLVED" => Ok(NotificationType::ComplaintResolved),
            "COMPLAINT_CLOSED" => Ok(NotificationType::ComplaintClosed),
            "COMPLAINT_ASSIGNED" => Ok(NotificationType::ComplaintAssigned),
            "RATING_REQUEST" => Ok(NotificationType::RatingRequest),
            "ESCALATION_ALERT" => Ok(NotificationType::EscalationAlert),
            "RESOLUTION_DISPUTED" => Ok(NotificationType::ResolutionDisputed),
            "DISPUTE_RECEIVED" => Ok(NotificationType::DisputeReceived),
            "DISPUTE_APPROVED" => Ok(NotificationType::DisputeApproved),
            "DISPUTE_REJECTED" => Ok(NotificationType::DisputeRejected),
            "COMPLAINT_REOPENED" => Ok(NotificationType::ComplaintReopened),
            other => Err(format!("unknown notification_type '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_wire_text() {
        for status in Status::ALL {
            assert_eq!(Status::from_str(status.as_wire()).unwrap(), status);
        }
    }

    #[test]
    fn escalation_level_orders_numerically() {
        assert!(EscalationLevel::L0 < EscalationLevel::L1);
        assert!(EscalationLevel::L1 < EscalationLevel::L2);
    }

    #[test]
    fn escalation_level_responsible_role() {
        assert_eq!(EscalationLevel::L0.responsible_role(), None);
        assert_eq!(EscalationLevel::L1.responsible_role(), Some(Role::DeptHead));
        assert_eq!(
            EscalationLevel::L2.responsible_role(),
            Some(Role::Commissioner)
        );
    }
}
