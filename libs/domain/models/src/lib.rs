//! [libs/domain/models/src/lib.rs]
//!
//! Shared entity definitions for the grievance redressal governance core.
//! Every other crate in the workspace depends on this one for the data
//! model described in the specification (complaints, categories, SLA
//! rules, escalation events, proofs, signoffs, audit rows, notifications)
//! and for the caller context and error taxonomy that every core
//! operation accepts and returns.

pub mod audit_log;
pub mod caller;
pub mod category;
pub mod citizen_signoff;
pub mod complaint;
pub mod enums;
pub mod error;
pub mod escalation_event;
pub mod notification;
pub mod resolution_proof;
pub mod sla_rule;

pub use audit_log::AuditLog;
pub use caller::CallerContext;
pub use category::Category;
pub use citizen_signoff::CitizenSignoff;
pub use complaint::Complaint;
pub use enums::{
    AuditAction, EntityType, EscalationLevel, NotificationType, Priority, Role, Status,
};
pub use error::CoreError;
pub use escalation_event::EscalationEvent;
pub use notification::Notification;
pub use resolution_proof::ResolutionProof;
pub use sla_rule::SlaRule;
