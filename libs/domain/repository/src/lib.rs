//! [libs/domain/repository/src/lib.rs]
//!
//! Repository contracts (§4.10): one async trait per entity, expressing
//! domain-meaningful writes rather than generic CRUD. Nothing in this
//! crate knows about libsql or any other storage engine — implementations
//! live in `grievance-infra-db`.

pub mod audit_log;
pub mod category;
pub mod citizen_signoff;
pub mod complaint;
pub mod error;
pub mod escalation_event;
pub mod notification;
pub mod recipient_directory;
pub mod resolution_proof;
pub mod sla_rule;

pub use audit_log::{AuditLogRepository, NewAuditEntry};
pub use category::CategoryRepository;
pub use citizen_signoff::CitizenSignoffRepository;
pub use complaint::{ComplaintRepository, RoutingDecision, StatusCount};
pub use error::RepoError;
pub use escalation_event::{EscalationEventRepository, NewEscalationEvent};
pub use notification::{NewNotification, NotificationRepository};
pub use recipient_directory::RecipientDirectory;
pub use resolution_proof::ResolutionProofRepository;
pub use sla_rule::SlaRuleRepository;
