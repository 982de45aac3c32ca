//! [libs/infra/db/src/repositories/mod.rs]

pub mod audit_log;
pub mod category;
pub mod citizen_signoff;
pub mod complaint;
pub mod escalation_event;
pub mod notification;
pub mod recipient_directory;
pub mod resolution_proof;
pub mod sla_rule;

pub use audit_log::AuditLogRepositoryImpl;
pub use category::CategoryRepositoryImpl;
pub use citizen_signoff::CitizenSignoffRepositoryImpl;
pub use complaint::ComplaintRepositoryImpl;
pub use escalation_event::EscalationEventRepositoryImpl;
pub use notification::NotificationRepositoryImpl;
pub use recipient_directory::RecipientDirectoryImpl;
pub use resolution_proof::ResolutionProofRepositoryImpl;
pub use sla_rule::SlaRuleRepositoryImpl;
