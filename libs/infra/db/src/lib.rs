//! [libs/infra/db/src/lib.rs]
//!
//! libsql-backed implementations of the repository contracts in
//! `grievance-domain-repository`. Every write that the contracts mark as
//! needing an atomic business-mutation-plus-audit-row pair opens its own
//! `libsql::Transaction`; everything else runs on a plain `Connection`.

pub mod client;
pub mod errors;
pub mod mapping;
pub mod repositories;
pub mod schema;

pub use client::DbClient;
pub use errors::DbError;
pub use repositories::{
    AuditLogRepositoryImpl, CategoryRepositoryImpl, CitizenSignoffRepositoryImpl,
    ComplaintRepositoryImpl, EscalationEventRepositoryImpl, NotificationRepositoryImpl,
    RecipientDirectoryImpl, ResolutionProofRepositoryImpl, SlaRuleRepositoryImpl,
};
