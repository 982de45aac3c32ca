//! [libs/domain/repository/src/audit_log.rs]

use crate::error::RepoError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use grievance_domain_models::audit_log::ActorType;
use grievance_domain_models::enums::{AuditAction, EntityType};
use grievance_domain_models::AuditLog;

/// Everything needed to write one audit row, minus the identity and
/// timestamp the repository assigns on insert.
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub entity_type: EntityType,
    pub entity_id: i64,
    pub action: AuditAction,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub actor_type: ActorType,
    pub actor_id: Option<i64>,
    pub reason: Option<String>,
}

/// I-A1: no method here updates or deletes a row — the contract itself
/// enforces append-only by omission, not by a runtime check.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    async fn insert(&self, entry: NewAuditEntry) -> Result<AuditLog, RepoError>;

    /// By `(entity_type, entity_id)`, ordered by `created_at` ascending.
    async fn find_by_entity(
        &self,
        entity_type: EntityType,
        entity_id: i64,
    ) -> Result<Vec<AuditLog>, RepoError>;

    async fn find_by_action(&self, action: AuditAction) -> Result<Vec<AuditLog>, RepoError>;

    async fn find_by_actor(&self, actor_id: i64) -> Result<Vec<AuditLog>, RepoError>;

    async fn find_by_action_in_window(
        &self,
        action: AuditAction,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AuditLog>, RepoError>;
}
