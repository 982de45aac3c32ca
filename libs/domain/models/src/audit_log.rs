//! [libs/domain/models/src/audit_log.rs]

use crate::enums::{AuditAction, EntityType};
use chrono::{DateTime, Utc};

/// An append-only record of one material change (§3). I-A1: rows are
/// never updated or deleted — the repository layer rejects attempts at
/// either. I-A2: `actor_id` is null exactly when `actor_type` is SYSTEM.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLog {
    pub id: i64,
    pub entity_type: EntityType,
    pub entity_id: i64,
    pub action: AuditAction,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub actor_type: ActorType,
    pub actor_id: Option<i64>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorType {
    User,
    System,
}

impl ActorType {
    pub fn as_wire(self) -> &'static str {
        match self {
            ActorType::User => "USER",
            ActorType::System => "SYSTEM",
        }
    }
}

impl AuditLog {
    /// I-A2 as a constructable invariant: build an already-consistent row
    /// from a caller role rather than letting call sites hand-assemble a
    /// mismatched `(actor_type, actor_id)` pair.
    pub fn actor_fields(actor_type: ActorType, actor_id: Option<i64>) -> (ActorType, Option<i64>) {
        debug_assert_eq!(
            actor_type == ActorType::System,
            actor_id.is_none(),
            "I-A2 violated: actor_id must be null iff actor_type is SYSTEM"
        );
        (actor_type, actor_id)
    }
}
