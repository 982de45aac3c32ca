//! [libs/core/audit/src/lib.rs]
//!
//! The audit recorder (AR, §4.3). Every other core service calls through
//! here instead of touching `AuditLogRepository` directly, so the
//! `(actor_type, actor_id)` pair derived from a `CallerContext` (I-A2) is
//! computed in exactly one place.

use grievance_domain_models::audit_log::ActorType;
use grievance_domain_models::enums::{AuditAction, EntityType, Role, Status};
use grievance_domain_models::{CallerContext, CoreError};
use grievance_domain_repository::{AuditLogRepository, NewAuditEntry};
use std::sync::Arc;

/// Derives `(actor_type, actor_id)` from a caller (I-A2: null actor_id iff
/// SYSTEM).
fn actor_fields(caller: &CallerContext) -> (ActorType, Option<i64>) {
    if caller.role == Role::System {
        (ActorType::System, None)
    } else {
        (ActorType::User, caller.user_id)
    }
}

pub struct AuditRecorder {
    audit_log: Arc<dyn AuditLogRepository>,
}

impl AuditRecorder {
    pub fn new(audit_log: Arc<dyn AuditLogRepository>) -> Self {
        Self { audit_log }
    }

    /// The general-purpose entry point; the convenience wrappers below
    /// all bottom out here.
    #[allow(clippy::too_many_arguments)]
    pub async fn record(
        &self,
        entity_type: EntityType,
        entity_id: i64,
        action: AuditAction,
        old_value: Option<String>,
        new_value: Option<String>,
        caller: &CallerContext,
        reason: Option<String>,
    ) -> Result<(), CoreError> {
        let (actor_type, actor_id) = actor_fields(caller);
        self.audit_log
            .insert(NewAuditEntry {
                entity_type,
                entity_id,
                action,
                old_value,
                new_value,
                actor_type,
                actor_id,
                reason,
            })
            .await?;
        Ok(())
    }

    pub fn record_state_change(
        &self,
        complaint_id: i64,
        from: Status,
        to: Status,
        caller: &CallerContext,
        reason: Option<String>,
    ) -> NewAuditEntry {
        let (actor_type, actor_id) = actor_fields(caller);
        NewAuditEntry {
            entity_type: EntityType::Complaint,
            entity_id: complaint_id,
            action: AuditAction::StateChange,
            old_value: Some(from.as_wire().to_string()),
            new_value: Some(to.as_wire().to_string()),
            actor_type,
            actor_id,
            reason,
        }
    }

    pub fn record_escalation(
        &self,
        complaint_id: i64,
        from_level: u8,
        to_level: u8,
        caller: &CallerContext,
        reason: Option<String>,
    ) -> NewAuditEntry {
        let (actor_type, actor_id) = actor_fields(caller);
        NewAuditEntry {
            entity_type: EntityType::Escalation,
            entity_id: complaint_id,
            action: AuditAction::Escalation,
            old_value: Some(from_level.to_string()),
            new_value: Some(to_level.to_string()),
            actor_type,
            actor_id,
            reason,
        }
    }

    pub fn record_assignment(
        &self,
        complaint_id: i64,
        old_assignee: Option<i64>,
        new_assignee: i64,
        caller: &CallerContext,
        reason: Option<String>,
    ) -> NewAuditEntry {
        let (actor_type, actor_id) = actor_fields(caller);
        NewAuditEntry {
            entity_type: EntityType::Complaint,
            entity_id: complaint_id,
            action: AuditAction::Assignment,
            old_value: old_assignee.map(|v| v.to_string()),
            new_value: Some(new_assignee.to_string()),
            actor_type,
            actor_id,
            reason,
        }
    }

    pub async fn history_for(
        &self,
        entity_type: EntityType,
        entity_id: i64,
    ) -> Result<Vec<grievance_domain_models::AuditLog>, CoreError> {
        Ok(self.audit_log.find_by_entity(entity_type, entity_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use grievance_domain_models::AuditLog;
    use grievance_domain_repository::RepoError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingAuditLog {
        entries: Mutex<Vec<NewAuditEntry>>,
    }

    #[async_trait]
    impl AuditLogRepository for RecordingAuditLog {
        async fn insert(&self, entry: NewAuditEntry) -> Result<AuditLog, RepoError> {
            let now = Utc::now();
            let row = AuditLog {
                id: 1,
                entity_type: entry.entity_type,
                entity_id: entry.entity_id,
                action: entry.action,
                old_value: entry.old_value.clone(),
                new_value: entry.new_value.clone(),
                actor_type: entry.actor_type,
                actor_id: entry.actor_id,
                reason: entry.reason.clone(),
                created_at: now,
            };
            self.entries.lock().unwrap().push(entry);
            Ok(row)
        }

        async fn find_by_entity(
            &self,
            _entity_type: EntityType,
            _entity_id: i64,
        ) -> Result<Vec<AuditLog>, RepoError> {
            Ok(vec![])
        }

        async fn find_by_action(&self, _action: AuditAction) -> Result<Vec<AuditLog>, RepoError> {
            Ok(vec![])
        }

        async fn find_by_actor(&self, _actor_id: i64) -> Result<Vec<AuditLog>, RepoError> {
            Ok(vec![])
        }

        async fn find_by_action_in_window(
            &self,
            _action: AuditAction,
            _from: DateTime<Utc>,
            _to: DateTime<Utc>,
        ) -> Result<Vec<AuditLog>, RepoError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn system_caller_records_null_actor_id() {
        let repo = Arc::new(RecordingAuditLog::default());
        let recorder = AuditRecorder::new(repo.clone());
        recorder
            .record(
                EntityType::Complaint,
                1,
                AuditAction::Create,
                None,
                Some("FILED".into()),
                &CallerContext::system(),
                None,
            )
            .await
            .unwrap();
        let entries = repo.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].actor_type, ActorType::System);
        assert_eq!(entries[0].actor_id, None);
    }

    #[test]
    fn state_change_entry_carries_wire_values() {
        let repo = Arc::new(RecordingAuditLog::default());
        let recorder = AuditRecorder::new(repo);
        let entry = recorder.record_state_change(
            7,
            Status::Filed,
            Status::InProgress,
            &CallerContext::admin(1),
            None,
        );
        assert_eq!(entry.old_value.as_deref(), Some("FILED"));
        assert_eq!(entry.new_value.as_deref(), Some("IN_PROGRESS"));
        assert_eq!(entry.actor_id, Some(1));
    }
}
