//! [libs/infra/db/src/repositories/audit_log.rs]

use crate::client::DbClient;
use crate::errors::DbError;
use crate::mapping::{from_text, to_text};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use grievance_domain_models::audit_log::ActorType;
use grievance_domain_models::enums::{AuditAction, EntityType};
use grievance_domain_models::AuditLog;
use grievance_domain_repository::{AuditLogRepository, NewAuditEntry, RepoError};
use libsql::params;
use std::str::FromStr;

pub struct AuditLogRepositoryImpl {
    client: DbClient,
}

impl AuditLogRepositoryImpl {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }
}

const COLUMNS: &str = "id, entity_type, entity_id, action, old_value, new_value, \
     actor_type, actor_id, reason, created_at";

fn actor_type_from_wire(value: &str) -> Result<ActorType, DbError> {
    match value {
        "USER" => Ok(ActorType::User),
        "SYSTEM" => Ok(ActorType::System),
        other => Err(DbError::Mapping(format!("invalid actor_type '{other}'"))),
    }
}

fn row_to_entry(row: &libsql::Row) -> Result<AuditLog, DbError> {
    let entity_type: String = row.get(1)?;
    let action: String = row.get(3)?;
    let actor_type: String = row.get(6)?;
    let created_at: String = row.get(9)?;
    Ok(AuditLog {
        id: row.get(0)?,
        entity_type: EntityType::from_str(&entity_type).map_err(DbError::Mapping)?,
        entity_id: row.get(2)?,
        action: AuditAction::from_str(&action).map_err(DbError::Mapping)?,
        old_value: row.get(4)?,
        new_value: row.get(5)?,
        actor_type: actor_type_from_wire(&actor_type)?,
        actor_id: row.get(7)?,
        reason: row.get(8)?,
        created_at: from_text(&created_at)?,
    })
}

#[async_trait]
impl AuditLogRepository for AuditLogRepositoryImpl {
    async fn insert(&self, entry: NewAuditEntry) -> Result<AuditLog, RepoError> {
        let conn = self.client.connection()?;
        let created_at = to_text(Utc::now());
        conn.execute(
            "INSERT INTO audit_log \
             (entity_type, entity_id, action, old_value, new_value, actor_type, actor_id, reason, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                entry.entity_type.as_wire(),
                entry.entity_id,
                entry.action.as_wire(),
                entry.old_value.clone(),
                entry.new_value.clone(),
                entry.actor_type.as_wire(),
                entry.actor_id,
                entry.reason.clone(),
                created_at.clone()
            ],
        )
        .await
        .map_err(DbError::from)?;
        let id = conn.last_insert_rowid();
        let mut rows = conn
            .query(
                &format!("SELECT {COLUMNS} FROM audit_log WHERE id = ?1"),
                params![id],
            )
            .await
            .map_err(DbError::from)?;
        let row = rows
            .next()
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| RepoError::NotFound(format!("audit_log {id}")))?;
        Ok(row_to_entry(&row)?)
    }

    async fn find_by_entity(
        &self,
        entity_type: EntityType,
        entity_id: i64,
    ) -> Result<Vec<AuditLog>, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {COLUMNS} FROM audit_log WHERE entity_type = ?1 AND entity_id = ?2 ORDER BY created_at ASC"
                ),
                params![entity_type.as_wire(), entity_id],
            )
            .await
            .map_err(DbError::from)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(DbError::from)? {
            out.push(row_to_entry(&row)?);
        }
        Ok(out)
    }

    async fn find_by_action(&self, action: AuditAction) -> Result<Vec<AuditLog>, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                &format!("SELECT {COLUMNS} FROM audit_log WHERE action = ?1 ORDER BY created_at ASC"),
                params![action.as_wire()],
            )
            .await
            .map_err(DbError::from)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(DbError::from)? {
            out.push(row_to_entry(&row)?);
        }
        Ok(out)
    }

    async fn find_by_actor(&self, actor_id: i64) -> Result<Vec<AuditLog>, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                &format!("SELECT {COLUMNS} FROM audit_log WHERE actor_id = ?1 ORDER BY created_at ASC"),
                params![actor_id],
            )
            .await
            .map_err(DbError::from)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(DbError::from)? {
            out.push(row_to_entry(&row)?);
        }
        Ok(out)
    }

    async fn find_by_action_in_window(
        &self,
        action: AuditAction,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AuditLog>, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {COLUMNS} FROM audit_log \
                     WHERE action = ?1 AND created_at >= ?2 AND created_at < ?3 \
                     ORDER BY created_at ASC"
                ),
                params![action.as_wire(), to_text(from), to_text(to)],
            )
            .await
            .map_err(DbError::from)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(DbError::from)? {
            out.push(row_to_entry(&row)?);
        }
        Ok(out)
    }
}
