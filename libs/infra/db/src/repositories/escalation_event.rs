//! [libs/infra/db/src/repositories/escalation_event.rs]

use crate::client::DbClient;
use crate::errors::DbError;
use crate::mapping::{from_text, to_text};
use async_trait::async_trait;
use grievance_domain_models::enums::{EscalationLevel, Role};
use grievance_domain_models::EscalationEvent;
use grievance_domain_repository::{EscalationEventRepository, NewEscalationEvent, RepoError};
use libsql::params;
use std::str::FromStr;

pub struct EscalationEventRepositoryImpl {
    client: DbClient,
}

impl EscalationEventRepositoryImpl {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }
}

const COLUMNS: &str = "id, complaint_id, previous_level, escalation_level, escalated_at, \
     escalated_to_role, reason, days_overdue, sla_deadline_snapshot, is_automated";

fn row_to_event(row: &libsql::Row) -> Result<EscalationEvent, DbError> {
    let previous_level: String = row.get(2)?;
    let escalation_level: String = row.get(3)?;
    let escalated_at: String = row.get(4)?;
    let escalated_to_role: String = row.get(5)?;
    let sla_deadline_snapshot: String = row.get(8)?;
    Ok(EscalationEvent {
        id: row.get(0)?,
        complaint_id: row.get(1)?,
        previous_level: EscalationLevel::from_str(&previous_level)
            .map_err(DbError::Mapping)?,
        escalation_level: EscalationLevel::from_str(&escalation_level)
            .map_err(DbError::Mapping)?,
        escalated_at: from_text(&escalated_at)?,
        escalated_to_role: Role::from_str(&escalated_to_role).map_err(DbError::Mapping)?,
        reason: row.get(6)?,
        days_overdue: row.get(7)?,
        sla_deadline_snapshot: from_text(&sla_deadline_snapshot)?,
        is_automated: row.get(9)?,
    })
}

#[async_trait]
impl EscalationEventRepository for EscalationEventRepositoryImpl {
    async fn exists_for(&self, complaint_id: i64, level: EscalationLevel) -> Result<bool, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                "SELECT 1 FROM escalation_event WHERE complaint_id = ?1 AND escalation_level = ?2 LIMIT 1",
                params![complaint_id, level.as_wire()],
            )
            .await
            .map_err(DbError::from)?;
        Ok(rows.next().await.map_err(DbError::from)?.is_some())
    }

    /// I-E2 is enforced by the unique index on `(complaint_id,
    /// escalation_level)` (§5, §6): a constraint violation here means a
    /// concurrent run already recorded this escalation, not a hard error.
    async fn insert_if_absent(
        &self,
        event: NewEscalationEvent,
    ) -> Result<Option<EscalationEvent>, RepoError> {
        let conn = self.client.connection()?;
        let result = conn
            .execute(
                "INSERT INTO escalation_event \
                 (complaint_id, previous_level, escalation_level, escalated_at, \
                  escalated_to_role, reason, days_overdue, sla_deadline_snapshot, is_automated) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    event.complaint_id,
                    event.previous_level.as_wire(),
                    event.escalation_level.as_wire(),
                    to_text(event.escalated_at),
                    event.escalated_to_role.as_wire(),
                    event.reason,
                    event.days_overdue,
                    to_text(event.sla_deadline_snapshot),
                    event.is_automated
                ],
            )
            .await;

        match result {
            Ok(_) => {
                let id = conn.last_insert_rowid();
                let mut rows = conn
                    .query(
                        &format!("SELECT {COLUMNS} FROM escalation_event WHERE id = ?1"),
                        params![id],
                    )
                    .await
                    .map_err(DbError::from)?;
                let row = rows
                    .next()
                    .await
                    .map_err(DbError::from)?
                    .ok_or_else(|| RepoError::NotFound(format!("escalation_event {id}")))?;
                Ok(Some(row_to_event(&row)?))
            }
            Err(libsql::Error::SqliteFailure(_, ref message))
                if message.to_lowercase().contains("unique") =>
            {
                Ok(None)
            }
            Err(err) => Err(DbError::from(err).into()),
        }
    }

    async fn history_by_complaint(&self, complaint_id: i64) -> Result<Vec<EscalationEvent>, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {COLUMNS} FROM escalation_event WHERE complaint_id = ?1 ORDER BY escalated_at ASC"
                ),
                params![complaint_id],
            )
            .await
            .map_err(DbError::from)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(DbError::from)? {
            out.push(row_to_event(&row)?);
        }
        Ok(out)
    }
}
