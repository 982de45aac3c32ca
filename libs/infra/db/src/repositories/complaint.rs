//! [libs/infra/db/src/repositories/complaint.rs]

use crate::client::DbClient;
use crate::errors::DbError;
use crate::mapping::{from_text, opt_from_text, opt_to_text, to_text};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use grievance_domain_models::enums::{Priority, Status};
use grievance_domain_models::Complaint;
use grievance_domain_repository::audit_log::NewAuditEntry;
use grievance_domain_repository::complaint::{RoutingDecision, StatusCount};
use grievance_domain_repository::{ComplaintRepository, RepoError};
use libsql::{params, Connection};
use std::str::FromStr;

pub struct ComplaintRepositoryImpl {
    client: DbClient,
}

impl ComplaintRepositoryImpl {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }
}

const COLUMNS: &str = "id, title, description, location, citizen_id, department_id, staff_id, \
     category_id, priority, status, escalation_level, sla_deadline, created_at, started_at, \
     resolved_at, closed_at, needs_manual_routing, ai_confidence, citizen_satisfaction";

fn row_to_complaint(row: &libsql::Row) -> Result<Complaint, DbError> {
    let priority: String = row.get(8)?;
    let status: String = row.get(9)?;
    let sla_deadline: Option<String> = row.get(11)?;
    let created_at: String = row.get(12)?;
    let started_at: Option<String> = row.get(13)?;
    let resolved_at: Option<String> = row.get(14)?;
    let closed_at: Option<String> = row.get(15)?;
    Ok(Complaint {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        location: row.get(3)?,
        citizen_id: row.get(4)?,
        department_id: row.get(5)?,
        staff_id: row.get(6)?,
        category_id: row.get(7)?,
        priority: Priority::from_str(&priority).map_err(DbError::Mapping)?,
        status: Status::from_str(&status).map_err(DbError::Mapping)?,
        escalation_level: row.get::<i64>(10)? as u8,
        sla_deadline: opt_from_text(sla_deadline)?,
        created_at: from_text(&created_at)?,
        started_at: opt_from_text(started_at)?,
        resolved_at: opt_from_text(resolved_at)?,
        closed_at: opt_from_text(closed_at)?,
        needs_manual_routing: row.get(16)?,
        ai_confidence: row.get(17)?,
        citizen_satisfaction: row.get::<Option<i64>>(18)?.map(|v| v as u8),
    })
}

async fn fetch_by_id(conn: &Connection, id: i64) -> Result<Complaint, DbError> {
    let mut rows = conn
        .query(
            &format!("SELECT {COLUMNS} FROM complaint WHERE id = ?1"),
            params![id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DbError::NotFound(format!("complaint {id}")))?;
    row_to_complaint(&row)
}

/// Writes one audit row against an open transaction (or any `Connection`,
/// since `libsql::Transaction` derefs to it) — shared by every write here
/// that must land its business mutation and its audit row in one commit
/// (§4.3).
async fn insert_audit(conn: &Connection, entry: &NewAuditEntry) -> Result<(), DbError> {
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
            to_text(Utc::now())
        ],
    )
    .await?;
    Ok(())
}

#[async_trait]
impl ComplaintRepository for ComplaintRepositoryImpl {
    async fn find_by_id(&self, id: i64) -> Result<Option<Complaint>, RepoError> {
        let conn = self.client.connection()?;
        match fetch_by_id(&conn, id).await {
            Ok(complaint) => Ok(Some(complaint)),
            Err(DbError::NotFound(_)) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn insert(&self, complaint: &Complaint) -> Result<i64, RepoError> {
        let conn = self.client.connection()?;
        conn.execute(
            "INSERT INTO complaint \
             (title, description, location, citizen_id, department_id, staff_id, category_id, \
              priority, status, escalation_level, sla_deadline, created_at, started_at, \
              resolved_at, closed_at, needs_manual_routing, ai_confidence, citizen_satisfaction) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
            params![
                complaint.title.clone(),
                complaint.description.clone(),
                complaint.location.clone(),
                complaint.citizen_id,
                complaint.department_id,
                complaint.staff_id,
                complaint.category_id,
                complaint.priority.as_wire(),
                complaint.status.as_wire(),
                complaint.escalation_level as i64,
                opt_to_text(complaint.sla_deadline),
                to_text(complaint.created_at),
                opt_to_text(complaint.started_at),
                opt_to_text(complaint.resolved_at),
                opt_to_text(complaint.closed_at),
                complaint.needs_manual_routing,
                complaint.ai_confidence,
                complaint.citizen_satisfaction.map(|v| v as i64)
            ],
        )
        .await
        .map_err(DbError::from)?;
        Ok(conn.last_insert_rowid())
    }

    async fn find_active(&self) -> Result<Vec<Complaint>, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {COLUMNS} FROM complaint \
                     WHERE status NOT IN ('CLOSED', 'CANCELLED') AND sla_deadline IS NOT NULL \
                     ORDER BY sla_deadline ASC"
                ),
                (),
            )
            .await
            .map_err(DbError::from)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(DbError::from)? {
            out.push(row_to_complaint(&row)?);
        }
        Ok(out)
    }

    async fn find_by_citizen(&self, citizen_id: i64) -> Result<Vec<Complaint>, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {COLUMNS} FROM complaint WHERE citizen_id = ?1 ORDER BY created_at DESC"
                ),
                params![citizen_id],
            )
            .await
            .map_err(DbError::from)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(DbError::from)? {
            out.push(row_to_complaint(&row)?);
        }
        Ok(out)
    }

    async fn find_by_staff(&self, staff_id: i64) -> Result<Vec<Complaint>, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {COLUMNS} FROM complaint WHERE staff_id = ?1 ORDER BY created_at DESC"
                ),
                params![staff_id],
            )
            .await
            .map_err(DbError::from)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(DbError::from)? {
            out.push(row_to_complaint(&row)?);
        }
        Ok(out)
    }

    async fn find_by_department(&self, department_id: i64) -> Result<Vec<Complaint>, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {COLUMNS} FROM complaint WHERE department_id = ?1 ORDER BY created_at DESC"
                ),
                params![department_id],
            )
            .await
            .map_err(DbError::from)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(DbError::from)? {
            out.push(row_to_complaint(&row)?);
        }
        Ok(out)
    }

    async fn find_unassigned_active_by_department(
        &self,
        department_id: i64,
    ) -> Result<Vec<Complaint>, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {COLUMNS} FROM complaint \
                     WHERE department_id = ?1 AND staff_id IS NULL \
                     AND status NOT IN ('CLOSED', 'CANCELLED') \
                     ORDER BY created_at ASC"
                ),
                params![department_id],
            )
            .await
            .map_err(DbError::from)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(DbError::from)? {
            out.push(row_to_complaint(&row)?);
        }
        Ok(out)
    }

    async fn find_escalated(&self) -> Result<Vec<Complaint>, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {COLUMNS} FROM complaint WHERE escalation_level > 0 ORDER BY escalation_level DESC"
                ),
                (),
            )
            .await
            .map_err(DbError::from)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(DbError::from)? {
            out.push(row_to_complaint(&row)?);
        }
        Ok(out)
    }

    async fn count_by_status(
        &self,
        department_id: Option<i64>,
    ) -> Result<Vec<StatusCount>, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = if let Some(department_id) = department_id {
            conn.query(
                "SELECT status, COUNT(*) FROM complaint WHERE department_id = ?1 GROUP BY status",
                params![department_id],
            )
            .await
        } else {
            conn.query("SELECT status, COUNT(*) FROM complaint GROUP BY status", ())
                .await
        }
        .map_err(DbError::from)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(DbError::from)? {
            let status: String = row.get(0).map_err(DbError::from)?;
            out.push(StatusCount {
                status: Status::from_str(&status).map_err(DbError::Mapping)?,
                count: row.get(1).map_err(DbError::from)?,
            });
        }
        Ok(out)
    }

    async fn apply_routing(
        &self,
        complaint_id: i64,
        decision: RoutingDecision,
        now: DateTime<Utc>,
        transition_audit: Option<NewAuditEntry>,
    ) -> Result<Complaint, RepoError> {
        let conn = self.client.connection()?;
        let tx = conn.transaction().await.map_err(DbError::from)?;

        let new_status = if transition_audit.is_some() {
            Status::InProgress.as_wire()
        } else {
            Status::Filed.as_wire()
        };
        let started_at = transition_audit.as_ref().map(|_| to_text(now));

        tx.execute(
            "UPDATE complaint SET category_id = ?2, department_id = ?3, priority = ?4, \
             sla_deadline = ?5, needs_manual_routing = ?6, status = ?7, started_at = COALESCE(?8, started_at) \
             WHERE id = ?1",
            params![
                complaint_id,
                decision.category_id,
                decision.department_id,
                decision.priority.as_wire(),
                opt_to_text(decision.sla_deadline),
                decision.needs_manual_routing,
                new_status,
                started_at
            ],
        )
        .await
        .map_err(DbError::from)?;

        if let Some(audit) = &transition_audit {
            insert_audit(&tx, audit).await?;
        }

        let complaint = fetch_by_id(&tx, complaint_id).await?;
        tx.commit().await.map_err(DbError::from)?;
        Ok(complaint)
    }

    async fn assign_department(
        &self,
        complaint_id: i64,
        department_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Complaint, RepoError> {
        let conn = self.client.connection()?;
        let affected = conn
            .execute(
                "UPDATE complaint SET department_id = ?2, needs_manual_routing = 0 WHERE id = ?1",
                params![complaint_id, department_id],
            )
            .await
            .map_err(DbError::from)?;
        let _ = now;
        if affected == 0 {
            return Err(RepoError::NotFound(format!("complaint {complaint_id}")));
        }
        Ok(fetch_by_id(&conn, complaint_id).await?)
    }

    async fn apply_state_transition(
        &self,
        complaint_id: i64,
        from: Status,
        to: Status,
        now: DateTime<Utc>,
        audit: NewAuditEntry,
    ) -> Result<Complaint, RepoError> {
        let conn = self.client.connection()?;
        let tx = conn.transaction().await.map_err(DbError::from)?;

        let started_at = matches!(to, Status::InProgress).then(|| to_text(now));
        let resolved_at = matches!(to, Status::Resolved).then(|| to_text(now));
        let closed_at = matches!(to, Status::Closed | Status::Cancelled).then(|| to_text(now));

        let affected = tx
            .execute(
                "UPDATE complaint SET status = ?3, \
                 started_at = COALESCE(?4, started_at), \
                 resolved_at = COALESCE(?5, resolved_at), \
                 closed_at = COALESCE(?6, closed_at) \
                 WHERE id = ?1 AND status = ?2",
                params![
                    complaint_id,
                    from.as_wire(),
                    to.as_wire(),
                    started_at,
                    resolved_at,
                    closed_at
                ],
            )
            .await
            .map_err(DbError::from)?;

        if affected == 0 {
            tx.rollback().await.map_err(DbError::from)?;
            return Err(RepoError::Conflict(format!(
                "complaint {complaint_id} is no longer in status {from}"
            )));
        }

        insert_audit(&tx, &audit).await?;
        let complaint = fetch_by_id(&tx, complaint_id).await?;
        tx.commit().await.map_err(DbError::from)?;
        Ok(complaint)
    }

    async fn raise_escalation_level(
        &self,
        complaint_id: i64,
        new_level: u8,
        now: DateTime<Utc>,
        audit: NewAuditEntry,
    ) -> Result<Option<Complaint>, RepoError> {
        let conn = self.client.connection()?;
        let tx = conn.transaction().await.map_err(DbError::from)?;
        let _ = now;

        let affected = tx
            .execute(
                "UPDATE complaint SET escalation_level = ?2 WHERE id = ?1 AND escalation_level < ?2",
                params![complaint_id, new_level as i64],
            )
            .await
            .map_err(DbError::from)?;

        if affected == 0 {
            tx.rollback().await.map_err(DbError::from)?;
            return Ok(None);
        }

        insert_audit(&tx, &audit).await?;
        let complaint = fetch_by_id(&tx, complaint_id).await?;
        tx.commit().await.map_err(DbError::from)?;
        Ok(Some(complaint))
    }

    async fn assign_staff(
        &self,
        complaint_id: i64,
        staff_id: i64,
        now: DateTime<Utc>,
        audit: NewAuditEntry,
    ) -> Result<Complaint, RepoError> {
        let conn = self.client.connection()?;
        let tx = conn.transaction().await.map_err(DbError::from)?;
        let _ = now;

        let affected = tx
            .execute(
                "UPDATE complaint SET staff_id = ?2 WHERE id = ?1",
                params![complaint_id, staff_id],
            )
            .await
            .map_err(DbError::from)?;

        if affected == 0 {
            tx.rollback().await.map_err(DbError::from)?;
            return Err(RepoError::NotFound(format!("complaint {complaint_id}")));
        }

        insert_audit(&tx, &audit).await?;
        let complaint = fetch_by_id(&tx, complaint_id).await?;
        tx.commit().await.map_err(DbError::from)?;
        Ok(complaint)
    }

    async fn record_citizen_satisfaction(
        &self,
        complaint_id: i64,
        rating: u8,
    ) -> Result<(), RepoError> {
        let conn = self.client.connection()?;
        let affected = conn
            .execute(
                "UPDATE complaint SET citizen_satisfaction = ?2 WHERE id = ?1",
                params![complaint_id, rating as i64],
            )
            .await
            .map_err(DbError::from)?;
        if affected == 0 {
            return Err(RepoError::NotFound(format!("complaint {complaint_id}")));
        }
        Ok(())
    }
}
