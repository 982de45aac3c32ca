//! [libs/infra/db/src/repositories/citizen_signoff.rs]

use crate::client::DbClient;
use crate::errors::DbError;
use crate::mapping::{from_text, opt_from_text, opt_to_text, to_text};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use grievance_domain_models::CitizenSignoff;
use grievance_domain_repository::{CitizenSignoffRepository, RepoError};
use libsql::params;

pub struct CitizenSignoffRepositoryImpl {
    client: DbClient,
}

impl CitizenSignoffRepositoryImpl {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }
}

const COLUMNS: &str = "id, complaint_id, citizen_id, is_accepted, rating, feedback, \
     dispute_reason, dispute_image_reference, signed_off_at, dispute_approved, \
     dispute_approved_by, dispute_reviewed_at, dispute_rejection_reason";

fn row_to_signoff(row: &libsql::Row) -> Result<CitizenSignoff, DbError> {
    let signed_off_at: String = row.get(8)?;
    let dispute_reviewed_at: Option<String> = row.get(11)?;
    Ok(CitizenSignoff {
        id: row.get(0)?,
        complaint_id: row.get(1)?,
        citizen_id: row.get(2)?,
        is_accepted: row.get(3)?,
        rating: row.get::<Option<i64>>(4)?.map(|v| v as u8),
        feedback: row.get(5)?,
        dispute_reason: row.get(6)?,
        dispute_image_reference: row.get(7)?,
        signed_off_at: from_text(&signed_off_at)?,
        dispute_approved: row.get(9)?,
        dispute_approved_by: row.get(10)?,
        dispute_reviewed_at: opt_from_text(dispute_reviewed_at)?,
        dispute_rejection_reason: row.get(12)?,
    })
}

#[async_trait]
impl CitizenSignoffRepository for CitizenSignoffRepositoryImpl {
    async fn find_by_id(&self, id: i64) -> Result<Option<CitizenSignoff>, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                &format!("SELECT {COLUMNS} FROM citizen_signoff WHERE id = ?1"),
                params![id],
            )
            .await
            .map_err(DbError::from)?;
        match rows.next().await.map_err(DbError::from)? {
            Some(row) => Ok(Some(row_to_signoff(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_complaint(&self, complaint_id: i64) -> Result<Vec<CitizenSignoff>, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {COLUMNS} FROM citizen_signoff WHERE complaint_id = ?1 ORDER BY signed_off_at ASC"
                ),
                params![complaint_id],
            )
            .await
            .map_err(DbError::from)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(DbError::from)? {
            out.push(row_to_signoff(&row)?);
        }
        Ok(out)
    }

    /// I-S3 is enforced by `idx_citizen_signoff_pending_dispute_unique`
    /// (§5, §6): two concurrent dispute inserts for the same complaint
    /// cannot both succeed, mirroring how `EscalationEventRepositoryImpl`
    /// handles the analogous I-E2 collision.
    async fn insert(&self, signoff: &CitizenSignoff) -> Result<i64, RepoError> {
        let conn = self.client.connection()?;
        let result = conn
            .execute(
                "INSERT INTO citizen_signoff \
                 (complaint_id, citizen_id, is_accepted, rating, feedback, dispute_reason, \
                  dispute_image_reference, signed_off_at, dispute_approved, dispute_approved_by, \
                  dispute_reviewed_at, dispute_rejection_reason) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    signoff.complaint_id,
                    signoff.citizen_id,
                    signoff.is_accepted,
                    signoff.rating.map(|r| r as i64),
                    signoff.feedback.clone(),
                    signoff.dispute_reason.clone(),
                    signoff.dispute_image_reference.clone(),
                    to_text(signoff.signed_off_at),
                    signoff.dispute_approved,
                    signoff.dispute_approved_by,
                    opt_to_text(signoff.dispute_reviewed_at),
                    signoff.dispute_rejection_reason.clone()
                ],
            )
            .await;

        match result {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(libsql::Error::SqliteFailure(_, ref message))
                if message.to_lowercase().contains("unique") =>
            {
                Err(RepoError::Conflict(format!(
                    "complaint {} already has a pending dispute",
                    signoff.complaint_id
                )))
            }
            Err(err) => Err(DbError::from(err).into()),
        }
    }

    async fn exists_accepted_for(&self, complaint_id: i64) -> Result<bool, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                "SELECT 1 FROM citizen_signoff WHERE complaint_id = ?1 AND is_accepted = 1 LIMIT 1",
                params![complaint_id],
            )
            .await
            .map_err(DbError::from)?;
        Ok(rows.next().await.map_err(DbError::from)?.is_some())
    }

    async fn find_pending_dispute(
        &self,
        complaint_id: i64,
    ) -> Result<Option<CitizenSignoff>, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {COLUMNS} FROM citizen_signoff \
                     WHERE complaint_id = ?1 AND is_accepted = 0 AND dispute_approved IS NULL \
                     ORDER BY signed_off_at DESC LIMIT 1"
                ),
                params![complaint_id],
            )
            .await
            .map_err(DbError::from)?;
        match rows.next().await.map_err(DbError::from)? {
            Some(row) => Ok(Some(row_to_signoff(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_pending_disputes_by_department(
        &self,
        department_id: i64,
    ) -> Result<Vec<CitizenSignoff>, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {cols} FROM citizen_signoff s \
                     JOIN complaint c ON c.id = s.complaint_id \
                     WHERE c.department_id = ?1 AND s.is_accepted = 0 AND s.dispute_approved IS NULL \
                     ORDER BY s.signed_off_at ASC",
                    cols = COLUMNS
                        .split(", ")
                        .map(|c| format!("s.{c}"))
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
                params![department_id],
            )
            .await
            .map_err(DbError::from)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(DbError::from)? {
            out.push(row_to_signoff(&row)?);
        }
        Ok(out)
    }

    async fn review_dispute(
        &self,
        signoff_id: i64,
        approved: bool,
        approved_by: i64,
        rejection_reason: Option<String>,
        reviewed_at: DateTime<Utc>,
    ) -> Result<CitizenSignoff, RepoError> {
        let conn = self.client.connection()?;
        let affected = conn
            .execute(
                "UPDATE citizen_signoff SET dispute_approved = ?2, dispute_approved_by = ?3, \
                 dispute_reviewed_at = ?4, dispute_rejection_reason = ?5 \
                 WHERE id = ?1 AND dispute_approved IS NULL",
                params![
                    signoff_id,
                    approved,
                    approved_by,
                    to_text(reviewed_at),
                    rejection_reason
                ],
            )
            .await
            .map_err(DbError::from)?;
        if affected == 0 {
            return Err(RepoError::Conflict(format!(
                "dispute {signoff_id} is no longer pending"
            )));
        }
        self.find_by_id(signoff_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("signoff {signoff_id} does not exist")))
    }
}
