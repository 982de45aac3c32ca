//! [libs/infra/db/src/repositories/resolution_proof.rs]

use crate::client::DbClient;
use crate::errors::DbError;
use crate::mapping::{from_text, to_text};
use async_trait::async_trait;
use grievance_domain_models::ResolutionProof;
use grievance_domain_repository::{RepoError, ResolutionProofRepository};
use libsql::params;

pub struct ResolutionProofRepositoryImpl {
    client: DbClient,
}

impl ResolutionProofRepositoryImpl {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }
}

fn row_to_proof(row: &libsql::Row) -> Result<ResolutionProof, DbError> {
    let captured_at: String = row.get(6)?;
    let created_at: String = row.get(9)?;
    Ok(ResolutionProof {
        id: row.get(0)?,
        complaint_id: row.get(1)?,
        staff_id: row.get(2)?,
        image_reference: row.get(3)?,
        latitude: row.get(4)?,
        longitude: row.get(5)?,
        captured_at: from_text(&captured_at)?,
        remarks: row.get(7)?,
        is_verified: row.get(8)?,
        created_at: from_text(&created_at)?,
    })
}

#[async_trait]
impl ResolutionProofRepository for ResolutionProofRepositoryImpl {
    async fn exists_for(&self, complaint_id: i64) -> Result<bool, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                "SELECT 1 FROM resolution_proof WHERE complaint_id = ?1 LIMIT 1",
                params![complaint_id],
            )
            .await
            .map_err(DbError::from)?;
        Ok(rows.next().await.map_err(DbError::from)?.is_some())
    }

    async fn find_by_complaint(
        &self,
        complaint_id: i64,
    ) -> Result<Vec<ResolutionProof>, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                "SELECT id, complaint_id, staff_id, image_reference, latitude, longitude, captured_at, remarks, is_verified, created_at \
                 FROM resolution_proof WHERE complaint_id = ?1 ORDER BY created_at ASC",
                params![complaint_id],
            )
            .await
            .map_err(DbError::from)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(DbError::from)? {
            out.push(row_to_proof(&row)?);
        }
        Ok(out)
    }

    async fn insert(&self, proof: &ResolutionProof) -> Result<i64, RepoError> {
        let conn = self.client.connection()?;
        conn.execute(
            "INSERT INTO resolution_proof \
             (complaint_id, staff_id, image_reference, latitude, longitude, captured_at, remarks, is_verified, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                proof.complaint_id,
                proof.staff_id,
                proof.image_reference.clone(),
                proof.latitude,
                proof.longitude,
                to_text(proof.captured_at),
                proof.remarks.clone(),
                proof.is_verified,
                to_text(proof.created_at)
            ],
        )
        .await
        .map_err(DbError::from)?;
        Ok(conn.last_insert_rowid())
    }
}
