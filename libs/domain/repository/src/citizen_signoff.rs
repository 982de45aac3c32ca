//! [libs/domain/repository/src/citizen_signoff.rs]

use crate::error::RepoError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use grievance_domain_models::CitizenSignoff;

#[async_trait]
pub trait CitizenSignoffRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<CitizenSignoff>, RepoError>;

    async fn find_by_complaint(&self, complaint_id: i64) -> Result<Vec<CitizenSignoff>, RepoError>;

    /// I-S1 (citizen_id must equal the complaint's owner) is checked by the
    /// caller before this insert, not here. I-S3 (at most one pending
    /// dispute per complaint) is enforced by a partial unique index on
    /// `(complaint_id)` restricted to pending disputes; a concurrent
    /// second dispute insert fails with `RepoError::Conflict` rather than
    /// succeeding.
    async fn insert(&self, signoff: &CitizenSignoff) -> Result<i64, RepoError>;

    /// Guard for `RESOLVED -> CLOSED` by a citizen (§4.2).
    async fn exists_accepted_for(&self, complaint_id: i64) -> Result<bool, RepoError>;

    /// I-S3: at most one pending dispute per complaint.
    async fn find_pending_dispute(
        &self,
        complaint_id: i64,
    ) -> Result<Option<CitizenSignoff>, RepoError>;

    /// Every pending dispute for complaints belonging to `department_id`,
    /// for a department head's review queue.
    async fn find_pending_disputes_by_department(
        &self,
        department_id: i64,
    ) -> Result<Vec<CitizenSignoff>, RepoError>;

    /// Atomically mark a pending dispute reviewed (§4.9). Fails with
    /// `RepoError::Conflict` if the signoff is no longer pending.
    async fn review_dispute(
        &self,
        signoff_id: i64,
        approved: bool,
        approved_by: i64,
        rejection_reason: Option<String>,
        reviewed_at: DateTime<Utc>,
    ) -> Result<CitizenSignoff, RepoError>;
}
