//! [libs/domain/repository/src/resolution_proof.rs]

use crate::error::RepoError;
use async_trait::async_trait;
use grievance_domain_models::ResolutionProof;

#[async_trait]
pub trait ResolutionProofRepository: Send + Sync {
    /// I-P1's existence check, consumed by the guard evaluator.
    async fn exists_for(&self, complaint_id: i64) -> Result<bool, RepoError>;

    async fn find_by_complaint(&self, complaint_id: i64) -> Result<Vec<ResolutionProof>, RepoError>;

    async fn insert(&self, proof: &ResolutionProof) -> Result<i64, RepoError>;
}
