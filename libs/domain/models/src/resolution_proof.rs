//! [libs/domain/models/src/resolution_proof.rs]

use chrono::{DateTime, Utc};

/// Proof that staff performed work on a complaint (§3). I-P1: a complaint
/// cannot enter RESOLVED unless at least one row exists for it — enforced
/// by the guard evaluator via `ResolutionProofRepository::exists_for`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionProof {
    pub id: i64,
    pub complaint_id: i64,
    pub staff_id: i64,
    pub image_reference: String,
    pub latitude: f64,
    pub longitude: f64,
    pub captured_at: DateTime<Utc>,
    pub remarks: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}
