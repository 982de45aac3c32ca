//! [libs/domain/models/src/citizen_signoff.rs]

use chrono::{DateTime, Utc};

/// A citizen's response to a RESOLVED complaint: either an acceptance
/// (`is_accepted = true`) or a dispute (`is_accepted = false`). I-S1..I-S3
/// are enforced by `DisputeWorkflow` and `ComplaintStateService`, not by
/// this struct — a complaint may accumulate many rows over its lifetime
/// (I-S2: a rejection followed later by an acceptance is legal).
#[derive(Debug, Clone, PartialEq)]
pub struct CitizenSignoff {
    pub id: i64,
    pub complaint_id: i64,
    pub citizen_id: i64,
    pub is_accepted: bool,
    pub rating: Option<u8>,
    pub feedback: Option<String>,
    pub dispute_reason: Option<String>,
    pub dispute_image_reference: Option<String>,
    pub signed_off_at: DateTime<Utc>,
    pub dispute_approved: Option<bool>,
    pub dispute_approved_by: Option<i64>,
    pub dispute_reviewed_at: Option<DateTime<Utc>>,
    pub dispute_rejection_reason: Option<String>,
}

impl CitizenSignoff {
    /// I-S3: at most one *pending* dispute per complaint. A signoff is a
    /// pending dispute when it rejects the resolution and has not yet been
    /// reviewed by a department head.
    pub fn is_pending_dispute(&self) -> bool {
        !self.is_accepted && self.dispute_approved.is_none()
    }
}
