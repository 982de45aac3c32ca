//! [libs/domain/repository/src/recipient_directory.rs]
//!
//! Escalation and dispute notifications (§4.4, §4.9) must address a
//! concrete `user_id`, but the data model in §3 treats departments and
//! users as opaque ids owned by a platform this crate does not model.
//! This is the narrow lookup seam that bridges the two: "who holds the
//! DEPT_HEAD seat for this department" and "who is the on-duty municipal
//! commissioner" are read from wherever that platform publishes them, not
//! computed here.

use crate::error::RepoError;
use async_trait::async_trait;

#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    /// The user_id holding the DEPT_HEAD seat for `department_id`, if any
    /// is currently assigned.
    async fn dept_head_for_department(&self, department_id: i64) -> Result<Option<i64>, RepoError>;

    /// The user_id of the on-duty municipal commissioner, if configured.
    async fn commissioner(&self) -> Result<Option<i64>, RepoError>;
}
