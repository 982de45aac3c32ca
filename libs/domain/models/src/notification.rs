//! [libs/domain/models/src/notification.rs]

use crate::enums::NotificationType;
use chrono::{DateTime, Utc};

/// A mutable, user-facing awareness alert (§3). I-N1: `read_at` is
/// non-null iff `is_read` is true.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub complaint_id: Option<i64>,
    pub link: Option<String>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
