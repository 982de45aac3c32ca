//! [libs/domain/repository/src/notification.rs]

use crate::error::RepoError;
use async_trait::async_trait;
use grievance_domain_models::enums::NotificationType;
use grievance_domain_models::Notification;

/// Everything needed to insert one notification, minus the identity and
/// read-state the repository assigns (a freshly sent notification is
/// always unread).
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: i64,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub complaint_id: Option<i64>,
    pub link: Option<String>,
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert(&self, notification: NewNotification) -> Result<Notification, RepoError>;

    /// By `user_id`, ordered by `created_at` descending (§4.10).
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Notification>, RepoError>;

    async fn find_unread_by_user(&self, user_id: i64) -> Result<Vec<Notification>, RepoError>;

    async fn unread_count(&self, user_id: i64) -> Result<i64, RepoError>;

    async fn find_by_user_and_complaint(
        &self,
        user_id: i64,
        complaint_id: i64,
    ) -> Result<Vec<Notification>, RepoError>;

    /// I-N1: sets both `is_read` and `read_at` together. Fails with
    /// `RepoError::NotFound` if `id` does not belong to `user_id` (§4.4:
    /// "user_id must match").
    async fn mark_read(&self, id: i64, user_id: i64) -> Result<(), RepoError>;

    /// Returns the number of rows marked read.
    async fn mark_all_read(&self, user_id: i64) -> Result<i64, RepoError>;

    async fn mark_read_for_complaint(
        &self,
        user_id: i64,
        complaint_id: i64,
    ) -> Result<i64, RepoError>;
}
