//! [libs/domain/notification/src/lib.rs]
//!
//! Notification Dispatcher (§4.4). Delivery is best-effort and runs in an
//! independent failure domain from the business transaction: a caller
//! hands a job to the dispatcher after its transaction has committed, the
//! dispatcher queues it, and a background worker persists it through
//! `NotificationRepository`. A full queue drops the incoming job rather
//! than blocking the caller or the business transaction (§9 design note
//! permits either drop-oldest or drop-incoming; this is drop-incoming).

use grievance_domain_models::enums::NotificationType;
use grievance_domain_repository::{NewNotification, NotificationRepository};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};

/// One notification job, queued after its triggering transaction commits.
#[derive(Debug, Clone)]
pub struct NotificationJob {
    pub user_id: i64,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub complaint_id: Option<i64>,
    pub link: Option<String>,
}

impl From<NotificationJob> for NewNotification {
    fn from(job: NotificationJob) -> Self {
        NewNotification {
            user_id: job.user_id,
            notification_type: job.notification_type,
            title: job.title,
            message: job.message,
            complaint_id: job.complaint_id,
            link: job.link,
        }
    }
}

/// A bounded, drop-incoming queue in front of the repository. `dispatch` is
/// synchronous and infallible from the caller's point of view: a full
/// queue logs a warning and discards the job that was about to be queued
/// rather than ever propagating backpressure into the business
/// transaction.
#[derive(Clone)]
pub struct NotificationDispatcher {
    sender: mpsc::Sender<NotificationJob>,
}

impl NotificationDispatcher {
    /// Spawns the worker loop on the current Tokio runtime and returns a
    /// handle to queue jobs onto it. `capacity` bounds how many
    /// unconsumed jobs may sit in the queue at once.
    pub fn spawn(repository: Arc<dyn NotificationRepository>, capacity: usize) -> Self {
        let (sender, mut receiver) = mpsc::channel::<NotificationJob>(capacity);

        tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                let user_id = job.user_id;
                let notification_type = job.notification_type;
                if let Err(err) = repository.insert(job.into()).await {
                    error!(
                        user_id,
                        %notification_type,
                        error = %err,
                        "failed to persist notification; dropping, best-effort delivery only"
                    );
                }
            }
        });

        Self { sender }
    }

    /// Queues `job` for delivery. Never blocks: a saturated queue drops
    /// the incoming job and logs a warning rather than applying
    /// backpressure.
    pub fn dispatch(&self, job: NotificationJob) {
        if let Err(mpsc::error::TrySendError::Full(job)) = self.sender.try_send(job) {
            warn!(
                user_id = job.user_id,
                notification_type = %job.notification_type,
                "notification queue full, dropping incoming job"
            );
        }
    }
}

/// Recipient resolution for an escalation at `level` (§4.4): L0 has no
/// recipient, L1 goes to a department head, L2 to a commissioner. The
/// concrete user_id lookup (which dept head, which commissioner) is a
/// repository concern performed by the caller before building the job.
pub use grievance_domain_models::enums::EscalationLevel;

pub fn escalation_recipient_role(
    level: EscalationLevel,
) -> Option<grievance_domain_models::enums::Role> {
    level.responsible_role()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use grievance_domain_models::Notification;
    use grievance_domain_repository::RepoError;
    use std::sync::Mutex;

    struct RecordingRepository {
        inserted: Mutex<Vec<NewNotification>>,
    }

    #[async_trait]
    impl NotificationRepository for RecordingRepository {
        async fn insert(&self, notification: NewNotification) -> Result<Notification, RepoError> {
            self.inserted.lock().unwrap().push(notification.clone());
            Ok(Notification {
                id: 1,
                user_id: notification.user_id,
                notification_type: notification.notification_type,
                title: notification.title,
                message: notification.message,
                complaint_id: notification.complaint_id,
                link: notification.link,
                is_read: false,
                read_at: None,
                created_at: chrono::Utc::now(),
            })
        }
        async fn find_by_user(&self, _user_id: i64) -> Result<Vec<Notification>, RepoError> {
            Ok(vec![])
        }
        async fn find_unread_by_user(&self, _user_id: i64) -> Result<Vec<Notification>, RepoError> {
            Ok(vec![])
        }
        async fn unread_count(&self, _user_id: i64) -> Result<i64, RepoError> {
            Ok(0)
        }
        async fn find_by_user_and_complaint(
            &self,
            _user_id: i64,
            _complaint_id: i64,
        ) -> Result<Vec<Notification>, RepoError> {
            Ok(vec![])
        }
        async fn mark_read(&self, _id: i64, _user_id: i64) -> Result<(), RepoError> {
            Ok(())
        }
        async fn mark_all_read(&self, _user_id: i64) -> Result<i64, RepoError> {
            Ok(0)
        }
        async fn mark_read_for_complaint(
            &self,
            _user_id: i64,
            _complaint_id: i64,
        ) -> Result<i64, RepoError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn dispatch_persists_through_repository() {
        let repo = Arc::new(RecordingRepository {
            inserted: Mutex::new(vec![]),
        });
        let dispatcher = NotificationDispatcher::spawn(repo.clone(), 8);

        dispatcher.dispatch(NotificationJob {
            user_id: 42,
            notification_type: NotificationType::EscalationAlert,
            title: "Escalated".into(),
            message: "Complaint escalated to L1".into(),
            complaint_id: Some(7),
            link: None,
        });

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(repo.inserted.lock().unwrap().len(), 1);
    }

    #[test]
    fn recipient_resolution_matches_level() {
        use grievance_domain_models::enums::Role;
        assert_eq!(escalation_recipient_role(EscalationLevel::L0), None);
        assert_eq!(
            escalation_recipient_role(EscalationLevel::L1),
            Some(Role::DeptHead)
        );
        assert_eq!(
            escalation_recipient_role(EscalationLevel::L2),
            Some(Role::Commissioner)
        );
    }
}
