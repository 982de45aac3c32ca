//! [libs/infra/db/src/repositories/notification.rs]

use crate::client::DbClient;
use crate::errors::DbError;
use crate::mapping::{opt_from_text, to_text};
use async_trait::async_trait;
use chrono::Utc;
use grievance_domain_models::enums::NotificationType;
use grievance_domain_models::Notification;
use grievance_domain_repository::{NewNotification, NotificationRepository, RepoError};
use libsql::params;
use std::str::FromStr;

pub struct NotificationRepositoryImpl {
    client: DbClient,
}

impl NotificationRepositoryImpl {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }
}

const COLUMNS: &str = "id, user_id, notification_type, title, message, complaint_id, link, \
     is_read, read_at, created_at";

fn row_to_notification(row: &libsql::Row) -> Result<Notification, DbError> {
    let notification_type: String = row.get(2)?;
    let read_at: Option<String> = row.get(8)?;
    let created_at: String = row.get(9)?;
    Ok(Notification {
        id: row.get(0)?,
        user_id: row.get(1)?,
        notification_type: NotificationType::from_str(&notification_type)
            .map_err(DbError::Mapping)?,
        title: row.get(3)?,
        message: row.get(4)?,
        complaint_id: row.get(5)?,
        link: row.get(6)?,
        is_read: row.get(7)?,
        read_at: opt_from_text(read_at)?,
        created_at: crate::mapping::from_text(&created_at)?,
    })
}

#[async_trait]
impl NotificationRepository for NotificationRepositoryImpl {
    async fn insert(&self, notification: NewNotification) -> Result<Notification, RepoError> {
        let conn = self.client.connection()?;
        conn.execute(
            "INSERT INTO notification \
             (user_id, notification_type, title, message, complaint_id, link, is_read, read_at, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, NULL, ?7)",
            params![
                notification.user_id,
                notification.notification_type.as_wire(),
                notification.title.clone(),
                notification.message.clone(),
                notification.complaint_id,
                notification.link.clone(),
                to_text(Utc::now())
            ],
        )
        .await
        .map_err(DbError::from)?;
        let id = conn.last_insert_rowid();
        let mut rows = conn
            .query(
                &format!("SELECT {COLUMNS} FROM notification WHERE id = ?1"),
                params![id],
            )
            .await
            .map_err(DbError::from)?;
        let row = rows
            .next()
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| RepoError::NotFound(format!("notification {id}")))?;
        Ok(row_to_notification(&row)?)
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Notification>, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {COLUMNS} FROM notification WHERE user_id = ?1 ORDER BY created_at DESC"
                ),
                params![user_id],
            )
            .await
            .map_err(DbError::from)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(DbError::from)? {
            out.push(row_to_notification(&row)?);
        }
        Ok(out)
    }

    async fn find_unread_by_user(&self, user_id: i64) -> Result<Vec<Notification>, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {COLUMNS} FROM notification WHERE user_id = ?1 AND is_read = 0 ORDER BY created_at DESC"
                ),
                params![user_id],
            )
            .await
            .map_err(DbError::from)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(DbError::from)? {
            out.push(row_to_notification(&row)?);
        }
        Ok(out)
    }

    async fn unread_count(&self, user_id: i64) -> Result<i64, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                "SELECT COUNT(*) FROM notification WHERE user_id = ?1 AND is_read = 0",
                params![user_id],
            )
            .await
            .map_err(DbError::from)?;
        let row = rows
            .next()
            .await
            .map_err(DbError::from)?
            .expect("COUNT(*) always returns one row");
        Ok(row.get(0).map_err(DbError::from)?)
    }

    async fn find_by_user_and_complaint(
        &self,
        user_id: i64,
        complaint_id: i64,
    ) -> Result<Vec<Notification>, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {COLUMNS} FROM notification \
                     WHERE user_id = ?1 AND complaint_id = ?2 ORDER BY created_at DESC"
                ),
                params![user_id, complaint_id],
            )
            .await
            .map_err(DbError::from)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(DbError::from)? {
            out.push(row_to_notification(&row)?);
        }
        Ok(out)
    }

    async fn mark_read(&self, id: i64, user_id: i64) -> Result<(), RepoError> {
        let conn = self.client.connection()?;
        let affected = conn
            .execute(
                "UPDATE notification SET is_read = 1, read_at = ?3 \
                 WHERE id = ?1 AND user_id = ?2 AND is_read = 0",
                params![id, user_id, to_text(Utc::now())],
            )
            .await
            .map_err(DbError::from)?;
        if affected == 0 {
            let mut rows = conn
                .query(
                    "SELECT 1 FROM notification WHERE id = ?1 AND user_id = ?2",
                    params![id, user_id],
                )
                .await
                .map_err(DbError::from)?;
            if rows.next().await.map_err(DbError::from)?.is_none() {
                return Err(RepoError::NotFound(format!(
                    "notification {id} does not belong to user {user_id}"
                )));
            }
        }
        Ok(())
    }

    async fn mark_all_read(&self, user_id: i64) -> Result<i64, RepoError> {
        let conn = self.client.connection()?;
        let affected = conn
            .execute(
                "UPDATE notification SET is_read = 1, read_at = ?2 WHERE user_id = ?1 AND is_read = 0",
                params![user_id, to_text(Utc::now())],
            )
            .await
            .map_err(DbError::from)?;
        Ok(affected as i64)
    }

    async fn mark_read_for_complaint(
        &self,
        user_id: i64,
        complaint_id: i64,
    ) -> Result<i64, RepoError> {
        let conn = self.client.connection()?;
        let affected = conn
            .execute(
                "UPDATE notification SET is_read = 1, read_at = ?3 \
                 WHERE user_id = ?1 AND complaint_id = ?2 AND is_read = 0",
                params![user_id, complaint_id, to_text(Utc::now())],
            )
            .await
            .map_err(DbError::from)?;
        Ok(affected as i64)
    }
}
