//! [libs/infra/db/src/repositories/recipient_directory.rs]

use crate::client::DbClient;
use crate::errors::DbError;
use async_trait::async_trait;
use grievance_domain_repository::{RecipientDirectory, RepoError};
use libsql::params;

pub struct RecipientDirectoryImpl {
    client: DbClient,
}

impl RecipientDirectoryImpl {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecipientDirectory for RecipientDirectoryImpl {
    async fn dept_head_for_department(&self, department_id: i64) -> Result<Option<i64>, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                "SELECT dept_head_user_id FROM department_directory WHERE department_id = ?1",
                params![department_id],
            )
            .await
            .map_err(DbError::from)?;
        match rows.next().await.map_err(DbError::from)? {
            Some(row) => Ok(Some(row.get(0).map_err(DbError::from)?)),
            None => Ok(None),
        }
    }

    async fn commissioner(&self) -> Result<Option<i64>, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query("SELECT user_id FROM commissioner_directory WHERE id = 1", ())
            .await
            .map_err(DbError::from)?;
        match rows.next().await.map_err(DbError::from)? {
            Some(row) => Ok(Some(row.get(0).map_err(DbError::from)?)),
            None => Ok(None),
        }
    }
}
