//! [libs/infra/db/src/client.rs]

use crate::errors::DbError;
use crate::schema::apply_schema;
use libsql::{Builder, Connection, Database};
use std::sync::Arc;
use tracing::{info, instrument};

/// Wraps a libsql `Database` handle. Cheaply cloneable: every clone
/// shares the same underlying connection pool via `Arc`.
#[derive(Clone)]
pub struct DbClient {
    database: Arc<Database>,
    /// Keeps an in-memory database alive for the process lifetime; SQLite
    /// drops an in-memory database's contents once its last connection
    /// closes, so this anchor connection is never dropped.
    _memory_anchor: Option<Arc<Connection>>,
}

impl DbClient {
    #[instrument(skip(access_token))]
    pub async fn connect(url: &str, access_token: Option<String>) -> Result<Self, DbError> {
        if url.is_empty() {
            return Err(DbError::Configuration("DATABASE_URL is empty".into()));
        }

        let is_remote = url.starts_with("libsql://") || url.starts_with("https://");
        let is_memory = url.contains(":memory:");

        let database = if is_remote {
            let token = access_token.ok_or_else(|| {
                DbError::Configuration("remote connection requires an access token".into())
            })?;
            Builder::new_remote(url.to_string(), token).build().await
        } else {
            Builder::new_local(url).build().await
        }
        .map_err(|e| DbError::Connection(e.to_string()))?;

        let database = Arc::new(database);

        let anchor = if is_memory {
            let conn = database
                .connect()
                .map_err(|e| DbError::Connection(e.to_string()))?;
            apply_schema(&conn)
                .await
                .map_err(|e| DbError::Configuration(e.to_string()))?;
            Some(Arc::new(conn))
        } else {
            let conn = database
                .connect()
                .map_err(|e| DbError::Connection(e.to_string()))?;
            apply_schema(&conn)
                .await
                .map_err(|e| DbError::Configuration(e.to_string()))?;
            None
        };

        info!(url, "database connected and schema applied");

        Ok(Self {
            database,
            _memory_anchor: anchor,
        })
    }

    pub fn connection(&self) -> Result<Connection, DbError> {
        self.database
            .connect()
            .map_err(|e| DbError::Connection(e.to_string()))
    }
}
