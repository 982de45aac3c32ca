//! [libs/infra/db/src/errors.rs]

use grievance_domain_repository::RepoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("[L3_DB_NET_FAULT]: connection failed -> {0}")]
    Connection(String),

    #[error("[L3_DB_CONFIG_FAULT]: {0}")]
    Configuration(String),

    #[error("[L3_DB_QUERY_FAULT]: {0}")]
    Query(#[from] libsql::Error),

    #[error("[L3_DB_MAPPING_FAULT]: {0}")]
    Mapping(String),

    #[error("[L3_DB_NOT_FOUND]: {0}")]
    NotFound(String),

    #[error("[L3_DB_CONFLICT]: {0}")]
    Conflict(String),
}

impl From<DbError> for RepoError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(msg) => RepoError::NotFound(msg),
            DbError::Conflict(msg) => RepoError::Conflict(msg),
            other => RepoError::Io(other.to_string()),
        }
    }
}
