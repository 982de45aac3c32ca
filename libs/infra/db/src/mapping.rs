//! [libs/infra/db/src/mapping.rs]
//!
//! Timestamp round-tripping shared by every repository. Everything is
//! stored as RFC 3339 text, which is what libsql's TEXT affinity and
//! SQLite's date functions both expect.

use crate::errors::DbError;
use chrono::{DateTime, Utc};

pub fn to_text(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339()
}

pub fn opt_to_text(instant: Option<DateTime<Utc>>) -> Option<String> {
    instant.map(to_text)
}

pub fn from_text(text: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::Mapping(format!("invalid timestamp '{text}': {e}")))
}

pub fn opt_from_text(text: Option<String>) -> Result<Option<DateTime<Utc>>, DbError> {
    text.map(|t| from_text(&t)).transpose()
}
