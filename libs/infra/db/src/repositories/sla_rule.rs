//! [libs/infra/db/src/repositories/sla_rule.rs]

use crate::client::DbClient;
use crate::errors::DbError;
use async_trait::async_trait;
use grievance_domain_models::enums::Priority;
use grievance_domain_models::SlaRule;
use grievance_domain_repository::{RepoError, SlaRuleRepository};
use libsql::params;
use std::str::FromStr;

pub struct SlaRuleRepositoryImpl {
    client: DbClient,
}

impl SlaRuleRepositoryImpl {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }
}

fn row_to_rule(row: &libsql::Row) -> Result<SlaRule, DbError> {
    let priority_text: String = row.get(3)?;
    let base_priority = Priority::from_str(&priority_text)
        .map_err(|e| DbError::Mapping(format!("invalid priority '{priority_text}': {e}")))?;
    Ok(SlaRule {
        id: row.get(0)?,
        category_id: row.get(1)?,
        sla_days: row.get::<i64>(2)? as u32,
        base_priority,
        department_id: row.get(4)?,
    })
}

#[async_trait]
impl SlaRuleRepository for SlaRuleRepositoryImpl {
    async fn find_by_category(&self, category_id: i64) -> Result<Option<SlaRule>, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                "SELECT id, category_id, sla_days, base_priority, department_id FROM sla_rule WHERE category_id = ?1",
                params![category_id],
            )
            .await
            .map_err(DbError::from)?;
        match rows.next().await.map_err(DbError::from)? {
            Some(row) => Ok(Some(row_to_rule(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> Result<Vec<SlaRule>, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                "SELECT id, category_id, sla_days, base_priority, department_id FROM sla_rule ORDER BY id",
                (),
            )
            .await
            .map_err(DbError::from)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(DbError::from)? {
            out.push(row_to_rule(&row)?);
        }
        Ok(out)
    }

    async fn insert(&self, rule: &SlaRule) -> Result<i64, RepoError> {
        let conn = self.client.connection()?;
        conn.execute(
            "INSERT INTO sla_rule (category_id, sla_days, base_priority, department_id) VALUES (?1, ?2, ?3, ?4)",
            params![
                rule.category_id,
                rule.sla_days as i64,
                rule.base_priority.as_wire(),
                rule.department_id
            ],
        )
        .await
        .map_err(DbError::from)?;
        Ok(conn.last_insert_rowid())
    }
}
