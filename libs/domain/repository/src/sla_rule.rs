//! [libs/domain/repository/src/sla_rule.rs]

use crate::error::RepoError;
use async_trait::async_trait;
use grievance_domain_models::SlaRule;

#[async_trait]
pub trait SlaRuleRepository: Send + Sync {
    /// One rule per category (§3: `category_id` unique).
    async fn find_by_category(&self, category_id: i64) -> Result<Option<SlaRule>, RepoError>;

    async fn find_all(&self) -> Result<Vec<SlaRule>, RepoError>;

    async fn insert(&self, rule: &SlaRule) -> Result<i64, RepoError>;
}
