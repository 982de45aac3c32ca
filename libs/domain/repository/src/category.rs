//! [libs/domain/repository/src/category.rs]

use crate::error::RepoError;
use async_trait::async_trait;
use grievance_domain_models::Category;

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Category>, RepoError>;

    async fn find_all(&self) -> Result<Vec<Category>, RepoError>;

    /// Immutable after creation except by an admin (§3).
    async fn insert(&self, category: &Category) -> Result<i64, RepoError>;

    async fn update(&self, category: &Category) -> Result<(), RepoError>;
}
