//! [libs/infra/db/src/repositories/category.rs]

use crate::client::DbClient;
use crate::errors::DbError;
use async_trait::async_trait;
use grievance_domain_models::Category;
use grievance_domain_repository::{CategoryRepository, RepoError};
use libsql::params;

pub struct CategoryRepositoryImpl {
    client: DbClient,
}

impl CategoryRepositoryImpl {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }
}

fn row_to_category(row: &libsql::Row) -> Result<Category, DbError> {
    let keywords_json: String = row.get(3)?;
    let keywords: Vec<String> = serde_json::from_str(&keywords_json)
        .map_err(|e| DbError::Mapping(format!("invalid keywords json: {e}")))?;
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        keywords,
    })
}

#[async_trait]
impl CategoryRepository for CategoryRepositoryImpl {
    async fn find_by_id(&self, id: i64) -> Result<Option<Category>, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                "SELECT id, name, description, keywords FROM category WHERE id = ?1",
                params![id],
            )
            .await
            .map_err(DbError::from)?;
        match rows.next().await.map_err(DbError::from)? {
            Some(row) => Ok(Some(row_to_category(&row).map_err(RepoError::from)?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> Result<Vec<Category>, RepoError> {
        let conn = self.client.connection()?;
        let mut rows = conn
            .query(
                "SELECT id, name, description, keywords FROM category ORDER BY id",
                (),
            )
            .await
            .map_err(DbError::from)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(DbError::from)? {
            out.push(row_to_category(&row)?);
        }
        Ok(out)
    }

    async fn insert(&self, category: &Category) -> Result<i64, RepoError> {
        let conn = self.client.connection()?;
        let keywords_json = serde_json::to_string(&category.keywords)
            .map_err(|e| RepoError::Io(e.to_string()))?;
        conn.execute(
            "INSERT INTO category (name, description, keywords) VALUES (?1, ?2, ?3)",
            params![
                category.name.clone(),
                category.description.clone(),
                keywords_json
            ],
        )
        .await
        .map_err(DbError::from)?;
        Ok(conn.last_insert_rowid())
    }

    async fn update(&self, category: &Category) -> Result<(), RepoError> {
        let conn = self.client.connection()?;
        let keywords_json = serde_json::to_string(&category.keywords)
            .map_err(|e| RepoError::Io(e.to_string()))?;
        let affected = conn
            .execute(
                "UPDATE category SET name = ?2, description = ?3, keywords = ?4 WHERE id = ?1",
                params![
                    category.id,
                    category.name.clone(),
                    category.description.clone(),
                    keywords_json
                ],
            )
            .await
            .map_err(DbError::from)?;
        if affected == 0 {
            return Err(RepoError::NotFound(format!(
                "category {} does not exist",
                category.id
            )));
        }
        Ok(())
    }
}
