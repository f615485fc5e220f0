//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, post};
use crate::repositories::pagination::fetch_page;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use wavytv_common::{AppError, AppResult, PageRequest, Paginated};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by storage ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by public ID.
    pub async fn find_by_public_id(&self, public_id: &str) -> AppResult<Option<post::Model>> {
        Post::find()
            .filter(post::Column::PublicId.eq(public_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by public ID owned by `owner_id`.
    pub async fn find_owned(
        &self,
        public_id: &str,
        owner_id: &str,
    ) -> AppResult<Option<post::Model>> {
        Post::find()
            .filter(post::Column::PublicId.eq(public_id))
            .filter(post::Column::OwnerId.eq(owner_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List posts newest first, optionally for one channel.
    pub async fn list(
        &self,
        owner_id: Option<&str>,
        request: PageRequest,
    ) -> AppResult<Paginated<post::Model>> {
        let mut select = Post::find();
        if let Some(owner_id) = owner_id {
            select = select.filter(post::Column::OwnerId.eq(owner_id));
        }
        let select = select
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id);

        fetch_page(self.db.as_ref(), select, request).await
    }

    /// Count a channel's posts.
    pub async fn count_by_owner(&self, owner_id: &str) -> AppResult<u64> {
        Post::find()
            .filter(post::Column::OwnerId.eq(owner_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Post::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_post(id: &str, owner_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            public_id: format!("pub_{id}"),
            content: "Hello wavy".to_string(),
            owner_id: owner_id.to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_public_id() {
        let post = create_test_post("p1", "u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post.clone()]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let found = repo.find_by_public_id("pub_p1").await.unwrap().unwrap();

        assert_eq!(found.owner_id, "u1");
    }

    #[tokio::test]
    async fn test_list_for_owner() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    maplit::btreemap! { "num_items" => sea_orm::Value::BigInt(Some(1)) },
                ]])
                .append_query_results([[create_test_post("p1", "u1")]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let page = repo.list(Some("u1"), PageRequest::default()).await.unwrap();

        assert_eq!(page.docs.len(), 1);
        assert_eq!(page.paging_counter, 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        assert!(repo.delete("p1").await.is_ok());
    }
}
