//! Comment repository.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::entities::target::{Target, TargetKind};
use crate::entities::{Comment, comment};
use crate::repositories::pagination::fetch_page;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect,
};
use wavytv_common::{AppError, AppResult, PageRequest, Paginated};

#[derive(Debug, FromQueryResult)]
struct ReplyCount {
    target_id: String,
    count: i64,
}

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a comment by storage ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a comment by public ID.
    pub async fn find_by_public_id(&self, public_id: &str) -> AppResult<Option<comment::Model>> {
        Comment::find()
            .filter(comment::Column::PublicId.eq(public_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a comment by public ID written by `owner_id`.
    pub async fn find_owned(
        &self,
        public_id: &str,
        owner_id: &str,
    ) -> AppResult<Option<comment::Model>> {
        Comment::find()
            .filter(comment::Column::PublicId.eq(public_id))
            .filter(comment::Column::OwnerId.eq(owner_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List comments attached to `target`, newest first.
    pub async fn list_for_target(
        &self,
        target: &Target,
        request: PageRequest,
    ) -> AppResult<Paginated<comment::Model>> {
        let select = Comment::find()
            .filter(comment::Column::TargetKind.eq(target.kind()))
            .filter(comment::Column::TargetId.eq(target.id()))
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_desc(comment::Column::Id);

        fetch_page(self.db.as_ref(), select, request).await
    }

    /// Number of direct replies for each of `comment_ids`. Comments without
    /// replies are absent from the map.
    pub async fn reply_counts(&self, comment_ids: &[String]) -> AppResult<HashMap<String, u64>> {
        if comment_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Comment::find()
            .select_only()
            .column(comment::Column::TargetId)
            .column_as(Expr::col(comment::Column::Id).count(), "count")
            .filter(comment::Column::TargetKind.eq(TargetKind::Comment))
            .filter(comment::Column::TargetId.is_in(comment_ids.to_vec()))
            .group_by(comment::Column::TargetId)
            .into_model::<ReplyCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|r| (r.target_id, u64::try_from(r.count).unwrap_or(0)))
            .collect())
    }

    /// Storage IDs of every comment under `root`, replies at any depth
    /// included.
    pub async fn thread_ids(&self, root: &Target) -> AppResult<Vec<String>> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        let mut frontier = self
            .attached_ids(root.kind(), &[root.id().to_string()])
            .await?;

        while !frontier.is_empty() {
            frontier.retain(|id| seen.insert(id.clone()));
            ids.extend(frontier.iter().cloned());
            if frontier.is_empty() {
                break;
            }
            frontier = self.attached_ids(TargetKind::Comment, &frontier).await?;
        }
        Ok(ids)
    }

    async fn attached_ids(&self, kind: TargetKind, target_ids: &[String]) -> AppResult<Vec<String>> {
        let comments = Comment::find()
            .filter(comment::Column::TargetKind.eq(kind))
            .filter(comment::Column::TargetId.is_in(target_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(comments.into_iter().map(|c| c.id).collect())
    }

    /// Create a new comment.
    pub async fn create(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a comment.
    pub async fn update(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a comment.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Comment::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete the comments with the given storage IDs.
    pub async fn delete_by_ids(&self, ids: &[String]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = Comment::delete_many()
            .filter(comment::Column::Id.is_in(ids.to_vec()))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_comment(id: &str, target: &Target) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            public_id: format!("pub_{id}"),
            content: "nice".to_string(),
            owner_id: "u1".to_string(),
            target_kind: target.kind(),
            target_id: target.id().to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_public_id_exposes_target() {
        let target = Target::Comment("c0".to_string());
        let comment = create_test_comment("c1", &target);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[comment.clone()]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let found = repo.find_by_public_id("pub_c1").await.unwrap().unwrap();

        assert_eq!(found.target(), target);
    }

    #[tokio::test]
    async fn test_reply_counts() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "target_id" => sea_orm::Value::String(Some(Box::new("c1".to_string()))),
                    "count" => sea_orm::Value::BigInt(Some(3)),
                }]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let counts = repo
            .reply_counts(&["c1".to_string(), "c2".to_string()])
            .await
            .unwrap();

        assert_eq!(counts.get("c1"), Some(&3));
        assert_eq!(counts.get("c2"), None);
    }

    #[tokio::test]
    async fn test_thread_ids_walks_replies() {
        let video = Target::Video("v1".to_string());
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_comment("c1", &video),
                    create_test_comment("c2", &video),
                ]])
                .append_query_results([[create_test_comment(
                    "c3",
                    &Target::Comment("c1".to_string()),
                )]])
                .append_query_results([Vec::<comment::Model>::new()])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let ids = repo.thread_ids(&video).await.unwrap();

        assert_eq!(ids, vec!["c1", "c2", "c3"]);
    }

    #[tokio::test]
    async fn test_delete_by_ids() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 3,
                }])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        assert_eq!(repo.delete_by_ids(&[]).await.unwrap(), 0);

        let ids = vec!["c1".to_string(), "c2".to_string(), "c3".to_string()];
        assert_eq!(repo.delete_by_ids(&ids).await.unwrap(), 3);
    }
}
