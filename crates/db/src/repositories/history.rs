//! Watch history repository.

use std::sync::Arc;

use crate::entities::{Video, WatchHistory, history, video};
use crate::repositories::pagination::fetch_page;
use crate::repositories::visibility::visible_to;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, QueryTrait,
};
use wavytv_common::{AppError, AppResult, PageRequest, Paginated};

/// Watch history repository for database operations.
#[derive(Clone)]
pub struct HistoryRepository {
    db: Arc<DatabaseConnection>,
}

impl HistoryRepository {
    /// Create a new history repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new history entry.
    pub async fn create(&self, model: history::ActiveModel) -> AppResult<history::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove the entry for a (user, video) pair. Returns rows removed.
    pub async fn delete_pair(&self, user_id: &str, video_id: &str) -> AppResult<u64> {
        let result = WatchHistory::delete_many()
            .filter(history::Column::UserId.eq(user_id))
            .filter(history::Column::VideoId.eq(video_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Remove every entry for a user. Returns rows removed.
    pub async fn delete_all(&self, user_id: &str) -> AppResult<u64> {
        let result = WatchHistory::delete_many()
            .filter(history::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// A user's history, most recently watched first. Entries whose video
    /// is gone or private to someone else are excluded before paging.
    pub async fn list(
        &self,
        user_id: &str,
        request: PageRequest,
    ) -> AppResult<Paginated<history::Model>> {
        let visible = Video::find()
            .select_only()
            .column(video::Column::Id)
            .filter(visible_to(
                video::Column::PublishStatus,
                video::Column::OwnerId,
                Some(user_id),
            ))
            .into_query();

        let select = WatchHistory::find()
            .filter(history::Column::UserId.eq(user_id))
            .filter(history::Column::VideoId.in_subquery(visible))
            .order_by_desc(history::Column::CreatedAt)
            .order_by_desc(history::Column::Id);

        fetch_page(self.db.as_ref(), select, request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn test_delete_pair_then_list() {
        let entry = history::Model {
            id: "h2".to_string(),
            user_id: "u1".to_string(),
            video_id: "v1".to_string(),
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .append_query_results([[
                    maplit::btreemap! { "num_items" => sea_orm::Value::BigInt(Some(1)) },
                ]])
                .append_query_results([[entry.clone()]])
                .into_connection(),
        );

        let repo = HistoryRepository::new(db);
        assert_eq!(repo.delete_pair("u1", "v1").await.unwrap(), 1);

        let page = repo.list("u1", PageRequest::default()).await.unwrap();
        assert_eq!(page.docs, vec![entry]);
    }

    #[tokio::test]
    async fn test_list_counts_only_visible_videos() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    maplit::btreemap! { "num_items" => sea_orm::Value::BigInt(Some(0)) },
                ]])
                .into_connection(),
        );

        let repo = HistoryRepository::new(db.clone());
        let page = repo.list("u1", PageRequest::default()).await.unwrap();
        assert_eq!(page.total_docs, 0);

        drop(repo);
        let log = Arc::try_unwrap(db).ok().unwrap().into_transaction_log();
        let count_sql = log[0].statements()[0].sql.clone();
        assert!(count_sql.contains(r#""video_id" IN (SELECT "video"."id" FROM "video""#));
        assert!(count_sql.contains(r#""publish_status" <> "#));
        assert!(count_sql.contains(r#""owner_id" = "#));
    }
}
