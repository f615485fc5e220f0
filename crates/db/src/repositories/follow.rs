//! Follow repository.

use std::sync::Arc;

use crate::entities::{Follow, follow};
use crate::repositories::pagination::fetch_page;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use wavytv_common::{AppError, AppResult, PageRequest, Paginated};

/// Follow repository for database operations.
#[derive(Clone)]
pub struct FollowRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowRepository {
    /// Create a new follow repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the follow row for a (channel, follower) pair.
    pub async fn find_pair(
        &self,
        channel_id: &str,
        follower_id: &str,
    ) -> AppResult<Option<follow::Model>> {
        Follow::find()
            .filter(follow::Column::ChannelId.eq(channel_id))
            .filter(follow::Column::FollowerId.eq(follower_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if `follower_id` follows `channel_id`.
    pub async fn is_following(&self, channel_id: &str, follower_id: &str) -> AppResult<bool> {
        Ok(self.find_pair(channel_id, follower_id).await?.is_some())
    }

    /// Insert a follow unless the pair already exists. Returns rows inserted.
    pub async fn insert_if_absent(&self, model: follow::ActiveModel) -> AppResult<u64> {
        Follow::insert(model)
            .on_conflict(
                OnConflict::columns([follow::Column::ChannelId, follow::Column::FollowerId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete the follow row for a pair. Returns rows removed.
    pub async fn delete_pair(&self, channel_id: &str, follower_id: &str) -> AppResult<u64> {
        let result = Follow::delete_many()
            .filter(follow::Column::ChannelId.eq(channel_id))
            .filter(follow::Column::FollowerId.eq(follower_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Count followers of a channel.
    pub async fn count_followers(&self, channel_id: &str) -> AppResult<u64> {
        Follow::find()
            .filter(follow::Column::ChannelId.eq(channel_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count channels a user follows.
    pub async fn count_following(&self, follower_id: &str) -> AppResult<u64> {
        Follow::find()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Followers of a channel, newest first.
    pub async fn followers(
        &self,
        channel_id: &str,
        request: PageRequest,
    ) -> AppResult<Paginated<follow::Model>> {
        let select = Follow::find()
            .filter(follow::Column::ChannelId.eq(channel_id))
            .order_by_desc(follow::Column::CreatedAt)
            .order_by_desc(follow::Column::Id);

        fetch_page(self.db.as_ref(), select, request).await
    }

    /// Channels a user follows, newest first.
    pub async fn following(
        &self,
        follower_id: &str,
        request: PageRequest,
    ) -> AppResult<Paginated<follow::Model>> {
        let select = Follow::find()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .order_by_desc(follow::Column::CreatedAt)
            .order_by_desc(follow::Column::Id);

        fetch_page(self.db.as_ref(), select, request).await
    }
}
