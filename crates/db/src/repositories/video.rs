//! Video repository.

use std::sync::Arc;

use crate::entities::video::PublishStatus;
use crate::entities::{Video, video};
use crate::repositories::pagination::{fetch_page, like_pattern};
use crate::repositories::visibility::visible_to;
use sea_orm::sea_query::{Alias, Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};
use wavytv_common::{AppError, AppResult, PageRequest, Paginated};

/// Listing filter for videos.
#[derive(Debug, Clone, Default)]
pub struct VideoFilter {
    /// Restrict to one channel.
    pub owner_id: Option<String>,
    pub category: Option<String>,
    /// Statuses to include; empty means public only.
    pub statuses: Vec<PublishStatus>,
    pub exclude_nsfw: bool,
    /// Case-insensitive match on title, description, or tags.
    pub query: Option<String>,
}

impl VideoFilter {
    fn condition(&self) -> Condition {
        let statuses = if self.statuses.is_empty() {
            vec![PublishStatus::Public]
        } else {
            self.statuses.clone()
        };

        let mut condition =
            Condition::all().add(video::Column::PublishStatus.is_in(statuses));

        if let Some(owner_id) = &self.owner_id {
            condition = condition.add(video::Column::OwnerId.eq(owner_id.as_str()));
        }
        if let Some(category) = &self.category {
            condition = condition.add(video::Column::Category.eq(category.as_str()));
        }
        if self.exclude_nsfw {
            condition = condition.add(video::Column::IsNsfw.eq(false));
        }
        if let Some(query) = self.query.as_deref().filter(|q| !q.trim().is_empty()) {
            let pattern = like_pattern(query);
            condition = condition.add(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(video::Column::Title))).like(&pattern))
                    .add(
                        Expr::expr(Func::lower(Expr::col(video::Column::Description)))
                            .like(&pattern),
                    )
                    .add(
                        Expr::expr(Expr::col(video::Column::Tags).cast_as(Alias::new("text")))
                            .like(&pattern),
                    ),
            );
        }
        condition
    }
}

/// Video repository for database operations.
#[derive(Clone)]
pub struct VideoRepository {
    db: Arc<DatabaseConnection>,
}

impl VideoRepository {
    /// Create a new video repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a video by storage ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<video::Model>> {
        Video::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find multiple videos by storage IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<video::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Video::find()
            .filter(video::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a video by public ID regardless of status.
    pub async fn find_by_public_id(&self, public_id: &str) -> AppResult<Option<video::Model>> {
        Video::find()
            .filter(video::Column::PublicId.eq(public_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a video by public ID if `viewer_id` may see it.
    pub async fn find_visible(
        &self,
        public_id: &str,
        viewer_id: Option<&str>,
    ) -> AppResult<Option<video::Model>> {
        Video::find()
            .filter(video::Column::PublicId.eq(public_id))
            .filter(visible_to(
                video::Column::PublishStatus,
                video::Column::OwnerId,
                viewer_id,
            ))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a video by storage ID if `viewer_id` may see it.
    pub async fn find_visible_by_id(
        &self,
        id: &str,
        viewer_id: Option<&str>,
    ) -> AppResult<Option<video::Model>> {
        Video::find_by_id(id)
            .filter(visible_to(
                video::Column::PublishStatus,
                video::Column::OwnerId,
                viewer_id,
            ))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a video by public ID owned by `owner_id`.
    pub async fn find_owned(
        &self,
        public_id: &str,
        owner_id: &str,
    ) -> AppResult<Option<video::Model>> {
        Video::find()
            .filter(video::Column::PublicId.eq(public_id))
            .filter(video::Column::OwnerId.eq(owner_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List videos newest first.
    pub async fn list(
        &self,
        filter: &VideoFilter,
        request: PageRequest,
    ) -> AppResult<Paginated<video::Model>> {
        let select = Video::find()
            .filter(filter.condition())
            .order_by_desc(video::Column::CreatedAt)
            .order_by_desc(video::Column::Id);

        fetch_page(self.db.as_ref(), select, request).await
    }

    /// Count a channel's videos with the given statuses.
    pub async fn count_by_owner(
        &self,
        owner_id: &str,
        statuses: Vec<PublishStatus>,
    ) -> AppResult<u64> {
        Video::find()
            .filter(video::Column::OwnerId.eq(owner_id))
            .filter(video::Column::PublishStatus.is_in(statuses))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new video.
    pub async fn create(&self, model: video::ActiveModel) -> AppResult<video::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a video.
    pub async fn update(&self, model: video::ActiveModel) -> AppResult<video::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a video.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Video::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment the view counter atomically (single UPDATE query, no fetch).
    pub async fn increment_views(&self, id: &str) -> AppResult<()> {
        Video::update_many()
            .col_expr(video::Column::Views, Expr::col(video::Column::Views).add(1))
            .filter(video::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
