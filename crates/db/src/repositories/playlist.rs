//! Playlist repository.

use std::sync::Arc;

use crate::entities::video::PublishStatus;
use crate::entities::{Playlist, playlist};
use crate::repositories::pagination::fetch_page;
use crate::repositories::visibility::visible_to;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use wavytv_common::{AppError, AppResult, PageRequest, Paginated};

/// Playlist repository for database operations.
#[derive(Clone)]
pub struct PlaylistRepository {
    db: Arc<DatabaseConnection>,
}

impl PlaylistRepository {
    /// Create a new playlist repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a playlist by public ID regardless of status.
    pub async fn find_by_public_id(&self, public_id: &str) -> AppResult<Option<playlist::Model>> {
        Playlist::find()
            .filter(playlist::Column::PublicId.eq(public_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a playlist by public ID if `viewer_id` may see it.
    pub async fn find_visible(
        &self,
        public_id: &str,
        viewer_id: Option<&str>,
    ) -> AppResult<Option<playlist::Model>> {
        Playlist::find()
            .filter(playlist::Column::PublicId.eq(public_id))
            .filter(visible_to(
                playlist::Column::PublishStatus,
                playlist::Column::OwnerId,
                viewer_id,
            ))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a playlist by public ID owned by `owner_id`.
    pub async fn find_owned(
        &self,
        public_id: &str,
        owner_id: &str,
    ) -> AppResult<Option<playlist::Model>> {
        Playlist::find()
            .filter(playlist::Column::PublicId.eq(public_id))
            .filter(playlist::Column::OwnerId.eq(owner_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List a channel's playlists with the given statuses, newest first.
    pub async fn list_by_owner(
        &self,
        owner_id: &str,
        statuses: Vec<PublishStatus>,
        request: PageRequest,
    ) -> AppResult<Paginated<playlist::Model>> {
        let select = Playlist::find()
            .filter(playlist::Column::OwnerId.eq(owner_id))
            .filter(playlist::Column::PublishStatus.is_in(statuses))
            .order_by_desc(playlist::Column::CreatedAt)
            .order_by_desc(playlist::Column::Id);

        fetch_page(self.db.as_ref(), select, request).await
    }

    /// Create a new playlist.
    pub async fn create(&self, model: playlist::ActiveModel) -> AppResult<playlist::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a playlist.
    pub async fn update(&self, model: playlist::ActiveModel) -> AppResult<playlist::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a playlist.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Playlist::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
