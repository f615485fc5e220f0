//! Watch history service.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::Set;
use serde::Serialize;
use tracing::debug;
use wavytv_common::{AppError, AppResult, IdGenerator, PageRequest, Paginated};
use wavytv_db::{
    entities::{history, user, video},
    repositories::{HistoryRepository, VideoRepository},
};

use crate::services::guard::{is_visible_to, not_found};
use crate::services::view::{VideoView, ViewAssembler};

/// One watched video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryView {
    pub watched_at: DateTime<FixedOffset>,
    pub video: VideoView,
}

/// History service for business logic.
#[derive(Clone)]
pub struct HistoryService {
    history_repo: HistoryRepository,
    video_repo: VideoRepository,
    views: ViewAssembler,
    id_gen: IdGenerator,
}

impl HistoryService {
    /// Create a new history service.
    #[must_use]
    pub const fn new(
        history_repo: HistoryRepository,
        video_repo: VideoRepository,
        views: ViewAssembler,
    ) -> Self {
        Self {
            history_repo,
            video_repo,
            views,
            id_gen: IdGenerator::new(),
        }
    }

    /// Move `video_id` to the top of the user's history.
    ///
    /// Returns `false` when the user has history turned off.
    pub async fn record(&self, user: &user::Model, video_id: &str) -> AppResult<bool> {
        if !user.preferences.save_watch_history {
            return Ok(false);
        }

        self.history_repo.delete_pair(&user.id, video_id).await?;
        self.history_repo
            .create(history::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(user.id.clone()),
                video_id: Set(video_id.to_string()),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        debug!(user_id = %user.id, video_id = %video_id, "History recorded");
        Ok(true)
    }

    /// Record a visible video addressed by public ID.
    pub async fn record_public(&self, user: &user::Model, video_public_id: &str) -> AppResult<bool> {
        let video = self
            .video_repo
            .find_visible(video_public_id, Some(&user.id))
            .await?
            .ok_or_else(|| not_found("Video"))?;
        self.record(user, &video.id).await
    }

    /// The user's history, most recent first. Videos that were deleted or
    /// turned private by someone else are left out of both the docs and
    /// the page counts.
    pub async fn list(
        &self,
        user_id: &str,
        request: PageRequest,
    ) -> AppResult<Paginated<HistoryEntryView>> {
        let mut page = self.history_repo.list(user_id, request).await?;
        let entries = std::mem::take(&mut page.docs);

        let ids: Vec<String> = entries.iter().map(|e| e.video_id.clone()).collect();
        let videos: HashMap<String, video::Model> = self
            .video_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .filter(|v| is_visible_to(v.publish_status, &v.owner_id, Some(user_id)))
            .map(|v| (v.id.clone(), v))
            .collect();

        let kept: Vec<(DateTime<FixedOffset>, video::Model)> = entries
            .into_iter()
            .filter_map(|e| videos.get(&e.video_id).map(|v| (e.created_at, v.clone())))
            .collect();
        let (watched, models): (Vec<_>, Vec<_>) = kept.into_iter().unzip();

        let views = self.views.videos(models, Some(user_id)).await?;
        let docs = watched
            .into_iter()
            .zip(views)
            .map(|(watched_at, video)| HistoryEntryView { watched_at, video })
            .collect();
        Ok(page.with_docs(docs))
    }

    /// Remove one video from the user's history.
    pub async fn remove(&self, user_id: &str, video_public_id: &str) -> AppResult<()> {
        let video = self
            .video_repo
            .find_visible(video_public_id, Some(user_id))
            .await?
            .ok_or_else(|| not_found("Video"))?;

        if self.history_repo.delete_pair(user_id, &video.id).await? == 0 {
            return Err(AppError::NotFound("Video not in history".to_string()));
        }
        Ok(())
    }

    /// Clear the user's history, returning how many entries were removed.
    pub async fn clear(&self, user_id: &str) -> AppResult<u64> {
        self.history_repo.delete_all(user_id).await
    }
}
