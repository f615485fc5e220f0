//! Search service.
//!
//! Matching is a case-insensitive substring test over video title,
//! description and tags, or over username and display name.

use sea_orm::Set;
use serde::Deserialize;
use tracing::warn;
use wavytv_common::{AppError, AppResult, PageRequest, Paginated};
use wavytv_db::{
    entities::user,
    repositories::{UserRepository, VideoFilter},
};

use crate::services::video::{VideoService, hides_nsfw};
use crate::services::view::{OwnerProfile, VideoView};

/// Most queries kept in a user's search history.
pub const MAX_SEARCH_HISTORY: usize = 20;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub category: Option<String>,
}

impl SearchQuery {
    fn term(&self) -> AppResult<String> {
        let term = self.q.trim();
        if term.is_empty() {
            return Err(AppError::invalid("q", "must not be empty"));
        }
        if term.chars().count() > 200 {
            return Err(AppError::invalid("q", "must be at most 200 characters"));
        }
        Ok(term.to_string())
    }
}

/// Put `query` at the front of `history`, dropping earlier copies that differ
/// only in case, and keep at most [`MAX_SEARCH_HISTORY`] entries.
#[must_use]
pub fn push_search_history(mut history: Vec<String>, query: &str) -> Vec<String> {
    let lowered = query.to_lowercase();
    history.retain(|h| h.to_lowercase() != lowered);
    history.insert(0, query.to_string());
    history.truncate(MAX_SEARCH_HISTORY);
    history
}

/// Search service for business logic.
#[derive(Clone)]
pub struct SearchService {
    videos: VideoService,
    user_repo: UserRepository,
}

impl SearchService {
    /// Create a new search service.
    #[must_use]
    pub const fn new(videos: VideoService, user_repo: UserRepository) -> Self {
        Self { videos, user_repo }
    }

    /// Public videos matching the query, newest first.
    pub async fn search_videos(
        &self,
        query: SearchQuery,
        viewer: Option<&user::Model>,
        request: PageRequest,
    ) -> AppResult<Paginated<VideoView>> {
        let term = query.term()?;

        let filter = VideoFilter {
            category: query.category.map(|c| c.trim().to_lowercase()),
            exclude_nsfw: hides_nsfw(viewer),
            query: Some(term.clone()),
            ..Default::default()
        };
        let page = self.videos.assemble_page(&filter, viewer, request).await?;

        if let Some(viewer) = viewer {
            self.remember(viewer, &term).await;
        }
        Ok(page)
    }

    /// Users whose username or display name matches the query.
    pub async fn search_users(
        &self,
        query: SearchQuery,
        viewer: Option<&user::Model>,
        request: PageRequest,
    ) -> AppResult<Paginated<OwnerProfile>> {
        let term = query.term()?;
        let page = self
            .user_repo
            .search(&term, request)
            .await?
            .map(|u| OwnerProfile::from(&u));

        if let Some(viewer) = viewer {
            self.remember(viewer, &term).await;
        }
        Ok(page)
    }

    /// Record a query in the viewer's history when they allow it. A failure
    /// here never fails the search.
    async fn remember(&self, viewer: &user::Model, term: &str) {
        if !viewer.preferences.save_search_history {
            return;
        }

        let history = push_search_history(viewer.search_history_list(), term);
        let mut active: user::ActiveModel = viewer.clone().into();
        active.search_history = Set(serde_json::json!(history));

        if let Err(e) = self.user_repo.update(active).await {
            warn!(error = %e, user_id = %viewer.id, "Failed to record search history");
        }
    }
}
