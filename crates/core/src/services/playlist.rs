//! Playlist service.
//!
//! The owner manages a playlist's metadata and collaborators. The owner and
//! collaborators may add and remove videos.

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;
use wavytv_common::{AppError, AppResult, IdGenerator, PageRequest, Paginated};
use wavytv_db::{
    entities::{playlist, user, video::PublishStatus},
    repositories::{
        PlaylistRepository, UserRepository, VideoRepository, visibility::listed_statuses,
    },
};

use crate::services::guard::{Access, not_found, resolve_owned};
use crate::services::view::{PlaylistView, ViewAssembler};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaylistInput {
    #[validate(length(min = 1, max = 100))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: String,

    #[serde(default)]
    pub publish_status: PublishStatus,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlaylistInput {
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub publish_status: Option<PublishStatus>,
}

/// Remove every occurrence of `video_id`, returning how many were removed.
fn remove_all(ids: &mut Vec<String>, video_id: &str) -> usize {
    let before = ids.len();
    ids.retain(|id| id != video_id);
    before - ids.len()
}

/// Playlist service for business logic.
#[derive(Clone)]
pub struct PlaylistService {
    playlist_repo: PlaylistRepository,
    video_repo: VideoRepository,
    user_repo: UserRepository,
    views: ViewAssembler,
    id_gen: IdGenerator,
}

impl PlaylistService {
    /// Create a new playlist service.
    #[must_use]
    pub const fn new(
        playlist_repo: PlaylistRepository,
        video_repo: VideoRepository,
        user_repo: UserRepository,
        views: ViewAssembler,
    ) -> Self {
        Self {
            playlist_repo,
            video_repo,
            user_repo,
            views,
            id_gen: IdGenerator::new(),
        }
    }

    pub async fn create(
        &self,
        owner: &user::Model,
        input: CreatePlaylistInput,
    ) -> AppResult<PlaylistView> {
        input.validate()?;

        let model = playlist::ActiveModel {
            id: Set(self.id_gen.generate()),
            public_id: Set(self.id_gen.generate_public_id()),
            title: Set(input.title.trim().to_string()),
            description: Set(input.description),
            owner_id: Set(owner.id.clone()),
            publish_status: Set(input.publish_status),
            collaborators: Set(serde_json::json!([])),
            video_ids: Set(serde_json::json!([])),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let playlist = self.playlist_repo.create(model).await?;
        info!(playlist_id = %playlist.id, owner_id = %owner.id, "Playlist created");

        self.views.playlist(playlist, Some(&owner.id)).await
    }

    /// Open a playlist with the videos the viewer may see.
    pub async fn get(&self, public_id: &str, viewer_id: Option<&str>) -> AppResult<PlaylistView> {
        let playlist = self
            .playlist_repo
            .find_visible(public_id, viewer_id)
            .await?
            .ok_or_else(|| not_found("Playlist"))?;

        self.views.playlist(playlist, viewer_id).await
    }

    /// A channel's playlists. The owner also sees unlisted and private ones.
    pub async fn list_by_owner(
        &self,
        username: &str,
        viewer_id: Option<&str>,
        request: PageRequest,
    ) -> AppResult<Paginated<PlaylistView>> {
        let owner = self
            .user_repo
            .find_by_username(&username.trim().to_lowercase())
            .await?
            .ok_or_else(|| AppError::NotFound("Channel not found".to_string()))?;
        let is_owner = viewer_id == Some(owner.id.as_str());

        let mut page = self
            .playlist_repo
            .list_by_owner(&owner.id, listed_statuses(is_owner), request)
            .await?;
        let models = std::mem::take(&mut page.docs);
        let views = self.views.playlists(models).await?;
        Ok(page.with_docs(views))
    }

    pub async fn update(
        &self,
        public_id: &str,
        caller_id: &str,
        input: UpdatePlaylistInput,
    ) -> AppResult<PlaylistView> {
        input.validate()?;
        let playlist =
            resolve_owned(&self.playlist_repo, public_id, caller_id, Access::Owner).await?;

        let mut active: playlist::ActiveModel = playlist.into();
        if let Some(title) = input.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(status) = input.publish_status {
            active.publish_status = Set(status);
        }
        active.updated_at = Set(Some(Utc::now().into()));

        let playlist = self.playlist_repo.update(active).await?;
        self.views.playlist(playlist, Some(caller_id)).await
    }

    pub async fn delete(&self, public_id: &str, caller_id: &str) -> AppResult<()> {
        let playlist =
            resolve_owned(&self.playlist_repo, public_id, caller_id, Access::Owner).await?;
        self.playlist_repo.delete(&playlist.id).await?;
        info!(playlist_id = %playlist.id, "Playlist deleted");
        Ok(())
    }

    /// Append a video the caller can see. Repeats are kept.
    pub async fn add_video(
        &self,
        public_id: &str,
        video_public_id: &str,
        caller_id: &str,
    ) -> AppResult<PlaylistView> {
        let playlist =
            resolve_owned(&self.playlist_repo, public_id, caller_id, Access::Editor).await?;
        let video = self
            .video_repo
            .find_visible(video_public_id, Some(caller_id))
            .await?
            .ok_or_else(|| not_found("Video"))?;

        let mut video_ids = playlist.video_id_list();
        video_ids.push(video.id);

        self.save_videos(playlist, video_ids, caller_id).await
    }

    /// Remove every occurrence of a video.
    pub async fn remove_video(
        &self,
        public_id: &str,
        video_public_id: &str,
        caller_id: &str,
    ) -> AppResult<PlaylistView> {
        let playlist =
            resolve_owned(&self.playlist_repo, public_id, caller_id, Access::Editor).await?;
        let video = self
            .video_repo
            .find_visible(video_public_id, Some(caller_id))
            .await?
            .ok_or_else(|| not_found("Video"))?;

        let mut video_ids = playlist.video_id_list();
        if remove_all(&mut video_ids, &video.id) == 0 {
            return Err(AppError::NotFound("Video not in playlist".to_string()));
        }

        self.save_videos(playlist, video_ids, caller_id).await
    }

    /// Grant a user edit rights over the playlist's videos.
    pub async fn add_collaborator(
        &self,
        public_id: &str,
        username: &str,
        caller_id: &str,
    ) -> AppResult<PlaylistView> {
        let playlist =
            resolve_owned(&self.playlist_repo, public_id, caller_id, Access::Owner).await?;
        let user = self.find_user(username).await?;

        if user.id == playlist.owner_id {
            return Err(AppError::BadRequest(
                "The owner cannot be a collaborator".to_string(),
            ));
        }

        let mut collaborators = playlist.collaborator_list();
        if collaborators.contains(&user.id) {
            return self.views.playlist(playlist, Some(caller_id)).await;
        }
        collaborators.push(user.id);

        self.save_collaborators(playlist, collaborators, caller_id)
            .await
    }

    pub async fn remove_collaborator(
        &self,
        public_id: &str,
        username: &str,
        caller_id: &str,
    ) -> AppResult<PlaylistView> {
        let playlist =
            resolve_owned(&self.playlist_repo, public_id, caller_id, Access::Owner).await?;
        let user = self.find_user(username).await?;

        let mut collaborators = playlist.collaborator_list();
        if remove_all(&mut collaborators, &user.id) == 0 {
            return self.views.playlist(playlist, Some(caller_id)).await;
        }

        self.save_collaborators(playlist, collaborators, caller_id)
            .await
    }

    async fn find_user(&self, username: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_username(&username.trim().to_lowercase())
            .await?
            .ok_or_else(|| not_found("User"))
    }

    async fn save_videos(
        &self,
        playlist: playlist::Model,
        video_ids: Vec<String>,
        caller_id: &str,
    ) -> AppResult<PlaylistView> {
        let mut active: playlist::ActiveModel = playlist.into();
        active.video_ids = Set(serde_json::json!(video_ids));
        active.updated_at = Set(Some(Utc::now().into()));

        let playlist = self.playlist_repo.update(active).await?;
        self.views.playlist(playlist, Some(caller_id)).await
    }

    async fn save_collaborators(
        &self,
        playlist: playlist::Model,
        collaborators: Vec<String>,
        caller_id: &str,
    ) -> AppResult<PlaylistView> {
        let mut active: playlist::ActiveModel = playlist.into();
        active.collaborators = Set(serde_json::json!(collaborators));
        active.updated_at = Set(Some(Utc::now().into()));

        let playlist = self.playlist_repo.update(active).await?;
        self.views.playlist(playlist, Some(caller_id)).await
    }
}
