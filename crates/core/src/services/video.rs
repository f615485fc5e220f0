//! Video service.

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use tracing::{debug, info};
use validator::Validate;
use wavytv_common::{AppError, AppResult, IdGenerator, PageRequest, Paginated, TagExtractor};
use wavytv_db::{
    entities::{
        target::Target,
        user::{self, NsfwPolicy},
        video::{self, MediaAsset, PublishStatus},
    },
    repositories::{
        CommentRepository, UserRepository, VideoFilter, VideoRepository, VoteRepository,
        visibility::listed_statuses,
    },
};

use crate::services::comment::remove_attachments;
use crate::services::guard::{Access, not_found, resolve_owned};
use crate::services::view::{VideoView, ViewAssembler};

/// Input for publishing a video whose media is already uploaded.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVideoInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,

    #[validate(range(min = 0))]
    pub duration_ms: i64,

    pub video_file: MediaAsset,
    pub thumbnail: MediaAsset,

    /// Falls back to the owner's default.
    pub publish_status: Option<PublishStatus>,

    /// Falls back to the owner's default.
    #[validate(length(min = 1, max = 64))]
    pub category: Option<String>,

    #[serde(default)]
    pub is_nsfw: bool,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVideoInput {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    pub thumbnail: Option<MediaAsset>,
    pub publish_status: Option<PublishStatus>,

    #[validate(length(min = 1, max = 64))]
    pub category: Option<String>,

    pub is_nsfw: Option<bool>,
}

/// Browse filters for the public video list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoQuery {
    pub category: Option<String>,
    /// Username of the channel to restrict to.
    pub owner: Option<String>,
}

fn check_asset(field: &str, asset: &MediaAsset) -> AppResult<()> {
    if asset.url.trim().is_empty() {
        return Err(AppError::invalid(field, "url is required"));
    }
    if asset.provider_id.trim().is_empty() {
        return Err(AppError::invalid(field, "providerId is required"));
    }
    Ok(())
}

/// Whether a viewer's preferences hide NSFW videos from listings.
#[must_use]
pub fn hides_nsfw(viewer: Option<&user::Model>) -> bool {
    viewer.is_some_and(|v| v.preferences.nsfw == NsfwPolicy::Hide)
}

/// Video service for business logic.
#[derive(Clone)]
pub struct VideoService {
    video_repo: VideoRepository,
    user_repo: UserRepository,
    vote_repo: VoteRepository,
    comment_repo: CommentRepository,
    views: ViewAssembler,
    tags: TagExtractor,
    id_gen: IdGenerator,
}

impl VideoService {
    /// Create a new video service.
    #[must_use]
    pub const fn new(
        video_repo: VideoRepository,
        user_repo: UserRepository,
        vote_repo: VoteRepository,
        comment_repo: CommentRepository,
        views: ViewAssembler,
        tags: TagExtractor,
    ) -> Self {
        Self {
            video_repo,
            user_repo,
            vote_repo,
            comment_repo,
            views,
            tags,
            id_gen: IdGenerator::new(),
        }
    }

    /// Publish a new video owned by `owner`.
    pub async fn create(&self, owner: &user::Model, input: CreateVideoInput) -> AppResult<VideoView> {
        input.validate()?;
        check_asset("videoFile", &input.video_file)?;
        check_asset("thumbnail", &input.thumbnail)?;

        let preferences = &owner.preferences;
        let tags = self
            .tags
            .extract(&input.title, Some(&input.description));

        let model = video::ActiveModel {
            id: Set(self.id_gen.generate()),
            public_id: Set(self.id_gen.generate_public_id()),
            title: Set(input.title.trim().to_string()),
            description: Set(input.description),
            duration_ms: Set(input.duration_ms),
            views: Set(0),
            owner_id: Set(owner.id.clone()),
            video_file: Set(input.video_file),
            thumbnail: Set(input.thumbnail),
            publish_status: Set(input
                .publish_status
                .unwrap_or(preferences.default_publish_status)),
            category: Set(input
                .category
                .map_or_else(|| preferences.default_category.clone(), |c| c.trim().to_lowercase())),
            is_nsfw: Set(input.is_nsfw),
            tags: Set(serde_json::json!(tags)),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let video = self.video_repo.create(model).await?;
        info!(video_id = %video.id, owner_id = %owner.id, "Video published");

        self.views.video(video, Some(&owner.id)).await
    }

    /// Open a video. Every successful call counts one view.
    pub async fn get(&self, public_id: &str, viewer_id: Option<&str>) -> AppResult<VideoView> {
        let mut video = self
            .video_repo
            .find_visible(public_id, viewer_id)
            .await?
            .ok_or_else(|| not_found("Video"))?;

        self.video_repo.increment_views(&video.id).await?;
        video.views += 1;
        debug!(video_id = %video.id, views = video.views, "View counted");

        self.views.video(video, viewer_id).await
    }

    /// Resolve a visible video without counting a view.
    pub async fn find_visible(
        &self,
        public_id: &str,
        viewer_id: Option<&str>,
    ) -> AppResult<video::Model> {
        self.video_repo
            .find_visible(public_id, viewer_id)
            .await?
            .ok_or_else(|| not_found("Video"))
    }

    /// Browse public videos, newest first.
    pub async fn list(
        &self,
        query: VideoQuery,
        viewer: Option<&user::Model>,
        request: PageRequest,
    ) -> AppResult<Paginated<VideoView>> {
        let owner_id = match query.owner.as_deref() {
            Some(username) => Some(self.channel_owner(username).await?.id),
            None => None,
        };

        let filter = VideoFilter {
            owner_id,
            category: query.category.map(|c| c.trim().to_lowercase()),
            exclude_nsfw: hides_nsfw(viewer),
            ..Default::default()
        };
        self.assemble_page(&filter, viewer, request).await
    }

    /// A channel's videos. The owner also sees unlisted and private ones.
    pub async fn list_by_channel(
        &self,
        username: &str,
        viewer: Option<&user::Model>,
        request: PageRequest,
    ) -> AppResult<Paginated<VideoView>> {
        let owner = self.channel_owner(username).await?;
        let is_owner = viewer.is_some_and(|v| v.id == owner.id);

        let filter = VideoFilter {
            owner_id: Some(owner.id),
            statuses: listed_statuses(is_owner),
            exclude_nsfw: !is_owner && hides_nsfw(viewer),
            ..Default::default()
        };
        self.assemble_page(&filter, viewer, request).await
    }

    /// Run a filtered listing and assemble views for the page.
    pub async fn assemble_page(
        &self,
        filter: &VideoFilter,
        viewer: Option<&user::Model>,
        request: PageRequest,
    ) -> AppResult<Paginated<VideoView>> {
        let mut page = self.video_repo.list(filter, request).await?;
        let models = std::mem::take(&mut page.docs);
        let views = self
            .views
            .videos(models, viewer.map(|v| v.id.as_str()))
            .await?;
        Ok(page.with_docs(views))
    }

    /// Edit a video the caller owns.
    pub async fn update(
        &self,
        public_id: &str,
        caller_id: &str,
        input: UpdateVideoInput,
    ) -> AppResult<VideoView> {
        input.validate()?;
        if let Some(thumbnail) = &input.thumbnail {
            check_asset("thumbnail", thumbnail)?;
        }

        let video = resolve_owned(&self.video_repo, public_id, caller_id, Access::Owner).await?;

        let retag = input.title.is_some() || input.description.is_some();
        let title = input.title.map_or_else(|| video.title.clone(), |t| t.trim().to_string());
        let description = input.description.unwrap_or_else(|| video.description.clone());

        let mut active: video::ActiveModel = video.into();
        if retag {
            let tags = self.tags.extract(&title, Some(&description));
            active.tags = Set(serde_json::json!(tags));
        }
        active.title = Set(title);
        active.description = Set(description);
        if let Some(thumbnail) = input.thumbnail {
            active.thumbnail = Set(thumbnail);
        }
        if let Some(status) = input.publish_status {
            active.publish_status = Set(status);
        }
        if let Some(category) = input.category {
            active.category = Set(category.trim().to_lowercase());
        }
        if let Some(is_nsfw) = input.is_nsfw {
            active.is_nsfw = Set(is_nsfw);
        }
        active.updated_at = Set(Some(Utc::now().into()));

        let video = self.video_repo.update(active).await?;
        self.views.video(video, Some(caller_id)).await
    }

    /// Delete a video the caller owns, with its votes and comments.
    pub async fn delete(&self, public_id: &str, caller_id: &str) -> AppResult<()> {
        let video = resolve_owned(&self.video_repo, public_id, caller_id, Access::Owner).await?;
        self.video_repo.delete(&video.id).await?;
        info!(video_id = %video.id, "Video deleted");

        remove_attachments(
            &self.comment_repo,
            &self.vote_repo,
            &Target::Video(video.id),
        )
        .await;
        Ok(())
    }

    async fn channel_owner(&self, username: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_username(&username.trim().to_lowercase())
            .await?
            .ok_or_else(|| AppError::NotFound("Channel not found".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::test_support::{
        assembler, count_row, create_test_comment, create_test_user, create_test_video,
        create_test_vote, db_with, exec, executed_sql, no_rows, tally_row,
    };
    use wavytv_db::entities::comment;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use wavytv_db::entities::vote::VoteKind;

    fn service(db: MockDatabase) -> VideoService {
        let db = db_with(db);
        VideoService::new(
            VideoRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            VoteRepository::new(db.clone()),
            CommentRepository::new(db.clone()),
            assembler(&db),
            TagExtractor::new(["the"]),
        )
    }

    fn asset(url: &str) -> MediaAsset {
        MediaAsset {
            provider_id: "prov".to_string(),
            url: url.to_string(),
            width: None,
            height: None,
            format: None,
        }
    }

    #[test]
    fn test_hides_nsfw_only_for_hide_policy() {
        let mut user = create_test_user("u1", "alice");
        assert!(!hides_nsfw(None));
        assert!(!hides_nsfw(Some(&user)));

        user.preferences.nsfw = NsfwPolicy::Hide;
        assert!(hides_nsfw(Some(&user)));
    }

    #[tokio::test]
    async fn test_anonymous_get_counts_view() {
        let video = create_test_video("v1", "u1", PublishStatus::Public);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[video]])
                .append_exec_results([exec(1)])
                .append_query_results([no_rows()])
                .append_query_results([[create_test_user("u1", "alice")]]),
        );

        let view = service.get("pub_v1", None).await.unwrap();

        assert_eq!(view.views, 11);
        assert_eq!(view.votes.upvotes, 0);
        assert_eq!(view.votes.downvotes, 0);
        assert_eq!(view.votes.current_viewer_vote, None);
        assert_eq!(view.owner.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn test_get_reflects_viewer_vote() {
        let video = create_test_video("v1", "u1", PublishStatus::Public);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[video]])
                .append_exec_results([exec(1)])
                .append_query_results([[tally_row("v1", "UPVOTE", 1)]])
                .append_query_results([[create_test_vote(
                    "vt1",
                    "u2",
                    VoteKind::Upvote,
                    &Target::Video("v1".to_string()),
                )]])
                .append_query_results([[create_test_user("u1", "alice")]]),
        );

        let view = service.get("pub_v1", Some("u2")).await.unwrap();

        assert_eq!(view.votes.upvotes, 1);
        assert_eq!(view.votes.current_viewer_vote, Some(VoteKind::Upvote));
    }

    #[tokio::test]
    async fn test_hidden_video_is_not_found() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<video::Model>::new()]),
        );

        let err = service.get("pub_private", Some("u2")).await.unwrap_err();
        match err {
            AppError::NotFound(message) => assert_eq!(message, "Video not found"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_missing_media_url() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));
        let owner = create_test_user("u1", "alice");

        let err = service
            .create(
                &owner,
                CreateVideoInput {
                    title: "Cats".to_string(),
                    description: String::new(),
                    duration_ms: 1000,
                    video_file: asset(""),
                    thumbnail: asset("thumb.jpg"),
                    publish_status: None,
                    category: None,
                    is_nsfw: false,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_update_foreign_video_is_not_found() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<video::Model>::new()]),
        );

        let err = service
            .update("pub_v1", "intruder", UpdateVideoInput::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_cleans_up_attachments() {
        let video = create_test_video("v1", "u1", PublishStatus::Public);
        let on_video = Target::Video("v1".to_string());
        let on_comment = Target::Comment("c1".to_string());
        let db = db_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[video]])
                .append_query_results([[create_test_comment("c1", "u2", &on_video)]])
                .append_query_results([[create_test_comment("c2", "u3", &on_comment)]])
                .append_query_results([Vec::<comment::Model>::new()])
                .append_exec_results([exec(1), exec(3), exec(2), exec(2)]),
        );
        let service = VideoService::new(
            VideoRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            VoteRepository::new(db.clone()),
            CommentRepository::new(db.clone()),
            assembler(&db),
            TagExtractor::default(),
        );

        service.delete("pub_v1", "u1").await.unwrap();
        drop(service);

        let sql = executed_sql(db);
        assert_eq!(sql.len(), 8);
        assert!(sql[1].starts_with(r#"DELETE FROM "video""#));
        assert!(sql[2].starts_with(r#"DELETE FROM "vote""#));
        assert!(sql[6].starts_with(r#"DELETE FROM "vote""#));
        assert!(sql[6].contains(r#""target_id" IN"#));
        assert!(sql[7].starts_with(r#"DELETE FROM "comment""#));
        assert!(sql[7].contains(r#""id" IN"#));
    }

    #[tokio::test]
    async fn test_list_beyond_last_page() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[count_row(10)]]),
        );

        let err = service
            .list(VideoQuery::default(), None, PageRequest::new(2, 10).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidPage { page: 2, total_pages: 1 }));
    }

    #[tokio::test]
    async fn test_list_assembles_page() {
        let v1 = create_test_video("v1", "u1", PublishStatus::Public);
        let v2 = create_test_video("v2", "u1", PublishStatus::Public);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(2)]])
                .append_query_results([[v2, v1]])
                .append_query_results([[tally_row("v1", "DOWNVOTE", 4)]])
                .append_query_results([[create_test_user("u1", "alice")]]),
        );

        let page = service
            .list(VideoQuery::default(), None, PageRequest::default())
            .await
            .unwrap();

        assert_eq!(page.total_docs, 2);
        assert_eq!(page.docs[0].id, "pub_v2");
        assert_eq!(page.docs[0].votes.downvotes, 0);
        assert_eq!(page.docs[1].votes.downvotes, 4);
    }
}
