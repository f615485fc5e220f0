//! Post service.

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;
use wavytv_common::{AppError, AppResult, IdGenerator, PageRequest, Paginated};
use wavytv_db::{
    entities::{post, target::Target, user},
    repositories::{CommentRepository, PostRepository, UserRepository, VoteRepository},
};

use crate::services::comment::remove_attachments;
use crate::services::guard::{Access, not_found, resolve_owned};
use crate::services::view::{PostView, ViewAssembler};

/// Input for writing or editing a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostInput {
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
}

impl PostInput {
    fn checked_content(self) -> AppResult<String> {
        self.validate()?;
        let content = self.content.trim();
        if content.is_empty() {
            return Err(AppError::invalid("content", "must not be blank"));
        }
        Ok(content.to_string())
    }
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    vote_repo: VoteRepository,
    comment_repo: CommentRepository,
    views: ViewAssembler,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        user_repo: UserRepository,
        vote_repo: VoteRepository,
        comment_repo: CommentRepository,
        views: ViewAssembler,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            vote_repo,
            comment_repo,
            views,
            id_gen: IdGenerator::new(),
        }
    }

    pub async fn create(&self, owner: &user::Model, input: PostInput) -> AppResult<PostView> {
        let content = input.checked_content()?;

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            public_id: Set(self.id_gen.generate_public_id()),
            content: Set(content),
            owner_id: Set(owner.id.clone()),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let post = self.post_repo.create(model).await?;
        info!(post_id = %post.id, owner_id = %owner.id, "Post created");

        self.views.post(post, Some(&owner.id)).await
    }

    pub async fn get(&self, public_id: &str, viewer_id: Option<&str>) -> AppResult<PostView> {
        let post = self
            .post_repo
            .find_by_public_id(public_id)
            .await?
            .ok_or_else(|| not_found("Post"))?;

        self.views.post(post, viewer_id).await
    }

    /// Posts newest first, optionally restricted to one channel by username.
    pub async fn list(
        &self,
        owner_username: Option<&str>,
        viewer_id: Option<&str>,
        request: PageRequest,
    ) -> AppResult<Paginated<PostView>> {
        let owner_id = match owner_username {
            Some(username) => Some(
                self.user_repo
                    .find_by_username(&username.trim().to_lowercase())
                    .await?
                    .ok_or_else(|| AppError::NotFound("Channel not found".to_string()))?
                    .id,
            ),
            None => None,
        };

        let mut page = self.post_repo.list(owner_id.as_deref(), request).await?;
        let models = std::mem::take(&mut page.docs);
        let views = self.views.posts(models, viewer_id).await?;
        Ok(page.with_docs(views))
    }

    pub async fn update(
        &self,
        public_id: &str,
        caller_id: &str,
        input: PostInput,
    ) -> AppResult<PostView> {
        let content = input.checked_content()?;
        let post = resolve_owned(&self.post_repo, public_id, caller_id, Access::Owner).await?;

        let mut active: post::ActiveModel = post.into();
        active.content = Set(content);
        active.updated_at = Set(Some(Utc::now().into()));

        let post = self.post_repo.update(active).await?;
        self.views.post(post, Some(caller_id)).await
    }

    /// Delete a post the caller owns, with its votes and comments.
    pub async fn delete(&self, public_id: &str, caller_id: &str) -> AppResult<()> {
        let post = resolve_owned(&self.post_repo, public_id, caller_id, Access::Owner).await?;
        self.post_repo.delete(&post.id).await?;
        info!(post_id = %post.id, "Post deleted");

        remove_attachments(
            &self.comment_repo,
            &self.vote_repo,
            &Target::Post(post.id),
        )
        .await;
        Ok(())
    }
}
