//! User service.

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;
use wavytv_common::{AppError, AppResult, TagExtractor};
use wavytv_db::{
    entities::{
        user::{self, NsfwPolicy},
        video::PublishStatus,
    },
    repositories::UserRepository,
};

use crate::services::auth::{hash_password, verify_password};
use crate::services::view::{ChannelView, ViewAssembler};

/// Input for updating a user's public profile.
///
/// An empty string clears an optional field.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 128))]
    pub full_name: Option<String>,

    #[validate(length(max = 2048))]
    pub about: Option<String>,

    #[validate(length(max = 2048))]
    pub avatar_url: Option<String>,

    #[validate(length(max = 2048))]
    pub cover_image_url: Option<String>,
}

/// Partial preference update; absent fields keep their value.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencesInput {
    #[validate(length(min = 1, max = 32))]
    pub theme: Option<String>,
    pub nsfw: Option<NsfwPolicy>,
    pub default_publish_status: Option<PublishStatus>,
    #[validate(length(min = 1, max = 64))]
    pub default_category: Option<String>,
    pub save_watch_history: Option<bool>,
    pub save_search_history: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordInput {
    #[validate(length(min = 1, max = 128))]
    pub old_password: String,

    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    views: ViewAssembler,
    tags: TagExtractor,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, views: ViewAssembler, tags: TagExtractor) -> Self {
        Self {
            user_repo,
            views,
            tags,
        }
    }

    /// Reload the caller's own account.
    pub async fn me(&self, user_id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(user_id).await
    }

    /// Look up a channel owner by username, or `NotFound`.
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_username(&username.trim().to_lowercase())
            .await?
            .ok_or_else(|| AppError::NotFound("Channel not found".to_string()))
    }

    /// Update the public profile. Tags are recomputed from `about`.
    pub async fn update_profile(
        &self,
        user: user::Model,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;
        let active = self.profile_changes(user, input);
        self.user_repo.update(active).await
    }

    fn profile_changes(&self, user: user::Model, input: UpdateProfileInput) -> user::ActiveModel {
        let mut active: user::ActiveModel = user.into();

        if let Some(full_name) = input.full_name {
            active.full_name = Set(full_name.trim().to_string());
        }
        if let Some(about) = input.about {
            let about = non_empty(about);
            let tags = about
                .as_deref()
                .map(|text| self.tags.extract(text, None))
                .unwrap_or_default();
            active.tags = Set(serde_json::json!(tags));
            active.about = Set(about);
        }
        if let Some(avatar_url) = input.avatar_url {
            active.avatar_url = Set(non_empty(avatar_url));
        }
        if let Some(cover_image_url) = input.cover_image_url {
            active.cover_image_url = Set(non_empty(cover_image_url));
        }

        active.updated_at = Set(Some(Utc::now().into()));
        active
    }

    /// Merge a partial preference update.
    pub async fn update_preferences(
        &self,
        user: user::Model,
        input: UpdatePreferencesInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let mut preferences = user.preferences.clone();
        if let Some(theme) = input.theme {
            preferences.theme = theme;
        }
        if let Some(nsfw) = input.nsfw {
            preferences.nsfw = nsfw;
        }
        if let Some(status) = input.default_publish_status {
            preferences.default_publish_status = status;
        }
        if let Some(category) = input.default_category {
            preferences.default_category = category.trim().to_lowercase();
        }
        if let Some(save) = input.save_watch_history {
            preferences.save_watch_history = save;
        }
        if let Some(save) = input.save_search_history {
            preferences.save_search_history = save;
        }

        let mut active: user::ActiveModel = user.into();
        active.preferences = Set(preferences);
        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await
    }

    /// Replace the password after checking the old one.
    ///
    /// The stored refresh token is cleared, ending other sessions.
    pub async fn change_password(
        &self,
        user: user::Model,
        input: ChangePasswordInput,
    ) -> AppResult<()> {
        input.validate()?;

        if !verify_password(&input.old_password, &user.password)? {
            return Err(AppError::BadRequest("Invalid old password".to_string()));
        }

        let user_id = user.id.clone();
        let mut active: user::ActiveModel = user.into();
        active.password = Set(hash_password(&input.new_password)?);
        active.refresh_token = Set(None);
        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await?;

        info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    /// Turn creator mode on or off.
    pub async fn set_creator_mode(
        &self,
        user: user::Model,
        is_creator: bool,
    ) -> AppResult<user::Model> {
        let mut active: user::ActiveModel = user.into();
        active.is_creator = Set(is_creator);
        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await
    }

    pub async fn clear_search_history(&self, user: user::Model) -> AppResult<user::Model> {
        let mut active: user::ActiveModel = user.into();
        active.search_history = Set(serde_json::json!([]));
        self.user_repo.update(active).await
    }

    /// Channel page for `username` as seen by `viewer_id`.
    pub async fn channel(&self, username: &str, viewer_id: Option<&str>) -> AppResult<ChannelView> {
        let user = self.get_by_username(username).await?;
        self.views.channel(user, viewer_id).await
    }
}
