//! Users endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{delete, get, patch, post},
};
use serde::{Deserialize, Serialize};
use wavytv_common::{AppResult, Paginated};
use wavytv_core::{
    ChangePasswordInput, ChannelView, PlaylistView, PostView, UpdatePreferencesInput,
    UpdateProfileInput, VideoView,
};
use wavytv_db::entities::user::{self, Preferences};

use crate::{
    extractors::{AuthUser, JsonBody, MaybeAuthUser, Page},
    middleware::AppState,
    response::ApiResponse,
};

/// The caller's own account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub cover_image_url: Option<String>,
    pub about: Option<String>,
    pub tags: Vec<String>,
    pub preferences: Preferences,
    pub is_creator: bool,
    pub search_history: Vec<String>,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            tags: user.tag_list(),
            search_history: user.search_history_list(),
            created_at: user.created_at.to_rfc3339(),
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            avatar_url: user.avatar_url,
            cover_image_url: user.cover_image_url,
            about: user.about,
            preferences: user.preferences,
            is_creator: user.is_creator,
        }
    }
}

/// Get current user.
async fn me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.me(&user.id).await?;
    Ok(ApiResponse::ok(user.into()))
}

async fn update_profile(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<UpdateProfileInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.update_profile(user, input).await?;
    Ok(ApiResponse::ok(user.into()).with_message("Profile updated"))
}

async fn update_preferences(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<UpdatePreferencesInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.update_preferences(user, input).await?;
    Ok(ApiResponse::ok(user.into()).with_message("Preferences updated"))
}

/// Change password. Other sessions lose their refresh token.
async fn change_password(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<ChangePasswordInput>,
) -> AppResult<ApiResponse<()>> {
    state.user_service.change_password(user, input).await?;
    Ok(ApiResponse::message("Password changed"))
}

/// Creator mode request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorModeRequest {
    pub is_creator: bool,
}

async fn set_creator_mode(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreatorModeRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state
        .user_service
        .set_creator_mode(user, req.is_creator)
        .await?;
    Ok(ApiResponse::ok(user.into()))
}

async fn clear_search_history(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<()>> {
    state.user_service.clear_search_history(user).await?;
    Ok(ApiResponse::message("Search history cleared"))
}

/// Channel page.
async fn channel(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<ChannelView>> {
    let view = state.user_service.channel(&username, viewer.id()).await?;
    Ok(ApiResponse::ok(view))
}

async fn channel_videos(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
    Page(page): Page,
) -> AppResult<ApiResponse<Paginated<VideoView>>> {
    let videos = state
        .video_service
        .list_by_channel(&username, viewer.as_ref(), page)
        .await?;
    Ok(ApiResponse::ok(videos))
}

async fn channel_posts(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
    Page(page): Page,
) -> AppResult<ApiResponse<Paginated<PostView>>> {
    let posts = state
        .post_service
        .list(Some(&username), viewer.id(), page)
        .await?;
    Ok(ApiResponse::ok(posts))
}

async fn channel_playlists(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
    Page(page): Page,
) -> AppResult<ApiResponse<Paginated<PlaylistView>>> {
    let playlists = state
        .playlist_service
        .list_by_owner(&username, viewer.id(), page)
        .await?;
    Ok(ApiResponse::ok(playlists))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me).patch(update_profile))
        .route("/me/preferences", patch(update_preferences))
        .route("/me/password", post(change_password))
        .route("/me/creator", patch(set_creator_mode))
        .route("/me/search-history", delete(clear_search_history))
        .route("/{username}", get(channel))
        .route("/{username}/videos", get(channel_videos))
        .route("/{username}/posts", get(channel_posts))
        .route("/{username}/playlists", get(channel_playlists))
}
