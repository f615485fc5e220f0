//! Follow endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use wavytv_common::{AppResult, Paginated};
use wavytv_core::{FollowOutcome, FollowToggle, OwnerProfile};

use crate::{
    extractors::{AuthUser, Page},
    middleware::AppState,
    response::ApiResponse,
};

/// Follow the channel, or unfollow it if already following.
async fn toggle(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<FollowToggle>> {
    let toggled = state.follow_service.toggle(&username, &user.id).await?;
    let message = match toggled.result {
        FollowOutcome::Followed => "Followed",
        FollowOutcome::Unfollowed => "Unfollowed",
    };
    Ok(ApiResponse::ok(toggled).with_message(message))
}

async fn followers(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Page(page): Page,
) -> AppResult<ApiResponse<Paginated<OwnerProfile>>> {
    let profiles = state.follow_service.followers(&username, page).await?;
    Ok(ApiResponse::ok(profiles))
}

async fn following(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Page(page): Page,
) -> AppResult<ApiResponse<Paginated<OwnerProfile>>> {
    let profiles = state.follow_service.following(&username, page).await?;
    Ok(ApiResponse::ok(profiles))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{username}", post(toggle))
        .route("/{username}/followers", get(followers))
        .route("/{username}/following", get(following))
}
