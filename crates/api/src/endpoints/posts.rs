//! Post endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use serde::Deserialize;
use wavytv_common::{AppResult, Paginated};
use wavytv_core::{PostInput, PostView};

use crate::{
    extractors::{AuthUser, JsonBody, MaybeAuthUser, Page, QueryParams},
    middleware::AppState,
    response::ApiResponse,
};

#[derive(Debug, Default, Deserialize)]
pub struct PostQuery {
    /// Username of the channel to restrict to.
    pub owner: Option<String>,
}

async fn list(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<PostQuery>,
    Page(page): Page,
) -> AppResult<ApiResponse<Paginated<PostView>>> {
    let posts = state
        .post_service
        .list(query.owner.as_deref(), viewer.id(), page)
        .await?;
    Ok(ApiResponse::ok(posts))
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<PostInput>,
) -> AppResult<ApiResponse<PostView>> {
    let post = state.post_service.create(&user, input).await?;
    Ok(ApiResponse::created(post).with_message("Post created"))
}

async fn show(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(public_id): Path<String>,
) -> AppResult<ApiResponse<PostView>> {
    let post = state.post_service.get(&public_id, viewer.id()).await?;
    Ok(ApiResponse::ok(post))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(public_id): Path<String>,
    JsonBody(input): JsonBody<PostInput>,
) -> AppResult<ApiResponse<PostView>> {
    let post = state
        .post_service
        .update(&public_id, &user.id, input)
        .await?;
    Ok(ApiResponse::ok(post).with_message("Post updated"))
}

async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(public_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.post_service.delete(&public_id, &user.id).await?;
    Ok(ApiResponse::message("Post deleted"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{public_id}", get(show).patch(update).delete(remove))
}
