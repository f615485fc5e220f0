//! Comment endpoints.
//!
//! `{kind}` is `video`, `post` or `comment`; commenting on a comment is a
//! reply.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, patch},
};
use wavytv_common::{AppResult, Paginated};
use wavytv_core::{CommentInput, CommentView};

use crate::{
    extractors::{AuthUser, JsonBody, MaybeAuthUser, Page, target_kind},
    middleware::AppState,
    response::ApiResponse,
};

async fn list(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path((kind, public_id)): Path<(String, String)>,
    Page(page): Page,
) -> AppResult<ApiResponse<Paginated<CommentView>>> {
    let comments = state
        .comment_service
        .list_for_target(target_kind(&kind)?, &public_id, viewer.id(), page)
        .await?;
    Ok(ApiResponse::ok(comments))
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((kind, public_id)): Path<(String, String)>,
    JsonBody(input): JsonBody<CommentInput>,
) -> AppResult<ApiResponse<CommentView>> {
    let comment = state
        .comment_service
        .create(target_kind(&kind)?, &public_id, &user, input)
        .await?;
    Ok(ApiResponse::created(comment).with_message("Comment added"))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(public_id): Path<String>,
    JsonBody(input): JsonBody<CommentInput>,
) -> AppResult<ApiResponse<CommentView>> {
    let comment = state
        .comment_service
        .update(&public_id, &user.id, input)
        .await?;
    Ok(ApiResponse::ok(comment).with_message("Comment updated"))
}

async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(public_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.comment_service.delete(&public_id, &user.id).await?;
    Ok(ApiResponse::message("Comment deleted"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{kind}/{public_id}", get(list).post(create))
        .route("/{public_id}", patch(update).delete(remove))
}
