//! Video endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use tracing::warn;
use wavytv_common::{AppResult, Paginated};
use wavytv_core::{CreateVideoInput, UpdateVideoInput, VideoQuery, VideoView};

use crate::{
    extractors::{AuthUser, JsonBody, MaybeAuthUser, Page, QueryParams},
    middleware::AppState,
    response::ApiResponse,
};

/// Browse public videos.
async fn list(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<VideoQuery>,
    Page(page): Page,
) -> AppResult<ApiResponse<Paginated<VideoView>>> {
    let videos = state.video_service.list(query, viewer.as_ref(), page).await?;
    Ok(ApiResponse::ok(videos))
}

/// Publish a video whose media is already uploaded.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateVideoInput>,
) -> AppResult<ApiResponse<VideoView>> {
    let video = state.video_service.create(&user, input).await?;
    Ok(ApiResponse::created(video).with_message("Video published"))
}

/// Watch a video. Counts a view and, for a signed-in viewer, records history.
async fn show(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(public_id): Path<String>,
) -> AppResult<ApiResponse<VideoView>> {
    let video = state
        .video_service
        .get(&public_id, viewer.as_ref().map(|v| v.id.as_str()))
        .await?;

    if let Some(viewer) = viewer
        && let Err(e) = state.history_service.record_public(&viewer, &public_id).await
    {
        warn!(error = %e, user_id = %viewer.id, "Failed to record watch history");
    }

    Ok(ApiResponse::ok(video))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(public_id): Path<String>,
    JsonBody(input): JsonBody<UpdateVideoInput>,
) -> AppResult<ApiResponse<VideoView>> {
    let video = state
        .video_service
        .update(&public_id, &user.id, input)
        .await?;
    Ok(ApiResponse::ok(video).with_message("Video updated"))
}

async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(public_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.video_service.delete(&public_id, &user.id).await?;
    Ok(ApiResponse::message("Video deleted"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{public_id}", get(show).patch(update).delete(remove))
}
