//! Playlist endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use wavytv_common::AppResult;
use wavytv_core::{CreatePlaylistInput, PlaylistView, UpdatePlaylistInput};

use crate::{
    extractors::{AuthUser, JsonBody, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreatePlaylistInput>,
) -> AppResult<ApiResponse<PlaylistView>> {
    let playlist = state.playlist_service.create(&user, input).await?;
    Ok(ApiResponse::created(playlist).with_message("Playlist created"))
}

async fn show(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(public_id): Path<String>,
) -> AppResult<ApiResponse<PlaylistView>> {
    let playlist = state.playlist_service.get(&public_id, viewer.id()).await?;
    Ok(ApiResponse::ok(playlist))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(public_id): Path<String>,
    JsonBody(input): JsonBody<UpdatePlaylistInput>,
) -> AppResult<ApiResponse<PlaylistView>> {
    let playlist = state
        .playlist_service
        .update(&public_id, &user.id, input)
        .await?;
    Ok(ApiResponse::ok(playlist).with_message("Playlist updated"))
}

async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(public_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.playlist_service.delete(&public_id, &user.id).await?;
    Ok(ApiResponse::message("Playlist deleted"))
}

async fn add_video(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((public_id, video_public_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<PlaylistView>> {
    let playlist = state
        .playlist_service
        .add_video(&public_id, &video_public_id, &user.id)
        .await?;
    Ok(ApiResponse::ok(playlist).with_message("Video added"))
}

async fn remove_video(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((public_id, video_public_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<PlaylistView>> {
    let playlist = state
        .playlist_service
        .remove_video(&public_id, &video_public_id, &user.id)
        .await?;
    Ok(ApiResponse::ok(playlist).with_message("Video removed"))
}

async fn add_collaborator(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((public_id, username)): Path<(String, String)>,
) -> AppResult<ApiResponse<PlaylistView>> {
    let playlist = state
        .playlist_service
        .add_collaborator(&public_id, &username, &user.id)
        .await?;
    Ok(ApiResponse::ok(playlist).with_message("Collaborator added"))
}

async fn remove_collaborator(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((public_id, username)): Path<(String, String)>,
) -> AppResult<ApiResponse<PlaylistView>> {
    let playlist = state
        .playlist_service
        .remove_collaborator(&public_id, &username, &user.id)
        .await?;
    Ok(ApiResponse::ok(playlist).with_message("Collaborator removed"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/{public_id}", get(show).patch(update).delete(remove))
        .route(
            "/{public_id}/videos/{video_public_id}",
            post(add_video).delete(remove_video),
        )
        .route(
            "/{public_id}/collaborators/{username}",
            post(add_collaborator).delete(remove_collaborator),
        )
}
