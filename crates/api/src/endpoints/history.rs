//! Watch history endpoints. All require a signed-in caller.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Serialize;
use wavytv_common::{AppResult, Paginated};
use wavytv_core::HistoryEntryView;

use crate::{
    extractors::{AuthUser, Page},
    middleware::AppState,
    response::ApiResponse,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse {
    /// `false` when the caller has watch history turned off.
    pub recorded: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearResponse {
    pub removed: u64,
}

async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Page(page): Page,
) -> AppResult<ApiResponse<Paginated<HistoryEntryView>>> {
    let entries = state.history_service.list(&user.id, page).await?;
    Ok(ApiResponse::ok(entries))
}

async fn clear(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<ClearResponse>> {
    let removed = state.history_service.clear(&user.id).await?;
    Ok(ApiResponse::ok(ClearResponse { removed }).with_message("History cleared"))
}

async fn record(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(video_public_id): Path<String>,
) -> AppResult<ApiResponse<RecordResponse>> {
    let recorded = state
        .history_service
        .record_public(&user, &video_public_id)
        .await?;
    Ok(ApiResponse::ok(RecordResponse { recorded }))
}

async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(video_public_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state
        .history_service
        .remove(&user.id, &video_public_id)
        .await?;
    Ok(ApiResponse::message("Removed from history"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).delete(clear))
        .route("/{video_public_id}", post(record).delete(remove))
}
