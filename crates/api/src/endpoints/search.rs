//! Search endpoints.

use axum::{Router, extract::State, routing::get};
use wavytv_common::{AppResult, Paginated};
use wavytv_core::{OwnerProfile, SearchQuery, VideoView};

use crate::{
    extractors::{MaybeAuthUser, Page, QueryParams},
    middleware::AppState,
    response::ApiResponse,
};

async fn videos(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
    Page(page): Page,
) -> AppResult<ApiResponse<Paginated<VideoView>>> {
    let results = state
        .search_service
        .search_videos(query, viewer.as_ref(), page)
        .await?;
    Ok(ApiResponse::ok(results))
}

async fn users(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
    Page(page): Page,
) -> AppResult<ApiResponse<Paginated<OwnerProfile>>> {
    let results = state
        .search_service
        .search_users(query, viewer.as_ref(), page)
        .await?;
    Ok(ApiResponse::ok(results))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/videos", get(videos))
        .route("/users", get(users))
}
