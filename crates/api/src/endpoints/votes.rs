//! Vote endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::post,
};
use serde::Deserialize;
use wavytv_common::{AppError, AppResult};
use wavytv_core::VoteToggle;
use wavytv_db::entities::vote::VoteKind;

use crate::{
    extractors::{AuthUser, QueryParams, target_kind},
    middleware::AppState,
    response::ApiResponse,
};

#[derive(Debug, Deserialize)]
pub struct ToggleQuery {
    /// `UPVOTE` or `DOWNVOTE`.
    pub toggle: Option<VoteKind>,
}

/// Cast, switch or withdraw the caller's vote.
async fn toggle(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((kind, public_id)): Path<(String, String)>,
    QueryParams(query): QueryParams<ToggleQuery>,
) -> AppResult<ApiResponse<VoteToggle>> {
    let kind = target_kind(&kind)?;
    let desired = query
        .toggle
        .ok_or_else(|| AppError::invalid("toggle", "must be UPVOTE or DOWNVOTE"))?;

    let toggled = state
        .vote_service
        .toggle_public(kind, &public_id, &user.id, desired)
        .await?;
    Ok(ApiResponse::ok(toggled))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{kind}/{public_id}", post(toggle))
}
