//! Authentication endpoints.

use axum::{Router, body::Bytes, extract::State, routing::post};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::info;
use wavytv_common::{AppError, AppResult};
use wavytv_core::{LoginInput, Session, SignupInput};

use super::users::UserResponse;
use crate::{
    cookies::REFRESH_COOKIE,
    extractors::{AuthUser, JsonBody},
    middleware::AppState,
    response::ApiResponse,
};

/// Session response: the user plus both tokens.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            user: session.user.into(),
            access_token: session.tokens.access_token,
            refresh_token: session.tokens.refresh_token,
        }
    }
}

/// Create a new account. The client logs in afterwards.
async fn signup(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<SignupInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.auth_service.signup(input).await?;
    Ok(ApiResponse::created(user.into()).with_message("Account created"))
}

/// Log in with a username or email and set the session cookies.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(input): JsonBody<LoginInput>,
) -> AppResult<(CookieJar, ApiResponse<SessionResponse>)> {
    let session = state.auth_service.login(input).await?;
    let jar = state.cookies.set(jar, &session.tokens);
    Ok((jar, ApiResponse::ok(session.into()).with_message("Logged in")))
}

/// End the session and clear the cookies.
async fn logout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, ApiResponse<()>)> {
    state.auth_service.logout(user).await?;
    Ok((state.cookies.clear(jar), ApiResponse::message("Logged out")))
}

/// Refresh request. The token may also come from the cookie.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Rotate both tokens.
async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> AppResult<(CookieJar, ApiResponse<SessionResponse>)> {
    let req: RefreshRequest = if body.iter().all(u8::is_ascii_whitespace) {
        RefreshRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))?
    };

    let token = req
        .refresh_token
        .filter(|t| !t.is_empty())
        .or_else(|| jar.get(REFRESH_COOKIE).map(|c| c.value().to_string()))
        .ok_or(AppError::Unauthorized)?;

    let session = state.auth_service.refresh(&token).await?;
    info!(user_id = %session.user.id, "Session refreshed");

    let jar = state.cookies.set(jar, &session.tokens);
    Ok((jar, ApiResponse::ok(session.into()).with_message("Token refreshed")))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/refresh", post(refresh))
}
