//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use sea_orm::DatabaseConnection;
use tracing::{debug, warn};
use wavytv_common::{AppError, Config, TagExtractor};
use wavytv_core::{
    AuthService, CommentService, FollowService, HistoryService, PlaylistService, PostService,
    SearchService, TargetResolver, UserService, VideoService, ViewAssembler, VoteService,
};
use wavytv_db::repositories::{
    CommentRepository, FollowRepository, HistoryRepository, PlaylistRepository, PostRepository,
    UserRepository, VideoRepository, VoteRepository,
};

use crate::cookies::{ACCESS_COOKIE, SessionCookies};
use crate::extractors::AuthFailure;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub video_service: VideoService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    pub vote_service: VoteService,
    pub follow_service: FollowService,
    pub playlist_service: PlaylistService,
    pub history_service: HistoryService,
    pub search_service: SearchService,
    pub cookies: SessionCookies,
}

impl AppState {
    /// Wire every repository and service over one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: &Config) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let video_repo = VideoRepository::new(Arc::clone(&db));
        let post_repo = PostRepository::new(Arc::clone(&db));
        let comment_repo = CommentRepository::new(Arc::clone(&db));
        let vote_repo = VoteRepository::new(Arc::clone(&db));
        let follow_repo = FollowRepository::new(Arc::clone(&db));
        let playlist_repo = PlaylistRepository::new(Arc::clone(&db));
        let history_repo = HistoryRepository::new(db);

        let tags = TagExtractor::new(&config.content.stop_words);
        let views = ViewAssembler::new(
            user_repo.clone(),
            vote_repo.clone(),
            follow_repo.clone(),
            video_repo.clone(),
            comment_repo.clone(),
        );
        let resolver = TargetResolver::new(
            video_repo.clone(),
            post_repo.clone(),
            comment_repo.clone(),
        );

        let video_service = VideoService::new(
            video_repo.clone(),
            user_repo.clone(),
            vote_repo.clone(),
            comment_repo.clone(),
            views.clone(),
            tags.clone(),
        );

        Self {
            auth_service: AuthService::new(user_repo.clone(), &config.auth),
            user_service: UserService::new(user_repo.clone(), views.clone(), tags),
            post_service: PostService::new(
                post_repo,
                user_repo.clone(),
                vote_repo.clone(),
                comment_repo.clone(),
                views.clone(),
            ),
            comment_service: CommentService::new(
                comment_repo,
                vote_repo.clone(),
                resolver.clone(),
                views.clone(),
            ),
            vote_service: VoteService::new(vote_repo, resolver, views.clone()),
            follow_service: FollowService::new(follow_repo, user_repo.clone()),
            playlist_service: PlaylistService::new(
                playlist_repo,
                video_repo.clone(),
                user_repo.clone(),
                views.clone(),
            ),
            history_service: HistoryService::new(history_repo, video_repo, views),
            search_service: SearchService::new(video_service.clone(), user_repo),
            video_service,
            cookies: SessionCookies::new(&config.cookies),
        }
    }
}

/// Access token from `Authorization: Bearer`, falling back to the cookie.
fn access_token(req: &Request<Body>, jar: &CookieJar) -> Option<String> {
    if let Some(header) = req.headers().get(AUTHORIZATION)
        && let Ok(value) = header.to_str()
        && let Some(token) = value.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }
    jar.get(ACCESS_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

/// Authentication middleware.
///
/// A valid token attaches the caller's `user::Model`. Otherwise the request
/// continues anonymously with the failure reason recorded.
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = access_token(&req, &jar) {
        match state.auth_service.authenticate(&token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(AppError::TokenExpired) => {
                debug!("Access token expired");
                req.extensions_mut().insert(AuthFailure::Expired);
            }
            Err(AppError::Unauthorized) => {
                debug!("Access token rejected");
                req.extensions_mut().insert(AuthFailure::Invalid);
            }
            Err(e) => {
                warn!(error = %e, "Failed to authenticate request");
                req.extensions_mut().insert(AuthFailure::Invalid);
            }
        }
    }

    next.run(req).await
}
