//! API endpoints.

mod auth;
mod comments;
mod follows;
mod history;
mod playlists;
mod posts;
mod search;
mod users;
mod videos;
mod votes;

use axum::Router;

use crate::middleware::AppState;

pub use users::UserResponse;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/videos", videos::router())
        .nest("/posts", posts::router())
        .nest("/comments", comments::router())
        .nest("/votes", votes::router())
        .nest("/follows", follows::router())
        .nest("/playlists", playlists::router())
        .nest("/history", history::router())
        .nest("/search", search::router())
}
