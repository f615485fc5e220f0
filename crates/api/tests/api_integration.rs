//! API integration tests.
//!
//! These drive the full router, including the auth and rate-limit
//! middleware, over a mock database.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone)]

use std::collections::BTreeMap;
use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, Value};
use tower::ServiceExt;
use wavytv_api::{AppState, RateLimiterState, app};
use wavytv_common::config::{
    AuthConfig, Config, ContentConfig, CookieConfig, DatabaseConfig, ServerConfig,
};
use wavytv_db::entities::{
    target::TargetKind,
    user::{self, Preferences},
    video::{self, MediaAsset, PublishStatus},
    vote::{self, VoteKind},
};

/// Create a test configuration.
fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            url: "http://localhost:8000".to_string(),
            cors_origin: None,
        },
        database: DatabaseConfig {
            url: "postgres://localhost/wavytv_test".to_string(),
            max_connections: 5,
            min_connections: 1,
        },
        auth: AuthConfig {
            access_token_secret: "access-secret".to_string(),
            access_token_ttl_secs: 3600,
            refresh_token_secret: "refresh-secret".to_string(),
            refresh_token_ttl_secs: 86_400,
        },
        cookies: CookieConfig::default(),
        content: ContentConfig::default(),
    }
}

fn create_test_state(mock: MockDatabase, config: &Config) -> AppState {
    AppState::new(Arc::new(mock.into_connection()), config)
}

fn create_test_app(mock: MockDatabase) -> (Router, AppState) {
    let state = create_test_state(mock, &create_test_config());
    (app(state.clone(), RateLimiterState::new()), state)
}

fn create_test_user(id: &str, username: &str) -> user::Model {
    user::Model {
        id: id.to_string(),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password: "hash".to_string(),
        full_name: format!("{username} full"),
        avatar_url: None,
        cover_image_url: None,
        refresh_token: None,
        about: None,
        tags: serde_json::json!([]),
        preferences: Preferences::default(),
        is_creator: false,
        search_history: serde_json::json!([]),
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn create_test_video(id: &str, owner_id: &str) -> video::Model {
    let asset = |url: &str| MediaAsset {
        provider_id: format!("prov_{url}"),
        url: url.to_string(),
        width: None,
        height: None,
        format: None,
    };
    video::Model {
        id: id.to_string(),
        public_id: format!("pub_{id}"),
        title: "Test video".to_string(),
        description: "Description".to_string(),
        duration_ms: 30_000,
        views: 0,
        owner_id: owner_id.to_string(),
        video_file: asset("video.mp4"),
        thumbnail: asset("thumb.jpg"),
        publish_status: PublishStatus::Public,
        category: "general".to_string(),
        is_nsfw: false,
        tags: serde_json::json!([]),
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
    maplit::btreemap! { "num_items" => Value::BigInt(Some(n)) }
}

fn tally_row(target_id: &str, kind: &str, count: i64) -> BTreeMap<&'static str, Value> {
    maplit::btreemap! {
        "target_id" => Value::String(Some(Box::new(target_id.to_string()))),
        "kind" => Value::String(Some(Box::new(kind.to_string()))),
        "count" => Value::BigInt(Some(count)),
    }
}

fn bearer(state: &AppState, user: &user::Model) -> String {
    let tokens = state.auth_service.issue_tokens(user).unwrap();
    format!("Bearer {}", tokens.access_token)
}

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let (app, _) = create_test_app(MockDatabase::new(DatabaseBackend::Postgres));

    let response = app.oneshot(get("/api/v1/nonexistent")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_me_without_token_is_unauthorized() {
    let (app, _) = create_test_app(MockDatabase::new(DatabaseBackend::Postgres));

    let response = app.oneshot(get("/api/v1/users/me")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_expired_token_is_reported_distinctly() {
    let mut config = create_test_config();
    config.auth.access_token_ttl_secs = -3600;
    let state = create_test_state(MockDatabase::new(DatabaseBackend::Postgres), &config);
    let token = bearer(&state, &create_test_user("u1", "alice"));
    let app = app(state, RateLimiterState::new());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/users/me")
                .header(header::AUTHORIZATION, token)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_me_with_bearer_token() {
    let user = create_test_user("u1", "alice");
    let (app, state) = create_test_app(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user.clone()]])
            .append_query_results([[user.clone()]]),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/users/me")
                .header(header::AUTHORIZATION, bearer(&state, &user))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("X-RateLimit-Limit"));

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["username"], "alice");
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn test_me_with_access_cookie() {
    let user = create_test_user("u1", "alice");
    let (app, state) = create_test_app(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user.clone()]])
            .append_query_results([[user.clone()]]),
    );
    let tokens = state.auth_service.issue_tokens(&user).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/users/me")
                .header(header::COOKIE, format!("accessToken={}", tokens.access_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_sets_session_cookies() {
    let salt = SaltString::generate(&mut OsRng);
    let mut user = create_test_user("u1", "alice");
    user.password = Argon2::default()
        .hash_password(b"correct horse", &salt)
        .unwrap()
        .to_string();

    let mut stored = user.clone();
    stored.refresh_token = Some("stored".to_string());
    let (app, _) = create_test_app(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user]])
            .append_query_results([[stored]]),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/login")
                .method("POST")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"identifier":"Alice","password":"correct horse"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let cookies: Vec<String> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert!(cookies.iter().any(|c| c.starts_with("accessToken=") && c.contains("HttpOnly")));
    assert!(cookies.iter().any(|c| c.starts_with("refreshToken=")));

    let body = body_json(response).await;
    assert!(body["data"]["accessToken"].is_string());
    assert_eq!(body["data"]["user"]["username"], "alice");
}

#[tokio::test]
async fn test_login_with_unknown_user_is_unauthorized() {
    let (app, _) = create_test_app(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()]),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/login")
                .method("POST")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"username":"ghost","password":"whatever"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_with_invalid_json_uses_error_envelope() {
    let (app, _) = create_test_app(MockDatabase::new(DatabaseBackend::Postgres));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/signup")
                .method("POST")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("invalid json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "BAD_REQUEST");
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_empty_video_list() {
    let (app, _) = create_test_app(
        MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[count_row(0)]]),
    );

    let response = app.oneshot(get("/api/v1/videos")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["totalDocs"], 0);
    assert_eq!(body["data"]["page"], 1);
    assert_eq!(body["data"]["hasNextPage"], false);
}

#[tokio::test]
async fn test_page_past_the_end_is_invalid() {
    let (app, _) = create_test_app(
        MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[count_row(0)]]),
    );

    let response = app.oneshot(get("/api/v1/videos?page=3")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_PAGE");
}

#[tokio::test]
async fn test_page_zero_is_a_validation_error() {
    let (app, _) = create_test_app(MockDatabase::new(DatabaseBackend::Postgres));

    let response = app.oneshot(get("/api/v1/videos?page=0")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_vote_requires_toggle_parameter() {
    let user = create_test_user("u2", "bob");
    let (app, state) = create_test_app(
        MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[user.clone()]]),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/votes/video/pub_v1")
                .method("POST")
                .header(header::AUTHORIZATION, bearer(&state, &user))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["errors"][0]["field"], "toggle");
}

#[tokio::test]
async fn test_vote_on_unknown_kind() {
    let user = create_test_user("u2", "bob");
    let (app, state) = create_test_app(
        MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[user.clone()]]),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/votes/playlist/pub_p1?toggle=UPVOTE")
                .method("POST")
                .header(header::AUTHORIZATION, bearer(&state, &user))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["errors"][0]["field"], "kind");
}

#[tokio::test]
async fn test_upvote_video() {
    let voter = create_test_user("u2", "bob");
    let vote = vote::Model {
        id: "vt1".to_string(),
        voter_id: "u2".to_string(),
        kind: VoteKind::Upvote,
        target_kind: TargetKind::Video,
        target_id: "v1".to_string(),
        created_at: Utc::now().into(),
    };
    let (app, state) = create_test_app(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[voter.clone()]])
            .append_query_results([[create_test_video("v1", "u1")]])
            .append_query_results([Vec::<vote::Model>::new()])
            .append_query_results([[vote.clone()]])
            .append_query_results([[tally_row("v1", "UPVOTE", 1)]])
            .append_query_results([[vote]]),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/votes/video/pub_v1?toggle=UPVOTE")
                .method("POST")
                .header(header::AUTHORIZATION, bearer(&state, &voter))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["result"], "added");
    assert_eq!(body["data"]["upvotes"], 1);
    assert_eq!(body["data"]["downvotes"], 0);
    assert_eq!(body["data"]["currentViewerVote"], "UPVOTE");
}

#[tokio::test]
async fn test_anonymous_vote_is_unauthorized() {
    let (app, _) = create_test_app(MockDatabase::new(DatabaseBackend::Postgres));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/votes/video/pub_v1?toggle=UPVOTE")
                .method("POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_hidden_video_is_not_found() {
    let (app, _) = create_test_app(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<video::Model>::new()]),
    );

    let response = app.oneshot(get("/api/v1/videos/pub_private")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Video not found");
}

#[tokio::test]
async fn test_rate_limit_on_auth_routes() {
    let (app, _) = create_test_app(MockDatabase::new(DatabaseBackend::Postgres));

    let mut last = StatusCode::OK;
    for _ in 0..11 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/auth/signup")
                    .method("POST")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header("x-forwarded-for", "203.0.113.7")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        last = response.status();
        if last == StatusCode::TOO_MANY_REQUESTS {
            assert!(response.headers().contains_key(header::RETRY_AFTER));
            assert_eq!(body_json(response).await["code"], "RATE_LIMITED");
            break;
        }
    }

    assert_eq!(last, StatusCode::TOO_MANY_REQUESTS);
}
