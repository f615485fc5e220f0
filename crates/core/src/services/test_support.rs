//! Fixtures shared by service tests.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseConnection, MockDatabase, MockExecResult, Value};
use wavytv_common::config::{
    AuthConfig, Config, ContentConfig, CookieConfig, DatabaseConfig, ServerConfig,
};
use wavytv_db::{
    entities::{
        comment, follow, playlist, post,
        target::Target,
        user::{self, Preferences},
        video::{self, MediaAsset, PublishStatus},
        vote::{self, VoteKind},
    },
    repositories::{
        CommentRepository, FollowRepository, UserRepository, VideoRepository, VoteRepository,
    },
};

use crate::services::view::ViewAssembler;

pub fn test_config() -> Config {
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

pub fn db_with(mock: MockDatabase) -> Arc<DatabaseConnection> {
    Arc::new(mock.into_connection())
}

pub fn assembler(db: &Arc<DatabaseConnection>) -> ViewAssembler {
    ViewAssembler::new(
        UserRepository::new(db.clone()),
        VoteRepository::new(db.clone()),
        FollowRepository::new(db.clone()),
        VideoRepository::new(db.clone()),
        CommentRepository::new(db.clone()),
    )
}

/// SQL of every statement run against `db`, in order. Every other handle to
/// the connection must be dropped first.
pub fn executed_sql(db: Arc<DatabaseConnection>) -> Vec<String> {
    Arc::try_unwrap(db)
        .ok()
        .unwrap()
        .into_transaction_log()
        .iter()
        .flat_map(|t| t.statements().iter().map(|s| s.sql.clone()).collect::<Vec<_>>())
        .collect()
}

pub fn no_rows() -> Vec<BTreeMap<&'static str, Value>> {
    Vec::new()
}

pub fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
    maplit::btreemap! { "num_items" => Value::BigInt(Some(n)) }
}

pub fn tally_row(target_id: &str, kind: &str, count: i64) -> BTreeMap<&'static str, Value> {
    maplit::btreemap! {
        "target_id" => Value::String(Some(Box::new(target_id.to_string()))),
        "kind" => Value::String(Some(Box::new(kind.to_string()))),
        "count" => Value::BigInt(Some(count)),
    }
}

pub fn exec(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

pub fn create_test_user(id: &str, username: &str) -> user::Model {
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

pub fn create_test_video(id: &str, owner_id: &str, status: PublishStatus) -> video::Model {
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
        views: 10,
        owner_id: owner_id.to_string(),
        video_file: asset("video.mp4"),
        thumbnail: asset("thumb.jpg"),
        publish_status: status,
        category: "general".to_string(),
        is_nsfw: false,
        tags: serde_json::json!(["test"]),
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

pub fn create_test_post(id: &str, owner_id: &str) -> post::Model {
    post::Model {
        id: id.to_string(),
        public_id: format!("pub_{id}"),
        content: "Hello".to_string(),
        owner_id: owner_id.to_string(),
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

pub fn create_test_comment(id: &str, owner_id: &str, target: &Target) -> comment::Model {
    comment::Model {
        id: id.to_string(),
        public_id: format!("pub_{id}"),
        content: "ok!".to_string(),
        owner_id: owner_id.to_string(),
        target_kind: target.kind(),
        target_id: target.id().to_string(),
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

pub fn create_test_vote(id: &str, voter_id: &str, kind: VoteKind, target: &Target) -> vote::Model {
    vote::Model {
        id: id.to_string(),
        voter_id: voter_id.to_string(),
        kind,
        target_kind: target.kind(),
        target_id: target.id().to_string(),
        created_at: Utc::now().into(),
    }
}

pub fn create_test_follow(id: &str, channel_id: &str, follower_id: &str) -> follow::Model {
    follow::Model {
        id: id.to_string(),
        channel_id: channel_id.to_string(),
        follower_id: follower_id.to_string(),
        created_at: Utc::now().into(),
    }
}

pub fn create_test_playlist(id: &str, owner_id: &str, video_ids: &[&str]) -> playlist::Model {
    playlist::Model {
        id: id.to_string(),
        public_id: format!("pub_{id}"),
        title: "Playlist".to_string(),
        description: String::new(),
        owner_id: owner_id.to_string(),
        publish_status: PublishStatus::Public,
        collaborators: serde_json::json!([]),
        video_ids: serde_json::json!(video_ids),
        created_at: Utc::now().into(),
        updated_at: None,
    }
}
