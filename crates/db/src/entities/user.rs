//! User entity.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::video::PublishStatus;

/// How NSFW videos are presented to a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NsfwPolicy {
    Show,
    #[default]
    Blur,
    Hide,
}

/// Per-user preferences, stored as a JSON document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    /// UI theme name.
    pub theme: String,
    pub nsfw: NsfwPolicy,
    /// Status applied to new videos when the upload omits one.
    pub default_publish_status: PublishStatus,
    /// Category applied to new videos when the upload omits one.
    pub default_category: String,
    pub save_watch_history: bool,
    pub save_search_history: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: "system".to_string(),
            nsfw: NsfwPolicy::default(),
            default_publish_status: PublishStatus::Public,
            default_category: "general".to_string(),
            save_watch_history: true,
            save_search_history: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Public handle, trimmed and lowercased
    #[sea_orm(unique)]
    pub username: String,

    /// Trimmed and lowercased
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 hash
    #[serde(skip_serializing)]
    pub password: String,

    pub full_name: String,

    #[sea_orm(nullable)]
    pub avatar_url: Option<String>,

    #[sea_orm(nullable)]
    pub cover_image_url: Option<String>,

    /// Current session secret
    #[sea_orm(nullable)]
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub about: Option<String>,

    /// Tags extracted from `about`
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,

    #[sea_orm(column_type = "JsonBinary")]
    pub preferences: Preferences,

    #[sea_orm(default_value = false)]
    pub is_creator: bool,

    /// Recent search queries, newest first
    #[sea_orm(column_type = "JsonBinary")]
    pub search_history: Json,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Recent search queries, newest first.
    #[must_use]
    pub fn search_history_list(&self) -> Vec<String> {
        super::string_list(&self.search_history)
    }

    /// Extracted profile tags.
    #[must_use]
    pub fn tag_list(&self) -> Vec<String> {
        super::string_list(&self.tags)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::video::Entity")]
    Videos,

    #[sea_orm(has_many = "super::post::Entity")]
    Posts,
}

impl Related<super::video::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Videos.def()
    }
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
