//! Video entity.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Who may see a video or playlist.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum PublishStatus {
    /// Listed and visible to everyone.
    #[default]
    #[sea_orm(string_value = "PUBLIC")]
    Public,
    /// Reachable by direct link, never listed to others.
    #[sea_orm(string_value = "UNLISTED")]
    Unlisted,
    /// Visible to the owner only.
    #[sea_orm(string_value = "PRIVATE")]
    Private,
}

/// A file held by the external media provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    /// Identifier assigned by the provider, used for deletion.
    pub provider_id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "video")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Short id used in URLs
    #[sea_orm(unique)]
    pub public_id: String,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Length in milliseconds
    pub duration_ms: i64,

    #[sea_orm(default_value = 0)]
    pub views: i64,

    #[sea_orm(indexed)]
    pub owner_id: String,

    #[sea_orm(column_type = "JsonBinary")]
    pub video_file: MediaAsset,

    #[sea_orm(column_type = "JsonBinary")]
    pub thumbnail: MediaAsset,

    pub publish_status: PublishStatus,

    pub category: String,

    #[sea_orm(default_value = false)]
    pub is_nsfw: bool,

    /// Tags extracted from title and description
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,

    #[sea_orm(indexed)]
    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    #[must_use]
    pub fn tag_list(&self) -> Vec<String> {
        super::string_list(&self.tags)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
