//! Playlist entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::video::PublishStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "playlist")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub public_id: String,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    #[sea_orm(indexed)]
    pub owner_id: String,

    pub publish_status: PublishStatus,

    /// User ids allowed to edit the video list
    #[sea_orm(column_type = "JsonBinary")]
    pub collaborators: Json,

    /// Ordered video storage ids; duplicates allowed
    #[sea_orm(column_type = "JsonBinary")]
    pub video_ids: Json,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    #[must_use]
    pub fn collaborator_list(&self) -> Vec<String> {
        super::string_list(&self.collaborators)
    }

    #[must_use]
    pub fn video_id_list(&self) -> Vec<String> {
        super::string_list(&self.video_ids)
    }

    /// Whether `user_id` may edit this playlist's videos.
    #[must_use]
    pub fn can_edit(&self, user_id: &str) -> bool {
        self.owner_id == user_id || self.collaborator_list().iter().any(|c| c == user_id)
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
