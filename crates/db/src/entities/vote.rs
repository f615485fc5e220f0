//! Vote entity (one up or down vote per voter per target).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::target::{Target, TargetKind};

/// Direction of a vote.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum VoteKind {
    #[sea_orm(string_value = "UPVOTE")]
    Upvote,
    #[sea_orm(string_value = "DOWNVOTE")]
    Downvote,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vote")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user who voted
    #[sea_orm(indexed)]
    pub voter_id: String,

    pub kind: VoteKind,

    pub target_kind: TargetKind,

    /// Storage id of the voted entity
    #[sea_orm(indexed)]
    pub target_id: String,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    #[must_use]
    pub fn target(&self) -> Target {
        Target::from_parts(self.target_kind, self.target_id.clone())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::VoterId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Voter,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Voter.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
