//! Polymorphic attachment targets shared by votes and comments.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Discriminant stored next to a `target_id` column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    #[sea_orm(string_value = "video")]
    Video,
    #[sea_orm(string_value = "post")]
    Post,
    #[sea_orm(string_value = "comment")]
    Comment,
}

impl TargetKind {
    /// Lowercase name used in paths and messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Post => "post",
            Self::Comment => "comment",
        }
    }

    /// Parse a path segment such as `video`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "video" | "videos" => Some(Self::Video),
            "post" | "posts" => Some(Self::Post),
            "comment" | "comments" => Some(Self::Comment),
            _ => None,
        }
    }
}

/// Exactly one attached entity, by storage id.
///
/// Votes attach to a video, post or comment; comments attach to a video, a
/// post, or a parent comment (a reply).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    Video(String),
    Post(String),
    Comment(String),
}

/// What a vote is cast on.
pub type VoteTarget = Target;

/// What a comment is attached to; `Comment` makes it a reply.
pub type CommentTarget = Target;

impl Target {
    /// Rebuild a target from its stored columns.
    #[must_use]
    pub fn from_parts(kind: TargetKind, id: String) -> Self {
        match kind {
            TargetKind::Video => Self::Video(id),
            TargetKind::Post => Self::Post(id),
            TargetKind::Comment => Self::Comment(id),
        }
    }

    /// The stored discriminant.
    #[must_use]
    pub const fn kind(&self) -> TargetKind {
        match self {
            Self::Video(_) => TargetKind::Video,
            Self::Post(_) => TargetKind::Post,
            Self::Comment(_) => TargetKind::Comment,
        }
    }

    /// The storage id of the attached entity.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Video(id) | Self::Post(id) | Self::Comment(id) => id,
        }
    }
}
