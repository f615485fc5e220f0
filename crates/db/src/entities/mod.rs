//! Database entities.

pub mod comment;
pub mod follow;
pub mod history;
pub mod playlist;
pub mod post;
pub mod target;
pub mod user;
pub mod video;
pub mod vote;

pub use comment::Entity as Comment;
pub use follow::Entity as Follow;
pub use history::Entity as WatchHistory;
pub use playlist::Entity as Playlist;
pub use post::Entity as Post;
pub use target::{CommentTarget, Target, TargetKind, VoteTarget};
pub use user::Entity as User;
pub use video::Entity as Video;
pub use vote::Entity as Vote;

use sea_orm::prelude::Json;

/// Read a JSON array of strings, ignoring anything else.
#[must_use]
pub fn string_list(json: &Json) -> Vec<String> {
    json.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(ToString::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_list_skips_non_strings() {
        let json = serde_json::json!(["a", 1, "b", null]);
        assert_eq!(string_list(&json), vec!["a".to_string(), "b".to_string()]);
        assert!(string_list(&serde_json::json!({})).is_empty());
    }
}
