//! Publish-status filters shared by videos and playlists.

use sea_orm::{ColumnTrait, Condition};

use crate::entities::video::PublishStatus;

/// Items a viewer may open directly: anything not private, plus the
/// viewer's own private items.
pub fn visible_to(
    status: impl ColumnTrait,
    owner: impl ColumnTrait,
    viewer_id: Option<&str>,
) -> Condition {
    let mut condition = Condition::any().add(status.ne(PublishStatus::Private));
    if let Some(viewer_id) = viewer_id {
        condition = condition.add(owner.eq(viewer_id));
    }
    condition
}

/// Statuses included in listings. Owners browsing their own channel see
/// everything; everyone else sees public items only.
#[must_use]
pub fn listed_statuses(viewer_is_owner: bool) -> Vec<PublishStatus> {
    if viewer_is_owner {
        vec![
            PublishStatus::Public,
            PublishStatus::Unlisted,
            PublishStatus::Private,
        ]
    } else {
        vec![PublishStatus::Public]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Video, video};
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    #[test]
    fn test_anonymous_condition_excludes_private() {
        let sql = Video::find()
            .filter(visible_to(
                video::Column::PublishStatus,
                video::Column::OwnerId,
                None,
            ))
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""publish_status" <> 'PRIVATE'"#));
        assert!(!sql.contains(" OR "));
    }

    #[test]
    fn test_viewer_condition_admits_own_items() {
        let sql = Video::find()
            .filter(visible_to(
                video::Column::PublishStatus,
                video::Column::OwnerId,
                Some("u1"),
            ))
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""owner_id" = 'u1'"#));
        assert!(sql.contains(" OR "));
    }

    #[test]
    fn test_listed_statuses() {
        assert_eq!(listed_statuses(false), vec![PublishStatus::Public]);
        assert_eq!(listed_statuses(true).len(), 3);
    }
}
