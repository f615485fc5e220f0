//! Follow service.
//!
//! Following is a two-state toggle keyed by (channel, follower). The pair is
//! unique in storage, so concurrent toggles cannot leave duplicates behind.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::Set;
use serde::Serialize;
use tracing::debug;
use wavytv_common::{AppError, AppResult, IdGenerator, PageRequest, Paginated};
use wavytv_db::{
    entities::{follow, user},
    repositories::{FollowRepository, UserRepository},
};

use crate::services::view::OwnerProfile;

/// What a follow toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowOutcome {
    Followed,
    Unfollowed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowToggle {
    pub result: FollowOutcome,
    pub followers_count: u64,
}

/// Follow service for business logic.
#[derive(Clone)]
pub struct FollowService {
    follow_repo: FollowRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub const fn new(follow_repo: FollowRepository, user_repo: UserRepository) -> Self {
        Self {
            follow_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow the channel if not following it, otherwise unfollow.
    pub async fn toggle(&self, username: &str, follower_id: &str) -> AppResult<FollowToggle> {
        let channel = self.channel(username).await?;
        if channel.id == follower_id {
            return Err(AppError::BadRequest("You cannot follow yourself".to_string()));
        }

        let result = if self
            .follow_repo
            .delete_pair(&channel.id, follower_id)
            .await?
            > 0
        {
            FollowOutcome::Unfollowed
        } else {
            let model = follow::ActiveModel {
                id: Set(self.id_gen.generate()),
                channel_id: Set(channel.id.clone()),
                follower_id: Set(follower_id.to_string()),
                created_at: Set(Utc::now().into()),
            };
            // Zero rows means a concurrent toggle already inserted the pair.
            self.follow_repo.insert_if_absent(model).await?;
            FollowOutcome::Followed
        };

        debug!(
            channel_id = %channel.id,
            follower_id = %follower_id,
            result = ?result,
            "Follow toggled"
        );

        let followers_count = self.follow_repo.count_followers(&channel.id).await?;
        Ok(FollowToggle {
            result,
            followers_count,
        })
    }

    /// Public profiles of a channel's followers, newest first.
    pub async fn followers(
        &self,
        username: &str,
        request: PageRequest,
    ) -> AppResult<Paginated<OwnerProfile>> {
        let channel = self.channel(username).await?;
        let page = self.follow_repo.followers(&channel.id, request).await?;
        let ids: Vec<String> = page.docs.iter().map(|f| f.follower_id.clone()).collect();
        self.profiles(page, &ids).await
    }

    /// Public profiles of the channels a user follows, newest first.
    pub async fn following(
        &self,
        username: &str,
        request: PageRequest,
    ) -> AppResult<Paginated<OwnerProfile>> {
        let user = self.channel(username).await?;
        let page = self.follow_repo.following(&user.id, request).await?;
        let ids: Vec<String> = page.docs.iter().map(|f| f.channel_id.clone()).collect();
        self.profiles(page, &ids).await
    }

    async fn profiles(
        &self,
        page: Paginated<follow::Model>,
        ids: &[String],
    ) -> AppResult<Paginated<OwnerProfile>> {
        let users: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        let profiles = ids
            .iter()
            .filter_map(|id| users.get(id))
            .map(OwnerProfile::from)
            .collect();
        Ok(page.with_docs(profiles))
    }

    async fn channel(&self, username: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_username(&username.trim().to_lowercase())
            .await?
            .ok_or_else(|| AppError::NotFound("Channel not found".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::test_support::{
        count_row, create_test_follow, create_test_user, db_with, exec,
    };
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn service(db: MockDatabase) -> FollowService {
        let db = db_with(db);
        FollowService::new(FollowRepository::new(db.clone()), UserRepository::new(db))
    }

    #[tokio::test]
    async fn test_self_follow_rejected() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("u1", "alice")]]),
        );

        let err = service.toggle("alice", "u1").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_toggle_follows_then_unfollows() {
        let channel = create_test_user("u1", "alice");
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[channel.clone()]])
                .append_exec_results([exec(0), exec(1)])
                .append_query_results([[count_row(1)]])
                .append_query_results([[channel]])
                .append_exec_results([exec(1)])
                .append_query_results([[count_row(0)]]),
        );

        let first = service.toggle("alice", "u3").await.unwrap();
        assert_eq!(first.result, FollowOutcome::Followed);
        assert_eq!(first.followers_count, 1);

        let second = service.toggle("alice", "u3").await.unwrap();
        assert_eq!(second.result, FollowOutcome::Unfollowed);
        assert_eq!(second.followers_count, 0);
    }

    #[tokio::test]
    async fn test_followers_profiles_in_follow_order() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("u1", "alice")]])
                .append_query_results([[count_row(2)]])
                .append_query_results([[
                    create_test_follow("f2", "u1", "u3"),
                    create_test_follow("f1", "u1", "u2"),
                ]])
                .append_query_results([[
                    create_test_user("u2", "bob"),
                    create_test_user("u3", "carol"),
                ]]),
        );

        let page = service
            .followers("alice", PageRequest::default())
            .await
            .unwrap();

        assert_eq!(page.total_docs, 2);
        let names: Vec<&str> = page.docs.iter().map(|p| p.username.as_str()).collect();
        assert_eq!(names, vec!["carol", "bob"]);
    }

    #[tokio::test]
    async fn test_followers_of_unknown_channel() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
        );

        let err = service
            .followers("ghost", PageRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
