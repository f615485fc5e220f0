//! Comment service.
//!
//! Comments attach to exactly one video, post, or parent comment.

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;
use wavytv_common::{AppError, AppResult, IdGenerator, PageRequest, Paginated};
use wavytv_db::{
    entities::{
        comment,
        target::{CommentTarget, Target, TargetKind},
        user,
    },
    repositories::{CommentRepository, VoteRepository},
};

use crate::services::guard::{Access, TargetResolver, resolve_owned};
use crate::services::view::{CommentView, ViewAssembler};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CommentInput {
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
}

impl CommentInput {
    fn checked_content(self) -> AppResult<String> {
        self.validate()?;
        if !has_alphanumeric(&self.content) {
            return Err(AppError::invalid(
                "content",
                "must contain at least one letter or digit",
            ));
        }
        Ok(self.content.trim().to_string())
    }
}

/// Whether `text` holds at least one letter or digit.
#[must_use]
pub fn has_alphanumeric(text: &str) -> bool {
    text.chars().any(char::is_alphanumeric)
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    vote_repo: VoteRepository,
    resolver: TargetResolver,
    views: ViewAssembler,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        vote_repo: VoteRepository,
        resolver: TargetResolver,
        views: ViewAssembler,
    ) -> Self {
        Self {
            comment_repo,
            vote_repo,
            resolver,
            views,
            id_gen: IdGenerator::new(),
        }
    }

    /// Comment on a target the author can see.
    pub async fn create(
        &self,
        kind: TargetKind,
        public_id: &str,
        author: &user::Model,
        input: CommentInput,
    ) -> AppResult<CommentView> {
        let content = input.checked_content()?;
        let target: CommentTarget = self.resolver.resolve(kind, public_id, Some(&author.id)).await?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            public_id: Set(self.id_gen.generate_public_id()),
            content: Set(content),
            owner_id: Set(author.id.clone()),
            target_kind: Set(target.kind()),
            target_id: Set(target.id().to_string()),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let comment = self.comment_repo.create(model).await?;
        info!(
            comment_id = %comment.id,
            target_kind = target.kind().as_str(),
            target_id = %target.id(),
            "Comment created"
        );

        self.views.comment(comment, Some(&author.id)).await
    }

    /// Comments on a target, newest first.
    pub async fn list_for_target(
        &self,
        kind: TargetKind,
        public_id: &str,
        viewer_id: Option<&str>,
        request: PageRequest,
    ) -> AppResult<Paginated<CommentView>> {
        let target = self.resolver.resolve(kind, public_id, viewer_id).await?;

        let mut page = self.comment_repo.list_for_target(&target, request).await?;
        let models = std::mem::take(&mut page.docs);
        let views = self.views.comments(models, viewer_id).await?;
        Ok(page.with_docs(views))
    }

    pub async fn update(
        &self,
        public_id: &str,
        caller_id: &str,
        input: CommentInput,
    ) -> AppResult<CommentView> {
        let content = input.checked_content()?;
        let comment =
            resolve_owned(&self.comment_repo, public_id, caller_id, Access::Owner).await?;

        let mut active: comment::ActiveModel = comment.into();
        active.content = Set(content);
        active.updated_at = Set(Some(Utc::now().into()));

        let comment = self.comment_repo.update(active).await?;
        self.views.comment(comment, Some(caller_id)).await
    }

    /// Delete a comment the caller owns, with its votes and its replies.
    pub async fn delete(&self, public_id: &str, caller_id: &str) -> AppResult<()> {
        let comment =
            resolve_owned(&self.comment_repo, public_id, caller_id, Access::Owner).await?;
        self.comment_repo.delete(&comment.id).await?;
        info!(comment_id = %comment.id, "Comment deleted");

        remove_attachments(
            &self.comment_repo,
            &self.vote_repo,
            &Target::Comment(comment.id),
        )
        .await;
        Ok(())
    }
}

/// Remove the votes on a deleted `root` and the whole comment thread under
/// it, with the votes on those comments.
///
/// Runs after the root is gone, so failures are logged and the delete still
/// succeeds.
pub(crate) async fn remove_attachments(
    comment_repo: &CommentRepository,
    vote_repo: &VoteRepository,
    root: &Target,
) {
    if let Err(e) = vote_repo.delete_for_target(root).await {
        warn!(error = %e, target_id = %root.id(), "Failed to remove votes of deleted item");
    }

    let ids = match comment_repo.thread_ids(root).await {
        Ok(ids) if ids.is_empty() => return,
        Ok(ids) => ids,
        Err(e) => {
            warn!(error = %e, target_id = %root.id(), "Failed to collect comments of deleted item");
            return;
        }
    };

    if let Err(e) = vote_repo.delete_for_targets(TargetKind::Comment, &ids).await {
        warn!(error = %e, target_id = %root.id(), "Failed to remove votes on comments");
    }
    match comment_repo.delete_by_ids(&ids).await {
        Ok(removed) => info!(target_id = %root.id(), removed, "Removed comment thread"),
        Err(e) => {
            warn!(error = %e, target_id = %root.id(), "Failed to remove comments of deleted item");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::test_support::{
        assembler, count_row, create_test_comment, create_test_post, create_test_user,
        create_test_video, db_with, exec, executed_sql, no_rows,
    };
    use sea_orm::{DatabaseBackend, MockDatabase};
    use wavytv_db::{
        entities::video::{self, PublishStatus},
        repositories::{PostRepository, VideoRepository},
    };

    fn service(db: MockDatabase) -> CommentService {
        let db = db_with(db);
        CommentService::new(
            CommentRepository::new(db.clone()),
            VoteRepository::new(db.clone()),
            TargetResolver::new(
                VideoRepository::new(db.clone()),
                PostRepository::new(db.clone()),
                CommentRepository::new(db.clone()),
            ),
            assembler(&db),
        )
    }

    fn input(content: &str) -> CommentInput {
        CommentInput {
            content: content.to_string(),
        }
    }

    #[test]
    fn test_has_alphanumeric() {
        assert!(has_alphanumeric("ok!"));
        assert!(has_alphanumeric("  7 "));
        assert!(has_alphanumeric("très"));
        assert!(!has_alphanumeric("   "));
        assert!(!has_alphanumeric("?!..."));
    }

    #[tokio::test]
    async fn test_whitespace_comment_rejected() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));
        let author = create_test_user("u2", "bob");

        let err = service
            .create(TargetKind::Video, "pub_v1", &author, input("   \n "))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_comment_on_video() {
        let author = create_test_user("u2", "bob");
        let video = create_test_video("v1", "u1", PublishStatus::Public);
        let target = Target::Video("v1".to_string());

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[video]])
                .append_query_results([[create_test_comment("c1", "u2", &target)]])
                .append_query_results([no_rows()])
                .append_query_results([no_rows()])
                .append_query_results([[author.clone()]])
                .append_query_results([no_rows()]),
        );

        let view = service
            .create(TargetKind::Video, "pub_v1", &author, input("ok!"))
            .await
            .unwrap();

        assert_eq!(view.id, "pub_c1");
        assert_eq!(view.target_kind, TargetKind::Video);
        assert_eq!(view.reply_count, 0);
    }

    #[tokio::test]
    async fn test_comment_on_hidden_video_is_not_found() {
        let author = create_test_user("u2", "bob");
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<video::Model>::new()]),
        );

        let err = service
            .create(TargetKind::Video, "pub_private", &author, input("hello"))
            .await
            .unwrap_err();

        match err {
            AppError::NotFound(message) => assert_eq!(message, "Video not found"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_for_post_with_no_comments() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post("p1", "u1")]])
                .append_query_results([[count_row(0)]]),
        );

        let page = service
            .list_for_target(TargetKind::Post, "pub_p1", None, PageRequest::default())
            .await
            .unwrap();

        assert_eq!(page.total_docs, 0);
        assert!(!page.has_next_page);
    }

    #[tokio::test]
    async fn test_delete_removes_nested_replies() {
        let target = Target::Video("v1".to_string());
        let db = db_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("c1", "u2", &target)]])
                .append_query_results([[create_test_comment(
                    "c2",
                    "u3",
                    &Target::Comment("c1".to_string()),
                )]])
                .append_query_results([[create_test_comment(
                    "c3",
                    "u4",
                    &Target::Comment("c2".to_string()),
                )]])
                .append_query_results([Vec::<comment::Model>::new()])
                .append_exec_results([exec(1), exec(2), exec(1), exec(2)]),
        );
        let service = CommentService::new(
            CommentRepository::new(db.clone()),
            VoteRepository::new(db.clone()),
            TargetResolver::new(
                VideoRepository::new(db.clone()),
                PostRepository::new(db.clone()),
                CommentRepository::new(db.clone()),
            ),
            assembler(&db),
        );

        service.delete("pub_c1", "u2").await.unwrap();
        drop(service);

        let sql = executed_sql(db);
        assert_eq!(sql.len(), 8);
        assert!(sql[1].starts_with(r#"DELETE FROM "comment""#));
        assert!(sql[6].starts_with(r#"DELETE FROM "vote""#));
        assert!(sql[7].starts_with(r#"DELETE FROM "comment""#));
        assert!(sql[7].contains(r#""id" IN"#));
    }
}
