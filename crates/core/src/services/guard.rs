//! Ownership and visibility guards.
//!
//! Every lookup here collapses "absent" and "not yours" into the same
//! `NotFound` so the existence of private or foreign content is never
//! disclosed.

use async_trait::async_trait;
use wavytv_common::{AppError, AppResult};
use wavytv_db::{
    entities::{
        comment, playlist, post,
        target::{Target, TargetKind},
        video::{self, PublishStatus},
    },
    repositories::{CommentRepository, PlaylistRepository, PostRepository, VideoRepository},
};

/// Relationship a caller must have with the item being mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The item's owner.
    Owner,
    /// The owner, or a collaborator where the item supports them.
    Editor,
}

/// Lookup of an item by public ID, scoped to what a caller may touch.
#[async_trait]
pub trait ScopedLookup {
    type Model: Send;

    /// Display name used in not-found messages.
    const NOUN: &'static str;

    async fn find_scoped(
        &self,
        public_id: &str,
        caller_id: &str,
        access: Access,
    ) -> AppResult<Option<Self::Model>>;
}

/// Build the collapsed not-found error for `noun`.
#[must_use]
pub fn not_found(noun: &str) -> AppError {
    AppError::NotFound(format!("{noun} not found"))
}

/// Resolve an item the caller has `access` to, or `NotFound`.
pub async fn resolve_owned<L>(
    lookup: &L,
    public_id: &str,
    caller_id: &str,
    access: Access,
) -> AppResult<L::Model>
where
    L: ScopedLookup + Sync,
{
    lookup
        .find_scoped(public_id, caller_id, access)
        .await?
        .ok_or_else(|| not_found(L::NOUN))
}

/// Whether an item with `status` owned by `owner_id` may be opened by
/// `viewer_id`.
#[must_use]
pub fn is_visible_to(status: PublishStatus, owner_id: &str, viewer_id: Option<&str>) -> bool {
    status != PublishStatus::Private || viewer_id == Some(owner_id)
}

#[async_trait]
impl ScopedLookup for VideoRepository {
    type Model = video::Model;
    const NOUN: &'static str = "Video";

    async fn find_scoped(
        &self,
        public_id: &str,
        caller_id: &str,
        _access: Access,
    ) -> AppResult<Option<video::Model>> {
        self.find_owned(public_id, caller_id).await
    }
}

#[async_trait]
impl ScopedLookup for PostRepository {
    type Model = post::Model;
    const NOUN: &'static str = "Post";

    async fn find_scoped(
        &self,
        public_id: &str,
        caller_id: &str,
        _access: Access,
    ) -> AppResult<Option<post::Model>> {
        self.find_owned(public_id, caller_id).await
    }
}

#[async_trait]
impl ScopedLookup for CommentRepository {
    type Model = comment::Model;
    const NOUN: &'static str = "Comment";

    async fn find_scoped(
        &self,
        public_id: &str,
        caller_id: &str,
        _access: Access,
    ) -> AppResult<Option<comment::Model>> {
        self.find_owned(public_id, caller_id).await
    }
}

#[async_trait]
impl ScopedLookup for PlaylistRepository {
    type Model = playlist::Model;
    const NOUN: &'static str = "Playlist";

    async fn find_scoped(
        &self,
        public_id: &str,
        caller_id: &str,
        access: Access,
    ) -> AppResult<Option<playlist::Model>> {
        match access {
            Access::Owner => self.find_owned(public_id, caller_id).await,
            Access::Editor => Ok(self
                .find_by_public_id(public_id)
                .await?
                .filter(|p| p.can_edit(caller_id))),
        }
    }
}

/// Resolves public `(kind, id)` references to storage targets the viewer
/// can see.
#[derive(Clone)]
pub struct TargetResolver {
    video_repo: VideoRepository,
    post_repo: PostRepository,
    comment_repo: CommentRepository,
}

impl TargetResolver {
    #[must_use]
    pub const fn new(
        video_repo: VideoRepository,
        post_repo: PostRepository,
        comment_repo: CommentRepository,
    ) -> Self {
        Self {
            video_repo,
            post_repo,
            comment_repo,
        }
    }

    /// Resolve a visible target, or `NotFound`.
    pub async fn resolve(
        &self,
        kind: TargetKind,
        public_id: &str,
        viewer_id: Option<&str>,
    ) -> AppResult<Target> {
        let id = match kind {
            TargetKind::Video => self
                .video_repo
                .find_visible(public_id, viewer_id)
                .await?
                .map(|v| v.id),
            TargetKind::Post => self
                .post_repo
                .find_by_public_id(public_id)
                .await?
                .map(|p| p.id),
            TargetKind::Comment => match self.comment_repo.find_by_public_id(public_id).await? {
                Some(c) => self
                    .root_visible(c.target(), viewer_id)
                    .await?
                    .then_some(c.id),
                None => None,
            },
        };

        id.map(|id| Target::from_parts(kind, id))
            .ok_or_else(|| not_found(noun(kind)))
    }

    /// Whether the video or post a comment thread hangs off exists and is
    /// visible to `viewer_id`.
    async fn root_visible(&self, mut target: Target, viewer_id: Option<&str>) -> AppResult<bool> {
        for _ in 0..MAX_THREAD_DEPTH {
            match target {
                Target::Video(id) => {
                    return Ok(self
                        .video_repo
                        .find_visible_by_id(&id, viewer_id)
                        .await?
                        .is_some());
                }
                Target::Post(id) => return Ok(self.post_repo.find_by_id(&id).await?.is_some()),
                Target::Comment(id) => match self.comment_repo.find_by_id(&id).await? {
                    Some(parent) => target = parent.target(),
                    None => return Ok(false),
                },
            }
        }
        Ok(false)
    }
}

/// Reply chains longer than this are treated as detached.
const MAX_THREAD_DEPTH: usize = 64;

/// Capitalised display name of a target kind.
#[must_use]
pub const fn noun(kind: TargetKind) -> &'static str {
    match kind {
        TargetKind::Video => "Video",
        TargetKind::Post => "Post",
        TargetKind::Comment => "Comment",
    }
}
