//! View assembly.
//!
//! Raw entities never leave the service layer directly. Each content type is
//! joined with its vote tally, the viewer's own vote, and the owner's public
//! profile here, so every endpoint that returns content derives those fields
//! the same way. All lookups are batched per page.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use wavytv_common::AppResult;
use wavytv_db::{
    entities::{
        comment, playlist, post,
        target::TargetKind,
        user,
        video::{self, MediaAsset, PublishStatus},
        vote::{self, VoteKind},
    },
    repositories::{
        CommentRepository, FollowRepository, UserRepository, VideoRepository, VoteRepository,
        VoteTally, visibility::listed_statuses,
    },
};

use crate::services::guard::is_visible_to;

/// Vote-derived fields of a content item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSummary {
    pub upvotes: u64,
    pub downvotes: u64,
    /// `None` for anonymous viewers and viewers who have not voted.
    pub current_viewer_vote: Option<VoteKind>,
}

/// Public fields of a content owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerProfile {
    pub username: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
}

impl From<&user::Model> for OwnerProfile {
    fn from(user: &user::Model) -> Self {
        Self {
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoView {
    /// Public ID.
    pub id: String,
    pub title: String,
    pub description: String,
    pub duration_ms: i64,
    pub views: i64,
    pub video_file: MediaAsset,
    pub thumbnail: MediaAsset,
    pub publish_status: PublishStatus,
    pub category: String,
    pub is_nsfw: bool,
    pub tags: Vec<String>,
    pub owner: Option<OwnerProfile>,
    #[serde(flatten)]
    pub votes: VoteSummary,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl VideoView {
    fn build(model: video::Model, owner: Option<OwnerProfile>, votes: VoteSummary) -> Self {
        let tags = model.tag_list();
        Self {
            id: model.public_id,
            title: model.title,
            description: model.description,
            duration_ms: model.duration_ms,
            views: model.views,
            video_file: model.video_file,
            thumbnail: model.thumbnail,
            publish_status: model.publish_status,
            category: model.category,
            is_nsfw: model.is_nsfw,
            tags,
            owner,
            votes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: String,
    pub content: String,
    pub owner: Option<OwnerProfile>,
    #[serde(flatten)]
    pub votes: VoteSummary,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub content: String,
    pub owner: Option<OwnerProfile>,
    /// What the comment is attached to; `comment` marks a reply.
    pub target_kind: TargetKind,
    pub reply_count: u64,
    #[serde(flatten)]
    pub votes: VoteSummary,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

/// A user's channel page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelView {
    pub username: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub cover_image_url: Option<String>,
    pub about: Option<String>,
    pub tags: Vec<String>,
    pub is_creator: bool,
    pub followers_count: u64,
    pub following_count: u64,
    /// Videos the viewer can list on this channel.
    pub video_count: u64,
    pub is_own_profile: bool,
    pub is_following: bool,
    pub created_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub owner: Option<OwnerProfile>,
    pub publish_status: PublishStatus,
    pub collaborators: Vec<OwnerProfile>,
    pub video_count: usize,
    /// Present on detail views only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub videos: Option<Vec<VideoView>>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

/// Fold vote tallies and the viewer's votes into one summary per target.
///
/// Every ID in `ids` gets an entry, zeroed when it has no votes. Should a
/// viewer somehow hold both kinds on one target, UPVOTE wins.
#[must_use]
pub fn summarize(
    ids: &[String],
    tallies: &[VoteTally],
    viewer_votes: &[vote::Model],
) -> HashMap<String, VoteSummary> {
    let mut summaries: HashMap<String, VoteSummary> = ids
        .iter()
        .map(|id| (id.clone(), VoteSummary::default()))
        .collect();

    for tally in tallies {
        if let Some(summary) = summaries.get_mut(&tally.target_id) {
            let count = u64::try_from(tally.count).unwrap_or(0);
            match tally.kind {
                VoteKind::Upvote => summary.upvotes += count,
                VoteKind::Downvote => summary.downvotes += count,
            }
        }
    }

    for vote in viewer_votes {
        if let Some(summary) = summaries.get_mut(&vote.target_id) {
            summary.current_viewer_vote = match summary.current_viewer_vote {
                Some(VoteKind::Upvote) => Some(VoteKind::Upvote),
                _ => Some(vote.kind),
            };
        }
    }

    summaries
}

/// Builds viewer-relative views of stored content.
#[derive(Clone)]
pub struct ViewAssembler {
    user_repo: UserRepository,
    vote_repo: VoteRepository,
    follow_repo: FollowRepository,
    video_repo: VideoRepository,
    comment_repo: CommentRepository,
}

impl ViewAssembler {
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        vote_repo: VoteRepository,
        follow_repo: FollowRepository,
        video_repo: VideoRepository,
        comment_repo: CommentRepository,
    ) -> Self {
        Self {
            user_repo,
            vote_repo,
            follow_repo,
            video_repo,
            comment_repo,
        }
    }

    /// Vote summaries for a batch of targets of one kind.
    pub async fn vote_summaries(
        &self,
        kind: TargetKind,
        ids: &[String],
        viewer_id: Option<&str>,
    ) -> AppResult<HashMap<String, VoteSummary>> {
        let tallies = self.vote_repo.tallies(kind, ids).await?;
        let viewer_votes = match viewer_id {
            Some(viewer_id) => self.vote_repo.votes_by(viewer_id, kind, ids).await?,
            None => Vec::new(),
        };
        Ok(summarize(ids, &tallies, &viewer_votes))
    }

    /// Public profiles keyed by user ID.
    pub async fn owners(&self, ids: &[String]) -> AppResult<HashMap<String, OwnerProfile>> {
        let mut unique = ids.to_vec();
        unique.sort();
        unique.dedup();

        Ok(self
            .user_repo
            .find_by_ids(&unique)
            .await?
            .iter()
            .map(|u| (u.id.clone(), OwnerProfile::from(u)))
            .collect())
    }

    pub async fn videos(
        &self,
        models: Vec<video::Model>,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<VideoView>> {
        let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
        let owner_ids: Vec<String> = models.iter().map(|m| m.owner_id.clone()).collect();

        let mut votes = self
            .vote_summaries(TargetKind::Video, &ids, viewer_id)
            .await?;
        let owners = self.owners(&owner_ids).await?;

        Ok(models
            .into_iter()
            .map(|m| {
                let summary = votes.remove(&m.id).unwrap_or_default();
                let owner = owners.get(&m.owner_id).cloned();
                VideoView::build(m, owner, summary)
            })
            .collect())
    }

    pub async fn video(&self, model: video::Model, viewer_id: Option<&str>) -> AppResult<VideoView> {
        let mut views = self.videos(vec![model], viewer_id).await?;
        Ok(views.remove(0))
    }

    pub async fn posts(
        &self,
        models: Vec<post::Model>,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<PostView>> {
        let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
        let owner_ids: Vec<String> = models.iter().map(|m| m.owner_id.clone()).collect();

        let mut votes = self.vote_summaries(TargetKind::Post, &ids, viewer_id).await?;
        let owners = self.owners(&owner_ids).await?;

        Ok(models
            .into_iter()
            .map(|m| PostView {
                votes: votes.remove(&m.id).unwrap_or_default(),
                owner: owners.get(&m.owner_id).cloned(),
                id: m.public_id,
                content: m.content,
                created_at: m.created_at,
                updated_at: m.updated_at,
            })
            .collect())
    }

    pub async fn post(&self, model: post::Model, viewer_id: Option<&str>) -> AppResult<PostView> {
        let mut views = self.posts(vec![model], viewer_id).await?;
        Ok(views.remove(0))
    }

    pub async fn comments(
        &self,
        models: Vec<comment::Model>,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<CommentView>> {
        let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
        let owner_ids: Vec<String> = models.iter().map(|m| m.owner_id.clone()).collect();

        let mut votes = self
            .vote_summaries(TargetKind::Comment, &ids, viewer_id)
            .await?;
        let owners = self.owners(&owner_ids).await?;
        let replies = self.comment_repo.reply_counts(&ids).await?;

        Ok(models
            .into_iter()
            .map(|m| CommentView {
                votes: votes.remove(&m.id).unwrap_or_default(),
                owner: owners.get(&m.owner_id).cloned(),
                reply_count: replies.get(&m.id).copied().unwrap_or(0),
                id: m.public_id,
                content: m.content,
                target_kind: m.target_kind,
                created_at: m.created_at,
                updated_at: m.updated_at,
            })
            .collect())
    }

    pub async fn comment(
        &self,
        model: comment::Model,
        viewer_id: Option<&str>,
    ) -> AppResult<CommentView> {
        let mut views = self.comments(vec![model], viewer_id).await?;
        Ok(views.remove(0))
    }

    /// Channel page of `user` as seen by `viewer_id`.
    pub async fn channel(&self, user: user::Model, viewer_id: Option<&str>) -> AppResult<ChannelView> {
        let is_own_profile = viewer_id == Some(user.id.as_str());

        let followers_count = self.follow_repo.count_followers(&user.id).await?;
        let following_count = self.follow_repo.count_following(&user.id).await?;
        let video_count = self
            .video_repo
            .count_by_owner(
                &user.id,
                listed_statuses(is_own_profile),
            )
            .await?;
        let is_following = match viewer_id {
            Some(viewer_id) if !is_own_profile => {
                self.follow_repo.is_following(&user.id, viewer_id).await?
            }
            _ => false,
        };

        let tags = user.tag_list();
        Ok(ChannelView {
            username: user.username,
            full_name: user.full_name,
            avatar_url: user.avatar_url,
            cover_image_url: user.cover_image_url,
            about: user.about,
            tags,
            is_creator: user.is_creator,
            followers_count,
            following_count,
            video_count,
            is_own_profile,
            is_following,
            created_at: user.created_at,
        })
    }

    /// Playlist summaries without their videos.
    pub async fn playlists(&self, models: Vec<playlist::Model>) -> AppResult<Vec<PlaylistView>> {
        let user_ids: Vec<String> = models
            .iter()
            .flat_map(|m| {
                std::iter::once(m.owner_id.clone()).chain(m.collaborator_list())
            })
            .collect();
        let profiles = self.owners(&user_ids).await?;

        Ok(models
            .into_iter()
            .map(|m| Self::playlist_view(m, &profiles, None))
            .collect())
    }

    /// Playlist detail with the videos `viewer_id` may see, in list order.
    pub async fn playlist(
        &self,
        model: playlist::Model,
        viewer_id: Option<&str>,
    ) -> AppResult<PlaylistView> {
        let video_ids = model.video_id_list();
        let stored = self.video_repo.find_by_ids(&video_ids).await?;
        let by_id: HashMap<String, video::Model> =
            stored.into_iter().map(|v| (v.id.clone(), v)).collect();

        let ordered: Vec<video::Model> = video_ids
            .iter()
            .filter_map(|id| by_id.get(id))
            .filter(|v| is_visible_to(v.publish_status, &v.owner_id, viewer_id))
            .cloned()
            .collect();
        let videos = self.videos(ordered, viewer_id).await?;

        let user_ids: Vec<String> = std::iter::once(model.owner_id.clone())
            .chain(model.collaborator_list())
            .collect();
        let profiles = self.owners(&user_ids).await?;

        Ok(Self::playlist_view(model, &profiles, Some(videos)))
    }

    fn playlist_view(
        model: playlist::Model,
        profiles: &HashMap<String, OwnerProfile>,
        videos: Option<Vec<VideoView>>,
    ) -> PlaylistView {
        let collaborators = model
            .collaborator_list()
            .iter()
            .filter_map(|id| profiles.get(id).cloned())
            .collect();
        let video_count = videos
            .as_ref()
            .map_or_else(|| model.video_id_list().len(), Vec::len);

        PlaylistView {
            owner: profiles.get(&model.owner_id).cloned(),
            collaborators,
            video_count,
            videos,
            id: model.public_id,
            title: model.title,
            description: model.description,
            publish_status: model.publish_status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
