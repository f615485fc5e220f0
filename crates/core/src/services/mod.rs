//! Business logic services.

#![allow(missing_docs)]

pub mod auth;
pub mod comment;
pub mod following;
pub mod guard;
pub mod history;
pub mod playlist;
pub mod post;
pub mod search;
pub mod user;
pub mod video;
pub mod view;
pub mod vote;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth::{AccessClaims, AuthService, LoginInput, Session, SignupInput, TokenPair};
pub use comment::{CommentInput, CommentService};
pub use following::{FollowOutcome, FollowService, FollowToggle};
pub use guard::{Access, ScopedLookup, TargetResolver};
pub use history::{HistoryEntryView, HistoryService};
pub use playlist::{CreatePlaylistInput, PlaylistService, UpdatePlaylistInput};
pub use post::{PostInput, PostService};
pub use search::{SearchQuery, SearchService};
pub use user::{ChangePasswordInput, UpdatePreferencesInput, UpdateProfileInput, UserService};
pub use video::{CreateVideoInput, UpdateVideoInput, VideoQuery, VideoService};
pub use view::{
    ChannelView, CommentView, OwnerProfile, PlaylistView, PostView, VideoView, ViewAssembler,
    VoteSummary,
};
pub use vote::{ToggleOutcome, VoteService, VoteToggle};
