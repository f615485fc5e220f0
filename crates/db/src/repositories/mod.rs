//! Database repositories.

pub mod comment;
pub mod follow;
pub mod history;
pub mod pagination;
pub mod playlist;
pub mod post;
pub mod user;
pub mod video;
pub mod visibility;
pub mod vote;

pub use comment::CommentRepository;
pub use follow::FollowRepository;
pub use history::HistoryRepository;
pub use pagination::fetch_page;
pub use playlist::PlaylistRepository;
pub use post::PostRepository;
pub use user::UserRepository;
pub use video::{VideoFilter, VideoRepository};
pub use vote::{VoteRepository, VoteTally};
