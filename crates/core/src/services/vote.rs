//! Vote engine.
//!
//! A voter holds at most one stance per target: UPVOTE, DOWNVOTE, or none.
//! Toggling with the current stance clears it; toggling with the other kind
//! switches it.

use sea_orm::Set;
use serde::Serialize;
use tracing::debug;
use wavytv_common::{AppError, AppResult, IdGenerator};
use wavytv_db::{
    entities::{
        target::{TargetKind, VoteTarget},
        vote::{self, VoteKind},
    },
    repositories::VoteRepository,
};

use crate::services::guard::TargetResolver;
use crate::services::view::{VoteSummary, ViewAssembler};

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleOutcome {
    Added,
    Removed,
    Switched,
}

/// Result of a toggle as returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteToggle {
    pub result: ToggleOutcome,
    #[serde(flatten)]
    pub votes: VoteSummary,
}

/// Next stance for a voter currently at `current` who asks for `desired`.
#[must_use]
pub fn transition(current: Option<VoteKind>, desired: VoteKind) -> (ToggleOutcome, Option<VoteKind>) {
    match current {
        None => (ToggleOutcome::Added, Some(desired)),
        Some(kind) if kind == desired => (ToggleOutcome::Removed, None),
        Some(_) => (ToggleOutcome::Switched, Some(desired)),
    }
}

/// Vote service for business logic.
#[derive(Clone)]
pub struct VoteService {
    vote_repo: VoteRepository,
    resolver: TargetResolver,
    views: ViewAssembler,
    id_gen: IdGenerator,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub const fn new(vote_repo: VoteRepository, resolver: TargetResolver, views: ViewAssembler) -> Self {
        Self {
            vote_repo,
            resolver,
            views,
            id_gen: IdGenerator::new(),
        }
    }

    /// Toggle the caller's vote on a target addressed by public ID.
    ///
    /// The target must exist and be visible to the voter. Returns the outcome
    /// together with the target's refreshed tallies.
    pub async fn toggle_public(
        &self,
        kind: TargetKind,
        public_id: &str,
        voter_id: &str,
        desired: VoteKind,
    ) -> AppResult<VoteToggle> {
        let target = self.resolver.resolve(kind, public_id, Some(voter_id)).await?;
        let result = self.toggle(&target, voter_id, desired).await?;

        let id = target.id().to_string();
        let votes = self
            .views
            .vote_summaries(kind, std::slice::from_ref(&id), Some(voter_id))
            .await?
            .remove(&id)
            .unwrap_or_default();

        Ok(VoteToggle { result, votes })
    }

    /// Toggle the voter's stance on an already-resolved target.
    ///
    /// Adding and switching go through one upsert on the
    /// `(voter, target)` unique key. Removal deletes only if the row still
    /// holds the kind that was read; when another request changed it first,
    /// the stance is read again and the toggle applied to it, so the reported
    /// outcome always matches what is stored.
    pub async fn toggle(
        &self,
        target: &VoteTarget,
        voter_id: &str,
        desired: VoteKind,
    ) -> AppResult<ToggleOutcome> {
        for _ in 0..MAX_TOGGLE_ATTEMPTS {
            let current = self.vote_repo.find_for(voter_id, target).await?;
            let (outcome, next) = transition(current.as_ref().map(|v| v.kind), desired);

            match (current, next) {
                (Some(existing), None) => {
                    if self
                        .vote_repo
                        .delete_if_kind(&existing.id, existing.kind)
                        .await?
                        == 0
                    {
                        debug!(
                            voter_id = %voter_id,
                            target_id = %target.id(),
                            "Vote changed concurrently, reading again"
                        );
                        continue;
                    }
                }
                (_, Some(kind)) => {
                    let model = vote::ActiveModel {
                        id: Set(self.id_gen.generate()),
                        voter_id: Set(voter_id.to_string()),
                        kind: Set(kind),
                        target_kind: Set(target.kind()),
                        target_id: Set(target.id().to_string()),
                        created_at: Set(chrono::Utc::now().into()),
                    };
                    self.vote_repo.upsert(model).await?;
                }
                (None, None) => {}
            }

            debug!(
                voter_id = %voter_id,
                target_kind = target.kind().as_str(),
                target_id = %target.id(),
                outcome = ?outcome,
                "Vote toggled"
            );
            return Ok(outcome);
        }

        Err(AppError::Conflict(
            "Vote changed while it was being updated, try again".to_string(),
        ))
    }
}

/// Removal races retried before giving up.
const MAX_TOGGLE_ATTEMPTS: usize = 3;
