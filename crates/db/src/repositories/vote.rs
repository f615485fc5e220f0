//! Vote repository.
//!
//! A unique index over `(voter_id, target_kind, target_id)` keeps at most one
//! row per voter and target; writes go through an upsert or a conditional
//! delete so concurrent toggles cannot leave duplicates behind.

use std::sync::Arc;

use crate::entities::target::{Target, TargetKind};
use crate::entities::vote::VoteKind;
use crate::entities::{Vote, vote};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, QueryFilter,
    QuerySelect,
};
use wavytv_common::{AppError, AppResult};

/// Number of votes of one kind on one target.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct VoteTally {
    pub target_id: String,
    pub kind: VoteKind,
    pub count: i64,
}

/// Vote repository for database operations.
#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    /// Create a new vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// The voter's current vote on a target, if any.
    pub async fn find_for(
        &self,
        voter_id: &str,
        target: &Target,
    ) -> AppResult<Option<vote::Model>> {
        Vote::find()
            .filter(vote::Column::VoterId.eq(voter_id))
            .filter(vote::Column::TargetKind.eq(target.kind()))
            .filter(vote::Column::TargetId.eq(target.id()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a vote, or overwrite the kind of the voter's existing vote on
    /// the same target.
    pub async fn upsert(&self, model: vote::ActiveModel) -> AppResult<vote::Model> {
        Vote::insert(model)
            .on_conflict(
                OnConflict::columns([
                    vote::Column::VoterId,
                    vote::Column::TargetKind,
                    vote::Column::TargetId,
                ])
                .update_column(vote::Column::Kind)
                .to_owned(),
            )
            .exec_with_returning(self.db.as_ref())
            .await
            .map_err(|e| match e {
                DbErr::RecordNotInserted | DbErr::RecordNotFound(_) => {
                    AppError::CreationFailed("vote".to_string())
                }
                other => AppError::Database(other.to_string()),
            })
    }

    /// Delete a vote only if it still has `kind`. Returns rows removed.
    pub async fn delete_if_kind(&self, id: &str, kind: VoteKind) -> AppResult<u64> {
        let result = Vote::delete_many()
            .filter(vote::Column::Id.eq(id))
            .filter(vote::Column::Kind.eq(kind))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Up/down tallies for a batch of targets of one kind. Targets without
    /// votes produce no rows.
    pub async fn tallies(&self, kind: TargetKind, ids: &[String]) -> AppResult<Vec<VoteTally>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Vote::find()
            .select_only()
            .column(vote::Column::TargetId)
            .column(vote::Column::Kind)
            .column_as(Expr::col(vote::Column::Id).count(), "count")
            .filter(vote::Column::TargetKind.eq(kind))
            .filter(vote::Column::TargetId.is_in(ids.to_vec()))
            .group_by(vote::Column::TargetId)
            .group_by(vote::Column::Kind)
            .into_model::<VoteTally>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The voter's votes among a batch of targets of one kind.
    pub async fn votes_by(
        &self,
        voter_id: &str,
        kind: TargetKind,
        ids: &[String],
    ) -> AppResult<Vec<vote::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Vote::find()
            .filter(vote::Column::VoterId.eq(voter_id))
            .filter(vote::Column::TargetKind.eq(kind))
            .filter(vote::Column::TargetId.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete every vote on the `kind` targets with the given storage IDs.
    pub async fn delete_for_targets(&self, kind: TargetKind, ids: &[String]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = Vote::delete_many()
            .filter(vote::Column::TargetKind.eq(kind))
            .filter(vote::Column::TargetId.is_in(ids.to_vec()))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Delete every vote on `target`.
    pub async fn delete_for_target(&self, target: &Target) -> AppResult<u64> {
        let result = Vote::delete_many()
            .filter(vote::Column::TargetKind.eq(target.kind()))
            .filter(vote::Column::TargetId.eq(target.id()))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }
}
