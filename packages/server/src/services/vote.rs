use chrono::Utc;
use sea_orm::sea_query::{ExprTrait, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QuerySelect,
    Set, SqlErr, prelude::Expr,
};

use crate::entity::{contest, entry, reaction};
use crate::error::AppError;

/// Result of a reaction write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    /// A new reaction was stored and the vote count incremented.
    Added { vote_count: i32 },
    /// The caller's existing reaction changed type; the count is unchanged.
    Changed { vote_count: i32 },
    /// The caller's reaction was deleted and the vote count decremented.
    Removed { vote_count: i32 },
}

impl VoteOutcome {
    pub fn vote_count(&self) -> i32 {
        match self {
            Self::Added { vote_count }
            | Self::Changed { vote_count }
            | Self::Removed { vote_count } => *vote_count,
        }
    }
}

/// Reaction writes that keep `entry.vote_count` equal to the number of reactions.
///
/// Both operations must run inside the caller's transaction; the reaction row
/// and the counter change commit or roll back together.
pub struct VoteService<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> VoteService<'a> {
    pub fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Insert the caller's reaction, or change its type if one already exists.
    pub async fn react(
        &self,
        user_id: i32,
        entry_id: i32,
        reaction_type: &str,
    ) -> Result<VoteOutcome, AppError> {
        self.lock_open_entry(entry_id).await?;

        let now = Utc::now();
        let existing = reaction::Entity::find()
            .filter(reaction::Column::UserId.eq(user_id))
            .filter(reaction::Column::EntryId.eq(entry_id))
            .one(self.txn)
            .await?;

        if let Some(existing) = existing {
            let mut active: reaction::ActiveModel = existing.into();
            active.reaction_type = Set(reaction_type.to_string());
            active.updated_at = Set(now);
            active.update(self.txn).await?;
            let vote_count = self.lock_entry(entry_id).await?.vote_count;
            return Ok(VoteOutcome::Changed { vote_count });
        }

        reaction::ActiveModel {
            user_id: Set(user_id),
            entry_id: Set(entry_id),
            reaction_type: Set(reaction_type.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.txn)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("Reaction already recorded".into())
            }
            _ => AppError::from(e),
        })?;

        entry::Entity::update_many()
            .col_expr(
                entry::Column::VoteCount,
                Expr::col(entry::Column::VoteCount).add(1),
            )
            .col_expr(entry::Column::LastActivityAt, Expr::value(now))
            .filter(entry::Column::Id.eq(entry_id))
            .exec(self.txn)
            .await?;

        let vote_count = self.lock_entry(entry_id).await?.vote_count;
        Ok(VoteOutcome::Added { vote_count })
    }

    /// Delete the caller's reaction. 404 if there is none; the count is untouched.
    pub async fn unreact(&self, user_id: i32, entry_id: i32) -> Result<VoteOutcome, AppError> {
        self.lock_open_entry(entry_id).await?;

        let deleted = reaction::Entity::delete_many()
            .filter(reaction::Column::UserId.eq(user_id))
            .filter(reaction::Column::EntryId.eq(entry_id))
            .exec(self.txn)
            .await?;
        if deleted.rows_affected == 0 {
            return Err(AppError::NotFound("Reaction not found".into()));
        }

        entry::Entity::update_many()
            .col_expr(
                entry::Column::VoteCount,
                Expr::col(entry::Column::VoteCount).sub(1),
            )
            .filter(entry::Column::Id.eq(entry_id))
            .filter(entry::Column::VoteCount.gt(0))
            .exec(self.txn)
            .await?;

        let vote_count = self.lock_entry(entry_id).await?.vote_count;
        Ok(VoteOutcome::Removed { vote_count })
    }

    /// Lock the entry for a vote, failing once its contest has been finalized.
    ///
    /// The contest row is share-locked before the entry, the same order
    /// finalization takes them, so a vote cannot land between the ranking and
    /// the payout.
    async fn lock_open_entry(&self, entry_id: i32) -> Result<entry::Model, AppError> {
        let entry = entry::Entity::find_by_id(entry_id)
            .one(self.txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Entry not found".into()))?;

        let contest = contest::Entity::find_by_id(entry.contest_id)
            .lock(LockType::Share)
            .one(self.txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".into()))?;
        if contest.prize_pool_distributed {
            return Err(AppError::Conflict(
                "Voting is closed for a finalized contest".into(),
            ));
        }

        self.lock_entry(entry_id).await
    }

    async fn lock_entry(&self, entry_id: i32) -> Result<entry::Model, AppError> {
        entry::Entity::find_by_id(entry_id)
            .lock(LockType::Update)
            .one(self.txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Entry not found".into()))
    }
}
