use arena_common::prize::{self, Candidate, Distribution};
use arena_common::{ContestStatus, EntryStatus};
use chrono::Utc;
use sea_orm::sea_query::ExprTrait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr, prelude::Expr,
};
use tracing::{info, warn};

use crate::entity::{contest, contest_winner, entry, user, xp_transaction};
use crate::error::AppError;
use crate::utils::contest::find_contest_for_update;

/// Everything a finalization wrote.
#[derive(Debug, Clone)]
pub struct FinalizeOutcome {
    pub contest: contest::Model,
    pub distribution: Distribution,
    pub winners: Vec<contest_winner::Model>,
}

/// One-shot conversion of a contest's votes into prizes, XP and winner records.
///
/// Runs inside the caller's transaction with the contest row locked, so a
/// concurrent second finalization blocks until the first commits and then
/// sees `prize_pool_distributed = true`. Nothing is visible until commit.
pub struct FinalizeService<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> FinalizeService<'a> {
    pub fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub async fn finalize(
        &self,
        contest_id: i32,
        admin_id: i32,
    ) -> Result<FinalizeOutcome, AppError> {
        let contest = find_contest_for_update(self.txn, contest_id).await?;
        if contest.prize_pool_distributed {
            return Err(AppError::Conflict(
                "Contest has already been finalized".into(),
            ));
        }

        let approved = entry::Entity::find()
            .filter(entry::Column::ContestId.eq(contest_id))
            .filter(entry::Column::Status.eq(EntryStatus::Approved))
            .order_by_desc(entry::Column::VoteCount)
            .order_by_asc(entry::Column::Id)
            .all(self.txn)
            .await?;
        if approved.is_empty() {
            return Err(AppError::Validation(
                "Contest has no approved entries".into(),
            ));
        }

        let candidates: Vec<Candidate> = approved
            .iter()
            .map(|e| Candidate {
                entry_id: e.id,
                user_id: e.user_id,
                vote_count: e.vote_count,
            })
            .collect();
        let distribution = prize::distribute(&candidates);

        let now = Utc::now();
        let mut winners = Vec::with_capacity(distribution.awards.len());
        for award in &distribution.awards {
            let winner = contest_winner::ActiveModel {
                contest_id: Set(contest_id),
                user_id: Set(award.user_id),
                entry_id: Set(award.entry_id),
                placement: Set(award.placement),
                votes_received: Set(award.votes_received),
                prize_amount: Set(award.prize_amount),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(self.txn)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    AppError::Conflict("Contest has already been finalized".into())
                }
                _ => AppError::from(e),
            })?;

            user::Entity::update_many()
                .col_expr(
                    user::Column::PointsBalance,
                    Expr::col(user::Column::PointsBalance).add(award.prize_amount),
                )
                .col_expr(user::Column::Xp, Expr::col(user::Column::Xp).add(award.xp))
                .col_expr(
                    user::Column::TotalXp,
                    Expr::col(user::Column::TotalXp).add(award.xp),
                )
                .filter(user::Column::Id.eq(award.user_id))
                .exec(self.txn)
                .await?;

            xp_transaction::ActiveModel {
                user_id: Set(award.user_id),
                amount: Set(award.xp),
                reason: Set(format!("contest_placement_{}", award.placement)),
                contest_id: Set(Some(contest_id)),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(self.txn)
            .await?;

            entry::Entity::update_many()
                .col_expr(entry::Column::FinalRank, Expr::value(award.placement))
                .filter(entry::Column::Id.eq(award.entry_id))
                .exec(self.txn)
                .await?;

            winners.push(winner);
        }

        user::Entity::update_many()
            .col_expr(
                user::Column::PointsBalance,
                Expr::col(user::Column::PointsBalance).add(distribution.admin_share),
            )
            .filter(user::Column::Id.eq(admin_id))
            .exec(self.txn)
            .await?;

        if distribution.undistributed > 0 {
            warn!(
                contest_id,
                undistributed = distribution.undistributed,
                placements = distribution.awards.len(),
                "Fewer than three placements; unfilled shares are not paid out"
            );
        }

        let mut active: contest::ActiveModel = contest.into();
        active.prize_pool = Set(distribution.prize_pool);
        active.prize_pool_distributed = Set(true);
        active.finalized_at = Set(Some(now));
        active.status = Set(ContestStatus::Ended);
        active.updated_at = Set(now);
        let contest = active.update(self.txn).await?;

        info!(
            contest_id,
            admin_id,
            prize_pool = distribution.prize_pool,
            winners = winners.len(),
            "Contest finalized"
        );

        Ok(FinalizeOutcome {
            contest,
            distribution,
            winners,
        })
    }
}
