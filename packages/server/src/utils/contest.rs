use arena_common::{ContestStatus, VotingPolicy, derive_status};
use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter, QuerySelect,
};

use crate::entity::contest;
use crate::error::AppError;

/// Look up a contest by ID, returning 404 if not found.
pub async fn find_contest<C: ConnectionTrait>(db: &C, id: i32) -> Result<contest::Model, AppError> {
    contest::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Contest not found".into()))
}

/// Look up a contest by ID and hold a row lock until the transaction ends.
pub async fn find_contest_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<contest::Model, AppError> {
    contest::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Contest not found".into()))
}

/// Bring a contest's stored status in line with the clock.
///
/// The write is a compare-and-set on the previously stored status, so a
/// concurrent admin edit is never overwritten; in that case the fresh row is
/// returned instead.
pub async fn resolve_status<C: ConnectionTrait>(
    db: &C,
    model: contest::Model,
    policy: VotingPolicy,
) -> Result<contest::Model, AppError> {
    let now = Utc::now();
    let derived = derive_status(model.status, model.start_date, model.end_date, now, policy);
    if derived == model.status {
        return Ok(model);
    }

    let result = contest::Entity::update_many()
        .col_expr(contest::Column::Status, Expr::value(derived))
        .col_expr(contest::Column::UpdatedAt, Expr::value(now))
        .filter(contest::Column::Id.eq(model.id))
        .filter(contest::Column::Status.eq(model.status))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return find_contest(db, model.id).await;
    }

    tracing::info!(
        contest_id = model.id,
        from = %model.status,
        to = %derived,
        "Contest status transitioned"
    );

    Ok(contest::Model {
        status: derived,
        updated_at: now,
        ..model
    })
}

/// Apply the status rules to every stored contest in two statements.
///
/// Set-based form of [`derive_status`], used before listing so that status
/// filters and pagination see resolved values.
pub async fn sync_all_statuses<C: ConnectionTrait>(
    db: &C,
    policy: VotingPolicy,
) -> Result<u64, AppError> {
    let now = Utc::now();

    let mut not_terminal = vec![ContestStatus::Ended];
    if policy == VotingPolicy::Sticky {
        not_terminal.push(ContestStatus::Voting);
    }
    let ended = contest::Entity::update_many()
        .col_expr(contest::Column::Status, Expr::value(ContestStatus::Ended))
        .col_expr(contest::Column::UpdatedAt, Expr::value(now))
        .filter(contest::Column::Status.is_not_in(not_terminal))
        .filter(contest::Column::EndDate.lt(now))
        .exec(db)
        .await?;

    let activated = contest::Entity::update_many()
        .col_expr(contest::Column::Status, Expr::value(ContestStatus::Active))
        .col_expr(contest::Column::UpdatedAt, Expr::value(now))
        .filter(contest::Column::Status.eq(ContestStatus::Draft))
        .filter(contest::Column::StartDate.lte(now))
        .filter(contest::Column::EndDate.gte(now))
        .exec(db)
        .await?;

    let changed = ended.rows_affected + activated.rows_affected;
    if changed > 0 {
        tracing::info!(
            ended = ended.rows_affected,
            activated = activated.rows_affected,
            "Contest statuses transitioned"
        );
    }
    Ok(changed)
}

/// [`find_contest`] followed by [`resolve_status`].
pub async fn find_resolved_contest<C: ConnectionTrait>(
    db: &C,
    id: i32,
    policy: VotingPolicy,
) -> Result<contest::Model, AppError> {
    let model = find_contest(db, id).await?;
    resolve_status(db, model, policy).await
}
