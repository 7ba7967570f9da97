use arena_common::{ContestStatus, EntryStatus};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{comment, entry, reaction};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AdminUser, AuthUser};
use crate::extractors::json::AppJson;
use crate::models::entry::*;
use crate::models::shared::non_blank;
use crate::state::AppState;
use crate::utils::contest::{find_contest, find_resolved_contest};
use crate::utils::image::validate_all;

pub(crate) async fn find_entry<C: ConnectionTrait>(db: &C, id: i32) -> Result<entry::Model, AppError> {
    entry::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Entry not found".into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Entries",
    operation_id = "submitEntry",
    summary = "Submit or update an entry",
    description = "Creates the caller's entry in a contest, or overwrites it if one exists. Every non-empty phase URL is checked concurrently; any failure rejects the whole submission with per-URL `details` and nothing is stored.",
    request_body = SubmitEntryRequest,
    responses(
        (status = 201, description = "Entry created", body = EntryResponse),
        (status = 200, description = "Existing entry updated", body = EntryResponse),
        (status = 400, description = "Validation error, invalid images, or contest in voting or ended (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, contest_id = payload.contest_id))]
pub async fn submit_entry(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SubmitEntryRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_submit_entry(&payload)?;

    let contest = find_resolved_contest(
        &state.db,
        payload.contest_id,
        state.config.contest.voting_policy,
    )
    .await?;
    if matches!(contest.status, ContestStatus::Ended | ContestStatus::Voting)
        || contest.prize_pool_distributed
    {
        return Err(AppError::Validation(
            "Contest is closed and no longer accepts entries".into(),
        ));
    }

    let failures = validate_all(state.images.as_ref(), &payload.phase_urls()).await;
    if !failures.is_empty() {
        tracing::info!(rejected = failures.len(), "Entry images failed validation");
        return Err(AppError::InvalidImages(failures));
    }

    let existing = entry::Entity::find()
        .filter(entry::Column::UserId.eq(auth_user.user_id))
        .filter(entry::Column::ContestId.eq(payload.contest_id))
        .one(&state.db)
        .await?;

    let now = chrono::Utc::now();
    let (status_code, mut active) = match existing {
        Some(model) => (StatusCode::OK, entry::ActiveModel::from(model)),
        None => (
            StatusCode::CREATED,
            entry::ActiveModel {
                user_id: Set(auth_user.user_id),
                contest_id: Set(payload.contest_id),
                vote_count: Set(0),
                status: Set(EntryStatus::PendingReview),
                final_rank: Set(None),
                created_at: Set(now),
                ..Default::default()
            },
        ),
    };

    active.title = Set(non_blank(payload.title));
    active.description = Set(non_blank(payload.description));
    active.phase1_url = Set(non_blank(payload.phase1_url));
    active.phase2_url = Set(non_blank(payload.phase2_url));
    active.phase3_url = Set(non_blank(payload.phase3_url));
    active.phase4_url = Set(non_blank(payload.phase4_url));
    active.submitted_at = Set(now);
    active.last_activity_at = Set(now);

    let model = if status_code == StatusCode::CREATED {
        active.insert(&state.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("An entry for this contest was submitted concurrently".into())
            }
            _ => AppError::from(e),
        })?
    } else {
        active.update(&state.db).await?
    };

    tracing::info!(entry_id = model.id, created = status_code == StatusCode::CREATED, "Entry saved");
    Ok((status_code, Json(EntryResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Entries",
    operation_id = "getEntry",
    summary = "Get an entry by ID",
    params(("id" = i32, Path, description = "Entry ID")),
    responses(
        (status = 200, description = "Entry details", body = EntryResponse),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EntryResponse>, AppError> {
    let model = find_entry(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}/status",
    tag = "Entries",
    operation_id = "updateEntryStatus",
    summary = "Moderate an entry",
    description = "Sets the moderation status of an entry. Admin only. Only `approved` entries take part in finalization.",
    params(("id" = i32, Path, description = "Entry ID")),
    request_body = UpdateEntryStatusRequest,
    responses(
        (status = 200, description = "Entry updated", body = EntryResponse),
        (status = 400, description = "Invalid status (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, admin, payload), fields(id, admin_id = admin.user_id, status = %payload.status))]
pub async fn update_entry_status(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateEntryStatusRequest>,
) -> Result<Json<EntryResponse>, AppError> {
    let existing = find_entry(&state.db, id).await?;
    let mut active: entry::ActiveModel = existing.into();
    active.status = Set(payload.status);
    let model = active.update(&state.db).await?;

    tracing::info!(entry_id = id, status = %model.status, "Entry moderated");
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Entries",
    operation_id = "deleteEntry",
    summary = "Delete an entry",
    description = "Removes an entry with its reactions and comments. Allowed for the author and admins, and only until the contest's prize pool is distributed.",
    params(("id" = i32, Path, description = "Entry ID")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 400, description = "Contest already finalized (CONFLICT)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn delete_entry(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;

    let existing = entry::Entity::find_by_id(id)
        .lock(sea_query::LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Entry not found".into()))?;
    auth_user.require_owner_or_admin(existing.user_id)?;

    let contest = find_contest(&txn, existing.contest_id).await?;
    if contest.prize_pool_distributed {
        return Err(AppError::Conflict(
            "Entries of a finalized contest cannot be deleted".into(),
        ));
    }

    reaction::Entity::delete_many()
        .filter(reaction::Column::EntryId.eq(id))
        .exec(&txn)
        .await?;
    comment::Entity::delete_many()
        .filter(comment::Column::EntryId.eq(id))
        .exec(&txn)
        .await?;
    entry::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    tracing::info!(entry_id = id, "Entry deleted");
    Ok(StatusCode::NO_CONTENT)
}
