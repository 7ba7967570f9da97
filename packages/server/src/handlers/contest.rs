use std::collections::HashMap;

use arena_common::ContestStatus;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{comment, contest, contest_winner, entry, reaction, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::json::{AppJson, AppQuery};
use crate::models::contest::*;
use crate::models::entry::{EntryListItem, EntryListQuery};
use crate::models::shared::{PageQuery, Pagination};
use crate::services::FinalizeService;
use crate::state::AppState;
use crate::utils::contest::{
    find_contest, find_contest_for_update, find_resolved_contest, resolve_status,
    sync_all_statuses,
};

#[utoipa::path(
    post,
    path = "/",
    tag = "Contests",
    operation_id = "createContest",
    summary = "Create a new contest",
    description = "Creates a new contest. Admin only. Status defaults to `draft` and is resolved against the clock on every read.",
    request_body = CreateContestRequest,
    responses(
        (status = 201, description = "Contest created", body = ContestResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, admin, payload), fields(title = %payload.title))]
pub async fn create_contest(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateContestRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_contest(&payload)?;

    let now = chrono::Utc::now();
    let new_contest = contest::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        status: Set(payload.status.unwrap_or_default()),
        start_date: Set(payload.start_date),
        end_date: Set(payload.end_date),
        prize_pool: Set(0),
        prize_pool_distributed: Set(false),
        finalized_at: Set(None),
        created_by: Set(admin.user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_contest.insert(&state.db).await?;
    let model = resolve_status(&state.db, model, state.config.contest.voting_policy).await?;

    Ok((StatusCode::CREATED, Json(ContestResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Contests",
    operation_id = "listContests",
    summary = "List contests",
    description = "Returns a paginated list of contests, newest start date first. Statuses are resolved before filtering.",
    params(ContestListQuery),
    responses(
        (status = 200, description = "List of contests", body = ContestListResponse),
        (status = 400, description = "Invalid query (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_contests(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ContestListQuery>,
) -> Result<Json<ContestListResponse>, AppError> {
    let (page, per_page) = PageQuery {
        page: query.page,
        per_page: query.per_page,
    }
    .resolve();

    sync_all_statuses(&state.db, state.config.contest.voting_policy).await?;

    let mut select = contest::Entity::find();
    if let Some(status) = query.status {
        select = select.filter(contest::Column::Status.eq(status));
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    let data = select
        .order_by_desc(contest::Column::StartDate)
        .order_by_desc(contest::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(ContestResponse::from)
        .collect();

    Ok(Json(ContestListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Contests",
    operation_id = "getContest",
    summary = "Get a contest by ID",
    description = "Returns the contest with its status resolved against the current time. A corrected status is persisted before responding.",
    params(("id" = i32, Path, description = "Contest ID")),
    responses(
        (status = 200, description = "Contest details", body = ContestResponse),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_contest(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ContestResponse>, AppError> {
    let model = find_resolved_contest(&state.db, id, state.config.contest.voting_policy).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Contests",
    operation_id = "updateContest",
    summary = "Update an existing contest",
    description = "Partially updates a contest, including a manual status override. Admin only. A finalized contest keeps its dates and stays ended.",
    params(("id" = i32, Path, description = "Contest ID")),
    request_body = UpdateContestRequest,
    responses(
        (status = 200, description = "Contest updated", body = ContestResponse),
        (status = 400, description = "Validation error or finalized contest (VALIDATION_ERROR, CONFLICT)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, _admin, payload), fields(id))]
pub async fn update_contest(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateContestRequest>,
) -> Result<Json<ContestResponse>, AppError> {
    validate_update_contest(&payload)?;
    let policy = state.config.contest.voting_policy;

    if payload == UpdateContestRequest::default() {
        let existing = find_resolved_contest(&state.db, id, policy).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;
    let existing = find_contest_for_update(&txn, id).await?;

    if existing.prize_pool_distributed {
        let reopens = payload.status.is_some_and(|s| s != ContestStatus::Ended);
        if payload.start_date.is_some() || payload.end_date.is_some() || reopens {
            return Err(AppError::Conflict(
                "Contest has been finalized; its schedule and status are fixed".into(),
            ));
        }
    }

    // Cross-field date validation against existing values
    let effective_start = payload.start_date.unwrap_or(existing.start_date);
    let effective_end = payload.end_date.unwrap_or(existing.end_date);
    if effective_end <= effective_start {
        return Err(AppError::Validation(
            "end_date must be after start_date".into(),
        ));
    }

    let mut active: contest::ActiveModel = existing.into();

    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(start_date) = payload.start_date {
        active.start_date = Set(start_date);
    }
    if let Some(end_date) = payload.end_date {
        active.end_date = Set(end_date);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    let model = resolve_status(&state.db, model, policy).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Contests",
    operation_id = "deleteContest",
    summary = "Delete a contest by ID",
    description = "Permanently deletes a contest together with its winners, entries, and the entries' reactions and comments. Admin only.",
    params(("id" = i32, Path, description = "Contest ID")),
    responses(
        (status = 204, description = "Contest deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, _admin), fields(id))]
pub async fn delete_contest(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    find_contest_for_update(&txn, id).await?;

    let entry_ids: Vec<i32> = entry::Entity::find()
        .filter(entry::Column::ContestId.eq(id))
        .select_only()
        .column(entry::Column::Id)
        .into_tuple()
        .all(&txn)
        .await?;

    if !entry_ids.is_empty() {
        reaction::Entity::delete_many()
            .filter(reaction::Column::EntryId.is_in(entry_ids.clone()))
            .exec(&txn)
            .await?;
        comment::Entity::delete_many()
            .filter(comment::Column::EntryId.is_in(entry_ids))
            .exec(&txn)
            .await?;
    }
    contest_winner::Entity::delete_many()
        .filter(contest_winner::Column::ContestId.eq(id))
        .exec(&txn)
        .await?;
    entry::Entity::delete_many()
        .filter(entry::Column::ContestId.eq(id))
        .exec(&txn)
        .await?;
    contest::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    tracing::info!(contest_id = id, "Contest deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/finalize",
    tag = "Contests",
    operation_id = "finalizeContest",
    summary = "Finalize a contest and distribute its prize pool",
    description = "Admin only. Sums the votes of all approved entries into the prize pool, pays 50/20/10% to the top three entries plus 200/150/100 XP, pays 20% to the finalizing admin, and marks the contest finalized. Runs in one transaction; a second call fails with CONFLICT.",
    params(("id" = i32, Path, description = "Contest ID")),
    responses(
        (status = 200, description = "Contest finalized", body = FinalizeResponse),
        (status = 400, description = "Already finalized or no approved entries (CONFLICT, VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, admin), fields(id, admin_id = admin.user_id))]
pub async fn finalize_contest(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<FinalizeResponse>, AppError> {
    let txn = state.db.begin().await?;
    let outcome = FinalizeService::new(&txn)
        .finalize(id, admin.user_id)
        .await?;
    txn.commit().await?;

    let winners = winner_responses(&state.db, outcome.winners).await?;

    Ok(Json(FinalizeResponse {
        contest_id: outcome.contest.id,
        prize_pool: outcome.distribution.prize_pool,
        admin_share: outcome.distribution.admin_share,
        undistributed: outcome.distribution.undistributed,
        winners,
    }))
}

#[utoipa::path(
    get,
    path = "/{id}/winners",
    tag = "Contests",
    operation_id = "listWinners",
    summary = "List the winners of a contest",
    description = "Returns the podium of a finalized contest ordered by placement. Empty before finalization.",
    params(("id" = i32, Path, description = "Contest ID")),
    responses(
        (status = 200, description = "Winners", body = Vec<WinnerResponse>),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn list_winners(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<WinnerResponse>>, AppError> {
    find_contest(&state.db, id).await?;

    let winners = contest_winner::Entity::find()
        .filter(contest_winner::Column::ContestId.eq(id))
        .order_by_asc(contest_winner::Column::Placement)
        .all(&state.db)
        .await?;

    Ok(Json(winner_responses(&state.db, winners).await?))
}

#[utoipa::path(
    get,
    path = "/{id}/entries",
    tag = "Entries",
    operation_id = "listContestEntries",
    summary = "List the entries of a contest",
    description = "Returns the contest's entries ordered by vote count (highest first), ties by submission order.",
    params(("id" = i32, Path, description = "Contest ID"), EntryListQuery),
    responses(
        (status = 200, description = "Entries", body = Vec<EntryListItem>),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(id))]
pub async fn list_contest_entries(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppQuery(query): AppQuery<EntryListQuery>,
) -> Result<Json<Vec<EntryListItem>>, AppError> {
    find_contest(&state.db, id).await?;

    let mut select = entry::Entity::find().filter(entry::Column::ContestId.eq(id));
    if let Some(status) = query.status {
        select = select.filter(entry::Column::Status.eq(status));
    }

    let rows = select
        .find_also_related(user::Entity)
        .order_by_desc(entry::Column::VoteCount)
        .order_by_asc(entry::Column::Id)
        .all(&state.db)
        .await?;

    let items = rows
        .into_iter()
        .map(|(e, author)| EntryListItem {
            entry: e.into(),
            username: author.map(|u| u.username).unwrap_or_default(),
        })
        .collect();

    Ok(Json(items))
}

async fn winner_responses<C: ConnectionTrait>(
    db: &C,
    winners: Vec<contest_winner::Model>,
) -> Result<Vec<WinnerResponse>, AppError> {
    let user_ids: Vec<i32> = winners.iter().map(|w| w.user_id).collect();
    let usernames: HashMap<i32, String> = if user_ids.is_empty() {
        HashMap::new()
    } else {
        user::Entity::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect()
    };

    Ok(winners
        .into_iter()
        .map(|w| WinnerResponse {
            username: usernames.get(&w.user_id).cloned().unwrap_or_default(),
            id: w.id,
            contest_id: w.contest_id,
            user_id: w.user_id,
            entry_id: w.entry_id,
            placement: w.placement,
            votes_received: w.votes_received,
            prize_amount: w.prize_amount,
            created_at: w.created_at,
        })
        .collect())
}
