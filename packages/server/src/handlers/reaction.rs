use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::reaction;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::entry::find_entry;
use crate::models::reaction::*;
use crate::services::{VoteOutcome, VoteService};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/{id}/reactions",
    tag = "Reactions",
    operation_id = "react",
    summary = "React to an entry",
    description = "Adds the caller's reaction and increments the entry's vote count, or changes the type of an existing reaction without touching the count.",
    params(("id" = i32, Path, description = "Entry ID")),
    request_body = ReactRequest,
    responses(
        (status = 201, description = "Reaction added", body = VoteStateResponse),
        (status = 200, description = "Reaction type changed", body = VoteStateResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR) or contest finalized (CONFLICT)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, user_id = auth_user.user_id))]
pub async fn react(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ReactRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_react_request(&payload)?;
    let reaction_type = payload.reaction_type.trim().to_string();

    let txn = state.db.begin().await?;
    let outcome = VoteService::new(&txn)
        .react(auth_user.user_id, id, &reaction_type)
        .await?;
    txn.commit().await?;

    let status = match outcome {
        VoteOutcome::Added { .. } => StatusCode::CREATED,
        _ => StatusCode::OK,
    };

    Ok((
        status,
        Json(VoteStateResponse {
            entry_id: id,
            vote_count: outcome.vote_count(),
            reaction_type: Some(reaction_type),
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/{id}/reactions",
    tag = "Reactions",
    operation_id = "unreact",
    summary = "Remove your reaction from an entry",
    description = "Deletes the caller's reaction and decrements the vote count. Fails with 404 when the caller has not reacted; the count is left unchanged.",
    params(("id" = i32, Path, description = "Entry ID")),
    responses(
        (status = 200, description = "Reaction removed", body = VoteStateResponse),
        (status = 400, description = "Contest finalized (CONFLICT)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Entry or reaction not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn unreact(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<VoteStateResponse>, AppError> {
    let txn = state.db.begin().await?;
    let outcome = VoteService::new(&txn).unreact(auth_user.user_id, id).await?;
    txn.commit().await?;

    Ok(Json(VoteStateResponse {
        entry_id: id,
        vote_count: outcome.vote_count(),
        reaction_type: None,
    }))
}

#[utoipa::path(
    get,
    path = "/{id}/reactions",
    tag = "Reactions",
    operation_id = "listReactions",
    summary = "List reactions on an entry",
    params(("id" = i32, Path, description = "Entry ID")),
    responses(
        (status = 200, description = "Reactions, oldest first", body = Vec<ReactionResponse>),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn list_reactions(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ReactionResponse>>, AppError> {
    find_entry(&state.db, id).await?;

    let reactions = reaction::Entity::find()
        .filter(reaction::Column::EntryId.eq(id))
        .order_by_asc(reaction::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(ReactionResponse::from)
        .collect();

    Ok(Json(reactions))
}
