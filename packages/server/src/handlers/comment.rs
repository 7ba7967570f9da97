use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{comment, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::entry::find_entry;
use crate::models::comment::*;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/{id}/comments",
    tag = "Comments",
    operation_id = "listComments",
    summary = "List comments on an entry",
    params(("id" = i32, Path, description = "Entry ID")),
    responses(
        (status = 200, description = "Comments, oldest first", body = Vec<CommentResponse>),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<CommentResponse>>, AppError> {
    find_entry(&state.db, id).await?;

    let rows = comment::Entity::find()
        .filter(comment::Column::EntryId.eq(id))
        .find_also_related(user::Entity)
        .order_by_asc(comment::Column::CreatedAt)
        .order_by_asc(comment::Column::Id)
        .all(&state.db)
        .await?;

    let comments = rows
        .into_iter()
        .map(|(c, author)| CommentResponse {
            id: c.id,
            entry_id: c.entry_id,
            user_id: c.user_id,
            username: author.map(|u| u.username).unwrap_or_default(),
            content: c.content,
            created_at: c.created_at,
        })
        .collect();

    Ok(Json(comments))
}

#[utoipa::path(
    post,
    path = "/{id}/comments",
    tag = "Comments",
    operation_id = "createComment",
    summary = "Comment on an entry",
    params(("id" = i32, Path, description = "Entry ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, user_id = auth_user.user_id))]
pub async fn create_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_comment(&payload)?;
    find_entry(&state.db, id).await?;

    let model = comment::ActiveModel {
        user_id: Set(auth_user.user_id),
        entry_id: Set(id),
        content: Set(payload.content.trim().to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse {
            id: model.id,
            entry_id: model.entry_id,
            user_id: model.user_id,
            username: auth_user.username,
            content: model.content,
            created_at: model.created_at,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Comments",
    operation_id = "deleteComment",
    summary = "Delete a comment",
    description = "Allowed for the comment's author and admins.",
    params(("id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Comment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn delete_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let existing = comment::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".into()))?;
    auth_user.require_owner_or_admin(existing.user_id)?;

    comment::Entity::delete_by_id(id).exec(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}
