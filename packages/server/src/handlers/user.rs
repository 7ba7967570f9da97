use axum::Json;
use axum::extract::{Path, State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{contest_winner, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::json::AppJson;
use crate::models::user::*;
use crate::state::AppState;

async fn find_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

async fn profile<C: ConnectionTrait>(
    db: &C,
    user: user::Model,
) -> Result<UserProfileResponse, AppError> {
    let wins = contest_winner::Entity::find()
        .filter(contest_winner::Column::UserId.eq(user.id))
        .count(db)
        .await?;

    Ok(UserProfileResponse {
        id: user.id,
        username: user.username,
        role: user.role,
        points_balance: user.points_balance,
        xp: user.xp,
        total_xp: user.total_xp,
        wins,
        created_at: user.created_at,
    })
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    operation_id = "getUserProfile",
    summary = "Public profile of a user",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Profile", body = UserProfileResponse),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserProfileResponse>, AppError> {
    let user = find_user(&state.db, id).await?;
    Ok(Json(profile(&state.db, user).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}/role",
    tag = "Admin",
    operation_id = "updateUserRole",
    summary = "Change a user's role",
    description = "Admin only. Takes effect on the user's next login, since roles are carried in the session token.",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = UserProfileResponse),
        (status = 400, description = "Invalid role (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, admin, payload), fields(id, admin_id = admin.user_id, role = %payload.role))]
pub async fn update_role(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateRoleRequest>,
) -> Result<Json<UserProfileResponse>, AppError> {
    let existing = find_user(&state.db, id).await?;
    let mut active: user::ActiveModel = existing.into();
    active.role = Set(payload.role);
    let model = active.update(&state.db).await?;

    tracing::info!(user_id = id, role = %model.role, "User role changed");
    Ok(Json(profile(&state.db, model).await?))
}
