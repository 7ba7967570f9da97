use arena_common::Role;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::cookie::CookieJar;
use sea_orm::*;
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, expired_session_cookie, session_cookie};
use crate::extractors::json::AppJson;
use crate::models::auth::{
    LoginRequest, MeResponse, RegisterRequest, SessionResponse, validate_login_request,
    validate_register_request,
};
use crate::state::AppState;
use crate::utils::{hash, jwt};

fn issue_session(
    state: &AppState,
    jar: CookieJar,
    user: user::Model,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    let token = jwt::sign(
        user.id,
        &user.email,
        &user.username,
        user.role,
        &state.config.auth.jwt_secret,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    let jar = jar.add(session_cookie(token.clone(), state.config.auth.secure_cookie));
    Ok((
        jar,
        Json(SessionResponse {
            token,
            user: user.into(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    operation_id = "register",
    summary = "Create an account",
    description = "Registers a new user with the `user` role and starts a session (sets the `arena_session` cookie).",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = SessionResponse),
        (status = 400, description = "Validation error or email/username taken (VALIDATION_ERROR, CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, jar, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_request(&payload)?;

    let hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let new_user = user::ActiveModel {
        email: Set(payload.email.trim().to_lowercase()),
        username: Set(payload.username.trim().to_string()),
        password: Set(hash),
        role: Set(Role::User),
        points_balance: Set(0),
        xp: Set(0),
        total_xp: Set(0),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let user = new_user.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Email or username is already taken".into())
        }
        _ => AppError::from(e),
    })?;

    let (jar, body) = issue_session(&state, jar, user)?;
    Ok((StatusCode::CREATED, jar, body))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Log in",
    description = "Verifies email and password and sets the `arena_session` cookie (HttpOnly, SameSite=Lax, 7 days).",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = SessionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Wrong credentials (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_login_request(&payload)?;

    let user = user::Entity::find()
        .filter(user::Column::Email.eq(payload.email.trim().to_lowercase()))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;

    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    tracing::info!(user_id = user.id, "User logged in");
    issue_session(&state, jar, user)
}

#[utoipa::path(
    post,
    path = "/logout",
    tag = "Auth",
    operation_id = "logout",
    summary = "Log out",
    description = "Expires the session cookie. Tokens are stateless, so a copied token stays valid until it expires.",
    responses((status = 204, description = "Session cookie cleared")),
)]
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (StatusCode::NO_CONTENT, jar.add(expired_session_cookie()))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    operation_id = "me",
    summary = "Current session",
    responses(
        (status = 200, description = "Identity of the session", body = MeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(auth_user), fields(user_id = auth_user.user_id))]
pub async fn me(auth_user: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        id: auth_user.user_id,
        email: auth_user.email,
        username: auth_user.username,
        role: auth_user.role,
    })
}
