use arena_common::Role;
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header::AUTHORIZATION, request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Name of the cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "arena_session";

/// Authenticated caller, resolved from the session cookie
/// (or an `Authorization: Bearer <token>` header).
///
/// Add this as a handler parameter to require authentication.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Returns `Ok(())` if the caller owns the resource or is an admin.
    pub fn require_owner_or_admin(&self, owner_id: i32) -> Result<(), AppError> {
        if self.user_id == owner_id || self.is_admin() {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

/// Authenticated caller with the admin role. Rejects others with 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

/// Result of checking a request against a required role.
#[derive(Debug)]
pub enum AuthOutcome {
    Authenticated(AuthUser),
    /// No token, or a token that failed verification.
    Unauthenticated(AppError),
    /// Valid session without the required role.
    Forbidden,
}

/// Pull the session token from the cookie, falling back to a bearer header.
pub fn session_token(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Ok(Some(cookie.value().to_string()));
    }

    match headers.get(AUTHORIZATION) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|t| Some(t.to_string()))
            .ok_or(AppError::TokenInvalid),
    }
}

/// The single authorization gate every protected handler goes through.
pub fn authorize(headers: &HeaderMap, secret: &str, required: Role) -> AuthOutcome {
    let token = match session_token(headers) {
        Ok(Some(token)) => token,
        Ok(None) => return AuthOutcome::Unauthenticated(AppError::TokenMissing),
        Err(e) => return AuthOutcome::Unauthenticated(e),
    };

    let Ok(claims) = jwt::verify(&token, secret) else {
        return AuthOutcome::Unauthenticated(AppError::TokenInvalid);
    };

    if required.is_admin() && !claims.role.is_admin() {
        return AuthOutcome::Forbidden;
    }

    AuthOutcome::Authenticated(AuthUser {
        user_id: claims.uid,
        email: claims.email,
        username: claims.username,
        role: claims.role,
    })
}

impl AuthOutcome {
    fn into_result(self) -> Result<AuthUser, AppError> {
        match self {
            AuthOutcome::Authenticated(user) => Ok(user),
            AuthOutcome::Unauthenticated(err) => Err(err),
            AuthOutcome::Forbidden => Err(AppError::PermissionDenied),
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(&parts.headers, &state.config.auth.jwt_secret, Role::User).into_result()
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(&parts.headers, &state.config.auth.jwt_secret, Role::Admin)
            .into_result()
            .map(AdminUser)
    }
}

/// Build the HTTP-only session cookie for a freshly signed token.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(secure)
        .max_age(time::Duration::days(jwt::SESSION_DAYS))
        .build()
}

/// A cookie that expires the session immediately.
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}
