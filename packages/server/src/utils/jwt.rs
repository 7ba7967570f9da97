use anyhow::{Context, Result};
use arena_common::Role;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Session lifetime, shared by the token `exp` claim and the cookie `Max-Age`.
pub const SESSION_DAYS: i64 = 7;

/// JWT Claims structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub uid: i32, // User ID
    pub email: String,
    pub username: String,
    pub role: Role,
    pub exp: usize, // Expiration timestamp
}

/// Sign a new session token for a user.
pub fn sign(user_id: i32, email: &str, username: &str, role: Role, secret: &str) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::days(SESSION_DAYS))
        .context("session expiry out of range")?
        .timestamp();

    let claims = Claims {
        uid: user_id,
        email: email.to_owned(),
        username: username.to_owned(),
        role,
        exp: usize::try_from(expiration).context("session expiry before epoch")?,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify and decode a session token. Any signature or expiry failure is an error.
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}
