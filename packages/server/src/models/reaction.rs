use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ReactRequest {
    /// Reaction kind, 1-32 characters.
    #[schema(example = "heart")]
    pub reaction_type: String,
}

pub fn validate_react_request(req: &ReactRequest) -> Result<(), AppError> {
    let kind = req.reaction_type.trim();
    if kind.is_empty() || kind.chars().count() > 32 {
        return Err(AppError::Validation(
            "reaction_type must be 1-32 characters".into(),
        ));
    }
    Ok(())
}

/// Vote state of an entry after a reaction change.
#[derive(Serialize, utoipa::ToSchema)]
pub struct VoteStateResponse {
    pub entry_id: i32,
    pub vote_count: i32,
    /// The caller's reaction, absent after removal.
    pub reaction_type: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ReactionResponse {
    pub id: i32,
    pub user_id: i32,
    pub entry_id: i32,
    pub reaction_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::reaction::Model> for ReactionResponse {
    fn from(m: crate::entity::reaction::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            entry_id: m.entry_id,
            reaction_type: m.reaction_type,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
