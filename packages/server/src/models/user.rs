use arena_common::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public profile of a user.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserProfileResponse {
    pub id: i32,
    pub username: String,
    pub role: Role,
    #[schema(example = 120)]
    pub points_balance: i64,
    pub xp: i32,
    pub total_xp: i32,
    /// Number of podium placements.
    pub wins: u64,
    pub created_at: DateTime<Utc>,
}

/// Request body for changing a user's role.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateRoleRequest {
    pub role: Role,
}
