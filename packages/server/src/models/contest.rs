use arena_common::ContestStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, validate_title};
use crate::error::AppError;

const MAX_DESCRIPTION_BYTES: usize = 1_000_000;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateContestRequest {
    #[schema(example = "Autumn Landscapes")]
    pub title: String,
    /// Markdown description.
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Initial status. Defaults to `draft`.
    pub status: Option<ContestStatus>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateContestRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// Manual status override.
    pub status: Option<ContestStatus>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct ContestListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Only contests whose resolved status matches.
    pub status: Option<ContestStatus>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
pub struct ContestResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub status: ContestStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub prize_pool: i64,
    pub prize_pool_distributed: bool,
    pub finalized_at: Option<DateTime<Utc>>,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ContestListResponse {
    pub data: Vec<ContestResponse>,
    pub pagination: Pagination,
}

/// A podium placement of a finalized contest.
#[derive(Serialize, utoipa::ToSchema)]
pub struct WinnerResponse {
    pub id: i32,
    pub contest_id: i32,
    pub user_id: i32,
    pub username: String,
    pub entry_id: i32,
    #[schema(example = 1)]
    pub placement: i32,
    pub votes_received: i32,
    pub prize_amount: i64,
    pub created_at: DateTime<Utc>,
}

/// Outcome of finalizing a contest.
#[derive(Serialize, utoipa::ToSchema)]
pub struct FinalizeResponse {
    pub contest_id: i32,
    #[schema(example = 20)]
    pub prize_pool: i64,
    /// Paid to the finalizing admin.
    #[schema(example = 4)]
    pub admin_share: i64,
    /// Shares of unfilled placements, paid to nobody.
    #[schema(example = 0)]
    pub undistributed: i64,
    pub winners: Vec<WinnerResponse>,
}

impl From<crate::entity::contest::Model> for ContestResponse {
    fn from(m: crate::entity::contest::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            status: m.status,
            start_date: m.start_date,
            end_date: m.end_date,
            prize_pool: m.prize_pool,
            prize_pool_distributed: m.prize_pool_distributed,
            finalized_at: m.finalized_at,
            created_by: m.created_by,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

fn validate_description(description: &str) -> Result<(), AppError> {
    if description.trim().is_empty() || description.len() > MAX_DESCRIPTION_BYTES {
        return Err(AppError::Validation(
            "Description must be non-empty and at most 1MB".into(),
        ));
    }
    Ok(())
}

pub fn validate_create_contest(req: &CreateContestRequest) -> Result<(), AppError> {
    validate_title(&req.title)?;
    validate_description(&req.description)?;
    if req.end_date <= req.start_date {
        return Err(AppError::Validation(
            "end_date must be after start_date".into(),
        ));
    }
    Ok(())
}

pub fn validate_update_contest(req: &UpdateContestRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_title(title)?;
    }
    if let Some(ref description) = req.description {
        validate_description(description)?;
    }
    if let (Some(start), Some(end)) = (req.start_date, req.end_date)
        && end <= start
    {
        return Err(AppError::Validation(
            "end_date must be after start_date".into(),
        ));
    }
    Ok(())
}
