use arena_common::EntryStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::validate_optional_text;
use crate::error::AppError;

pub const MAX_ENTRY_TITLE_CHARS: usize = 256;
pub const MAX_ENTRY_DESCRIPTION_CHARS: usize = 10_000;

/// Create-or-update the caller's entry in a contest.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SubmitEntryRequest {
    pub contest_id: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Sketch.
    #[schema(example = "https://cdn.example.com/sketch.png")]
    pub phase1_url: Option<String>,
    /// Line art.
    pub phase2_url: Option<String>,
    /// Color.
    pub phase3_url: Option<String>,
    /// Final.
    pub phase4_url: Option<String>,
}

impl SubmitEntryRequest {
    /// `(field, url)` pairs for every phase, blank or not.
    pub fn phase_urls(&self) -> [(&'static str, &str); 4] {
        [
            ("phase1_url", self.phase1_url.as_deref().unwrap_or_default()),
            ("phase2_url", self.phase2_url.as_deref().unwrap_or_default()),
            ("phase3_url", self.phase3_url.as_deref().unwrap_or_default()),
            ("phase4_url", self.phase4_url.as_deref().unwrap_or_default()),
        ]
    }
}

pub fn validate_submit_entry(req: &SubmitEntryRequest) -> Result<(), AppError> {
    validate_optional_text(req.title.as_deref(), "Title", MAX_ENTRY_TITLE_CHARS)?;
    validate_optional_text(
        req.description.as_deref(),
        "Description",
        MAX_ENTRY_DESCRIPTION_CHARS,
    )?;
    if req.phase_urls().iter().all(|(_, url)| url.trim().is_empty()) {
        return Err(AppError::Validation(
            "At least one phase URL is required".into(),
        ));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateEntryStatusRequest {
    pub status: EntryStatus,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct EntryListQuery {
    /// Only entries with this moderation status.
    pub status: Option<EntryStatus>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct EntryResponse {
    pub id: i32,
    pub user_id: i32,
    pub contest_id: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub phase1_url: Option<String>,
    pub phase2_url: Option<String>,
    pub phase3_url: Option<String>,
    pub phase4_url: Option<String>,
    pub vote_count: i32,
    pub status: EntryStatus,
    pub final_rank: Option<i32>,
    pub submitted_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Entry with its author's username, for contest galleries.
#[derive(Serialize, utoipa::ToSchema)]
pub struct EntryListItem {
    #[serde(flatten)]
    pub entry: EntryResponse,
    pub username: String,
}

impl From<crate::entity::entry::Model> for EntryResponse {
    fn from(m: crate::entity::entry::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            contest_id: m.contest_id,
            title: m.title,
            description: m.description,
            phase1_url: m.phase1_url,
            phase2_url: m.phase2_url,
            phase3_url: m.phase3_url,
            phase4_url: m.phase4_url,
            vote_count: m.vote_count,
            status: m.status,
            final_rank: m.final_rank,
            submitted_at: m.submitted_at,
            last_activity_at: m.last_activity_at,
            created_at: m.created_at,
        }
    }
}
