use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCommentRequest {
    #[schema(example = "Love the color palette!")]
    pub content: String,
}

pub fn validate_create_comment(req: &CreateCommentRequest) -> Result<(), AppError> {
    let content = req.content.trim();
    if content.is_empty() || content.chars().count() > 2000 {
        return Err(AppError::Validation(
            "Comment must be 1-2000 characters".into(),
        ));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CommentResponse {
    pub id: i32,
    pub entry_id: i32,
    pub user_id: i32,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
