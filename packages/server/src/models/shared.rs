use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Pagination metadata included in list responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 20)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 3)]
    pub total_pages: u64,
}

/// `page` / `per_page` query parameters shared by list endpoints.
#[derive(Deserialize, Default, utoipa::IntoParams)]
pub struct PageQuery {
    /// 1-based page number. Default 1.
    pub page: Option<u64>,
    /// Items per page, 1-100. Default 20.
    pub per_page: Option<u64>,
}

impl PageQuery {
    /// Normalized `(page, per_page)`.
    pub fn resolve(&self) -> (u64, u64) {
        (
            Ord::max(self.page.unwrap_or(1), 1),
            self.per_page.unwrap_or(20).clamp(1, 100),
        )
    }
}

/// Validate a trimmed title (1-256 Unicode characters).
pub fn validate_title(title: &str) -> Result<(), AppError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 256 {
        return Err(AppError::Validation(
            "Title must be 1-256 characters".into(),
        ));
    }
    Ok(())
}

/// Validate an optional free-text field against a character limit.
pub fn validate_optional_text(
    value: Option<&str>,
    name: &str,
    max_chars: usize,
) -> Result<(), AppError> {
    if let Some(value) = value
        && value.chars().count() > max_chars
    {
        return Err(AppError::Validation(format!(
            "{name} must be at most {max_chars} characters"
        )));
    }
    Ok(())
}

/// Trim a value and map blank strings to `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
