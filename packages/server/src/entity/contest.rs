use arena_common::ContestStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contest")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String, // in Markdown
    /// Stored status; may lag behind the clock until the next read resolves it.
    #[sea_orm(indexed)]
    pub status: ContestStatus,
    pub start_date: DateTimeUtc,
    pub end_date: DateTimeUtc,

    /// Sum of approved entry votes, fixed at finalization.
    #[sea_orm(default_value = 0)]
    pub prize_pool: i64,
    /// One-way flag, set by finalization.
    #[sea_orm(default_value = false)]
    pub prize_pool_distributed: bool,
    pub finalized_at: Option<DateTimeUtc>,

    /// Admin who created the contest.
    pub created_by: i32,

    #[sea_orm(has_many)]
    pub entries: HasMany<super::entry::Entity>,

    #[sea_orm(has_many)]
    pub winners: HasMany<super::contest_winner::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
