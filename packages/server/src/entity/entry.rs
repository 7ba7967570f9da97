use arena_common::EntryStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One user's artwork submission to one contest. Unique per (user_id, contest_id).
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "entry")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub contest_id: i32,
    #[sea_orm(belongs_to, from = "contest_id", to = "id")]
    pub contest: HasOne<super::contest::Entity>,

    pub title: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub phase1_url: Option<String>,
    pub phase2_url: Option<String>,
    pub phase3_url: Option<String>,
    pub phase4_url: Option<String>,

    /// Number of reactions on this entry. Only changed together with a reaction row.
    #[sea_orm(default_value = 0)]
    pub vote_count: i32,
    #[sea_orm(indexed)]
    pub status: EntryStatus,
    /// Placement, set by finalization for the top three.
    pub final_rank: Option<i32>,

    #[sea_orm(has_many)]
    pub reactions: HasMany<super::reaction::Entity>,

    #[sea_orm(has_many)]
    pub comments: HasMany<super::comment::Entity>,

    pub submitted_at: DateTimeUtc,
    pub last_activity_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
