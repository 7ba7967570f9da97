use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only record of a placement, written once by finalization.
/// Unique per (contest_id, placement).
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contest_winner")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub contest_id: i32,
    #[sea_orm(belongs_to, from = "contest_id", to = "id")]
    pub contest: HasOne<super::contest::Entity>,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    /// Winning entry. Not a foreign key: winners outlive entry moderation.
    pub entry_id: i32,

    /// 1, 2 or 3.
    pub placement: i32,
    pub votes_received: i32,
    pub prize_amount: i64,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
