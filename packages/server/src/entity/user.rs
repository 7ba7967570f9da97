use arena_common::Role;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub username: String,
    /// Argon2 PHC string.
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,

    #[sea_orm(default_value = 0)]
    pub points_balance: i64,
    /// XP towards the current level.
    #[sea_orm(default_value = 0)]
    pub xp: i32,
    /// Lifetime XP.
    #[sea_orm(default_value = 0)]
    pub total_xp: i32,

    #[sea_orm(has_many)]
    pub entries: HasMany<super::entry::Entity>,

    #[sea_orm(has_many)]
    pub reactions: HasMany<super::reaction::Entity>,

    #[sea_orm(has_many)]
    pub comments: HasMany<super::comment::Entity>,

    #[sea_orm(has_many)]
    pub wins: HasMany<super::contest_winner::Entity>,

    #[sea_orm(has_many)]
    pub xp_transactions: HasMany<super::xp_transaction::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
