use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "xp_transaction")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub amount: i32,
    /// e.g. `contest_placement_1`.
    pub reason: String,
    pub contest_id: Option<i32>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
