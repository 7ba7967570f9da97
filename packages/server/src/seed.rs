use arena_common::Role;
use sea_orm::sea_query::{Index, IndexCreateStatement, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::config::BootstrapAdmin;
use crate::entity::{contest_winner, entry, reaction, user};
use crate::utils::hash;

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync only knows single-column uniqueness, so the composite
/// keys that back one-entry-per-user, one-reaction-per-user and
/// one-winner-per-placement are created here on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let indexes: [(&str, IndexCreateStatement); 3] = [
        (
            "uq_entry_user_contest",
            Index::create()
                .if_not_exists()
                .unique()
                .name("uq_entry_user_contest")
                .table(entry::Entity)
                .col(entry::Column::UserId)
                .col(entry::Column::ContestId)
                .to_owned(),
        ),
        (
            "uq_reaction_user_entry",
            Index::create()
                .if_not_exists()
                .unique()
                .name("uq_reaction_user_entry")
                .table(reaction::Entity)
                .col(reaction::Column::UserId)
                .col(reaction::Column::EntryId)
                .to_owned(),
        ),
        (
            "uq_contest_winner_placement",
            Index::create()
                .if_not_exists()
                .unique()
                .name("uq_contest_winner_placement")
                .table(contest_winner::Entity)
                .col(contest_winner::Column::ContestId)
                .col(contest_winner::Column::Placement)
                .to_owned(),
        ),
    ];

    for (name, stmt) in indexes {
        db.execute_unprepared(&stmt.to_string(PostgresQueryBuilder))
            .await?;
        info!("Ensured index {} exists", name);
    }

    Ok(())
}

/// Create the configured admin account if its email is not registered yet.
pub async fn seed_bootstrap_admin(
    db: &DatabaseConnection,
    admin: &BootstrapAdmin,
) -> Result<(), DbErr> {
    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(admin.email.trim().to_lowercase()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let password = hash::hash_password(&admin.password)
        .map_err(|e| DbErr::Custom(format!("Password hash error: {e}")))?;

    user::ActiveModel {
        email: Set(admin.email.trim().to_lowercase()),
        username: Set(admin.username.trim().to_string()),
        password: Set(password),
        role: Set(Role::Admin),
        points_balance: Set(0),
        xp: Set(0),
        total_xp: Set(0),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Seeded bootstrap admin {}", admin.username);
    Ok(())
}
