use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{auth, comment, contest, entry, reaction, user};
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/contests", contest_routes())
        .nest("/entries", entry_routes())
        .nest("/comments", comment_routes())
        .nest("/users", user_routes())
        .nest("/admin", admin_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(auth::register))
        .routes(routes!(auth::login))
        .routes(routes!(auth::logout))
        .routes(routes!(auth::me))
}

fn contest_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(contest::list_contests, contest::create_contest))
        .routes(routes!(
            contest::get_contest,
            contest::update_contest,
            contest::delete_contest
        ))
        .routes(routes!(contest::finalize_contest))
        .routes(routes!(contest::list_winners))
        .routes(routes!(contest::list_contest_entries))
}

fn entry_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(entry::submit_entry))
        .routes(routes!(entry::get_entry, entry::delete_entry))
        .routes(routes!(entry::update_entry_status))
        .routes(routes!(
            reaction::list_reactions,
            reaction::react,
            reaction::unreact
        ))
        .routes(routes!(comment::list_comments, comment::create_comment))
}

fn comment_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(comment::delete_comment))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(user::get_profile))
}

fn admin_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest(
        "/users",
        OpenApiRouter::new().routes(routes!(user::update_role)),
    )
}
