use arena_common::{ContestStatus, VotingPolicy};
use chrono::{Duration, Utc};
use serde_json::json;

use crate::common::{TestApp, routes};

mod crud {
    use super::*;

    #[tokio::test]
    async fn admin_creates_contest_defaulting_to_draft() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let now = Utc::now();

        let res = app
            .post_with_token(
                routes::CONTESTS,
                &json!({
                    "title": "  Winter Portraits ",
                    "description": "Faces in the cold.",
                    "start_date": now + Duration::days(3),
                    "end_date": now + Duration::days(10),
                }),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["title"], "Winter Portraits");
        assert_eq!(res.body["status"], "draft");
        assert_eq!(res.body["prize_pool"], 0);
        assert_eq!(res.body["prize_pool_distributed"], false);
        assert_eq!(res.body["created_by"], admin.id);
    }

    #[tokio::test]
    async fn end_date_must_follow_start_date() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let now = Utc::now();

        let res = app
            .post_with_token(
                routes::CONTESTS,
                &json!({
                    "title": "Backwards",
                    "description": "x",
                    "start_date": now + Duration::days(3),
                    "end_date": now + Duration::days(1),
                }),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn get_missing_contest_returns_404() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(&routes::contest(9999)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn admin_can_override_status_and_rename() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let id = app.create_running_contest(&admin.token).await;

        let res = app
            .patch_with_token(
                &routes::contest(id),
                &json!({"title": "Renamed", "status": "voting"}),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["title"], "Renamed");
        assert_eq!(res.body["status"], "voting");
    }

    #[tokio::test]
    async fn update_rejects_end_before_existing_start() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let id = app.create_running_contest(&admin.token).await;

        let res = app
            .patch_with_token(
                &routes::contest(id),
                &json!({"end_date": Utc::now() - Duration::days(30)}),
                &admin.token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn list_is_paginated_and_filtered_by_resolved_status() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let now = Utc::now();

        app.create_running_contest(&admin.token).await;
        app.create_running_contest(&admin.token).await;
        app.create_contest(&admin.token, now + Duration::days(5), now + Duration::days(9))
            .await;

        let res = app
            .get_without_token(&format!("{}?status=active&per_page=1", routes::CONTESTS))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"].as_array().unwrap().len(), 1);
        assert_eq!(res.body["data"][0]["status"], "active");
        assert_eq!(res.body["pagination"]["total"], 2);
        assert_eq!(res.body["pagination"]["total_pages"], 2);

        let drafts = app
            .get_without_token(&format!("{}?status=draft", routes::CONTESTS))
            .await;
        assert_eq!(drafts.body["pagination"]["total"], 1);
    }

    #[tokio::test]
    async fn delete_removes_contest_with_its_entries() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let alice = app.create_user("alice").await;
        let id = app.create_running_contest(&admin.token).await;
        let entry_id = app.submit_entry(id, &alice.token).await;
        app.post_with_token(&routes::reactions(entry_id), &json!({"reaction_type": "like"}), &admin.token)
            .await;

        let res = app.delete_with_token(&routes::contest(id), &admin.token).await;
        assert_eq!(res.status, 204, "{}", res.text);

        assert_eq!(app.get_without_token(&routes::contest(id)).await.status, 404);
        assert_eq!(app.get_without_token(&routes::entry(entry_id)).await.status, 404);
    }
}

mod status_resolution {
    use super::*;

    #[tokio::test]
    async fn draft_inside_its_window_reads_as_active_and_is_persisted() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let now = Utc::now();
        let id = app
            .create_contest(&admin.token, now + Duration::days(1), now + Duration::days(2))
            .await;
        assert_eq!(app.stored_contest(id).await.status, ContestStatus::Draft);

        app.set_schedule(id, now - Duration::hours(1), now + Duration::days(2))
            .await;

        let res = app.get_without_token(&routes::contest(id)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "active");
        assert_eq!(app.stored_contest(id).await.status, ContestStatus::Active);
    }

    #[tokio::test]
    async fn past_end_date_reads_as_ended() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let id = app.create_running_contest(&admin.token).await;
        let now = Utc::now();

        app.set_schedule(id, now - Duration::days(10), now - Duration::days(1))
            .await;

        let res = app.get_without_token(&routes::contest(id)).await;
        assert_eq!(res.body["status"], "ended");
    }

    #[tokio::test]
    async fn ended_never_reverts() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let id = app.create_running_contest(&admin.token).await;
        app.set_stored_status(id, ContestStatus::Ended).await;

        let res = app.get_without_token(&routes::contest(id)).await;
        assert_eq!(res.body["status"], "ended");
    }

    #[tokio::test]
    async fn voting_past_end_is_ended_under_auto_policy() {
        let app = TestApp::spawn_with_policy(VotingPolicy::Auto).await;
        let admin = app.create_admin("admin").await;
        let id = app.create_running_contest(&admin.token).await;
        let now = Utc::now();
        app.set_stored_status(id, ContestStatus::Voting).await;
        app.set_schedule(id, now - Duration::days(10), now - Duration::days(1))
            .await;

        let res = app.get_without_token(&routes::contest(id)).await;
        assert_eq!(res.body["status"], "ended");
    }

    #[tokio::test]
    async fn voting_past_end_survives_under_sticky_policy() {
        let app = TestApp::spawn_with_policy(VotingPolicy::Sticky).await;
        let admin = app.create_admin("admin").await;
        let id = app.create_running_contest(&admin.token).await;
        let now = Utc::now();
        app.set_stored_status(id, ContestStatus::Voting).await;
        app.set_schedule(id, now - Duration::days(10), now - Duration::days(1))
            .await;

        let res = app.get_without_token(&routes::contest(id)).await;
        assert_eq!(res.body["status"], "voting");

        let listed = app
            .get_without_token(&format!("{}?status=voting", routes::CONTESTS))
            .await;
        assert_eq!(listed.body["pagination"]["total"], 1);
    }
}
