use arena_common::EntryStatus;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde_json::json;

use arena_server::entity::{contest_winner, entry, xp_transaction};

use crate::common::{Session, TestApp, routes};

/// Contest with one approved entry per vote total, in submission order.
async fn contest_with_votes(app: &TestApp, admin: &Session, votes: &[i32]) -> (i32, Vec<(Session, i32)>) {
    let contest_id = app.create_running_contest(&admin.token).await;
    let mut entrants = Vec::new();
    for (i, &v) in votes.iter().enumerate() {
        let artist = app.create_user(&format!("artist{i}")).await;
        let entry_id = app.submit_entry(contest_id, &artist.token).await;
        app.set_entry_status(entry_id, EntryStatus::Approved, &admin.token)
            .await;
        app.set_vote_count(entry_id, v).await;
        entrants.push((artist, entry_id));
    }
    (contest_id, entrants)
}

#[tokio::test]
async fn pays_placements_admin_share_and_xp() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let (contest_id, entrants) = contest_with_votes(&app, &admin, &[10, 7, 3]).await;

    let res = app
        .post_with_token(&routes::finalize(contest_id), &json!({}), &admin.token)
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["prize_pool"], 20);
    assert_eq!(res.body["admin_share"], 4);
    assert_eq!(res.body["undistributed"], 0);
    let winners = res.body["winners"].as_array().unwrap();
    assert_eq!(winners.len(), 3);
    let prizes: Vec<i64> = winners.iter().map(|w| w["prize_amount"].as_i64().unwrap()).collect();
    assert_eq!(prizes, vec![10, 4, 2]);
    assert_eq!(winners[0]["username"], "artist0");

    for ((artist, entry_id), (prize, xp)) in entrants.iter().zip([(10, 200), (4, 150), (2, 100)]) {
        let row = app.user_row(artist.id).await;
        assert_eq!(row.points_balance, prize);
        assert_eq!(row.xp, xp);
        assert_eq!(row.total_xp, xp);

        let entry = entry::Entity::find_by_id(*entry_id).one(&app.db).await.unwrap().unwrap();
        assert!(entry.final_rank.is_some());
    }
    assert_eq!(app.user_row(admin.id).await.points_balance, 4);

    let reasons: Vec<String> = xp_transaction::Entity::find()
        .order_by_asc(xp_transaction::Column::Id)
        .all(&app.db)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.reason)
        .collect();
    assert_eq!(
        reasons,
        vec!["contest_placement_1", "contest_placement_2", "contest_placement_3"]
    );

    let contest = app.stored_contest(contest_id).await;
    assert!(contest.prize_pool_distributed);
    assert!(contest.finalized_at.is_some());
    assert_eq!(contest.prize_pool, 20);

    let listed = app.get_without_token(&routes::winners(contest_id)).await;
    assert_eq!(listed.status, 200);
    assert_eq!(listed.body[2]["placement"], 3);
    assert_eq!(listed.body[2]["votes_received"], 3);

    let shown = app.get_without_token(&routes::contest(contest_id)).await;
    assert_eq!(shown.body["status"], "ended");
}

#[tokio::test]
async fn second_finalize_conflicts_and_changes_nothing() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let (contest_id, entrants) = contest_with_votes(&app, &admin, &[10, 7, 3]).await;

    let first = app
        .post_with_token(&routes::finalize(contest_id), &json!({}), &admin.token)
        .await;
    assert_eq!(first.status, 200, "{}", first.text);

    let second = app
        .post_with_token(&routes::finalize(contest_id), &json!({}), &admin.token)
        .await;
    assert_eq!(second.status, 400);
    assert_eq!(second.body["code"], "CONFLICT");

    let winners = contest_winner::Entity::find()
        .filter(contest_winner::Column::ContestId.eq(contest_id))
        .count(&app.db)
        .await
        .unwrap();
    assert_eq!(winners, 3);
    assert_eq!(app.user_row(entrants[0].0.id).await.points_balance, 10);
    assert_eq!(app.user_row(admin.id).await.points_balance, 4);
}

#[tokio::test]
async fn concurrent_finalizations_pay_out_once() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let (contest_id, entrants) = contest_with_votes(&app, &admin, &[10, 7, 3]).await;

    let path = routes::finalize(contest_id);
    let body = json!({});
    let (a, b) = tokio::join!(
        app.post_with_token(&path, &body, &admin.token),
        app.post_with_token(&path, &body, &admin.token),
    );

    let mut statuses = [a.status, b.status];
    statuses.sort();
    assert_eq!(statuses, [200, 400]);
    assert_eq!(app.user_row(entrants[0].0.id).await.points_balance, 10);
    assert_eq!(app.user_row(admin.id).await.points_balance, 4);
}

#[tokio::test]
async fn no_approved_entries_is_rejected_without_side_effects() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let alice = app.create_user("alice").await;
    let contest_id = app.create_running_contest(&admin.token).await;
    let entry_id = app.submit_entry(contest_id, &alice.token).await;
    app.set_vote_count(entry_id, 9).await;

    let res = app
        .post_with_token(&routes::finalize(contest_id), &json!({}), &admin.token)
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
    assert_eq!(app.user_row(alice.id).await.points_balance, 0);
    assert_eq!(app.user_row(admin.id).await.points_balance, 0);
    assert!(!app.stored_contest(contest_id).await.prize_pool_distributed);
}

#[tokio::test]
async fn two_entries_leave_third_share_undistributed() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let (contest_id, _) = contest_with_votes(&app, &admin, &[6, 4]).await;

    let res = app
        .post_with_token(&routes::finalize(contest_id), &json!({}), &admin.token)
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["prize_pool"], 10);
    assert_eq!(res.body["winners"].as_array().unwrap().len(), 2);
    assert_eq!(res.body["winners"][0]["prize_amount"], 5);
    assert_eq!(res.body["winners"][1]["prize_amount"], 2);
    assert_eq!(res.body["admin_share"], 2);
    assert_eq!(res.body["undistributed"], 1);
}

#[tokio::test]
async fn ties_go_to_the_earlier_entry() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let (contest_id, entrants) = contest_with_votes(&app, &admin, &[5, 5]).await;

    let res = app
        .post_with_token(&routes::finalize(contest_id), &json!({}), &admin.token)
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["winners"][0]["entry_id"], entrants[0].1);
    assert_eq!(res.body["winners"][1]["entry_id"], entrants[1].1);
}

#[tokio::test]
async fn only_approved_entries_count_toward_the_pool() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let (contest_id, _) = contest_with_votes(&app, &admin, &[10]).await;
    let late = app.create_user("late").await;
    let pending = app.submit_entry(contest_id, &late.token).await;
    app.set_vote_count(pending, 50).await;

    let res = app
        .post_with_token(&routes::finalize(contest_id), &json!({}), &admin.token)
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["prize_pool"], 10);
    assert_eq!(app.user_row(late.id).await.points_balance, 0);
}

#[tokio::test]
async fn finalized_contest_is_frozen() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let (contest_id, entrants) = contest_with_votes(&app, &admin, &[3]).await;
    app.post_with_token(&routes::finalize(contest_id), &json!({}), &admin.token)
        .await;

    let reopen = app
        .patch_with_token(&routes::contest(contest_id), &json!({"status": "active"}), &admin.token)
        .await;
    assert_eq!(reopen.status, 400);
    assert_eq!(reopen.body["code"], "CONFLICT");

    let resubmit = app
        .post_with_token(
            routes::ENTRIES,
            &json!({"contest_id": contest_id, "phase1_url": "https://cdn.example.com/a.png"}),
            &entrants[0].0.token,
        )
        .await;
    assert_eq!(resubmit.status, 400);

    let delete = app
        .delete_with_token(&routes::entry(entrants[0].1), &admin.token)
        .await;
    assert_eq!(delete.status, 400);
    assert_eq!(delete.body["code"], "CONFLICT");
}

#[tokio::test]
async fn votes_are_frozen_after_finalization() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let fan = app.create_user("fan").await;
    let (contest_id, entrants) = contest_with_votes(&app, &admin, &[4]).await;
    let entry_id = entrants[0].1;
    app.post_with_token(&routes::finalize(contest_id), &json!({}), &admin.token)
        .await;

    let react = app
        .post_with_token(&routes::reactions(entry_id), &json!({"reaction_type": "like"}), &fan.token)
        .await;
    assert_eq!(react.status, 400, "{}", react.text);
    assert_eq!(react.body["code"], "CONFLICT");

    let unreact = app.delete_with_token(&routes::reactions(entry_id), &fan.token).await;
    assert_eq!(unreact.status, 400);
    assert_eq!(unreact.body["code"], "CONFLICT");

    let entry = entry::Entity::find_by_id(entry_id).one(&app.db).await.unwrap().unwrap();
    assert_eq!(entry.vote_count, 4);
    let winner = contest_winner::Entity::find()
        .filter(contest_winner::Column::EntryId.eq(entry_id))
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(winner.votes_received, entry.vote_count);
}

#[tokio::test]
async fn only_admins_finalize() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let alice = app.create_user("alice").await;
    let (contest_id, _) = contest_with_votes(&app, &admin, &[1]).await;

    let res = app
        .post_with_token(&routes::finalize(contest_id), &json!({}), &alice.token)
        .await;

    assert_eq!(res.status, 403);
    assert_eq!(res.body["code"], "PERMISSION_DENIED");
}

#[tokio::test]
async fn finalizing_missing_contest_is_404() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;

    let res = app
        .post_with_token(&routes::finalize(31337), &json!({}), &admin.token)
        .await;

    assert_eq!(res.status, 404);
}
