use std::future::Future;
use std::pin::Pin;

use futures::future::join_all;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

use arena_server::entity::{entry, reaction};

use crate::common::{TestApp, TestResponse, routes};

async fn stored_votes(app: &TestApp, entry_id: i32) -> (i32, u64) {
    let vote_count = entry::Entity::find_by_id(entry_id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap()
        .vote_count;
    let reactions = reaction::Entity::find()
        .filter(reaction::Column::EntryId.eq(entry_id))
        .count(&app.db)
        .await
        .unwrap();
    (vote_count, reactions)
}

#[tokio::test]
async fn first_reaction_increments_and_repeat_only_changes_type() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let contest_id = app.create_running_contest(&admin.token).await;
    let entry_id = app.submit_entry(contest_id, &alice.token).await;

    let first = app
        .post_with_token(&routes::reactions(entry_id), &json!({"reaction_type": "like"}), &bob.token)
        .await;
    assert_eq!(first.status, 201, "{}", first.text);
    assert_eq!(first.body["vote_count"], 1);
    assert_eq!(first.body["reaction_type"], "like");

    let second = app
        .post_with_token(&routes::reactions(entry_id), &json!({"reaction_type": "fire"}), &bob.token)
        .await;
    assert_eq!(second.status, 200, "{}", second.text);
    assert_eq!(second.body["vote_count"], 1);
    assert_eq!(second.body["reaction_type"], "fire");

    assert_eq!(stored_votes(&app, entry_id).await, (1, 1));

    let listed = app.get_without_token(&routes::reactions(entry_id)).await;
    assert_eq!(listed.status, 200);
    assert_eq!(listed.body.as_array().unwrap().len(), 1);
    assert_eq!(listed.body[0]["reaction_type"], "fire");
}

#[tokio::test]
async fn removing_a_reaction_decrements() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let contest_id = app.create_running_contest(&admin.token).await;
    let entry_id = app.submit_entry(contest_id, &alice.token).await;
    app.post_with_token(&routes::reactions(entry_id), &json!({"reaction_type": "like"}), &bob.token)
        .await;
    app.post_with_token(&routes::reactions(entry_id), &json!({"reaction_type": "like"}), &alice.token)
        .await;

    let res = app.delete_with_token(&routes::reactions(entry_id), &bob.token).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["vote_count"], 1);
    assert!(res.body["reaction_type"].is_null());
    assert_eq!(stored_votes(&app, entry_id).await, (1, 1));
}

#[tokio::test]
async fn removing_a_missing_reaction_is_404_and_leaves_count() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let contest_id = app.create_running_contest(&admin.token).await;
    let entry_id = app.submit_entry(contest_id, &alice.token).await;
    app.post_with_token(&routes::reactions(entry_id), &json!({"reaction_type": "like"}), &alice.token)
        .await;

    let res = app.delete_with_token(&routes::reactions(entry_id), &bob.token).await;

    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
    assert_eq!(stored_votes(&app, entry_id).await, (1, 1));
}

#[tokio::test]
async fn vote_count_matches_reactions_under_concurrent_toggles() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let alice = app.create_user("alice").await;
    let contest_id = app.create_running_contest(&admin.token).await;
    let entry_id = app.submit_entry(contest_id, &alice.token).await;

    let mut voters = Vec::new();
    for i in 0..6 {
        voters.push(app.create_user(&format!("voter{i}")).await);
    }

    let path = routes::reactions(entry_id);
    let body = json!({"reaction_type": "like"});
    let mut requests: Vec<Pin<Box<dyn Future<Output = TestResponse> + '_>>> = Vec::new();
    for (i, voter) in voters.iter().enumerate() {
        requests.push(Box::pin(app.post_with_token(&path, &body, &voter.token)));
        if i % 2 == 0 {
            requests.push(Box::pin(app.delete_with_token(&path, &voter.token)));
        } else {
            requests.push(Box::pin(app.post_with_token(&path, &body, &voter.token)));
        }
    }
    join_all(requests).await;

    let (vote_count, reactions) = stored_votes(&app, entry_id).await;
    assert_eq!(vote_count as u64, reactions);
}

#[tokio::test]
async fn reaction_type_is_validated() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let alice = app.create_user("alice").await;
    let contest_id = app.create_running_contest(&admin.token).await;
    let entry_id = app.submit_entry(contest_id, &alice.token).await;

    let res = app
        .post_with_token(
            &routes::reactions(entry_id),
            &json!({"reaction_type": "x".repeat(33)}),
            &alice.token,
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn reacting_to_missing_entry_is_404() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;

    let res = app
        .post_with_token(&routes::reactions(777), &json!({"reaction_type": "like"}), &alice.token)
        .await;

    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn reacting_requires_a_session() {
    let app = TestApp::spawn().await;

    let res = app.delete_without_token(&routes::reactions(1)).await;

    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "TOKEN_MISSING");
}
