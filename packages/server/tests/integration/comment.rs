use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn comments_are_listed_oldest_first_with_authors() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let contest_id = app.create_running_contest(&admin.token).await;
    let entry_id = app.submit_entry(contest_id, &alice.token).await;

    let first = app
        .post_with_token(&routes::comments(entry_id), &json!({"content": " Lovely palette "}), &bob.token)
        .await;
    assert_eq!(first.status, 201, "{}", first.text);
    assert_eq!(first.body["content"], "Lovely palette");
    assert_eq!(first.body["username"], "bob");
    app.post_with_token(&routes::comments(entry_id), &json!({"content": "Thanks!"}), &alice.token)
        .await;

    let res = app.get_without_token(&routes::comments(entry_id)).await;

    assert_eq!(res.status, 200);
    let items = res.body.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["username"], "bob");
    assert_eq!(items[1]["username"], "alice");
}

#[tokio::test]
async fn empty_comment_is_rejected() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let alice = app.create_user("alice").await;
    let contest_id = app.create_running_contest(&admin.token).await;
    let entry_id = app.submit_entry(contest_id, &alice.token).await;

    let res = app
        .post_with_token(&routes::comments(entry_id), &json!({"content": "   "}), &alice.token)
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn only_author_or_admin_deletes_a_comment() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin").await;
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let contest_id = app.create_running_contest(&admin.token).await;
    let entry_id = app.submit_entry(contest_id, &alice.token).await;
    let mine = app
        .post_with_token(&routes::comments(entry_id), &json!({"content": "first"}), &bob.token)
        .await
        .id();
    let other = app
        .post_with_token(&routes::comments(entry_id), &json!({"content": "second"}), &bob.token)
        .await
        .id();

    let denied = app.delete_with_token(&routes::comment(mine), &alice.token).await;
    assert_eq!(denied.status, 403);

    assert_eq!(app.delete_with_token(&routes::comment(mine), &bob.token).await.status, 204);
    assert_eq!(app.delete_with_token(&routes::comment(other), &admin.token).await.status, 204);
    assert_eq!(app.delete_with_token(&routes::comment(other), &admin.token).await.status, 404);

    let res = app.get_without_token(&routes::comments(entry_id)).await;
    assert!(res.body.as_array().unwrap().is_empty());
}
