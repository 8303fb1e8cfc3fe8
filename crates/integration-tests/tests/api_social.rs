use axum::http::{Method, StatusCode};
use integration_tests::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_sync_is_idempotent() {
    let app = TestApp::spawn().await;

    let (token, first) = app.sign_up("ana").await;
    let (status, second) = app.request(Method::POST, "/api/sync", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["id"], second["id"]);
    assert_eq!(first["username"], "ana");
    assert_eq!(app.count("users").await, 1);
}

#[tokio::test]
async fn test_sync_rejects_bad_token() {
    let app = TestApp::spawn().await;

    let (status, body) = app.request(Method::POST, "/api/sync", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn test_sync_with_taken_email_is_unauthorized() {
    let app = TestApp::spawn().await;
    app.sign_up("ana").await;

    let token = TestApp::token_for("ext_new", json!({ "email": "ana@example.com", "username": "newcomer" }));
    let (status, body) = app.request(Method::POST, "/api/sync", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));

    let (status, body) = app.get("/api/notifications", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));
    assert_eq!(app.count("users").await, 1);
}

#[tokio::test]
async fn test_like_toggle_round_trip() {
    let app = TestApp::spawn().await;
    let (ana, _) = app.sign_up("ana").await;
    let (bob, _) = app.sign_up("bob").await;

    let (_, created) = app.post("/api/posts", Some(&ana), json!({ "content": "hello" })).await;
    assert_eq!(created["success"], true);
    let post_id = created["post"]["id"].as_str().unwrap().to_string();

    let (_, liked) = app.request(Method::POST, &format!("/api/posts/{post_id}/like"), Some(&bob), None).await;
    assert_eq!(liked, json!({ "success": true, "liked": true }));
    let (_, unliked) = app.request(Method::POST, &format!("/api/posts/{post_id}/like"), Some(&bob), None).await;
    assert_eq!(unliked, json!({ "success": true, "liked": false }));

    assert_eq!(app.count("likes").await, 0);
    assert_eq!(app.count("notifications").await, 1);

    let (_, inbox) = app.get("/api/notifications", Some(&ana)).await;
    assert_eq!(inbox.as_array().unwrap().len(), 1);
    assert_eq!(inbox[0]["type"], "LIKE");
    assert_eq!(inbox[0]["creator"]["username"], "bob");
}

#[tokio::test]
async fn test_own_like_does_not_notify() {
    let app = TestApp::spawn().await;
    let (ana, _) = app.sign_up("ana").await;

    let (_, created) = app.post("/api/posts", Some(&ana), json!({ "content": "me" })).await;
    let post_id = created["post"]["id"].as_str().unwrap().to_string();

    let (_, liked) = app.request(Method::POST, &format!("/api/posts/{post_id}/like"), Some(&ana), None).await;
    assert_eq!(liked["liked"], true);
    assert_eq!(app.count("notifications").await, 0);
}

#[tokio::test]
async fn test_like_unknown_post_fails_softly() {
    let app = TestApp::spawn().await;
    let (ana, _) = app.sign_up("ana").await;

    let uri = format!("/api/posts/{}/like", uuid::Uuid::now_v7());
    let (status, body) = app.request(Method::POST, &uri, Some(&ana), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": false, "error": "Failed to toggle like" }));
}

#[tokio::test]
async fn test_self_follow_is_rejected() {
    let app = TestApp::spawn().await;
    let (ana, user) = app.sign_up("ana").await;

    let uri = format!("/api/users/{}/follow", user["id"].as_str().unwrap());
    let (status, body) = app.request(Method::POST, &uri, Some(&ana), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": false, "error": "Error toggling follow" }));
    assert_eq!(app.count("follows").await, 0);
    assert_eq!(app.count("notifications").await, 0);
}

#[tokio::test]
async fn test_follow_toggle_notifies_target() {
    let app = TestApp::spawn().await;
    let (ana, _) = app.sign_up("ana").await;
    let (bob, bob_user) = app.sign_up("bob").await;
    let bob_id = bob_user["id"].as_str().unwrap().to_string();

    let (_, body) = app.request(Method::POST, &format!("/api/users/{bob_id}/follow"), Some(&ana), None).await;
    assert_eq!(body, json!({ "success": true, "following": true }));

    let (_, status) = app.get(&format!("/api/users/{bob_id}/following"), Some(&ana)).await;
    assert_eq!(status, json!({ "following": true }));

    let (_, inbox) = app.get("/api/notifications", Some(&bob)).await;
    assert_eq!(inbox[0]["type"], "FOLLOW");
    assert_eq!(inbox[0]["read"], false);

    let (_, body) = app.request(Method::POST, &format!("/api/users/{bob_id}/follow"), Some(&ana), None).await;
    assert_eq!(body, json!({ "success": true, "following": false }));
}

#[tokio::test]
async fn test_comment_notifies_author() {
    let app = TestApp::spawn().await;
    let (ana, _) = app.sign_up("ana").await;
    let (bob, _) = app.sign_up("bob").await;

    let (_, created) = app.post("/api/posts", Some(&ana), json!({ "content": "thoughts?" })).await;
    let post_id = created["post"]["id"].as_str().unwrap().to_string();

    let (_, body) = app.post(&format!("/api/posts/{post_id}/comments"), Some(&bob), json!({ "content": "  nice  " })).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["comment"]["content"], "nice");

    let (_, body) = app.post(&format!("/api/posts/{post_id}/comments"), Some(&bob), json!({ "content": "   " })).await;
    assert_eq!(body, json!({ "success": false, "error": "Failed to create comment" }));

    let (status, body) = app.post(&format!("/api/posts/{post_id}/comments"), Some(&bob), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": false, "error": "Failed to create comment" }));

    let (status, body) = app.request(Method::POST, "/api/notifications/read", Some(&ana), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": false, "error": "Failed to mark notifications as read" }));

    let (_, inbox) = app.get("/api/notifications", Some(&ana)).await;
    assert_eq!(inbox.as_array().unwrap().len(), 1);
    assert_eq!(inbox[0]["type"], "COMMENT");
    assert_eq!(inbox[0]["comment"]["content"], "nice");
    assert_eq!(inbox[0]["post"]["id"], post_id.as_str());

    let (_, feed) = app.get("/api/posts", None).await;
    assert_eq!(feed[0]["_count"], json!({ "likes": 0, "comments": 1 }));
    assert_eq!(feed[0]["comments"][0]["author"]["username"], "bob");
}

#[tokio::test]
async fn test_mark_read_is_scoped_to_recipient() {
    let app = TestApp::spawn().await;
    let (ana, ana_user) = app.sign_up("ana").await;
    let (bob, bob_user) = app.sign_up("bob").await;

    let ana_id = ana_user["id"].as_str().unwrap().to_string();
    let bob_id = bob_user["id"].as_str().unwrap().to_string();
    app.request(Method::POST, &format!("/api/users/{bob_id}/follow"), Some(&ana), None).await;
    app.request(Method::POST, &format!("/api/users/{ana_id}/follow"), Some(&bob), None).await;

    let (_, ana_inbox) = app.get("/api/notifications", Some(&ana)).await;
    let (_, bob_inbox) = app.get("/api/notifications", Some(&bob)).await;
    let ids = json!({ "ids": [ana_inbox[0]["id"], bob_inbox[0]["id"]] });

    let (_, body) = app.post("/api/notifications/read", Some(&bob), ids).await;
    assert_eq!(body, json!({ "success": true, "updated": 1 }));

    let (_, ana_inbox) = app.get("/api/notifications", Some(&ana)).await;
    let (_, bob_inbox) = app.get("/api/notifications", Some(&bob)).await;
    assert_eq!(ana_inbox[0]["read"], false);
    assert_eq!(bob_inbox[0]["read"], true);
}

#[tokio::test]
async fn test_delete_post_rules_and_cascade() {
    let app = TestApp::spawn().await;
    let (ana, _) = app.sign_up("ana").await;
    let (bob, _) = app.sign_up("bob").await;

    let (_, created) = app.post("/api/posts", Some(&ana), json!({ "content": "bye" })).await;
    let post_id = created["post"]["id"].as_str().unwrap().to_string();
    app.request(Method::POST, &format!("/api/posts/{post_id}/like"), Some(&bob), None).await;
    app.post(&format!("/api/posts/{post_id}/comments"), Some(&bob), json!({ "content": "wait" })).await;

    let uri = format!("/api/posts/{post_id}");
    let (_, body) = app.request(Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(body, json!({ "success": false, "error": "Failed to delete post" }));
    assert_eq!(app.count("posts").await, 1);

    let (_, body) = app.request(Method::DELETE, &uri, Some(&ana), None).await;
    assert_eq!(body, json!({ "success": true, "postId": post_id }));
    for table in ["posts", "likes", "comments", "notifications"] {
        assert_eq!(app.count(table).await, 0, "{table} should be empty");
    }
}

#[tokio::test]
async fn test_mutations_require_auth() {
    let app = TestApp::spawn().await;

    let (status, body) = app.post("/api/posts", None, json!({ "content": "anon" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "success": false, "error": "Unauthorized" }));

    let (status, body) = app.get("/api/notifications", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));
    assert_eq!(app.count("posts").await, 0);
}
