//! Router tests against mocked ports.

use std::sync::Arc;

use api_adapters::metrics::Metrics;
use api_adapters::{router, AppState};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use chrono::Utc;
use domains::{
    DomainError, ExternalIdentity, MockIdentityProvider, MockNotificationRepo, MockPostRepo, MockSocialRepo,
    MockTaskRepo, MockUserRepo, Post, Task, ToggleOutcome, User,
};
use serde_json::{json, Value};
use services::{NotificationService, PostService, ProfileService, TaskService, UserService};
use tower::ServiceExt;
use uuid::Uuid;

#[derive(Default)]
struct Ports {
    users: MockUserRepo,
    posts: MockPostRepo,
    social: MockSocialRepo,
    notifications: MockNotificationRepo,
    tasks: MockTaskRepo,
    identity: MockIdentityProvider,
}

impl Ports {
    fn into_state(self) -> AppState {
        let users = Arc::new(self.users);
        let posts = Arc::new(self.posts);
        let social = Arc::new(self.social);
        AppState {
            users: Arc::new(UserService::new(users.clone(), social.clone(), Arc::new(self.identity))),
            posts: Arc::new(PostService::new(posts.clone(), social.clone())),
            profiles: Arc::new(ProfileService::new(users, posts, social)),
            notifications: Arc::new(NotificationService::new(Arc::new(self.notifications))),
            tasks: Arc::new(TaskService::new(Arc::new(self.tasks))),
            metrics: Arc::new(Metrics::new()),
        }
    }
}

fn user(external_id: &str) -> User {
    User {
        id: Uuid::now_v7(),
        external_id: external_id.into(),
        username: external_id.into(),
        email: format!("{external_id}@example.com"),
        name: None,
        bio: None,
        image: None,
        location: None,
        website: None,
        created_at: Utc::now(),
    }
}

/// Makes `Bearer token` resolve to an already synced `external_id`.
fn signed_in(ports: &mut Ports, external_id: &'static str) -> User {
    let stored = user(external_id);
    let found = stored.clone();
    ports.identity.expect_verify().returning(move |_| {
        Ok(ExternalIdentity { external_id: external_id.into(), claims: json!({ "email": "someone@example.com" }) })
    });
    ports
        .users
        .expect_find_user_by_external_id()
        .withf(move |id: &str| id == external_id)
        .returning(move |_| Ok(Some(found.clone())));
    stored
}

async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_list_tasks() {
    let mut ports = Ports::default();
    ports
        .tasks
        .expect_list_tasks()
        .returning(|| Ok(vec![Task { id: 1, title: "Set up the project".into(), completed: true }]));

    let request = Request::get("/api/tasks").body(Body::empty()).unwrap();
    let (status, body) = send(ports.into_state(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "id": 1, "title": "Set up the project", "completed": true }]));
}

#[tokio::test]
async fn test_mutation_without_token_is_unauthorized_action() {
    let request = Request::post("/api/posts")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"content":"hi"}"#))
        .unwrap();
    let (status, body) = send(Ports::default().into_state(), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "success": false, "error": "Unauthorized" }));
}

#[tokio::test]
async fn test_read_with_rejected_token_is_unauthorized() {
    let mut ports = Ports::default();
    ports.identity.expect_verify().returning(|_| Err(DomainError::NotAuthenticated));

    let request = Request::get("/api/notifications")
        .header(header::AUTHORIZATION, "Bearer expired")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(ports.into_state(), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn test_toggle_like_for_synced_user() {
    let mut ports = Ports::default();
    let actor = signed_in(&mut ports, "ext_bob");
    let author = Uuid::now_v7();
    let post_id = Uuid::now_v7();

    ports.posts.expect_find_post().returning(move |id| {
        Ok(Some(Post { id, author_id: author, content: Some("hello".into()), image: None, created_at: Utc::now() }))
    });
    ports
        .social
        .expect_toggle_like()
        .withf(move |user_id, id, notify| *user_id == actor.id && *id == post_id && notify.is_some())
        .returning(|_, _, _| Ok(ToggleOutcome::Created));

    let request = Request::post(format!("/api/posts/{post_id}/like"))
        .header(header::AUTHORIZATION, "Bearer token")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(ports.into_state(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "liked": true }));
}

async fn send_unreadable(method: Method, uri: String, content_type: Option<&str>, body: &'static str) -> (StatusCode, Value, String) {
    let mut ports = Ports::default();
    signed_in(&mut ports, "ext_ana");
    let state = ports.into_state();

    let mut builder = Request::builder().method(method).uri(uri).header(header::AUTHORIZATION, "Bearer token");
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    let (status, body) = send(state.clone(), builder.body(Body::from(body)).unwrap()).await;
    (status, body, state.metrics.render().unwrap())
}

#[tokio::test]
async fn test_create_post_with_malformed_json_is_failed_action() {
    let (status, body, metrics) =
        send_unreadable(Method::POST, "/api/posts".into(), Some("application/json"), "{not json").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": false, "error": "Failed to create post" }));
    assert!(metrics.contains(r#"action="create_post",outcome="failure""#));
}

#[tokio::test]
async fn test_comment_without_content_is_failed_action() {
    let uri = format!("/api/posts/{}/comments", Uuid::now_v7());
    let (status, body, metrics) = send_unreadable(Method::POST, uri, Some("application/json"), "{}").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": false, "error": "Failed to create comment" }));
    assert!(metrics.contains(r#"action="create_comment",outcome="failure""#));
}

#[tokio::test]
async fn test_mark_read_without_body_is_failed_action() {
    let (status, body, metrics) = send_unreadable(Method::POST, "/api/notifications/read".into(), None, "").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": false, "error": "Failed to mark notifications as read" }));
    assert!(metrics.contains(r#"action="mark_notifications_as_read",outcome="failure""#));
}

#[tokio::test]
async fn test_update_profile_with_wrong_types_is_failed_action() {
    let (status, body, metrics) =
        send_unreadable(Method::PUT, "/api/profile".into(), Some("application/json"), r#"{"bio": 5}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": false, "error": "Failed to update profile" }));
    assert!(metrics.contains(r#"action="update_profile",outcome="failure""#));
}

#[tokio::test]
async fn test_health_and_metrics() {
    let state = Ports::default().into_state();
    state.metrics.record("toggle_like", true);

    let response = router(state.clone()).oneshot(Request::get("/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let response = router(state).oneshot(Request::get("/metrics").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = String::from_utf8(to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()).unwrap();
    assert!(text.contains("hearth_actions_total"));
}
