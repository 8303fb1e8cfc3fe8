//! Shared harness: the real router over a fresh in-memory database, with
//! identity tokens signed by a test key.

use std::sync::Arc;

use api_adapters::{router, AppState};
use auth_adapters::{mint_token, JwtIdentityProvider};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use serde_json::{json, Value};
use storage_adapters::SqliteStore;
use tower::ServiceExt;

pub const SECRET: &[u8] = b"integration-secret";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<SqliteStore>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let store = Arc::new(SqliteStore::in_memory().await.expect("in-memory database"));
        let identity = Arc::new(JwtIdentityProvider::new(SECRET, None, 0));
        let state = AppState::new(store.clone(), identity);
        Self { router: router(state), store }
    }

    /// A provider token for `handle` with an email and username claim.
    pub fn token(handle: &str) -> String {
        let profile = json!({
            "email": format!("{handle}@example.com"),
            "username": handle,
            "first_name": handle,
        });
        Self::token_for(&format!("ext_{handle}"), profile)
    }

    pub fn token_for(external_id: &str, profile: Value) -> String {
        mint_token(SECRET, external_id, profile, Duration::hours(1)).expect("token")
    }

    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self.router.clone().oneshot(builder.body(body).expect("request")).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    /// Syncs `handle` and returns the stored user as JSON.
    pub async fn sign_up(&self, handle: &str) -> (String, Value) {
        let token = Self::token(handle);
        let (status, user) = self.request(Method::POST, "/api/sync", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK, "sync failed for {handle}: {user}");
        (token, user)
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(self.store.pool())
            .await
            .expect("count")
    }
}
