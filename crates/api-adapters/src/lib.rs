//! # api-adapters
//!
//! The HTTP surface of Hearth. Handlers stay thin: each one extracts the
//! actor, calls a single service action and serializes the result.

pub mod metrics;

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod middleware;
#[cfg(feature = "web-axum")]
pub mod state;

#[cfg(feature = "web-axum")]
pub use state::AppState;

#[cfg(feature = "web-axum")]
use axum::{
    routing::{delete, get, post, put},
    Router,
};

/// Builds the full application router, layers included.
///
/// The binary may nest it elsewhere if the API ever moves under a prefix.
#[cfg(feature = "web-axum")]
pub fn router(state: AppState) -> Router {
    use handlers::{notifications, posts, tasks, users};

    let api = Router::new()
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task).delete(tasks::delete_task))
        .route("/sync", post(users::sync_user))
        .route("/me", get(users::me))
        .route("/users/suggested", get(users::suggested_users))
        .route("/users/{id}/follow", post(users::toggle_follow))
        .route("/users/{id}/following", get(users::is_following))
        .route("/users/{id}/posts", get(users::user_posts))
        .route("/users/{id}/likes", get(users::user_likes))
        .route("/profiles/{username}", get(users::profile))
        .route("/profile", put(users::update_profile))
        .route("/posts", get(posts::feed).post(posts::create_post))
        .route("/posts/{id}", delete(posts::delete_post))
        .route("/posts/{id}/like", post(posts::toggle_like))
        .route("/posts/{id}/comments", post(posts::create_comment))
        .route("/notifications", get(notifications::list))
        .route("/notifications/read", post(notifications::mark_read));

    let app = Router::new()
        .nest("/api", api)
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::export_metrics))
        .with_state(state);

    middleware::apply(app)
}
