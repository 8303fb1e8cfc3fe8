use std::sync::Arc;

use domains::{IdentityProvider, Store};
use services::{NotificationService, PostService, ProfileService, TaskService, UserService};

use crate::metrics::Metrics;

/// Everything a handler can reach. Built once in `main` and cloned per
/// request.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub posts: Arc<PostService>,
    pub profiles: Arc<ProfileService>,
    pub notifications: Arc<NotificationService>,
    pub tasks: Arc<TaskService>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Wires every service to a single store.
    pub fn new<S>(store: Arc<S>, identity: Arc<dyn IdentityProvider>) -> Self
    where
        S: Store + 'static,
    {
        Self {
            users: Arc::new(UserService::new(store.clone(), store.clone(), identity)),
            posts: Arc::new(PostService::new(store.clone(), store.clone())),
            profiles: Arc::new(ProfileService::new(store.clone(), store.clone(), store.clone())),
            notifications: Arc::new(NotificationService::new(store.clone())),
            tasks: Arc::new(TaskService::new(store)),
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Records an action outcome and hands it back.
    pub fn track<T>(&self, action: &str, outcome: services::ActionOutcome<T>) -> services::ActionOutcome<T> {
        self.metrics.record(action, outcome.success);
        outcome
    }
}
