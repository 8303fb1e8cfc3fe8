//! # services
//!
//! Application actions. Each service owns the ports it needs and turns a
//! request from an actor into one or more store calls.

pub mod notifications;
pub mod outcome;
pub mod posts;
pub mod profiles;
pub mod tasks;
pub mod users;

pub use notifications::NotificationService;
pub use outcome::*;
pub use posts::PostService;
pub use profiles::ProfileService;
pub use tasks::TaskService;
pub use users::UserService;

use domains::{DomainError, Result};

pub const MAX_CONTENT_LENGTH: usize = 5000;
pub const MAX_BIO_LENGTH: usize = 500;
pub const MAX_PROFILE_FIELD_LENGTH: usize = 100;
pub const MAX_WEBSITE_LENGTH: usize = 2048;
pub const SUGGESTED_USERS_LIMIT: i64 = 3;

/// Trims `raw`; blank input becomes `None`. Length is counted in chars.
pub(crate) fn normalize_text(raw: Option<&str>, max: usize, field: &str) -> Result<Option<String>> {
    let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    if text.chars().count() > max {
        return Err(DomainError::validation(format!("{field} must be at most {max} characters")));
    }
    Ok(Some(text.to_string()))
}
