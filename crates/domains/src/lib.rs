//! # domains
//!
//! Users, posts, likes, follows, comments, notifications and tasks, plus
//! the repository and identity ports the services talk to. Nothing here
//! knows about HTTP or SQL.

pub mod error;
pub mod identity;
pub mod models;
pub mod ports;

pub use error::*;
pub use identity::*;
pub use models::*;
pub use ports::*;
