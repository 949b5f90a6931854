/// HTTP handlers for social-api
///
/// - Auth: registration and login (public)
/// - Posts: create, read, edit and delete, with owner checks on mutation
/// - Comments: attach text to an existing post
/// - Health: banner and readiness probe (public)
pub mod auth;
pub mod comments;
pub mod health;
pub mod posts;

pub use auth::{login, register};
pub use comments::create_comment;
pub use health::{health, index};
pub use posts::{create_post, delete_post, edit_post, get_post, list_post_comments};

use serde::Serialize;

/// Confirmation body returned by mutating endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Self {
        Self { message, id: None }
    }

    pub fn with_id(message: &'static str, id: i64) -> Self {
        Self {
            message,
            id: Some(id),
        }
    }
}
