/// Data models for social-api
///
/// - User: registered identity with a salted password hash
/// - Post: optional image and caption owned by one user
/// - Comment: text attached to a post by a user
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Registered user. Never serialized: `password_hash` must not leave the service.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub image: Option<String>,
    pub caption: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}
