//! Persistence layer
//!
//! Two contracts, each implemented by a PostgreSQL backend and an in-memory
//! backend:
//!
//! - [`CredentialStore`]: user identity and password hash
//! - [`EntityStore`]: posts and comments
//!
//! Stores never check who is calling except through the explicit `*_as`
//! conditional primitives, which perform the ownership comparison and the
//! mutation atomically.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;

use crate::models::{Comment, Post, User};

/// Error type for storage operations
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// Referenced record does not exist (names the entity)
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("email already registered")]
    DuplicateEmail,

    /// The acting user id does not resolve to a user
    #[error("user does not exist")]
    UnknownUser,

    #[error("database error: {0}")]
    Database(String),
}

/// Outcome of an ownership-checked mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum OwnedMutation {
    /// Mutation performed; carries the post as it was left (or as it was before deletion)
    Applied(Post),
    NotFound,
    /// Post exists but belongs to someone else; nothing changed
    NotOwner,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist a new user. Fails with [`StoreError::DuplicateEmail`] when the
    /// email is already registered; the existing record is left untouched.
    async fn register(&self, email: &str, name: &str, password_hash: &str) -> Result<i64, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn user_exists(&self, user_id: i64) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Fails with [`StoreError::UnknownUser`] when `user_id` does not resolve.
    async fn create_post(
        &self,
        user_id: i64,
        image: Option<&str>,
        caption: Option<&str>,
    ) -> Result<i64, StoreError>;

    /// Fails with [`StoreError::NotFound`] when `post_id` does not resolve;
    /// nothing is persisted in that case.
    async fn create_comment(&self, user_id: i64, post_id: i64, text: &str) -> Result<i64, StoreError>;

    async fn get_post(&self, post_id: i64) -> Result<Post, StoreError>;

    /// Comments on a post in creation order.
    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, StoreError>;

    /// Replace a post's caption regardless of owner.
    async fn update_post_caption(&self, post_id: i64, caption: Option<&str>) -> Result<(), StoreError>;

    /// Delete a post (and its comments) regardless of owner.
    async fn delete_post(&self, post_id: i64) -> Result<(), StoreError>;

    /// Update the caption only if `owner` owns the post, atomically with the
    /// ownership check. `None` leaves the caption as is, `Some(None)` clears it.
    async fn update_post_caption_as(
        &self,
        post_id: i64,
        owner: i64,
        caption: Option<Option<&str>>,
    ) -> Result<OwnedMutation, StoreError>;

    /// Delete the post only if `owner` owns it, atomically with the ownership check.
    async fn delete_post_as(&self, post_id: i64, owner: i64) -> Result<OwnedMutation, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
