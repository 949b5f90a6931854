//! In-memory storage backend
//!
//! Used when no database is configured and by the HTTP tests. Data is lost on
//! restart. A single lock guards all tables so that every operation, including
//! the ownership-checked ones, is atomic.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::debug;

use super::{CredentialStore, EntityStore, OwnedMutation, StoreError};
use crate::models::{Comment, Post, User};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    users_by_email: HashMap<String, i64>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    last_user_id: i64,
    last_post_id: i64,
    last_comment_id: i64,
}

impl Tables {
    fn remove_post(&mut self, post_id: i64) -> Option<Post> {
        let post = self.posts.remove(&post_id)?;
        self.comments.retain(|_, comment| comment.post_id != post_id);
        Some(post)
    }
}

/// In-memory credential and entity store
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted comments across all posts
    pub async fn comment_count(&self) -> usize {
        self.tables.read().await.comments.len()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn register(&self, email: &str, name: &str, password_hash: &str) -> Result<i64, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users_by_email.contains_key(email) {
            return Err(StoreError::DuplicateEmail);
        }

        tables.last_user_id += 1;
        let id = tables.last_user_id;
        tables.users.insert(
            id,
            User {
                id,
                email: email.to_string(),
                name: name.to_string(),
                password_hash: password_hash.to_string(),
                created_at: Utc::now(),
            },
        );
        tables.users_by_email.insert(email.to_string(), id);

        debug!(user_id = id, "registered user");
        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users_by_email
            .get(email)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn user_exists(&self, user_id: i64) -> Result<bool, StoreError> {
        Ok(self.tables.read().await.users.contains_key(&user_id))
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn create_post(
        &self,
        user_id: i64,
        image: Option<&str>,
        caption: Option<&str>,
    ) -> Result<i64, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::UnknownUser);
        }

        tables.last_post_id += 1;
        let id = tables.last_post_id;
        tables.posts.insert(
            id,
            Post {
                id,
                user_id,
                image: image.map(str::to_string),
                caption: caption.map(str::to_string),
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn create_comment(&self, user_id: i64, post_id: i64, text: &str) -> Result<i64, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&post_id) {
            return Err(StoreError::NotFound("Post"));
        }
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::UnknownUser);
        }

        tables.last_comment_id += 1;
        let id = tables.last_comment_id;
        tables.comments.insert(
            id,
            Comment {
                id,
                user_id,
                post_id,
                text: text.to_string(),
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn get_post(&self, post_id: i64) -> Result<Post, StoreError> {
        self.tables
            .read()
            .await
            .posts
            .get(&post_id)
            .cloned()
            .ok_or(StoreError::NotFound("Post"))
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, StoreError> {
        let tables = self.tables.read().await;
        if !tables.posts.contains_key(&post_id) {
            return Err(StoreError::NotFound("Post"));
        }

        Ok(tables
            .comments
            .values()
            .filter(|comment| comment.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn update_post_caption(&self, post_id: i64, caption: Option<&str>) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let post = tables
            .posts
            .get_mut(&post_id)
            .ok_or(StoreError::NotFound("Post"))?;
        post.caption = caption.map(str::to_string);
        Ok(())
    }

    async fn delete_post(&self, post_id: i64) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables
            .remove_post(post_id)
            .map(|_| ())
            .ok_or(StoreError::NotFound("Post"))
    }

    async fn update_post_caption_as(
        &self,
        post_id: i64,
        owner: i64,
        caption: Option<Option<&str>>,
    ) -> Result<OwnedMutation, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(post) = tables.posts.get_mut(&post_id) else {
            return Ok(OwnedMutation::NotFound);
        };
        if !post.is_owned_by(owner) {
            return Ok(OwnedMutation::NotOwner);
        }

        if let Some(caption) = caption {
            post.caption = caption.map(str::to_string);
        }
        Ok(OwnedMutation::Applied(post.clone()))
    }

    async fn delete_post_as(&self, post_id: i64, owner: i64) -> Result<OwnedMutation, StoreError> {
        let mut tables = self.tables.write().await;
        match tables.posts.get(&post_id) {
            None => return Ok(OwnedMutation::NotFound),
            Some(post) if !post.is_owned_by(owner) => return Ok(OwnedMutation::NotOwner),
            Some(_) => {}
        }

        Ok(tables
            .remove_post(post_id)
            .map_or(OwnedMutation::NotFound, OwnedMutation::Applied))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_users() -> (MemoryStore, i64, i64) {
        let store = MemoryStore::new();
        let alice = store
            .register("alice@x.com", "Alice", "hash-a")
            .await
            .expect("register alice");
        let bob = store
            .register("bob@x.com", "Bob", "hash-b")
            .await
            .expect("register bob");
        (store, alice, bob)
    }

    #[tokio::test]
    async fn duplicate_email_leaves_first_user_untouched() {
        let (store, alice, _) = store_with_users().await;

        let err = store
            .register("alice@x.com", "Mallory", "hash-m")
            .await
            .expect_err("duplicate");
        assert_eq!(err, StoreError::DuplicateEmail);

        let user = store
            .find_by_email("alice@x.com")
            .await
            .expect("lookup")
            .expect("alice exists");
        assert_eq!(user.id, alice);
        assert_eq!(user.name, "Alice");
        assert_eq!(user.password_hash, "hash-a");
    }

    #[tokio::test]
    async fn ids_are_sequential_from_one() {
        let (store, alice, bob) = store_with_users().await;
        assert_eq!((alice, bob), (1, 2));

        let first = store.create_post(alice, None, Some("hi")).await.expect("post");
        let second = store.create_post(bob, Some("/img.png"), None).await.expect("post");
        assert_eq!((first, second), (1, 2));
    }

    #[tokio::test]
    async fn post_for_unknown_user_is_rejected() {
        let store = MemoryStore::new();
        let err = store.create_post(42, None, None).await.expect_err("no user");
        assert_eq!(err, StoreError::UnknownUser);
    }

    #[tokio::test]
    async fn comment_on_missing_post_is_not_persisted() {
        let (store, alice, _) = store_with_users().await;

        let err = store
            .create_comment(alice, 99, "hello")
            .await
            .expect_err("missing post");
        assert_eq!(err, StoreError::NotFound("Post"));
        assert_eq!(store.comment_count().await, 0);
    }

    #[tokio::test]
    async fn caller_independent_primitives() {
        let (store, alice, _) = store_with_users().await;
        let post_id = store.create_post(alice, None, Some("hi")).await.expect("post");

        store
            .update_post_caption(post_id, Some("bye"))
            .await
            .expect("update");
        assert_eq!(
            store.get_post(post_id).await.expect("get").caption.as_deref(),
            Some("bye")
        );

        store.delete_post(post_id).await.expect("delete");
        assert_eq!(
            store.get_post(post_id).await,
            Err(StoreError::NotFound("Post"))
        );
        assert_eq!(
            store.delete_post(post_id).await,
            Err(StoreError::NotFound("Post"))
        );
        assert_eq!(
            store.update_post_caption(post_id, None).await,
            Err(StoreError::NotFound("Post"))
        );
    }

    #[tokio::test]
    async fn owned_update_checks_owner() {
        let (store, alice, bob) = store_with_users().await;
        let post_id = store.create_post(alice, None, Some("hi")).await.expect("post");

        let outcome = store
            .update_post_caption_as(post_id, bob, Some(Some("hijacked")))
            .await
            .expect("update");
        assert_eq!(outcome, OwnedMutation::NotOwner);
        assert_eq!(
            store.get_post(post_id).await.expect("get").caption.as_deref(),
            Some("hi")
        );

        let outcome = store
            .update_post_caption_as(post_id, alice, Some(Some("bye")))
            .await
            .expect("update");
        let OwnedMutation::Applied(post) = outcome else {
            panic!("expected owner update to apply");
        };
        assert_eq!(post.caption.as_deref(), Some("bye"));

        let outcome = store
            .update_post_caption_as(post_id, alice, None)
            .await
            .expect("update");
        assert!(matches!(outcome, OwnedMutation::Applied(ref p) if p.caption.as_deref() == Some("bye")));

        let outcome = store
            .update_post_caption_as(post_id, alice, Some(None))
            .await
            .expect("update");
        assert!(matches!(outcome, OwnedMutation::Applied(ref p) if p.caption.is_none()));

        let outcome = store
            .update_post_caption_as(404, alice, Some(Some("x")))
            .await
            .expect("update");
        assert_eq!(outcome, OwnedMutation::NotFound);
    }

    #[tokio::test]
    async fn owned_delete_removes_post_and_comments() {
        let (store, alice, bob) = store_with_users().await;
        let post_id = store.create_post(alice, None, Some("hi")).await.expect("post");
        store
            .create_comment(bob, post_id, "nice")
            .await
            .expect("comment");

        assert_eq!(
            store.delete_post_as(post_id, bob).await.expect("delete"),
            OwnedMutation::NotOwner
        );
        assert_eq!(store.comment_count().await, 1);

        assert!(matches!(
            store.delete_post_as(post_id, alice).await.expect("delete"),
            OwnedMutation::Applied(_)
        ));
        assert_eq!(store.comment_count().await, 0);
        assert_eq!(
            store.delete_post_as(post_id, alice).await.expect("delete"),
            OwnedMutation::NotFound
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_deletes_apply_exactly_once() {
        let (store, alice, _) = store_with_users().await;
        let store = std::sync::Arc::new(store);

        for _ in 0..50 {
            let post_id = store.create_post(alice, None, Some("hi")).await.expect("post");

            let first = tokio::spawn({
                let store = store.clone();
                async move { store.delete_post_as(post_id, alice).await }
            });
            let second = tokio::spawn({
                let store = store.clone();
                async move { store.delete_post_as(post_id, alice).await }
            });
            let outcomes = [
                first.await.expect("join").expect("delete"),
                second.await.expect("join").expect("delete"),
            ];

            let applied = outcomes
                .iter()
                .filter(|o| matches!(o, OwnedMutation::Applied(_)))
                .count();
            assert_eq!(applied, 1);
            assert!(outcomes.contains(&OwnedMutation::NotFound));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn edit_racing_delete_sees_post_or_not_found() {
        let (store, alice, _) = store_with_users().await;
        let store = std::sync::Arc::new(store);

        for _ in 0..50 {
            let post_id = store.create_post(alice, None, Some("hi")).await.expect("post");

            let edit = tokio::spawn({
                let store = store.clone();
                async move {
                    store
                        .update_post_caption_as(post_id, alice, Some(Some("bye")))
                        .await
                }
            });
            let delete = tokio::spawn({
                let store = store.clone();
                async move { store.delete_post_as(post_id, alice).await }
            });

            let edited = edit.await.expect("join").expect("edit");
            let deleted = delete.await.expect("join").expect("delete");

            // The delete always wins eventually; the edit either ran first or found nothing
            assert!(matches!(deleted, OwnedMutation::Applied(_)));
            match edited {
                OwnedMutation::Applied(post) => assert_eq!(post.caption.as_deref(), Some("bye")),
                other => assert_eq!(other, OwnedMutation::NotFound),
            }
            assert_eq!(
                store.get_post(post_id).await,
                Err(StoreError::NotFound("Post"))
            );
        }
    }

    #[tokio::test]
    async fn list_comments_in_creation_order() {
        let (store, alice, bob) = store_with_users().await;
        let post_id = store.create_post(alice, None, None).await.expect("post");
        store.create_comment(bob, post_id, "first").await.expect("comment");
        store.create_comment(alice, post_id, "second").await.expect("comment");

        let texts: Vec<String> = store
            .list_comments(post_id)
            .await
            .expect("list")
            .into_iter()
            .map(|c| c.text)
            .collect();
        assert_eq!(texts, vec!["first", "second"]);

        assert_eq!(
            store.list_comments(77).await,
            Err(StoreError::NotFound("Post"))
        );
    }
}
