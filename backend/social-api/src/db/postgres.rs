//! PostgreSQL storage backend
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use tracing::info;

use super::{CredentialStore, EntityStore, OwnedMutation, StoreError};
use crate::models::{Comment, Post, User};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) if db_err.constraint() == Some("users_email_key") => {
                    return StoreError::DuplicateEmail;
                }
                Some(FOREIGN_KEY_VIOLATION) => {
                    return match db_err.constraint() {
                        Some("comments_post_id_fkey") => StoreError::NotFound("Post"),
                        _ => StoreError::UnknownUser,
                    };
                }
                _ => {}
            }
        }
        StoreError::Database(err.to_string())
    }
}

/// Store backed by a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Apply the embedded migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("migration failed: {}", e)))?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Lock the post row and return its owner, if the post exists.
    async fn lock_owner(
        tx: &mut Transaction<'_, Postgres>,
        post_id: i64,
    ) -> Result<Option<i64>, StoreError> {
        let owner = sqlx::query_scalar::<_, i64>("SELECT user_id FROM posts WHERE id = $1 FOR UPDATE")
            .bind(post_id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(owner)
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn register(&self, email: &str, name: &str, password_hash: &str) -> Result<i64, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (email, name, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn user_exists(&self, user_id: i64) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn create_post(
        &self,
        user_id: i64,
        image: Option<&str>,
        caption: Option<&str>,
    ) -> Result<i64, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO posts (user_id, image, caption)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(image)
        .bind(caption)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn create_comment(&self, user_id: i64, post_id: i64, text: &str) -> Result<i64, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO comments (user_id, post_id, text)
            SELECT $1, $2, $3
            WHERE EXISTS (SELECT 1 FROM posts WHERE id = $2)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(post_id)
        .bind(text)
        .fetch_optional(&self.pool)
        .await?;
        id.ok_or(StoreError::NotFound("Post"))
    }

    async fn get_post(&self, post_id: i64) -> Result<Post, StoreError> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, image, caption, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound("Post"))
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
            .bind(post_id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(StoreError::NotFound("Post"));
        }

        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, user_id, post_id, text, created_at
            FROM comments
            WHERE post_id = $1
            ORDER BY id
            "#,
        )
        .bind(post_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(comments)
    }

    async fn update_post_caption(&self, post_id: i64, caption: Option<&str>) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE posts SET caption = $2 WHERE id = $1")
            .bind(post_id)
            .bind(caption)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Post"));
        }
        Ok(())
    }

    async fn delete_post(&self, post_id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Post"));
        }
        Ok(())
    }

    async fn update_post_caption_as(
        &self,
        post_id: i64,
        owner: i64,
        caption: Option<Option<&str>>,
    ) -> Result<OwnedMutation, StoreError> {
        let mut tx = self.pool.begin().await?;

        match Self::lock_owner(&mut tx, post_id).await? {
            None => return Ok(OwnedMutation::NotFound),
            Some(user_id) if user_id != owner => return Ok(OwnedMutation::NotOwner),
            Some(_) => {}
        }

        let post = match caption {
            Some(caption) => {
                sqlx::query_as::<_, Post>(
                    r#"
                    UPDATE posts SET caption = $2
                    WHERE id = $1
                    RETURNING id, user_id, image, caption, created_at
                    "#,
                )
                .bind(post_id)
                .bind(caption)
                .fetch_one(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as::<_, Post>(
                    "SELECT id, user_id, image, caption, created_at FROM posts WHERE id = $1",
                )
                .bind(post_id)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        Ok(OwnedMutation::Applied(post))
    }

    async fn delete_post_as(&self, post_id: i64, owner: i64) -> Result<OwnedMutation, StoreError> {
        let mut tx = self.pool.begin().await?;

        match Self::lock_owner(&mut tx, post_id).await? {
            None => return Ok(OwnedMutation::NotFound),
            Some(user_id) if user_id != owner => return Ok(OwnedMutation::NotOwner),
            Some(_) => {}
        }

        let post = sqlx::query_as::<_, Post>(
            r#"
            DELETE FROM posts
            WHERE id = $1
            RETURNING id, user_id, image, caption, created_at
            "#,
        )
        .bind(post_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(OwnedMutation::Applied(post))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
