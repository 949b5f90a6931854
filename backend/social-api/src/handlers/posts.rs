/// Post handlers - HTTP endpoints for post operations
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Deserializer};

use super::MessageResponse;
use crate::db::OwnedMutation;
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreatePostRequest {
    pub image: Option<String>,
    pub caption: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EditPostRequest {
    /// Absent keeps the current caption; `null` clears it.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub caption: Option<Option<String>>,
}

fn deserialize_some<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn forbidden(user_id: UserId, post_id: i64, action: &str) -> AppError {
    tracing::warn!(
        user_id = user_id.0,
        post_id,
        action,
        "Rejected mutation of post owned by another user"
    );
    AppError::Authorization("You don't have permission to modify this post".to_string())
}

fn post_not_found() -> AppError {
    AppError::NotFound("Post not found".to_string())
}

/// Create a new post
pub async fn create_post(
    state: web::Data<AppState>,
    user_id: UserId,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    let post_id = state
        .entities
        .create_post(user_id.0, req.image.as_deref(), req.caption.as_deref())
        .await?;

    tracing::info!(user_id = user_id.0, post_id, "Post created");

    Ok(HttpResponse::Created().json(MessageResponse::with_id(
        "Post created successfully",
        post_id,
    )))
}

/// Get a post by ID
pub async fn get_post(
    state: web::Data<AppState>,
    _user_id: UserId,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let post = state.entities.get_post(post_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// List comments on a post
pub async fn list_post_comments(
    state: web::Data<AppState>,
    _user_id: UserId,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let comments = state.entities.list_comments(post_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// Edit a post's caption (owner only)
pub async fn edit_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<i64>,
    req: web::Json<EditPostRequest>,
) -> Result<HttpResponse> {
    let post_id = post_id.into_inner();
    let caption = req.caption.as_ref().map(|c| c.as_deref());

    match state
        .entities
        .update_post_caption_as(post_id, user_id.0, caption)
        .await?
    {
        OwnedMutation::Applied(_) => {
            tracing::info!(user_id = user_id.0, post_id, "Post updated");
            Ok(HttpResponse::Ok().json(MessageResponse::new("Post updated")))
        }
        OwnedMutation::NotFound => Err(post_not_found()),
        OwnedMutation::NotOwner => Err(forbidden(user_id, post_id, "edit")),
    }
}

/// Delete a post and its comments (owner only)
pub async fn delete_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let post_id = post_id.into_inner();

    match state.entities.delete_post_as(post_id, user_id.0).await? {
        OwnedMutation::Applied(_) => {
            tracing::info!(user_id = user_id.0, post_id, "Post deleted");
            Ok(HttpResponse::Ok().json(MessageResponse::new("Post deleted")))
        }
        OwnedMutation::NotFound => Err(post_not_found()),
        OwnedMutation::NotOwner => Err(forbidden(user_id, post_id, "delete")),
    }
}
