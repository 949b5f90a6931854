/// Comment handlers
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

use super::MessageResponse;
use crate::error::Result;
use crate::middleware::UserId;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    pub post_id: i64,
    #[validate(length(min = 1, message = "text is required"))]
    pub text: String,
}

/// Add a comment to an existing post
pub async fn create_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let comment_id = state
        .entities
        .create_comment(user_id.0, req.post_id, &req.text)
        .await?;

    tracing::info!(user_id = user_id.0, post_id = req.post_id, comment_id, "Comment added");

    Ok(HttpResponse::Created().json(MessageResponse::with_id("Comment added", comment_id)))
}
