/// Authentication handlers
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::MessageResponse;
use crate::{error::Result, services, AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
}

/// Register endpoint handler
pub async fn register(
    state: web::Data<AppState>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let user_id = services::auth::register(
        state.credentials.as_ref(),
        &payload.email,
        &payload.name,
        &payload.password,
    )
    .await?;

    Ok(HttpResponse::Created().json(MessageResponse::with_id(
        "User registered successfully",
        user_id,
    )))
}

/// Login endpoint handler
pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let access_token = services::auth::login(
        state.credentials.as_ref(),
        &state.jwt,
        &payload.email,
        &payload.password,
    )
    .await?;

    Ok(HttpResponse::Ok().json(LoginResponse { access_token }))
}
