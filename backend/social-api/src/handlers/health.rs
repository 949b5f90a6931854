use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::AppState;

pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Welcome to social-api!")
}

/// Readiness probe: 200 when the store answers, 503 otherwise.
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    match state.entities.health_check().await {
        Ok(()) => HttpResponse::Ok().json(json!({ "status": "ok" })),
        Err(err) => {
            tracing::warn!(error = %err, "Health check failed");
            HttpResponse::ServiceUnavailable().json(json!({ "status": "unavailable" }))
        }
    }
}
