/// HTTP route table
///
/// Shared by the server binary and the integration tests so both exercise the
/// same wiring. Protected resources are wrapped individually with
/// [`JwtAuthMiddleware`], which runs before any body or path extraction.
use actix_web::{web, HttpRequest};

use crate::error::AppError;
use crate::handlers;
use crate::middleware::JwtAuthMiddleware;
use crate::AppState;

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req: &HttpRequest| AppError::Validation(err.to_string()).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|_err, _req: &HttpRequest| AppError::NotFound("Post not found".to_string()).into())
}

/// Register application state, extractor configuration and all routes.
pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    let auth = JwtAuthMiddleware::new(state.jwt.clone(), state.credentials.clone());

    cfg.app_data(web::Data::new(state.clone()))
        .app_data(json_config())
        .app_data(path_config())
        .route("/", web::get().to(handlers::index))
        .route("/health", web::get().to(handlers::health))
        .route("/register", web::post().to(handlers::register))
        .route("/login", web::post().to(handlers::login))
        .service(
            web::resource("/post")
                .route(web::post().to(handlers::create_post))
                .wrap(auth.clone()),
        )
        .service(
            web::resource("/post/{id}")
                .route(web::get().to(handlers::get_post))
                .route(web::put().to(handlers::edit_post))
                .route(web::delete().to(handlers::delete_post))
                .wrap(auth.clone()),
        )
        .service(
            web::resource("/post/{id}/comments")
                .route(web::get().to(handlers::list_post_comments))
                .wrap(auth.clone()),
        )
        .service(
            web::resource("/comment")
                .route(web::post().to(handlers::create_comment))
                .wrap(auth),
        );
}
