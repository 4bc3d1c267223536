//! # bbs-api
//!
//! The web routing and orchestration layer for the board.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod response;

use actix_web::{web, HttpRequest};
use bbs_core::error::AppError;

use crate::response::ApiError;

fn bad_request(reason: String, req: &HttpRequest) -> actix_web::Error {
    log::debug!("rejected {} {}: {reason}", req.method(), req.path());
    ApiError(AppError::ValidationError(reason)).into()
}

/// Makes extractor failures (bad JSON, bad query string, malformed id)
/// answer with the envelope instead of actix's plain-text errors.
fn extractor_configs(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, req| bad_request(err.to_string(), req)))
        .app_data(web::QueryConfig::default().error_handler(|err, req| bad_request(err.to_string(), req)))
        .app_data(web::PathConfig::default().error_handler(|err, req| bad_request(err.to_string(), req)));
}

/// Configures the routes for the board.
///
/// # Developer Note
/// Routes are registered on a `ServiceConfig` so the binary can mount the
/// API under a prefix (e.g., /api/v1/) if needed.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    extractor_configs(cfg);
    cfg.service(
        web::resource("/posts")
            .route(web::get().to(handlers::list_posts))
            .route(web::post().to(handlers::create_post)),
    )
    .service(
        web::resource("/posts/{id}")
            .route(web::get().to(handlers::get_post))
            .route(web::put().to(handlers::update_post))
            .route(web::delete().to(handlers::delete_post)),
    )
    .service(web::resource("/users").route(web::post().to(handlers::create_user)))
    .service(web::resource("/users/{id}").route(web::get().to(handlers::get_user)));
}
