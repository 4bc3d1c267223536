//! bbs/crates/bbs-api/src/middleware.rs Middleware
//!
//! Access logging and CORS for the BBS API.

use actix_cors::Cors;
use actix_web::middleware::Logger;

// Access log: remote-ip "request-line" status-code response-size time-taken
pub fn standard_middleware() -> Logger {
    Logger::new(r#"%a "%r" %s %b %Dms"#)
}

// The API is consumed by browser frontends served from other origins.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_header(actix_web::http::header::CONTENT_TYPE)
        .expose_headers(vec![actix_web::http::header::LOCATION])
        .max_age(3600)
}
