//! # Response Envelope
//!
//! Every body the API writes is `{"success", "result", "error"}`. All three
//! keys are always present; the unused one is `null`.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use bbs_core::error::AppError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub result: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(result: T) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(message.into()),
        }
    }
}

/// Bridges `AppError` into actix's error pipeline.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub AppError);

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            AppError::NotFound(..) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match &self.0 {
            AppError::Internal(detail) => {
                log::error!("request failed: {detail}");
                "internal service error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ApiResponse::fail(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn envelope(err: AppError) -> (StatusCode, serde_json::Value) {
        let resp = ApiError(err).error_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn internal_error_hides_detail() {
        let (status, body) = envelope(AppError::Internal("secret".into())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(body["result"].is_null());
        assert_eq!(body["error"], "internal service error");
        assert!(!body.to_string().contains("secret"));
    }

    #[actix_web::test]
    async fn domain_errors_keep_their_message() {
        let (status, body) = envelope(AppError::not_found("Post", "42")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Post not found with ID 42");

        let (status, _) = envelope(AppError::Conflict("taken".into())).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
