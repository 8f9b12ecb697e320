use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use tend_core::habit::ValidationError;
use thiserror::Error;

/// Errors surfaced by API handlers, each mapped to an HTTP response.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("{0}")]
  Validation(#[from] ValidationError),

  #[error("internal error: {0}")]
  Internal(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match &self {
      ApiError::Unauthorized => (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "unauthorized" })),
      )
        .into_response(),
      ApiError::NotFound(message) => (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": message })),
      )
        .into_response(),
      ApiError::BadRequest(message) => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": message })),
      )
        .into_response(),
      // Field-level failures carry the offending field so clients can
      // highlight the right input.
      ApiError::Validation(invalid) => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": invalid.to_string(), "field": invalid.field() })),
      )
        .into_response(),
      ApiError::Internal(message) => {
        tracing::error!("internal error: {message}");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": "internal error" })),
        )
          .into_response()
      }
      ApiError::Store(source) => {
        tracing::error!("store error: {source}");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": "store error" })),
        )
          .into_response()
      }
    }
  }
}
