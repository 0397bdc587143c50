use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::json;

use crate::error::DeliveryError;

#[derive(Debug)]
pub struct AppError {
  pub status_code: StatusCode,
  pub message: String,
}

impl AppError {
  pub fn new(status_code: StatusCode, message: impl Into<String>) -> Self {
    Self {
      status_code,
      message: message.into(),
    }
  }

  pub fn bad_request(message: impl Into<String>) -> Self {
    Self::new(StatusCode::BAD_REQUEST, message)
  }

  pub fn bad_gateway(message: impl Into<String>) -> Self {
    Self::new(StatusCode::BAD_GATEWAY, message)
  }

  pub fn service_unavailable(message: impl Into<String>) -> Self {
    Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
  }

  pub fn internal_server_error(message: impl Into<String>) -> Self {
    Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let body = Json(json!({
      "error": self.message,
      "status_code": self.status_code.as_u16(),
    }));

    (self.status_code, body).into_response()
  }
}

impl From<AppError> for StatusCode {
  fn from(err: AppError) -> Self {
    err.status_code
  }
}

impl From<DeliveryError> for AppError {
  fn from(error: DeliveryError) -> Self {
    match error {
      DeliveryError::InvalidAddress(e) => AppError::bad_request(format!("Invalid email address: {}", e)),
      DeliveryError::NotReady(e) => {
        tracing::error!("Email transport not ready: {}", e);
        AppError::service_unavailable("Email service is temporarily unavailable")
      }
      DeliveryError::Transport { transport, source } => {
        tracing::error!("Email delivery via {} failed: {}", transport, source);
        AppError::bad_gateway("Failed to deliver email")
      }
      err @ (DeliveryError::Message(_) | DeliveryError::Config(_)) => {
        tracing::error!("Email configuration error: {}", err);
        AppError::internal_server_error("Internal server error occurred")
      }
    }
  }
}
