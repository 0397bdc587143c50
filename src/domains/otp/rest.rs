use axum::{
  extract::{Json, State},
  http::StatusCode,
  response::Json as JsonResponse,
  routing::{get, post},
  Router,
};
use validator::Validate;

use super::model::{MailHealthResponse, SendOtpMailRequest};
use crate::{
  email::{ProbeOutcome, SendResult},
  state::{AppState, SharedAppState},
  AppError,
};

pub fn otp_mail_routes() -> Router<SharedAppState> {
  Router::new()
    .route("/otp-mail", post(send_otp_mail_handler))
    .route("/mail/health", get(mail_health_handler))
}

pub async fn send_otp_mail_handler(
  State(state): State<SharedAppState>,
  Json(payload): Json<SendOtpMailRequest>,
) -> Result<JsonResponse<SendResult>, AppError> {
  payload
    .validate()
    .map_err(|e| AppError::bad_request(format!("Validation failed: {}", e)))?;

  state
    .send_otp_mail(payload)
    .await
    .map(JsonResponse)
    .map_err(Into::into)
}

pub async fn mail_health_handler(State(state): State<SharedAppState>) -> (StatusCode, JsonResponse<MailHealthResponse>) {
  let health = state.check_mail_transport().await;
  let status = match health.outcome {
    ProbeOutcome::Failed => StatusCode::SERVICE_UNAVAILABLE,
    ProbeOutcome::Primary | ProbeOutcome::Fallback => StatusCode::OK,
  };

  (status, JsonResponse(health))
}
