use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
  email::{ProbeOutcome, VerificationState},
  utils::validate_otp,
};

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SendOtpMailRequest {
  #[validate(email(message = "A valid recipient email address is required"))]
  pub to: String,
  #[validate(length(max = 200, message = "Subject must be at most 200 characters"))]
  pub subject: Option<String>,
  #[validate(custom(function = "validate_otp"))]
  pub otp: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailHealthResponse {
  pub outcome: ProbeOutcome,
  pub state: VerificationState,
}
