use std::sync::{Arc, LazyLock};

use anyhow::Context;
use regex::Regex;
use validator::ValidationError;

use crate::{config::MailerConfig, email::EmailService};

pub mod error;

static OTP_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9A-Za-z]{4,12}$").unwrap());

/// OTP codes are interpolated into the HTML body unescaped, so only short
/// alphanumeric codes are accepted from callers.
pub fn validate_otp(otp: &str) -> Result<(), ValidationError> {
  if !OTP_PATTERN.is_match(otp) {
    return Err(ValidationError::new("otp_format").with_message("OTP must be 4 to 12 letters or digits".into()));
  }

  Ok(())
}

pub fn init_email_service(config: &MailerConfig) -> anyhow::Result<Arc<EmailService>> {
  let email_service = EmailService::new(config).context("Failed to build SMTP transports")?;
  Ok(Arc::new(email_service))
}
