use std::sync::Arc;

use crate::{
  domains::otp::model::{MailHealthResponse, SendOtpMailRequest},
  email::{EmailService, SendResult},
  error::DeliveryError,
};

pub trait AppState: Clone + Send + Sync + 'static {
  fn send_otp_mail(
    &self,
    req: SendOtpMailRequest,
  ) -> impl std::future::Future<Output = Result<SendResult, DeliveryError>> + Send;
  fn check_mail_transport(&self) -> impl std::future::Future<Output = MailHealthResponse> + Send;
}

#[derive(Clone)]
pub struct SharedAppState {
  pub email_service: Arc<EmailService>,
}

impl SharedAppState {
  pub fn new(email_service: Arc<EmailService>) -> Self {
    Self { email_service }
  }
}

impl AppState for SharedAppState {
  async fn send_otp_mail(&self, req: SendOtpMailRequest) -> Result<SendResult, DeliveryError> {
    self
      .email_service
      .send_mail(&req.to, req.subject.as_deref(), &req.otp)
      .await
  }

  async fn check_mail_transport(&self) -> MailHealthResponse {
    let outcome = self.email_service.verify_transporter().await;
    MailHealthResponse {
      outcome,
      state: self.email_service.probe_state().get(),
    }
  }
}
