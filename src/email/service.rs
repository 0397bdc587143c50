use std::sync::Arc;

use lettre::{
  message::{Mailbox, MultiPart},
  Address, Message,
};
use uuid::Uuid;

use super::{
  probe::{ProbeOutcome, ProbeState, VerificationState},
  templates::{render_otp_html, render_otp_text},
  transport::{SmtpTransport, Transport},
  types::{
    CredentialPresence, DeliveryPolicy, MailRequest, SendResult, TransportKind, SENDER_NAME, UNCONFIGURED_SENDER,
  },
};
use crate::{config::MailerConfig, error::DeliveryError};

pub struct EmailService {
  sender: Option<String>,
  credentials: CredentialPresence,
  policy: DeliveryPolicy,
  primary: Arc<dyn Transport>,
  fallback: Option<Arc<dyn Transport>>,
  probe_state: ProbeState,
}

impl EmailService {
  pub fn new(config: &MailerConfig) -> Result<Self, DeliveryError> {
    let primary: Arc<dyn Transport> = Arc::new(SmtpTransport::new(&config.primary)?);

    let fallback: Option<Arc<dyn Transport>> = match (&config.fallback, config.policy) {
      (Some(fallback), DeliveryPolicy::RetryOnce) => Some(Arc::new(SmtpTransport::new(fallback)?)),
      _ => None,
    };

    Ok(
      Self::with_transports(config.sender.clone(), config.policy, primary, fallback)
        .with_credentials(config.credential_presence()),
    )
  }

  pub fn with_transports(
    sender: Option<String>,
    policy: DeliveryPolicy,
    primary: Arc<dyn Transport>,
    fallback: Option<Arc<dyn Transport>>,
  ) -> Self {
    EmailService {
      sender,
      credentials: CredentialPresence::default(),
      policy,
      primary,
      fallback,
      probe_state: ProbeState::default(),
    }
  }

  pub fn with_credentials(mut self, credentials: CredentialPresence) -> Self {
    self.credentials = credentials;
    self
  }

  pub fn with_probe_state(mut self, probe_state: ProbeState) -> Self {
    self.probe_state = probe_state;
    self
  }

  pub fn policy(&self) -> DeliveryPolicy {
    self.policy
  }

  pub fn probe_state(&self) -> &ProbeState {
    &self.probe_state
  }

  pub fn credentials(&self) -> CredentialPresence {
    self.credentials
  }

  /// Builds the OTP message and returns it with its generated Message-ID.
  ///
  /// Without a configured sender the message still goes out from a
  /// placeholder address, leaving the SMTP server to reject it.
  pub fn build_message(&self, request: &MailRequest) -> Result<(Message, String), DeliveryError> {
    let sender = match self.sender.as_deref() {
      Some(sender) => sender,
      None => {
        tracing::warn!(sender = UNCONFIGURED_SENDER, "EMAIL is not set, sending from a placeholder address");
        UNCONFIGURED_SENDER
      }
    };
    let address: Address = sender.parse()?;
    let message_id = format!("<{}@{}>", Uuid::new_v4(), address.domain());

    let message = Message::builder()
      .from(Mailbox::new(Some(SENDER_NAME.to_string()), address))
      .to(request.to.parse()?)
      .subject(request.subject.clone())
      .message_id(Some(message_id.clone()))
      .multipart(MultiPart::alternative_plain_html(
        render_otp_text(&request.otp),
        render_otp_html(&request.otp),
      ))?;

    Ok((message, message_id))
  }

  pub async fn send_mail(&self, to: &str, subject: Option<&str>, otp: &str) -> Result<SendResult, DeliveryError> {
    let request = MailRequest::new(to, subject, otp);
    tracing::info!(to = %request.to, policy = ?self.policy, "Attempting to send email");

    let (message, message_id) = self.build_message(&request).inspect_err(|e| {
      tracing::error!(error = %e, "Email sending failed");
    })?;

    match self.policy {
      DeliveryPolicy::None => {
        self
          .deliver(self.primary.as_ref(), TransportKind::Primary, &message, &message_id)
          .await
      }
      DeliveryPolicy::ProbeBeforeSend => {
        if let Err(e) = self.primary.verify().await {
          tracing::error!(error = %e, code = ?e.code, "Email transport not ready, not sending");
          return Err(DeliveryError::NotReady(e));
        }
        self
          .deliver(self.primary.as_ref(), TransportKind::Primary, &message, &message_id)
          .await
      }
      DeliveryPolicy::RetryOnce => self.send_with_fallback(&message, &message_id).await,
    }
  }

  async fn send_with_fallback(&self, message: &Message, message_id: &str) -> Result<SendResult, DeliveryError> {
    let Some(fallback) = self.fallback.as_deref() else {
      return self
        .deliver(self.primary.as_ref(), TransportKind::Primary, message, message_id)
        .await;
    };

    let (active, kind) = match self.probe_state.get() {
      VerificationState::FallbackOk => {
        tracing::info!("Using fallback transporter");
        (fallback, TransportKind::Fallback)
      }
      VerificationState::AllFailed => {
        tracing::warn!("Verification failed, trying anyway with primary");
        (self.primary.as_ref(), TransportKind::Primary)
      }
      VerificationState::Unknown | VerificationState::PrimaryOk => (self.primary.as_ref(), TransportKind::Primary),
    };

    match self.deliver(active, kind, message, message_id).await {
      Err(_) if kind == TransportKind::Primary => {
        tracing::warn!("Primary failed, trying fallback");
        self
          .deliver(fallback, TransportKind::Fallback, message, message_id)
          .await
          .inspect_err(|_| tracing::error!("All transporters failed"))
      }
      result => result,
    }
  }

  async fn deliver(
    &self,
    transport: &dyn Transport,
    kind: TransportKind,
    message: &Message,
    message_id: &str,
  ) -> Result<SendResult, DeliveryError> {
    match transport.send(message).await {
      Ok(receipt) => {
        tracing::info!(transport = %kind, message_id, "Email sent successfully");
        Ok(SendResult {
          message_id: message_id.to_string(),
          transport: kind,
          response: receipt.response,
        })
      }
      Err(source) => {
        tracing::warn!(transport = %kind, error = %source, code = ?source.code, "Email send failed");
        Err(DeliveryError::Transport { transport: kind, source })
      }
    }
  }

  /// Probes the configured transports in priority order and reports the
  /// first one that answered. Does not touch the cached probe state.
  pub async fn verify_transporter(&self) -> ProbeOutcome {
    tracing::info!(
      user_configured = self.credentials.user_configured,
      password_configured = self.credentials.password_configured,
      "Testing SMTP connections"
    );

    tracing::info!("Testing primary SMTP transport");
    let primary_error = match self.primary.verify().await {
      Ok(()) => {
        tracing::info!("Primary SMTP connection successful");
        return ProbeOutcome::Primary;
      }
      Err(e) => e,
    };

    let fallback = match (self.policy, self.fallback.as_deref()) {
      (DeliveryPolicy::RetryOnce, Some(fallback)) => fallback,
      _ => {
        tracing::error!(error = %primary_error, "SMTP connection failed");
        return ProbeOutcome::Failed;
      }
    };

    tracing::warn!(error = %primary_error, "Primary connection failed, trying fallback");
    match fallback.verify().await {
      Ok(()) => {
        tracing::info!("Fallback SMTP connection successful");
        ProbeOutcome::Fallback
      }
      Err(fallback_error) => {
        tracing::error!(
          primary_error = %primary_error,
          fallback_error = %fallback_error,
          "All SMTP connections failed"
        );
        ProbeOutcome::Failed
      }
    }
  }
}
