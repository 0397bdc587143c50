//! OTP email delivery over SMTP.
//!
//! Messages are built with lettre and pushed through a [`Transport`]. The
//! [`EmailService`] decides which transport to use according to its
//! [`DeliveryPolicy`], optionally consulting a cached connectivity probe.

mod probe;
mod service;
mod templates;
mod transport;
mod types;

pub use probe::{spawn_startup_probe, ProbeOutcome, ProbeState, VerificationState};
pub use service::EmailService;
pub use templates::{render_otp_html, render_otp_text};
pub use transport::{Receipt, SmtpTransport, Transport};
pub use types::{
  CredentialPresence, DeliveryPolicy, MailRequest, PoolSettings, SendResult, SmtpEndpoint, Timeouts, TlsMode,
  TransportConfig, TransportKind, DEFAULT_SUBJECT, SENDER_NAME,
};
