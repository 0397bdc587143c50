use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

pub const DEFAULT_SUBJECT: &str = "Your OTP Code for Redigo";
pub const SENDER_NAME: &str = "Redigo";
/// From address used when `EMAIL` is not configured.
pub const UNCONFIGURED_SENDER: &str = "undefined@localhost";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsMode {
  None,
  StartTls,
  /// Implicit TLS from the first byte, usually port 465.
  Wrapper,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SmtpEndpoint {
  /// A well-known provider resolved to its submission endpoint.
  Service(String),
  Host { host: String, port: u16, tls: TlsMode },
}

impl SmtpEndpoint {
  /// Resolves the endpoint into `(host, port, tls)`.
  pub fn resolve(&self) -> Option<(String, u16, TlsMode)> {
    match self {
      SmtpEndpoint::Service(name) => match name.to_lowercase().as_str() {
        "gmail" => Some(("smtp.gmail.com".to_string(), 465, TlsMode::Wrapper)),
        _ => None,
      },
      SmtpEndpoint::Host { host, port, tls } => Some((host.clone(), *port, *tls)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Timeouts {
  pub connect: Duration,
  pub greeting: Duration,
  pub socket: Duration,
}

impl Timeouts {
  pub fn from_millis(connect: u64, greeting: u64, socket: u64) -> Self {
    Self {
      connect: Duration::from_millis(connect),
      greeting: Duration::from_millis(greeting),
      socket: Duration::from_millis(socket),
    }
  }

  /// Upper bound for a handshake: reaching the server plus its greeting.
  pub fn handshake(&self) -> Duration {
    self.connect + self.greeting
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PoolSettings {
  pub max_connections: u32,
  pub idle_timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
  pub endpoint: SmtpEndpoint,
  pub username: Option<String>,
  pub password: Option<String>,
  pub timeouts: Timeouts,
  pub pool: Option<PoolSettings>,
}

impl TransportConfig {
  pub fn gmail_service(username: Option<String>, password: Option<String>) -> Self {
    TransportConfig {
      endpoint: SmtpEndpoint::Service("gmail".to_string()),
      username,
      password,
      timeouts: Timeouts::from_millis(20_000, 10_000, 20_000),
      pool: None,
    }
  }

  pub fn gmail_direct(username: Option<String>, password: Option<String>) -> Self {
    TransportConfig {
      endpoint: SmtpEndpoint::Host {
        host: "smtp.gmail.com".to_string(),
        port: 465,
        tls: TlsMode::Wrapper,
      },
      username,
      password,
      timeouts: Timeouts::from_millis(15_000, 8_000, 15_000),
      pool: None,
    }
  }

  pub fn with_pool(mut self, pool: PoolSettings) -> Self {
    self.pool = Some(pool);
    self
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
  Primary,
  Fallback,
}

impl fmt::Display for TransportKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TransportKind::Primary => write!(f, "primary"),
      TransportKind::Fallback => write!(f, "fallback"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailRequest {
  pub to: String,
  pub subject: String,
  pub otp: String,
}

impl MailRequest {
  pub fn new(to: impl Into<String>, subject: Option<&str>, otp: impl Into<String>) -> Self {
    MailRequest {
      to: to.into(),
      subject: subject.filter(|s| !s.is_empty()).unwrap_or(DEFAULT_SUBJECT).to_string(),
      otp: otp.into(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResult {
  pub message_id: String,
  pub transport: TransportKind,
  pub response: Option<String>,
}

/// Whether credentials were supplied. Safe to log; never carries the secret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CredentialPresence {
  pub user_configured: bool,
  pub password_configured: bool,
}

impl CredentialPresence {
  pub fn from_values(user: Option<&str>, password: Option<&str>) -> Self {
    CredentialPresence {
      user_configured: user.is_some_and(|u| !u.is_empty()),
      password_configured: password.is_some_and(|p| !p.is_empty()),
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryPolicy {
  /// Single attempt on the primary transport.
  None,
  /// Pick the transport from the startup probe, hop to the fallback once.
  #[default]
  RetryOnce,
  /// Probe the primary transport before each send and refuse if it is down.
  ProbeBeforeSend,
}

impl std::str::FromStr for DeliveryPolicy {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "none" => Ok(DeliveryPolicy::None),
      "retry-once" | "retry_once" | "fallback" => Ok(DeliveryPolicy::RetryOnce),
      "probe-before-send" | "probe_before_send" | "verify" => Ok(DeliveryPolicy::ProbeBeforeSend),
      other => Err(format!("Unknown delivery policy: {}", other)),
    }
  }
}
