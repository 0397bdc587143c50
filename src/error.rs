use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::email::TransportKind;

/// Coarse classification of a transport failure, used for logging and for
/// mapping to HTTP status codes at the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
  Authentication,
  Timeout,
  Network,
  Rejected,
}

impl fmt::Display for TransportErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TransportErrorKind::Authentication => write!(f, "authentication"),
      TransportErrorKind::Timeout => write!(f, "timeout"),
      TransportErrorKind::Network => write!(f, "network"),
      TransportErrorKind::Rejected => write!(f, "rejected"),
    }
  }
}

/// Error raised by a single transport while probing or sending.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} error: {message}")]
pub struct TransportError {
  pub kind: TransportErrorKind,
  pub message: String,
  /// SMTP reply code, when the server answered.
  pub code: Option<u16>,
}

impl TransportError {
  pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
    Self {
      kind,
      message: message.into(),
      code: None,
    }
  }

  pub fn with_code(mut self, code: u16) -> Self {
    self.code = Some(code);
    self
  }

  pub fn timeout(message: impl Into<String>) -> Self {
    Self::new(TransportErrorKind::Timeout, message)
  }

  pub fn network(message: impl Into<String>) -> Self {
    Self::new(TransportErrorKind::Network, message)
  }
}

impl From<lettre::transport::smtp::Error> for TransportError {
  fn from(err: lettre::transport::smtp::Error) -> Self {
    let code = err.status().and_then(|c| c.to_string().parse::<u16>().ok());

    let kind = match code {
      Some(code) if (530..540).contains(&code) => TransportErrorKind::Authentication,
      _ if err.is_timeout() => TransportErrorKind::Timeout,
      Some(_) => TransportErrorKind::Rejected,
      None => TransportErrorKind::Network,
    };

    Self {
      kind,
      message: err.to_string(),
      code,
    }
  }
}

#[derive(Debug, Error)]
pub enum DeliveryError {
  #[error("Invalid email address: {0}")]
  InvalidAddress(#[from] lettre::address::AddressError),

  #[error("Email message error: {0}")]
  Message(#[from] lettre::error::Error),

  #[error("Email transport not ready: {0}")]
  NotReady(#[source] TransportError),

  #[error("Email delivery via {transport} transport failed: {source}")]
  Transport {
    transport: TransportKind,
    #[source]
    source: TransportError,
  },

  #[error("Configuration error: {0}")]
  Config(String),
}

impl DeliveryError {
  /// The last underlying transport error, if the failure came from a transport.
  pub fn transport_error(&self) -> Option<&TransportError> {
    match self {
      DeliveryError::NotReady(err) => Some(err),
      DeliveryError::Transport { source, .. } => Some(source),
      _ => None,
    }
  }
}
