use async_trait::async_trait;
use lettre::{
  transport::smtp::{
    authentication::Credentials,
    client::{Tls, TlsParameters},
    PoolConfig,
  },
  AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::types::{TlsMode, TransportConfig, Timeouts};
use crate::error::{DeliveryError, TransportError};

/// What the server answered when it accepted a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Receipt {
  pub response: Option<String>,
}

/// A configured sending channel. The mailer only ever needs to check that a
/// channel is usable and to push a finished message through it.
#[async_trait]
pub trait Transport: Send + Sync {
  async fn verify(&self) -> Result<(), TransportError>;
  async fn send(&self, message: &Message) -> Result<Receipt, TransportError>;
}

#[derive(Clone)]
pub struct SmtpTransport {
  transport: AsyncSmtpTransport<Tokio1Executor>,
  timeouts: Timeouts,
}

impl SmtpTransport {
  pub fn new(config: &TransportConfig) -> Result<Self, DeliveryError> {
    let (host, port, tls_mode) = config
      .endpoint
      .resolve()
      .ok_or_else(|| DeliveryError::Config(format!("Unknown mail service: {:?}", config.endpoint)))?;

    let tls = match tls_mode {
      TlsMode::None => Tls::None,
      TlsMode::StartTls => Tls::Required(tls_parameters(&host)?),
      TlsMode::Wrapper => Tls::Wrapper(tls_parameters(&host)?),
    };

    let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&host)
      .port(port)
      .tls(tls)
      .timeout(Some(config.timeouts.socket));

    if let Some(username) = &config.username {
      let password = config.password.clone().unwrap_or_default();
      builder = builder.credentials(Credentials::new(username.clone(), password));
    }

    if let Some(pool) = config.pool {
      builder = builder.pool_config(
        PoolConfig::new()
          .max_size(pool.max_connections)
          .idle_timeout(pool.idle_timeout),
      );
    }

    Ok(SmtpTransport {
      transport: builder.build(),
      timeouts: config.timeouts,
    })
  }
}

fn tls_parameters(host: &str) -> Result<TlsParameters, DeliveryError> {
  TlsParameters::builder(host.to_string())
    .dangerous_accept_invalid_certs(true)
    .build()
    .map_err(|e| DeliveryError::Config(format!("Failed to set up TLS for {}: {}", host, e)))
}

#[async_trait]
impl Transport for SmtpTransport {
  async fn verify(&self) -> Result<(), TransportError> {
    let handshake = tokio::time::timeout(self.timeouts.handshake(), self.transport.test_connection()).await;

    match handshake {
      Ok(Ok(true)) => Ok(()),
      Ok(Ok(false)) => Err(TransportError::network("SMTP server did not accept the connection")),
      Ok(Err(e)) => Err(e.into()),
      Err(_) => Err(TransportError::timeout(format!(
        "No SMTP greeting within {:?}",
        self.timeouts.handshake()
      ))),
    }
  }

  async fn send(&self, message: &Message) -> Result<Receipt, TransportError> {
    let response = self.transport.send(message.clone()).await?;

    Ok(Receipt {
      response: response.first_line().map(|line| format!("{} {}", response.code(), line)),
    })
  }
}
