use std::{env, str::FromStr, time::Duration};

use anyhow::{bail, Context, Result};

use crate::email::{CredentialPresence, DeliveryPolicy, PoolSettings, SmtpEndpoint, TlsMode, TransportConfig};

const DEFAULT_PROBE_DELAY_MS: u64 = 2_000;
const DEFAULT_POOL_MAX_CONNECTIONS: u32 = 5;
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct MailerConfig {
  pub sender: Option<String>,
  pub policy: DeliveryPolicy,
  pub primary: TransportConfig,
  pub fallback: Option<TransportConfig>,
  pub probe_delay: Duration,
}

impl MailerConfig {
  pub fn from_env() -> Result<Self> {
    let user = non_empty_var("EMAIL");
    let password = non_empty_var("EMAIL_PASSWORD");

    if user.is_none() {
      tracing::warn!("EMAIL is not set, mail will be sent from a placeholder address");
    }
    if password.is_none() {
      tracing::warn!("EMAIL_PASSWORD is not set, SMTP authentication will fail");
    }

    let policy = match non_empty_var("MAIL_DELIVERY_POLICY") {
      Some(value) => value.parse::<DeliveryPolicy>().map_err(anyhow::Error::msg)?,
      None => DeliveryPolicy::default(),
    };

    let mut primary = match non_empty_var("SMTP_HOST") {
      Some(host) => TransportConfig {
        endpoint: SmtpEndpoint::Host {
          host,
          port: parse_var("SMTP_PORT", 465)?,
          tls: parse_tls(non_empty_var("SMTP_TLS").as_deref())?,
        },
        ..TransportConfig::gmail_service(user.clone(), password.clone())
      },
      None => TransportConfig::gmail_service(user.clone(), password.clone()),
    };

    if policy == DeliveryPolicy::ProbeBeforeSend {
      primary = primary.with_pool(PoolSettings {
        max_connections: parse_var("MAIL_POOL_MAX_CONNECTIONS", DEFAULT_POOL_MAX_CONNECTIONS)?,
        idle_timeout: POOL_IDLE_TIMEOUT,
      });
    }

    let fallback = match policy {
      DeliveryPolicy::RetryOnce => Some(TransportConfig::gmail_direct(user.clone(), password)),
      DeliveryPolicy::None | DeliveryPolicy::ProbeBeforeSend => None,
    };

    Ok(MailerConfig {
      sender: user,
      policy,
      primary,
      fallback,
      probe_delay: Duration::from_millis(parse_var("MAIL_PROBE_DELAY_MS", DEFAULT_PROBE_DELAY_MS)?),
    })
  }

  pub fn credential_presence(&self) -> CredentialPresence {
    CredentialPresence::from_values(self.primary.username.as_deref(), self.primary.password.as_deref())
  }
}

fn non_empty_var(name: &str) -> Option<String> {
  env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::error::Error + Send + Sync + 'static,
{
  match non_empty_var(name) {
    Some(value) => value
      .trim()
      .parse()
      .with_context(|| format!("{} has an invalid value: {}", name, value)),
    None => Ok(default),
  }
}

fn parse_tls(value: Option<&str>) -> Result<TlsMode> {
  match value.map(|v| v.to_lowercase()) {
    None => Ok(TlsMode::Wrapper),
    Some(v) => match v.as_str() {
      "none" => Ok(TlsMode::None),
      "starttls" => Ok(TlsMode::StartTls),
      "tls" | "wrapper" => Ok(TlsMode::Wrapper),
      other => bail!("SMTP_TLS has an invalid value: {}", other),
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  const VARS: [&str; 8] = [
    "EMAIL",
    "EMAIL_PASSWORD",
    "MAIL_DELIVERY_POLICY",
    "MAIL_PROBE_DELAY_MS",
    "MAIL_POOL_MAX_CONNECTIONS",
    "SMTP_HOST",
    "SMTP_PORT",
    "SMTP_TLS",
  ];

  fn clear_env() {
    for var in VARS {
      env::remove_var(var);
    }
  }

  #[test]
  #[serial]
  fn test_defaults_use_gmail_with_fallback() {
    clear_env();
    env::set_var("EMAIL", "sender@gmail.com");
    env::set_var("EMAIL_PASSWORD", "app-secret");

    let config = MailerConfig::from_env().unwrap();

    assert_eq!(config.policy, DeliveryPolicy::RetryOnce);
    assert_eq!(config.sender.as_deref(), Some("sender@gmail.com"));
    assert_eq!(config.primary.endpoint, SmtpEndpoint::Service("gmail".to_string()));
    assert_eq!(config.primary.timeouts.connect, Duration::from_secs(20));
    assert!(config.primary.pool.is_none());

    let fallback = config.fallback.as_ref().expect("fallback transport");
    assert_eq!(fallback.timeouts.greeting, Duration::from_secs(8));
    assert_eq!(config.probe_delay, Duration::from_secs(2));

    let presence = config.credential_presence();
    assert!(presence.user_configured && presence.password_configured);

    clear_env();
  }

  #[test]
  #[serial]
  fn test_missing_credentials_are_not_fatal() {
    clear_env();

    let config = MailerConfig::from_env().unwrap();

    assert!(config.sender.is_none());
    assert_eq!(config.credential_presence(), CredentialPresence::default());
  }

  #[test]
  #[serial]
  fn test_probe_before_send_is_pooled_without_fallback() {
    clear_env();
    env::set_var("MAIL_DELIVERY_POLICY", "probe-before-send");
    env::set_var("MAIL_POOL_MAX_CONNECTIONS", "3");

    let config = MailerConfig::from_env().unwrap();

    assert_eq!(config.policy, DeliveryPolicy::ProbeBeforeSend);
    assert!(config.fallback.is_none());
    assert_eq!(config.primary.pool.map(|p| p.max_connections), Some(3));

    clear_env();
  }

  #[test]
  #[serial]
  fn test_smtp_host_overrides_primary_endpoint() {
    clear_env();
    env::set_var("SMTP_HOST", "mailhog");
    env::set_var("SMTP_PORT", "1025");
    env::set_var("SMTP_TLS", "none");

    let config = MailerConfig::from_env().unwrap();

    assert_eq!(
      config.primary.endpoint,
      SmtpEndpoint::Host {
        host: "mailhog".to_string(),
        port: 1025,
        tls: TlsMode::None,
      }
    );

    clear_env();
  }

  #[test]
  #[serial]
  fn test_invalid_values_are_rejected() {
    clear_env();
    env::set_var("MAIL_DELIVERY_POLICY", "sometimes");
    assert!(MailerConfig::from_env().is_err());

    clear_env();
    env::set_var("MAIL_PROBE_DELAY_MS", "soon");
    assert!(MailerConfig::from_env().is_err());

    clear_env();
    env::set_var("SMTP_HOST", "smtp.example.com");
    env::set_var("SMTP_TLS", "maybe");
    assert!(MailerConfig::from_env().is_err());

    clear_env();
  }
}
