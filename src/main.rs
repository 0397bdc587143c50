use std::env;

use anyhow::Context;
use dotenvy::dotenv;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use redigo_mailer::app::create_app;
use redigo_mailer::config::MailerConfig;
use redigo_mailer::email::{spawn_startup_probe, DeliveryPolicy};
use redigo_mailer::state::SharedAppState;
use redigo_mailer::utils::init_email_service;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenv().ok();

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let config = MailerConfig::from_env()?;
  let email_service = init_email_service(&config)?;

  if email_service.policy() == DeliveryPolicy::RetryOnce {
    spawn_startup_probe(email_service.clone(), config.probe_delay);
  }

  let app = create_app(SharedAppState::new(email_service));

  let addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
  let listener = tokio::net::TcpListener::bind(&addr)
    .await
    .with_context(|| format!("Failed to bind {}", addr))?;

  tracing::info!("Server running on http://{}", addr);

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

  Ok(())
}

async fn shutdown_signal() {
  let ctrl_c = async {
    signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
  };

  #[cfg(unix)]
  let terminate = async {
    signal::unix::signal(signal::unix::SignalKind::terminate())
      .expect("Failed to install signal handler")
      .recv()
      .await;
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
      _ = ctrl_c => {},
      _ = terminate => {},
  }

  tracing::info!("Received termination signal, shutting down gracefully...");
}
