use std::{
  sync::{Arc, RwLock},
  time::Duration,
};

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use super::{service::EmailService, types::DeliveryPolicy};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationState {
  #[default]
  Unknown,
  PrimaryOk,
  FallbackOk,
  AllFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome {
  Primary,
  Fallback,
  Failed,
}

impl From<ProbeOutcome> for VerificationState {
  fn from(outcome: ProbeOutcome) -> Self {
    match outcome {
      ProbeOutcome::Primary => VerificationState::PrimaryOk,
      ProbeOutcome::Fallback => VerificationState::FallbackOk,
      ProbeOutcome::Failed => VerificationState::AllFailed,
    }
  }
}

/// Shared, cheaply cloneable cache of the last connectivity probe.
///
/// Written by the startup probe, read by every send. Readers never wait on
/// the probe: until it lands they see `Unknown`.
#[derive(Debug, Clone, Default)]
pub struct ProbeState {
  inner: Arc<RwLock<VerificationState>>,
}

impl ProbeState {
  pub fn new(state: VerificationState) -> Self {
    Self {
      inner: Arc::new(RwLock::new(state)),
    }
  }

  pub fn get(&self) -> VerificationState {
    self.inner.read().map(|state| *state).unwrap_or_default()
  }

  /// Stores the first probe result. Once the state has left `Unknown`
  /// later writes are ignored, so it can never return to `Unknown` either.
  /// Returns whether the write took effect.
  pub fn record(&self, outcome: ProbeOutcome) -> bool {
    match self.inner.write() {
      Ok(mut state) if *state == VerificationState::Unknown => {
        *state = outcome.into();
        true
      }
      _ => false,
    }
  }
}

/// Runs `verify_transporter` once, `delay` after being called. Under
/// `RetryOnce` the result is cached in the service's probe state; this is the
/// only place that state is written.
pub fn spawn_startup_probe(service: Arc<EmailService>, delay: Duration) -> JoinHandle<ProbeOutcome> {
  tokio::spawn(async move {
    tokio::time::sleep(delay).await;
    let outcome = service.verify_transporter().await;
    if service.policy() == DeliveryPolicy::RetryOnce {
      service.probe_state().record(outcome);
    }
    tracing::info!(?outcome, "Startup SMTP probe finished");
    outcome
  })
}
