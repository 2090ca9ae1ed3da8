//! Tracing subscriber setup for binaries and tests embedding the client.
//!
//! The core itself only emits `tracing` events inside its `core` span; this
//! installs a subscriber that prints them.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Subscriber settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Filter used when `RUST_LOG` is not set.
    pub log_level: String,
    /// Emit JSON lines instead of human readable output.
    pub json_logs: bool,
    /// Include the event target.
    pub with_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info,ledger_client=debug".to_string(),
            json_logs: false,
            with_target: true,
        }
    }
}

/// Subscriber installation errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Filter directive could not be parsed.
    #[error("invalid log filter: {0}")]
    Filter(String),

    /// A global subscriber is already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Init(String),
}

/// Install the global subscriber. `RUST_LOG` overrides `config.log_level`.
pub fn init_tracing(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TelemetryError::Filter(e.to_string()))?;

    if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(config.with_target)
            .with_current_span(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| TelemetryError::Init(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(config.with_target)
            .with_thread_ids(false);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::Init(e.to_string()))?;
    }

    tracing::debug!(level = %config.log_level, json = config.json_logs, "tracing initialized");
    Ok(())
}
