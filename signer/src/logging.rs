//! # Structured Logging
//!
//! The signer itself only emits `tracing` events; it never installs a
//! subscriber on its own. Binaries and tests that want to see those events
//! call [`init_logging`] (or [`try_init_logging`]) once at startup.
//!
//! Output goes to stderr so stdout stays free for the raw transaction hex.
//! Key material is never logged, only ids and counts.

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, colored output.
    #[default]
    Pretty,
    /// JSON lines.
    Json,
}

impl LogFormat {
    /// Accepts "json" or "pretty" (case-insensitive). Anything else is `Pretty`.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Installs the global subscriber, failing if one is already set.
///
/// `RUST_LOG` overrides `default_level` when present, e.g.
///
/// ```text
/// RUST_LOG=tx_signer=debug
/// ```
pub fn try_init_logging(default_level: &str, format: LogFormat) -> Result<(), TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()?,
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr).with_target(true))
            .try_init()?,
    }

    tracing::debug!(?format, "logging initialized");
    Ok(())
}

/// Like [`try_init_logging`], but a second call is silently ignored.
pub fn init_logging(default_level: &str, format: LogFormat) {
    let _ = try_init_logging(default_level, format);
}
