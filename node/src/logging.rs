//! # Structured Logging
//!
//! Initializes the `tracing` subscriber with a configurable format and
//! environment-based filtering via `RUST_LOG`.
//!
//! Log output goes to stderr so stdout stays clean for structured data —
//! the `export` subcommand writes CSV to stdout and must not find log
//! lines in the middle of it.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable output for local operation.
    Pretty,
    /// JSON lines for log aggregation.
    Json,
}

impl LogFormat {
    /// Parses a format name. Accepts "json" or "pretty" (case-insensitive);
    /// anything else falls back to `Pretty`.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Initializes the global tracing subscriber.
///
/// Call exactly once, early in `main()`. `RUST_LOG` overrides
/// `default_level` when set, using the usual `EnvFilter` directive
/// syntax (e.g. `vera_node=debug,vera_ledger=info`).
pub fn init_logging(default_level: &str, format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(true),
                )
                .init();
        }
    }
}
