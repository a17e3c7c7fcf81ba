// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Tracing subscriber setup shared by every command.

use anyhow::{Context, Result};
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;

/// Output encoding of the log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// Anything other than `json` falls back to human-readable text.
    pub fn parse(format: &str) -> Self {
        if format.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

fn env_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Failed to create log filter")
}

/// Compact text subscriber for messages emitted while the configuration that
/// selects the real one is still being loaded. Install it with
/// [`tracing::subscriber::with_default`].
pub fn bootstrap_subscriber(level: &str) -> Result<impl Subscriber + Send + Sync + 'static> {
    Ok(tracing_subscriber::fmt()
        .with_env_filter(env_filter(level)?)
        .with_target(false)
        .compact()
        .finish())
}

/// Initialize the global tracing subscriber. `RUST_LOG` wins over `level`.
pub fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level)?)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        LogFormat::Json => builder.json().with_current_span(false).try_init(),
        LogFormat::Text => builder.with_target(false).compact().try_init(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("text"), LogFormat::Text);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Text);
    }

    #[test]
    fn test_bootstrap_subscriber_honours_level() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }

        let info = bootstrap_subscriber("info").unwrap();
        assert!(tracing::subscriber::with_default(info, || {
            tracing::enabled!(tracing::Level::INFO)
        }));

        let warn = bootstrap_subscriber("warn").unwrap();
        assert!(!tracing::subscriber::with_default(warn, || {
            tracing::enabled!(tracing::Level::INFO)
        }));
    }
}
