use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::config::LoggingConfig;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Build the env filter: `RUST_LOG` wins, then the configured level, then `info`.
pub fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn build_fmt_layer(config: &LoggingConfig) -> Result<BoxedLayer> {
    let json = config.format == "json";

    let layer: BoxedLayer = match (&config.file_path, json) {
        (Some(file_path), json) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)
                .with_context(|| format!("Failed to open log file {}", file_path))?;
            let base = fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            if json {
                base.json().boxed()
            } else {
                base.boxed()
            }
        }
        (None, true) => fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
        (None, false) => fmt::layer().with_span_events(FmtSpan::CLOSE).boxed(),
    };

    Ok(layer)
}

pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let fmt_layer = build_fmt_layer(config)?;

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(build_env_filter(config)))
        .try_init()
        .context("Global tracing subscriber already installed")?;

    tracing::info!(
        level = %config.level,
        format = %config.format,
        "Logging initialized"
    );
    Ok(())
}

/// `error!` with the error attached as a display field
#[macro_export]
macro_rules! log_error {
    ($err:expr, $($arg:tt)+) => {
        tracing::error!(error = %$err, $($arg)+)
    };
}

/// `warn!` with the error attached as a display field
#[macro_export]
macro_rules! log_warn {
    ($err:expr, $($arg:tt)+) => {
        tracing::warn!(error = %$err, $($arg)+)
    };
}
