//!
//! src/logging.rs  Andrew Belles  Oct 15th, 2026
//!
//! Initializes logger. Stdout belongs to the dashboard, so events go to
//! stderr or to a log file and never interleave with rendered views
//!
//!

use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use tracing_error::ErrorLayer;
use tracing_appender::non_blocking;

use crate::config::{LogFormat, LoggingConfig};
use crate::errors::DashboardError;

pub const LOG_FILE: &str = "rec-dashboard.log";

pub struct LoggingGuard(tracing_appender::non_blocking::WorkerGuard);

pub fn init_logging(cfg: &LoggingConfig) -> Result<LoggingGuard, DashboardError> {
    let (writer, guard) = match &cfg.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            non_blocking(tracing_appender::rolling::never(dir, LOG_FILE))
        },
        None => non_blocking(std::io::stderr())
    };

    let filter = std::env::var("RUST_LOG")
        .ok()
        .map(EnvFilter::new)
        .unwrap_or_else(|| EnvFilter::new(cfg.filter_directives.clone()));

    let time = tracing_subscriber::fmt::time::UtcTime::rfc_3339();
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(ErrorLayer::default());

    let init = match cfg.format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .with_writer(writer)
                .with_timer(time)
                .with_target(cfg.include_target)
                .with_file(cfg.include_file_line)
                .with_line_number(cfg.include_file_line)
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_span_list(true);
            registry.with(fmt_layer).try_init()
        },
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .with_writer(writer)
                .with_timer(time)
                .with_ansi(cfg.log_dir.is_none())
                .with_target(cfg.include_target)
                .with_file(cfg.include_file_line)
                .with_line_number(cfg.include_file_line);
            registry.with(fmt_layer).try_init()
        }
    };
    init.map_err(|e| DashboardError::Config(format!("logger init: {e}")))?;

    Ok( LoggingGuard(guard) )
}
