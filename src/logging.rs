//! File-based logging.
//!
//! The terminal UI owns stdout, so log lines go to
//! `<config dir>/walk-metronome/walk-metronome.log`. `RUST_LOG` overrides
//! the default filter.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILE: &str = "walk-metronome.log";
const DEFAULT_FILTER: &str = "walk_metronome=info";

/// Initializes the global subscriber.
///
/// The returned guard must live until shutdown so buffered lines are
/// flushed. Returns `None` when the log directory is unusable; logging is
/// then disabled after one line on stderr.
pub fn init(log_dir: &Path) -> Option<WorkerGuard> {
    if let Err(err) = std::fs::create_dir_all(log_dir) {
        // The subscriber is not up yet, so this is the only place to say it.
        eprintln!("failed to create log directory {log_dir:?}: {err}, logging disabled");
        return None;
    }

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(filter)
        .init();

    tracing::info!(
        log_file = ?log_dir.join(LOG_FILE),
        version = env!("CARGO_PKG_VERSION"),
        "logging initialized"
    );
    Some(guard)
}
