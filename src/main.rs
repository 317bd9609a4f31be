//! Binary entry point: parse flags, bring up logging and the preference
//! store, load the catalog, and drive the Ratatui event loop until the user
//! exits.
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use choir_hymn_reader::store::data_dir;
use choir_hymn_reader::{
    load_or_fallback, load_preferences, open_store, run_app, App, AppConfig, Args,
};

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "choir_hymn_reader=info";

fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = init_logging(args.log_dir.clone())?;
    info!("choir-hymn-reader v{} starting", env!("CARGO_PKG_VERSION"));

    let conn = open_store(args.db.as_deref())?;
    let prefs = load_preferences(&conn)?;
    let (catalog, load_error) = load_or_fallback(args.data.as_deref());
    let config = AppConfig::from(&args);

    let mut app = App::new(conn, catalog, prefs, config, load_error);
    let result = run_app(&mut app);
    if let Err(err) = &result {
        tracing::error!(error = %err, "exiting with error");
    }
    result
}

/// Write logs to a daily rolling file. The terminal belongs to the TUI, so
/// nothing is written to stdout or stderr.
fn init_logging(log_dir: Option<PathBuf>) -> Result<WorkerGuard> {
    let log_dir = match log_dir {
        Some(dir) => dir,
        None => data_dir()?.join("logs"),
    };
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "choir-hymn-reader.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(guard)
}
