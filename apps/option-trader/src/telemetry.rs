//! Tracing setup for an interactive terminal process.
//!
//! Structured logs go to a file rather than stdout/stderr, which the
//! status line owns while the monitor runs. `RUST_LOG` controls the
//! level and defaults to `option_trader=info`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber writing to `log_path`.
///
/// Appends to an existing file so restarts do not lose history.
pub fn init_tracing(log_path: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("option_trader=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    tracing::info!(path = %log_path.display(), "Logging initialized");
    Ok(())
}
