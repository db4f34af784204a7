use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{fmt, EnvFilter};

/// Install a file-backed subscriber when `DB_VIEWER_LOG` names a file.
/// Writing to the terminal would corrupt the TUI, so without it events are dropped.
pub fn init() -> Result<()> {
    let Ok(path) = std::env::var("DB_VIEWER_LOG") else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {path}"))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))?;
    tracing::info!(%path, "logging initialised");
    Ok(())
}
