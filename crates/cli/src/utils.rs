use eyre::{Result, WrapErr};
use portal_config::Config;
use portal_mint::PlayerProgress;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Initializes a tracing subscriber that logs to stderr, filtered by `RUST_LOG`.
pub fn subscriber() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// The progress file from `config`.
pub fn progress_path(config: &Config) -> Result<PathBuf> {
    config
        .progress_path()
        .ok_or_else(|| eyre::eyre!("could not determine a data directory, set `progress_file`"))
}

/// Loads the progress stored at the configured location.
pub fn load_progress(config: &Config) -> Result<(PathBuf, PlayerProgress)> {
    let path = progress_path(config)?;
    let progress = PlayerProgress::load(&path).wrap_err("could not read player progress")?;
    Ok((path, progress))
}
