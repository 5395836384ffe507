//! Shelf CLI Library
//!
//! Command implementations for the `shelf` binary.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (check, new, render)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use shelf::cmd;
//!
//! // Validate every collection under the configured content directory
//! cmd::check::run(Path::new("shelf.toml"), false).unwrap();
//! ```

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
pub use shelf_core::Config;
pub use shelf_loader::{ContentCollector, SiteContent};

pub mod cmd;

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

/// Load configuration, resolving relative paths against the config file's
/// directory.
pub fn load_config(config_path: &Path) -> Result<Config> {
    let mut config = Config::load_with_env(config_path).wrap_err_with(|| {
        format!("Failed to load configuration from {}", config_path.display())
    })?;

    let root = site_root(config_path);
    if config.site.content_dir.is_relative() {
        config.site.content_dir = root.join(&config.site.content_dir);
    }
    if let Some(dir) = config.markdown.theme_dir.as_mut()
        && dir.is_relative()
    {
        *dir = root.join(&*dir);
    }

    Ok(config)
}

/// Directory containing the configuration file.
pub fn site_root(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
