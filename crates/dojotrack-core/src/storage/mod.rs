pub mod config;
pub mod database;
pub mod migrations;

pub use config::Config;
pub use database::Database;

use std::path::PathBuf;

/// Returns `~/.config/dojotrack[-dev]/` based on DOJOTRACK_ENV.
///
/// Set DOJOTRACK_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("DOJOTRACK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("dojotrack-dev")
    } else {
        base_dir.join("dojotrack")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
