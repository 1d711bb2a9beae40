mod config;
pub mod database;

pub use config::{Config, NotificationsConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/sunguard[-dev]/`, creating it if needed.
///
/// `SUNGUARD_ENV=dev` selects the development directory. `SUNGUARD_DATA_DIR`
/// overrides the location entirely (used by tests).
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("SUNGUARD_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("SUNGUARD_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("sunguard-dev")
            } else {
                base_dir.join("sunguard")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
