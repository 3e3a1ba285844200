//! Builder configuration loader for minerforge.
//!
//! Reads `config.toml` and deserializes it into [`BuilderConfig`]. Falls back
//! to defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};

use minerforge_types::config::BuilderConfig;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "MINERFORGE_CONFIG";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "MINERFORGE_DATA_DIR";

/// Resolve the data directory: `$MINERFORGE_DATA_DIR`, else `~/.minerforge`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".minerforge");
    }

    PathBuf::from(".minerforge")
}

/// Pick the config file to load.
///
/// Priority:
/// 1. Explicit path (the `--config` flag)
/// 2. `$MINERFORGE_CONFIG`
/// 3. `{data_dir}/config.toml`
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    resolve_data_dir().join("config.toml")
}

/// Load builder configuration from `config_path`.
///
/// - If the file does not exist, returns [`BuilderConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - Otherwise returns the parsed config.
pub async fn load_builder_config(config_path: &Path) -> BuilderConfig {
    let content = match tokio::fs::read_to_string(config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(
                "No config found at {}, using defaults",
                config_path.display()
            );
            return BuilderConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return BuilderConfig::default();
        }
    };

    match toml::from_str::<BuilderConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            BuilderConfig::default()
        }
    }
}
