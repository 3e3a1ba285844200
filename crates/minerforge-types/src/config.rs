//! Builder configuration types.
//!
//! `BuilderConfig` represents the `config.toml` that tells the orchestrator
//! where the build script, base mining config and output directory live, and
//! how long finished builds are retained.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level configuration for the ISO build server.
///
/// Relative paths are resolved against `project_root`. All fields have
/// defaults matching the stock project layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Root of the ISO project; the build script runs with this as cwd.
    #[serde(default = "default_project_root")]
    pub project_root: PathBuf,

    /// Script that produces the ISO.
    #[serde(default = "default_build_script")]
    pub build_script: PathBuf,

    /// Base mining configuration (JSON) merged with each request.
    #[serde(default = "default_base_config")]
    pub base_config: PathBuf,

    /// Directory the script writes the ISO into; downloads are served from here.
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,

    /// File name of the artifact a successful build leaves in `build_dir`.
    #[serde(default = "default_artifact_name")]
    pub artifact_name: String,

    /// Run the build script through `sudo`.
    #[serde(default = "default_use_sudo")]
    pub use_sudo: bool,

    /// Environment variable carrying the temporary config path to the script.
    #[serde(default = "default_config_env_var")]
    pub config_env_var: String,

    /// Backup pool written next to the requested pool URL.
    #[serde(default = "default_backup_pool_url")]
    pub backup_pool_url: String,

    /// Age (from start) after which finished builds are forgotten.
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u64,

    /// Interval between retention sweeps.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Number of trailing log lines included in status reports.
    #[serde(default = "default_status_log_lines")]
    pub status_log_lines: usize,

    /// Static front end served for non-API paths, when present.
    #[serde(default = "default_web_dir")]
    pub web_dir: PathBuf,

    /// Run at most one build at a time.
    #[serde(default)]
    pub serialize_builds: bool,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_project_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_build_script() -> PathBuf {
    PathBuf::from("build-iso.sh")
}

fn default_base_config() -> PathBuf {
    PathBuf::from("config/config.json")
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("build")
}

fn default_artifact_name() -> String {
    "a5000mine.iso".to_string()
}

fn default_use_sudo() -> bool {
    true
}

fn default_config_env_var() -> String {
    "CUSTOM_CONFIG".to_string()
}

fn default_backup_pool_url() -> String {
    "stratum+tcp://ae.f2pool.com:4040".to_string()
}

fn default_retention_hours() -> u64 {
    24
}

fn default_sweep_interval_secs() -> u64 {
    60 * 60
}

fn default_status_log_lines() -> usize {
    20
}

fn default_web_dir() -> PathBuf {
    PathBuf::from("iso-builder")
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            project_root: default_project_root(),
            build_script: default_build_script(),
            base_config: default_base_config(),
            build_dir: default_build_dir(),
            artifact_name: default_artifact_name(),
            use_sudo: default_use_sudo(),
            config_env_var: default_config_env_var(),
            backup_pool_url: default_backup_pool_url(),
            retention_hours: default_retention_hours(),
            sweep_interval_secs: default_sweep_interval_secs(),
            status_log_lines: default_status_log_lines(),
            web_dir: default_web_dir(),
            serialize_builds: false,
            host: default_host(),
            port: default_port(),
        }
    }
}

impl BuilderConfig {
    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    pub fn script_path(&self) -> PathBuf {
        self.resolve(&self.build_script)
    }

    pub fn base_config_path(&self) -> PathBuf {
        self.resolve(&self.base_config)
    }

    pub fn build_dir_path(&self) -> PathBuf {
        self.resolve(&self.build_dir)
    }

    pub fn web_dir_path(&self) -> PathBuf {
        self.resolve(&self.web_dir)
    }

    /// Where a successful build must leave its ISO.
    pub fn artifact_path(&self) -> PathBuf {
        self.build_dir_path().join(&self.artifact_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_config_default_values() {
        let config = BuilderConfig::default();
        assert_eq!(config.artifact_name, "a5000mine.iso");
        assert_eq!(config.retention_hours, 24);
        assert_eq!(config.status_log_lines, 20);
        assert_eq!(config.config_env_var, "CUSTOM_CONFIG");
        assert!(config.use_sudo);
        assert!(!config.serialize_builds);
    }

    #[test]
    fn test_builder_config_deserialize_with_defaults() {
        let config: BuilderConfig = toml::from_str("").unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.sweep_interval_secs, 3600);
        assert_eq!(config.build_script, PathBuf::from("build-iso.sh"));
    }

    #[test]
    fn test_builder_config_deserialize_with_values() {
        let toml_str = r#"
project_root = "/srv/a5000mine"
build_dir = "/var/lib/isos"
use_sudo = false
retention_hours = 6
serialize_builds = true
port = 3000
"#;
        let config: BuilderConfig = toml::from_str(toml_str).unwrap();
        assert!(!config.use_sudo);
        assert!(config.serialize_builds);
        assert_eq!(config.retention_hours, 6);
        assert_eq!(config.port, 3000);
        assert_eq!(
            config.script_path(),
            PathBuf::from("/srv/a5000mine/build-iso.sh")
        );
        assert_eq!(
            config.artifact_path(),
            PathBuf::from("/var/lib/isos/a5000mine.iso")
        );
    }
}
