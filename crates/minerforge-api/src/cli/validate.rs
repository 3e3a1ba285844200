//! Offline validation of a build request file.

use std::path::Path;

use anyhow::{Context, Result, bail};
use console::style;
use serde_json::Value;

use minerforge_core::build::validate::parse_request;
use minerforge_infra::build::base_config::{load_base_config, merge_request};
use minerforge_types::config::BuilderConfig;

/// Validate the request in `file` and print the config the build script would receive.
///
/// The base config is optional here; without it only the normalized request
/// is printed.
pub async fn validate_request(config: &BuilderConfig, file: &Path, json: bool) -> Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let raw: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;

    let effective = match effective_config(config, &raw).await {
        Ok(effective) => effective,
        Err(err) => {
            if !json {
                println!();
                println!("  {} {}", style("✗").red(), style(&err).red());
                println!();
            }
            bail!("invalid build request: {err}");
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&effective.value)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {} is a valid build request",
        style("✓").green(),
        style(file.display()).cyan()
    );
    if !effective.merged {
        println!(
            "  {} base config {} not found; showing the request only",
            style("!").yellow(),
            style(config.base_config_path().display()).dim()
        );
    }
    println!();
    println!("{}", serde_json::to_string_pretty(&effective.value)?);
    println!();

    Ok(())
}

/// Result of validating a request against the configured base config.
#[derive(Debug)]
struct EffectiveConfig {
    value: Value,
    /// False when the base config was absent and `value` is the bare request.
    merged: bool,
}

async fn effective_config(config: &BuilderConfig, raw: &Value) -> Result<EffectiveConfig> {
    let request = parse_request(raw)?;

    let base_path = config.base_config_path();
    if !tokio::fs::try_exists(&base_path).await.unwrap_or(false) {
        return Ok(EffectiveConfig {
            value: serde_json::to_value(&request)?,
            merged: false,
        });
    }

    let base = load_base_config(&base_path).await?;
    Ok(EffectiveConfig {
        value: merge_request(base, &request, &config.backup_pool_url),
        merged: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> BuilderConfig {
        BuilderConfig {
            project_root: dir.path().to_path_buf(),
            ..BuilderConfig::default()
        }
    }

    fn request() -> Value {
        json!({
            "wallet": "ak_abc",
            "worker_name": "rig-7",
            "pool_url": "stratum+tcp://pool:3333",
            "power_limit": "250",
            "core_offset": 100,
            "mem_offset": 800,
        })
    }

    #[tokio::test]
    async fn without_base_config_returns_normalized_request() {
        let dir = TempDir::new().unwrap();
        let effective = effective_config(&config_in(&dir), &request()).await.unwrap();

        assert!(!effective.merged);
        assert_eq!(effective.value["power_limit"], 250);
        assert_eq!(effective.value["wallet"], "ak_abc");
    }

    #[tokio::test]
    async fn merges_into_base_config_when_present() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        std::fs::create_dir_all(config.base_config_path().parent().unwrap()).unwrap();
        std::fs::write(config.base_config_path(), r#"{"keep": true}"#).unwrap();

        let effective = effective_config(&config, &request()).await.unwrap();

        assert!(effective.merged);
        assert_eq!(effective.value["keep"], true);
        assert_eq!(effective.value["worker_name"], "rig-7");
        assert_eq!(effective.value["gpu"]["power_limit"], 250);
        assert_eq!(effective.value["pool"]["backup_url"], config.backup_pool_url);
    }

    #[tokio::test]
    async fn rejects_invalid_request() {
        let dir = TempDir::new().unwrap();
        let mut raw = request();
        raw["power_limit"] = json!(500);

        let err = effective_config(&config_in(&dir), &raw).await.unwrap_err();
        assert!(err.to_string().contains("power limit 500"));
    }
}
