//! Effective build configuration.
//!
//! The build script reads one JSON file: the project's base mining config
//! with the requester's wallet, pool and GPU settings layered on top. Each
//! build gets its own copy in a temporary file that is deleted when the
//! returned [`NamedTempFile`] is dropped.

use std::io::Write;
use std::path::Path;

use serde_json::{Value, json};
use tempfile::NamedTempFile;

use minerforge_types::build::BuildRequest;
use minerforge_types::error::BuildError;

/// GPU index the generated config targets.
const GPU_DEVICE_ID: u32 = 0;

/// Read the base config. It must be a JSON object.
pub async fn load_base_config(path: &Path) -> Result<Value, BuildError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| BuildError::BaseConfig(format!("{}: {e}", path.display())))?;

    let value: Value = serde_json::from_str(&content)
        .map_err(|e| BuildError::BaseConfig(format!("{}: {e}", path.display())))?;

    if !value.is_object() {
        return Err(BuildError::BaseConfig(format!(
            "{}: expected a JSON object",
            path.display()
        )));
    }

    Ok(value)
}

/// Layer a request over the base config.
///
/// Replaces the top-level `wallet`, `worker_name`, `pool` and `gpu` keys and
/// leaves every other key untouched.
pub fn merge_request(mut base: Value, request: &BuildRequest, backup_pool_url: &str) -> Value {
    if !base.is_object() {
        base = json!({});
    }

    if let Some(obj) = base.as_object_mut() {
        obj.insert("wallet".to_string(), json!(request.wallet));
        obj.insert("worker_name".to_string(), json!(request.worker_name));
        obj.insert(
            "pool".to_string(),
            json!({
                "url": request.pool_url,
                "backup_url": backup_pool_url,
            }),
        );
        obj.insert(
            "gpu".to_string(),
            json!({
                "device_id": GPU_DEVICE_ID,
                "power_limit": request.power_limit,
                "core_offset": request.core_offset,
                "mem_offset": request.mem_offset,
            }),
        );
    }

    base
}

/// Write `config` to a fresh `.json` temporary file.
pub fn write_temp_config(config: &Value) -> Result<NamedTempFile, BuildError> {
    let mut file = tempfile::Builder::new()
        .prefix("minerforge-build-")
        .suffix(".json")
        .tempfile()?;

    serde_json::to_writer_pretty(file.as_file_mut(), config)
        .map_err(|e| BuildError::Internal(format!("failed to serialize build config: {e}")))?;
    file.as_file_mut().flush()?;

    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn request() -> BuildRequest {
        BuildRequest {
            wallet: "ak_abc".to_string(),
            worker_name: "w1".to_string(),
            pool_url: "stratum+tcp://pool:3333".to_string(),
            power_limit: 200,
            core_offset: 100,
            mem_offset: 800,
        }
    }

    #[test]
    fn merge_overrides_request_keys_and_keeps_the_rest() {
        let base = json!({
            "wallet": "ak_default",
            "miner": "lolminer",
            "pool": { "url": "stratum+tcp://old:1", "tls": true },
            "monitoring": { "interval": 30 },
        });

        let merged = merge_request(base, &request(), "stratum+tcp://backup:4040");

        assert_eq!(merged["wallet"], "ak_abc");
        assert_eq!(merged["worker_name"], "w1");
        assert_eq!(merged["miner"], "lolminer");
        assert_eq!(merged["monitoring"]["interval"], 30);
        assert_eq!(
            merged["pool"],
            json!({ "url": "stratum+tcp://pool:3333", "backup_url": "stratum+tcp://backup:4040" })
        );
        assert_eq!(
            merged["gpu"],
            json!({ "device_id": 0, "power_limit": 200, "core_offset": 100, "mem_offset": 800 })
        );
    }

    #[tokio::test]
    async fn load_base_config_reports_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = load_base_config(&tmp.path().join("config.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::BaseConfig(_)));
    }

    #[tokio::test]
    async fn load_base_config_rejects_non_objects() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        tokio::fs::write(&path, "[1, 2]").await.unwrap();

        let err = load_base_config(&path).await.unwrap_err();
        assert!(err.to_string().contains("expected a JSON object"));
    }

    #[test]
    fn temp_config_is_removed_on_drop() {
        let file = write_temp_config(&json!({ "wallet": "ak_abc" })).unwrap();
        let path = file.path().to_path_buf();

        assert!(path.extension().is_some_and(|ext| ext == "json"));
        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["wallet"], "ak_abc");

        drop(file);
        assert!(!path.exists());
    }
}
