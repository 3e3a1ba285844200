use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Unique identifier for a build, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildId(pub Uuid);

impl BuildId {
    /// Create a new BuildId using UUID v7.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for BuildId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BuildId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A validated ISO build request.
///
/// Produced from raw JSON by the validator in `minerforge-core`; holding a
/// `BuildRequest` means every field already passed its checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequest {
    /// Payout wallet address (`ak_` prefixed).
    pub wallet: String,
    /// Worker name reported to the pool.
    pub worker_name: String,
    /// Primary pool URL (`stratum+tcp://`).
    pub pool_url: String,
    /// GPU power limit in watts.
    pub power_limit: i64,
    /// GPU core clock offset in MHz.
    pub core_offset: i64,
    /// GPU memory clock offset in MHz.
    pub mem_offset: i64,
}

/// Build lifecycle states.
///
/// `Running` is the only non-terminal state. A record moves to `Completed`
/// or `Failed` exactly once and never leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    Running,
    Completed,
    Failed,
}

impl BuildStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, BuildStatus::Running)
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildStatus::Running => write!(f, "running"),
            BuildStatus::Completed => write!(f, "completed"),
            BuildStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for BuildStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "running" => Ok(BuildStatus::Running),
            "completed" => Ok(BuildStatus::Completed),
            "failed" => Ok(BuildStatus::Failed),
            other => Err(format!("invalid build status: '{other}'")),
        }
    }
}

/// In-memory state of one ISO build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRecord {
    pub id: BuildId,
    pub status: BuildStatus,
    /// 0-100, never decreases while the build is running.
    pub progress: u8,
    /// Latest human-readable phase description.
    pub message: String,
    /// Every output line of the build, in arrival order.
    pub logs: Vec<String>,
    /// Artifact file name, set only once the build completed.
    pub filename: Option<String>,
    /// Failure description, set only once the build failed.
    pub error: Option<String>,
    pub start_time: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl BuildRecord {
    /// A freshly submitted build: running, progress 0, one log line.
    pub fn new(id: BuildId, start_time: DateTime<Utc>) -> Self {
        Self {
            id,
            status: BuildStatus::Running,
            progress: 0,
            message: "Initializing build...".to_string(),
            logs: vec!["Build process started".to_string()],
            filename: None,
            error: None,
            start_time,
            finished_at: None,
        }
    }

    /// Read-only view of the record with only the last `tail` log lines.
    pub fn snapshot(&self, tail: usize) -> BuildSnapshot {
        let skip = self.logs.len().saturating_sub(tail);
        BuildSnapshot {
            status: self.status,
            progress: self.progress,
            message: self.message.clone(),
            logs: self.logs[skip..].to_vec(),
            filename: match self.status {
                BuildStatus::Completed => self.filename.clone(),
                _ => None,
            },
            error: match self.status {
                BuildStatus::Failed => self.error.clone(),
                _ => None,
            },
        }
    }
}

/// Status report returned to pollers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSnapshot {
    pub status: BuildStatus,
    pub progress: u8,
    pub message: String,
    pub logs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_id_roundtrip_through_string() {
        let id = BuildId::new();
        let parsed: BuildId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_build_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<BuildId>().is_err());
    }

    #[test]
    fn test_build_ids_are_unique() {
        let a = BuildId::new();
        let b = BuildId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_build_status_serializes_lowercase() {
        let json = serde_json::to_string(&BuildStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
        assert_eq!("FAILED".parse::<BuildStatus>().unwrap(), BuildStatus::Failed);
        assert!("queued".parse::<BuildStatus>().is_err());
    }

    #[test]
    fn test_new_record_is_running() {
        let record = BuildRecord::new(BuildId::new(), Utc::now());
        assert_eq!(record.status, BuildStatus::Running);
        assert_eq!(record.progress, 0);
        assert_eq!(record.logs, vec!["Build process started".to_string()]);
        assert!(!record.status.is_terminal());
    }

    #[test]
    fn test_snapshot_keeps_most_recent_lines() {
        let mut record = BuildRecord::new(BuildId::new(), Utc::now());
        for i in 0..30 {
            record.logs.push(format!("line {i}"));
        }

        let snap = record.snapshot(20);
        assert_eq!(snap.logs.len(), 20);
        assert_eq!(snap.logs.first().unwrap(), "line 10");
        assert_eq!(snap.logs.last().unwrap(), "line 29");
    }

    #[test]
    fn test_snapshot_hides_fields_that_do_not_match_status() {
        let mut record = BuildRecord::new(BuildId::new(), Utc::now());
        record.filename = Some("a5000mine.iso".to_string());
        record.error = Some("boom".to_string());

        let snap = record.snapshot(20);
        assert!(snap.filename.is_none());
        assert!(snap.error.is_none());

        record.status = BuildStatus::Failed;
        let snap = record.snapshot(20);
        assert!(snap.filename.is_none());
        assert_eq!(snap.error.as_deref(), Some("boom"));

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["status"], "failed");
        assert!(json.get("filename").is_none());
    }
}
