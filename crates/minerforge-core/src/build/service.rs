//! Build orchestration service.
//!
//! Accepts build requests, runs each build on its own tokio task through a
//! [`BuildExecutor`], and answers status and download queries from the shared
//! [`BuildRegistry`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use minerforge_types::build::{BuildId, BuildRecord, BuildRequest, BuildSnapshot};
use minerforge_types::config::BuilderConfig;
use minerforge_types::error::BuildError;

use crate::build::executor::BuildExecutor;
use crate::build::registry::BuildRegistry;
use crate::build::validate;

/// Only files with this extension may be downloaded.
pub const ARTIFACT_EXTENSION: &str = ".iso";

/// Service orchestrating the ISO build lifecycle.
///
/// Generic over the executor so tests can substitute a scripted one.
/// Cloning is cheap and every clone shares the same registry.
pub struct BuildService<E: BuildExecutor> {
    registry: Arc<BuildRegistry>,
    executor: Arc<E>,
    artifact_path: PathBuf,
    build_dir: PathBuf,
    log_tail: usize,
    retention: Duration,
    gate: Option<Arc<Semaphore>>,
}

impl<E: BuildExecutor> Clone for BuildService<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            executor: Arc::clone(&self.executor),
            artifact_path: self.artifact_path.clone(),
            build_dir: self.build_dir.clone(),
            log_tail: self.log_tail,
            retention: self.retention,
            gate: self.gate.clone(),
        }
    }
}

impl<E: BuildExecutor> BuildService<E> {
    /// Create a new BuildService.
    ///
    /// - `executor`: runs the actual build
    /// - `config`: artifact location, status tail length, retention window
    ///   and whether builds are serialized
    pub fn new(executor: E, config: &BuilderConfig) -> Self {
        let retention_hours = i64::try_from(config.retention_hours).unwrap_or(i64::MAX);
        let retention =
            Duration::try_hours(retention_hours).unwrap_or_else(|| Duration::days(365 * 1000));

        Self {
            registry: Arc::new(BuildRegistry::new()),
            executor: Arc::new(executor),
            artifact_path: config.artifact_path(),
            build_dir: config.build_dir_path(),
            log_tail: config.status_log_lines,
            retention,
            gate: config.serialize_builds.then(|| Arc::new(Semaphore::new(1))),
        }
    }

    /// The shared record registry.
    pub fn registry(&self) -> &Arc<BuildRegistry> {
        &self.registry
    }

    /// Validate a raw request and start the build in the background.
    ///
    /// Returns the new build id as soon as the record exists; the build
    /// itself runs on a separate task. Invalid requests create no record.
    pub fn submit(&self, raw: &Value) -> Result<BuildId, BuildError> {
        let request = validate::parse_request(raw)?;
        let (id, _handle) = self.start(request);
        Ok(id)
    }

    /// Register a validated request and spawn its build task.
    pub fn start(&self, request: BuildRequest) -> (BuildId, JoinHandle<()>) {
        let id = BuildId::new();
        self.registry.insert(BuildRecord::new(id, Utc::now()));

        tracing::info!(
            build_id = %id,
            worker = %request.worker_name,
            power_limit = request.power_limit,
            "build submitted"
        );

        let service = self.clone();
        let handle = tokio::spawn(async move {
            service.execute(id, request).await;
        });

        (id, handle)
    }

    /// Run one build to completion and finalize its record.
    ///
    /// Never returns an error: every failure ends up on the record.
    pub async fn execute(&self, id: BuildId, request: BuildRequest) {
        let _permit = match &self.gate {
            Some(gate) => {
                if gate.available_permits() == 0 {
                    self.registry
                        .set_message(&id, "Waiting for another build to finish");
                }
                match Arc::clone(gate).acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(e) => {
                        self.registry.fail(&id, &e.to_string(), Utc::now());
                        return;
                    }
                }
            }
            None => None,
        };

        tracing::info!(build_id = %id, "build started");

        let registry = Arc::clone(&self.registry);
        let on_line = move |line: &str| {
            tracing::debug!(build_id = %id, "{line}");
            registry.append_line(&id, line);
        };

        let outcome = match self.executor.run(id, &request, &on_line).await {
            Ok(exit) if exit.success => {
                if artifact_exists(&self.artifact_path).await {
                    Ok(artifact_name(&self.artifact_path))
                } else {
                    Err(BuildError::ArtifactMissing(self.artifact_path.clone()))
                }
            }
            Ok(exit) => Err(BuildError::ScriptFailed { code: exit.code }),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(filename) => {
                self.registry.complete(&id, &filename, Utc::now());
                tracing::info!(build_id = %id, %filename, "build completed");
            }
            Err(e) => {
                self.registry.fail(&id, &e.to_string(), Utc::now());
                tracing::warn!(build_id = %id, error = %e, "build failed");
            }
        }
    }

    /// Status of a build, with only the most recent log lines.
    ///
    /// Unknown and malformed ids are both reported as [`BuildError::NotFound`].
    pub fn get_status(&self, raw_id: &str) -> Result<BuildSnapshot, BuildError> {
        let id: BuildId = raw_id.trim().parse().map_err(|_| BuildError::NotFound)?;
        self.registry
            .snapshot(&id, self.log_tail)
            .ok_or(BuildError::NotFound)
    }

    /// Map a requested download name to a file in the build directory.
    ///
    /// Names that do not end in `.iso`, or that try to leave the build
    /// directory, are [`BuildError::Forbidden`] whether or not they exist.
    pub async fn resolve_download(&self, filename: &str) -> Result<PathBuf, BuildError> {
        if !filename.ends_with(ARTIFACT_EXTENSION) {
            return Err(BuildError::Forbidden(filename.to_string()));
        }
        if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
            return Err(BuildError::Forbidden(filename.to_string()));
        }

        let path = self.build_dir.join(filename);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => Err(BuildError::ArtifactNotFound),
        }
    }

    /// Drop finished builds older than the retention window.
    ///
    /// Returns how many records were removed.
    pub fn sweep_expired(&self) -> usize {
        let removed = self.registry.sweep(Utc::now(), self.retention);
        let (running, completed, failed) = self.registry.counts();
        if !removed.is_empty() {
            tracing::info!(
                removed = removed.len(),
                running,
                completed,
                failed,
                "swept expired builds"
            );
        } else {
            tracing::debug!(running, completed, failed, "sweep found nothing to remove");
        }
        removed.len()
    }
}

async fn artifact_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

fn artifact_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
