//! Build script executor.
//!
//! Implements [`BuildExecutor`] by running the project's ISO build script as
//! a subprocess. The effective configuration is written to a temporary file
//! whose path is handed to the script through an environment variable; the
//! file is removed once the script has exited, on every path out of
//! [`ScriptBuildExecutor::run`].
//!
//! stdout and stderr are separate pipes drained by two reader tasks into one
//! channel. Lines keep their order within each stream; across the two
//! streams they arrive in read order, which can differ from the order the
//! script wrote them.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use minerforge_core::build::executor::{BuildExecutor, ExitReport, LineSink};
use minerforge_types::build::{BuildId, BuildRequest};
use minerforge_types::config::BuilderConfig;
use minerforge_types::error::BuildError;

use crate::build::base_config::{load_base_config, merge_request, write_temp_config};

/// Runs the ISO build script and streams its combined stdout/stderr.
#[derive(Debug, Clone)]
pub struct ScriptBuildExecutor {
    script: PathBuf,
    project_root: PathBuf,
    base_config: PathBuf,
    use_sudo: bool,
    config_env_var: String,
    backup_pool_url: String,
}

impl ScriptBuildExecutor {
    pub fn from_config(config: &BuilderConfig) -> Self {
        Self {
            script: config.script_path(),
            project_root: config.project_root.clone(),
            base_config: config.base_config_path(),
            use_sudo: config.use_sudo,
            config_env_var: config.config_env_var.clone(),
            backup_pool_url: config.backup_pool_url.clone(),
        }
    }

    /// Build the script invocation for a given temporary config path.
    ///
    /// Under sudo the config variable is explicitly preserved, since sudo
    /// resets the environment by default.
    fn command(&self, config_path: &std::path::Path) -> Command {
        let mut cmd = if self.use_sudo {
            let mut cmd = Command::new("sudo");
            cmd.arg(format!("--preserve-env={}", self.config_env_var))
                .arg(&self.script);
            cmd
        } else {
            Command::new(&self.script)
        };

        cmd.current_dir(&self.project_root)
            .env(&self.config_env_var, config_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl BuildExecutor for ScriptBuildExecutor {
    async fn run(
        &self,
        build_id: BuildId,
        request: &BuildRequest,
        on_line: LineSink<'_>,
    ) -> Result<ExitReport, BuildError> {
        if !tokio::fs::try_exists(&self.script).await.unwrap_or(false) {
            return Err(BuildError::ScriptMissing(self.script.clone()));
        }

        // 1. Effective config in a scoped temp file
        let base = load_base_config(&self.base_config).await?;
        let merged = merge_request(base, request, &self.backup_pool_url);
        let temp_config = write_temp_config(&merged)?;

        tracing::debug!(
            %build_id,
            script = %self.script.display(),
            config = %temp_config.path().display(),
            "spawning build script"
        );

        // 2. Spawn
        let mut child = self.command(temp_config.path()).spawn().map_err(|e| {
            BuildError::Internal(format!(
                "failed to spawn {}: {e}",
                self.script.display()
            ))
        })?;

        // 3. Funnel stdout and stderr into one ordered stream of lines
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(forward_lines(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(forward_lines(stderr, tx.clone()));
        }
        drop(tx);

        while let Some(line) = rx.recv().await {
            on_line(&line);
        }

        for reader in readers {
            if let Err(e) = reader.await {
                tracing::warn!(%build_id, error = %e, "build output reader panicked");
            }
        }

        // 4. Exit status; the temp config goes away right after
        let status = child.wait().await?;
        drop(temp_config);

        tracing::debug!(%build_id, code = ?status.code(), "build script exited");

        Ok(ExitReport {
            success: status.success(),
            code: status.code(),
        })
    }
}

/// Read `reader` line by line and send each non-blank line to `tx`.
///
/// Bytes that are not valid UTF-8 are replaced rather than ending the stream.
fn forward_lines<R>(reader: R, tx: mpsc::UnboundedSender<String>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if tx.send(line.to_string()).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read build output");
                    break;
                }
            }
        }
    })
}
