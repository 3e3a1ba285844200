//! Application state wiring the build service together.
//!
//! The build service is generic over its executor; AppState pins it to the
//! script-based executor from `minerforge-infra`.

use std::sync::Arc;

use minerforge_core::build::service::BuildService;
use minerforge_infra::build::ScriptBuildExecutor;
use minerforge_types::config::BuilderConfig;
use tokio_util::sync::CancellationToken;

/// Concrete type alias for the service generic pinned to the infra executor.
pub type ConcreteBuildService = BuildService<ScriptBuildExecutor>;

/// Shared application state handed to every HTTP handler.
#[derive(Clone)]
pub struct AppState {
    pub build_service: ConcreteBuildService,
    pub config: Arc<BuilderConfig>,
    /// Cancelled on server shutdown; stops background tasks.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Initialize the application state: ensure the build directory exists and
    /// wire the build service.
    pub async fn init(config: BuilderConfig) -> anyhow::Result<Self> {
        let build_dir = config.build_dir_path();
        tokio::fs::create_dir_all(&build_dir).await?;

        let executor = ScriptBuildExecutor::from_config(&config);
        let build_service = BuildService::new(executor, &config);

        tracing::debug!(
            build_dir = %build_dir.display(),
            script = %config.script_path().display(),
            "application state initialized"
        );

        Ok(Self {
            build_service,
            config: Arc::new(config),
            shutdown: CancellationToken::new(),
        })
    }
}
