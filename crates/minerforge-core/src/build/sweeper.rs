//! Periodic retention sweep.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::build::executor::BuildExecutor;
use crate::build::service::BuildService;

/// Spawn a task that calls [`BuildService::sweep_expired`] every `period`.
///
/// The first sweep happens one full period after start. The task exits when
/// `cancel` is triggered.
pub fn spawn_sweeper<E: BuildExecutor>(
    service: BuildService<E>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::debug!(period_secs = period.as_secs(), "build sweeper started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    service.sweep_expired();
                }
            }
        }

        tracing::debug!("build sweeper stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::executor::{ExitReport, LineSink};
    use chrono::Utc;
    use minerforge_types::build::{BuildId, BuildRecord, BuildRequest};
    use minerforge_types::config::BuilderConfig;
    use minerforge_types::error::BuildError;

    struct IdleExecutor;

    impl BuildExecutor for IdleExecutor {
        async fn run(
            &self,
            _build_id: BuildId,
            _request: &BuildRequest,
            _on_line: LineSink<'_>,
        ) -> Result<ExitReport, BuildError> {
            Ok(ExitReport::from_code(0))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_runs_on_interval_and_stops_on_cancel() {
        let service = BuildService::new(IdleExecutor, &BuilderConfig::default());
        let old = Utc::now() - chrono::Duration::hours(30);
        let id = BuildId::new();
        service.registry().insert(BuildRecord::new(id, old));
        service.registry().fail(&id, "boom", old);

        let cancel = CancellationToken::new();
        let handle = spawn_sweeper(service.clone(), Duration::from_secs(3600), cancel.clone());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(service.registry().contains(&id));

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(!service.registry().contains(&id));

        cancel.cancel();
        handle.await.unwrap();
    }
}
