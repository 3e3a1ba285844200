//! Build executor trait.
//!
//! A [`BuildExecutor`] owns everything about actually producing an ISO:
//! preparing the effective configuration, spawning the build script and
//! reading its output. It reports each output line through a callback and
//! returns how the process exited. Deciding whether the build succeeded is
//! left to [`crate::build::service::BuildService`].

use std::future::Future;

use minerforge_types::build::{BuildId, BuildRequest};
use minerforge_types::error::BuildError;

/// How the build process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    /// The process reported success (exit code zero).
    pub success: bool,
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
}

impl ExitReport {
    pub fn from_code(code: i32) -> Self {
        Self {
            success: code == 0,
            code: Some(code),
        }
    }
}

/// Receives every output line of a running build, in order.
pub type LineSink<'a> = &'a (dyn Fn(&str) + Send + Sync);

/// Trait for running one ISO build to completion.
///
/// Implementors include `ScriptBuildExecutor` in `minerforge-infra`, which
/// runs the project's build script as a subprocess.
pub trait BuildExecutor: Send + Sync + 'static {
    /// Run the build for `request`, feeding output lines to `on_line`.
    ///
    /// Returns `Err` only when the build could not be run at all (missing
    /// script, unreadable base configuration, spawn failure). A script that
    /// runs and exits non-zero is an `Ok` report with `success == false`.
    fn run(
        &self,
        build_id: BuildId,
        request: &BuildRequest,
        on_line: LineSink<'_>,
    ) -> impl Future<Output = Result<ExitReport, BuildError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_report_from_code() {
        assert!(ExitReport::from_code(0).success);
        let failed = ExitReport::from_code(3);
        assert!(!failed.success);
        assert_eq!(failed.code, Some(3));
    }
}
