use std::path::PathBuf;

use thiserror::Error;

/// Reasons a build request is rejected at submission time.
///
/// A request that fails validation never produces a build record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field '{0}' must be a string")]
    InvalidType(&'static str),

    #[error("wallet address must start with '{0}'")]
    WalletPrefix(&'static str),

    #[error("pool URL must start with '{0}'")]
    PoolScheme(&'static str),

    #[error("field '{0}' must be an integer")]
    NotInteger(&'static str),

    #[error("power limit {value} is outside the allowed range {min}-{max}")]
    PowerLimitOutOfRange { value: i64, min: i64, max: i64 },
}

/// Errors related to build orchestration.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("build not found")]
    NotFound,

    #[error("file not found")]
    ArtifactNotFound,

    #[error("invalid file type: {0}")]
    Forbidden(String),

    #[error("build script not found: {}", .0.display())]
    ScriptMissing(PathBuf),

    #[error("build script failed (exit code {})", code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    ScriptFailed { code: Option<i32> },

    #[error("build finished but artifact is missing: {}", .0.display())]
    ArtifactMissing(PathBuf),

    #[error("base configuration error: {0}")]
    BaseConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}
