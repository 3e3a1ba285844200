//! Build script execution.

pub mod base_config;
pub mod script_executor;

pub use script_executor::ScriptBuildExecutor;
