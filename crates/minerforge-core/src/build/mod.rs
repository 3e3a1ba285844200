//! ISO build orchestration.
//!
//! A build is submitted through [`service::BuildService::submit`], runs on its
//! own tokio task through a [`executor::BuildExecutor`], and is observed by
//! polling [`service::BuildService::get_status`]. Finished builds are dropped
//! by the periodic [`sweeper`].

pub mod executor;
pub mod progress;
pub mod registry;
pub mod service;
pub mod sweeper;
pub mod validate;
