//! `chime-core` — shared configuration and error types for the chime
//! workspace.
//!
//! Every other crate layers on top of this one: the scheduler reads its
//! worker-pool settings from [`config::RunnerConfig`], and the daemon loads
//! the whole [`config::ChimeConfig`] at startup.

pub mod config;
pub mod error;

pub use config::{ChimeConfig, DaemonConfig, RunnerConfig};
pub use error::{ChimeError, Result};
