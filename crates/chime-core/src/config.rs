use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Worker slots shared by all scheduled jobs when not configured.
pub const DEFAULT_WORKERS: usize = 3;

/// Top-level config (chime.toml + CHIME_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChimeConfig {
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub daemon: DaemonConfig,
}

/// Worker-pool settings for the recurring task runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Maximum number of jobs executing at the same time. Entries waiting
    /// for their next occurrence do not hold a slot.
    /// Override with env var: CHIME_RUNNER_WORKERS=8
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
        }
    }
}

/// Demo daemon settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DaemonConfig {
    /// Run for a fixed number of seconds, then shut down.
    /// When unset the daemon runs until SIGINT.
    pub run_for_secs: Option<u64>,
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

impl ChimeConfig {
    /// Load config from a TOML file with CHIME_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.chime/chime.toml
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: ChimeConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("CHIME_").split("_"))
            .extract()
            .map_err(|e| crate::error::ChimeError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.chime/chime.toml", home)
}
