use std::sync::Arc;

use chrono::Weekday;
use tracing::info;

use chime_core::config::ChimeConfig;
use chime_scheduler::{Cadence, Runner};

mod jobs;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chime_daemon=info,chime_scheduler=info".into()),
        )
        .init();

    // load config: CHIME_CONFIG env > ~/.chime/chime.toml > defaults
    let config_path = std::env::var("CHIME_CONFIG").ok();
    let config = ChimeConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        ChimeConfig::default()
    });

    let runner = Runner::new(&config.runner);

    runner.schedule(
        "hourly-heartbeat",
        Arc::new(jobs::Heartbeat::new("hourly heartbeat")),
        Cadence::hourly(15)?,
    )?;
    runner.schedule(
        "daily-heartbeat",
        Arc::new(jobs::Heartbeat::new("daily heartbeat")),
        Cadence::daily(14, 30)?,
    )?;
    runner.schedule(
        "weekly-heartbeat",
        Arc::new(jobs::Heartbeat::new("weekly heartbeat")),
        Cadence::weekly(Weekday::Sun, 10, 0)?,
    )?;

    for entry in runner.entries() {
        info!(job = %entry.name, cadence = %entry.cadence, "armed");
    }

    match config.daemon.run_for_secs {
        Some(secs) => {
            info!(secs, "running for a fixed window");
            tokio::time::sleep(std::time::Duration::from_secs(secs)).await;
        }
        None => {
            info!("running until Ctrl-C");
            tokio::signal::ctrl_c().await?;
        }
    }

    runner.shutdown().await;
    Ok(())
}
