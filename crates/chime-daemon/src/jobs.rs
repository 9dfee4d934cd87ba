use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;

use chime_scheduler::Job;

/// Demo job: logs a greeting with a per-job counter on every firing.
pub struct Heartbeat {
    label: String,
    beats: AtomicU64,
}

impl Heartbeat {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            beats: AtomicU64::new(0),
        }
    }
}

impl Job for Heartbeat {
    fn execute(&self) -> anyhow::Result<()> {
        let beat = self.beats.fetch_add(1, Ordering::Relaxed) + 1;
        info!(label = %self.label, beat, "heartbeat");
        Ok(())
    }
}
