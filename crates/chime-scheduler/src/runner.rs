use std::sync::{Arc, Mutex};

use chime_core::config::RunnerConfig;
use chrono::{Local, NaiveDateTime};
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::{
    cadence,
    error::{Result, SchedulerError},
    types::{Cadence, EntryInfo, EntryState, Job},
};

/// One registered job/cadence pairing with its live bookkeeping.
struct Entry {
    name: String,
    cadence: Cadence,
    status: Mutex<EntryStatus>,
}

struct EntryStatus {
    state: EntryState,
    runs: u64,
    failures: u64,
    next_fire: Option<NaiveDateTime>,
}

/// Drives registered jobs at their cadences until shut down.
///
/// Each entry runs as its own Tokio task that waits out the delay to its
/// next occurrence and then executes the job on the shared worker pool.
/// After execution the entry re-arms with the cadence's fixed interval
/// measured from completion. Entries waiting on their delay hold no pool
/// slot, so the pool size bounds concurrent executions rather than the
/// number of registered jobs.
///
/// The shutdown flag is one-way: once [`Runner::shutdown`] has been called
/// the runner accepts no new registrations and no new executions start.
pub struct Runner {
    workers: Arc<Semaphore>,
    shutdown: watch::Sender<bool>,
    entries: Mutex<Vec<Arc<Entry>>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Runner {
    /// Create a runner with the configured worker-pool size (floor 1).
    pub fn new(config: &RunnerConfig) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            workers: Arc::new(Semaphore::new(config.workers.max(1))),
            shutdown,
            entries: Mutex::new(Vec::new()),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Register `job` to fire on `cadence`, starting with its next occurrence.
    ///
    /// The cadence is validated here so a bad registration fails fast rather
    /// than at first fire. Jobs may be registered any number of times, each
    /// registration forming an independent entry.
    ///
    /// # Errors
    ///
    /// - `InvalidCadence` when a cadence field is outside its calendar range.
    /// - `ShutDown` when the runner has already been shut down.
    pub fn schedule(&self, name: &str, job: Arc<dyn Job>, cadence: Cadence) -> Result<()> {
        if *self.shutdown.borrow() {
            return Err(SchedulerError::ShutDown);
        }
        cadence.validate()?;

        let now = Local::now().naive_local();
        let first_fire = cadence::next_fire(&cadence, now);
        let delay = cadence::next_delay(&cadence, now);

        let entry = Arc::new(Entry {
            name: name.to_string(),
            cadence: cadence.clone(),
            status: Mutex::new(EntryStatus {
                state: EntryState::Armed,
                runs: 0,
                failures: 0,
                next_fire: Some(first_fire),
            }),
        });
        self.entries.lock().unwrap().push(Arc::clone(&entry));

        info!(
            job = %entry.name,
            cadence = %entry.cadence,
            delay_secs = delay.as_secs(),
            "job scheduled"
        );

        let workers = Arc::clone(&self.workers);
        let shutdown_rx = self.shutdown.subscribe();
        let handle = tokio::spawn(run_entry(entry, job, workers, shutdown_rx, delay));
        self.handles.lock().unwrap().push(handle);
        Ok(())
    }

    /// Flip the one-way shutdown flag and wait for every entry to wind down.
    ///
    /// An execution already in flight is allowed to finish; nothing new
    /// starts once this method has been called. Safe to call repeatedly,
    /// later calls return immediately.
    pub async fn shutdown(&self) {
        // send_replace stores the flag even when no entry is listening.
        let was_down = self.shutdown.send_replace(true);
        if !was_down {
            info!("runner shutting down");
        }
        // A closed pool rejects any firing that was already due.
        self.workers.close();

        let handles: Vec<JoinHandle<()>> = {
            let mut handles = self.handles.lock().unwrap();
            handles.drain(..).collect()
        };
        for handle in handles {
            let _ = handle.await;
        }
        if !was_down {
            info!("runner shut down");
        }
    }

    /// Return metadata snapshots for all registered entries.
    pub fn entries(&self) -> Vec<EntryInfo> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|entry| {
                let status = entry.status.lock().unwrap();
                EntryInfo {
                    name: entry.name.clone(),
                    cadence: entry.cadence.clone(),
                    state: status.state.clone(),
                    runs: status.runs,
                    failures: status.failures,
                    next_fire: status.next_fire,
                }
            })
            .collect()
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(&RunnerConfig::default())
    }
}

/// Per-entry loop: wait → fire → re-arm, until shutdown wins a race.
async fn run_entry(
    entry: Arc<Entry>,
    job: Arc<dyn Job>,
    workers: Arc<Semaphore>,
    mut shutdown_rx: watch::Receiver<bool>,
    mut delay: std::time::Duration,
) {
    loop {
        // Shutdown may have been signalled before this task first polled,
        // in which case the receiver already considers the flag seen.
        if *shutdown_rx.borrow() {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            // The flag only ever flips to true; a closed channel means the
            // runner itself is gone.
            _ = shutdown_rx.changed() => break,
        }

        // Shutdown wins over an elapsed timer.
        if *shutdown_rx.borrow() {
            break;
        }

        let permit = match workers.acquire().await {
            Ok(permit) => permit,
            // Closed pool: shutdown began while this entry was due.
            Err(_) => break,
        };

        {
            let mut status = entry.status.lock().unwrap();
            status.state = EntryState::Firing;
            status.next_fire = None;
        }

        let job_run = Arc::clone(&job);
        let outcome = tokio::task::spawn_blocking(move || job_run.execute()).await;
        drop(permit);

        let failed = match outcome {
            Ok(Ok(())) => {
                debug!(job = %entry.name, "job fired");
                false
            }
            Ok(Err(e)) => {
                warn!(job = %entry.name, error = %e, "job execution failed");
                true
            }
            Err(e) if e.is_panic() => {
                error!(job = %entry.name, "job execution panicked");
                true
            }
            // The blocking pool refused the task: the runtime is tearing down.
            Err(_) => break,
        };

        {
            let mut status = entry.status.lock().unwrap();
            status.runs += 1;
            if failed {
                status.failures += 1;
            }
        }

        // No re-arm once shutdown is in progress.
        if *shutdown_rx.borrow() {
            break;
        }

        // Fixed interval measured from completion: a slow execution delays
        // the next firing, it never skips one.
        delay = cadence::interval(&entry.cadence);
        let next = Local::now().naive_local()
            + chrono::Duration::seconds(delay.as_secs() as i64);
        let mut status = entry.status.lock().unwrap();
        status.state = EntryState::Armed;
        status.next_fire = Some(next);
    }

    let mut status = entry.status.lock().unwrap();
    status.state = EntryState::Cancelled;
    status.next_fire = None;
    debug!(job = %entry.name, "entry cancelled");
}
