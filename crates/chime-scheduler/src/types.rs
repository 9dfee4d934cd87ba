use chrono::{NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulerError};

/// A unit of user work fired repeatedly by the [`Runner`](crate::runner::Runner).
///
/// Implementations must be thread-safe: execution happens on a blocking
/// worker thread, potentially concurrent with other jobs. A returned error
/// (or a panic) is logged and contained; the entry's future firings are
/// never cancelled by a failure.
pub trait Job: Send + Sync {
    /// Perform one firing of the job.
    fn execute(&self) -> anyhow::Result<()>;
}

/// Defines when and how often a job fires.
///
/// All fields are local civil time. A candidate occurrence that falls
/// exactly on the current instant counts as already passed and is pushed
/// one full cycle, so a job never fires twice for the same instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cadence {
    /// Fire at the given minute of every hour.
    Hourly { minute: u8 },

    /// Fire every day at the given hour and minute.
    Daily { hour: u8, minute: u8 },

    /// Fire every week on a specific weekday at the given hour and minute.
    Weekly { weekday: Weekday, hour: u8, minute: u8 },
}

impl Cadence {
    /// Every hour at `minute` (0..=59).
    pub fn hourly(minute: u8) -> Result<Self> {
        let cadence = Cadence::Hourly { minute };
        cadence.validate()?;
        Ok(cadence)
    }

    /// Every day at `hour`:`minute` (0..=23, 0..=59).
    pub fn daily(hour: u8, minute: u8) -> Result<Self> {
        let cadence = Cadence::Daily { hour, minute };
        cadence.validate()?;
        Ok(cadence)
    }

    /// Every week on `weekday` at `hour`:`minute`.
    pub fn weekly(weekday: Weekday, hour: u8, minute: u8) -> Result<Self> {
        let cadence = Cadence::Weekly {
            weekday,
            hour,
            minute,
        };
        cadence.validate()?;
        Ok(cadence)
    }

    /// Check all fields against their calendar ranges.
    ///
    /// The error names the first offending field and its value. Variants
    /// built directly (bypassing the checked constructors) are re-validated
    /// at registration, so an out-of-range cadence never arms.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Cadence::Hourly { minute } => check_minute(minute),
            Cadence::Daily { hour, minute } | Cadence::Weekly { hour, minute, .. } => {
                check_hour(hour)?;
                check_minute(minute)
            }
        }
    }
}

fn check_hour(hour: u8) -> Result<()> {
    if hour > 23 {
        return Err(SchedulerError::InvalidCadence {
            field: "hour",
            value: hour,
        });
    }
    Ok(())
}

fn check_minute(minute: u8) -> Result<()> {
    if minute > 59 {
        return Err(SchedulerError::InvalidCadence {
            field: "minute",
            value: minute,
        });
    }
    Ok(())
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Cadence::Hourly { minute } => write!(f, "hourly at :{minute:02}"),
            Cadence::Daily { hour, minute } => write!(f, "daily at {hour:02}:{minute:02}"),
            Cadence::Weekly {
                weekday,
                hour,
                minute,
            } => write!(f, "weekly on {weekday} at {hour:02}:{minute:02}"),
        }
    }
}

/// Lifecycle state of a scheduled entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryState {
    /// Waiting out the delay to its next occurrence.
    Armed,
    /// The job is currently executing.
    Firing,
    /// The runner shut down; the entry will not fire again.
    Cancelled,
}

impl std::fmt::Display for EntryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntryState::Armed => "armed",
            EntryState::Firing => "firing",
            EntryState::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// Point-in-time snapshot of one scheduled entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryInfo {
    /// Human-readable label given at registration.
    pub name: String,
    /// The cadence the entry fires on.
    pub cadence: Cadence,
    /// Current lifecycle state.
    pub state: EntryState,
    /// Total number of completed executions, failures included.
    pub runs: u64,
    /// Executions that returned an error or panicked.
    pub failures: u64,
    /// Local time of the next planned firing, if one is armed.
    pub next_fire: Option<NaiveDateTime>,
}
