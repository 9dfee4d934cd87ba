//! `chime-scheduler` — process-local recurring task runner.
//!
//! # Overview
//!
//! Jobs implement the [`Job`] trait and are registered on a [`Runner`]
//! together with a [`Cadence`]. For each entry the runner arms a deferred
//! wait for the cadence's next occurrence and executes the job on a
//! bounded worker pool. After every execution the entry re-arms with the
//! cadence's fixed interval measured from completion, so the chain only
//! ends at [`Runner::shutdown`]. A failing or panicking job keeps its
//! future firings.
//!
//! # Cadence variants
//!
//! | Variant  | Behaviour                                    |
//! |----------|----------------------------------------------|
//! | `Hourly` | Fire at a fixed minute of every hour         |
//! | `Daily`  | Fire at HH:MM every day                      |
//! | `Weekly` | Fire at HH:MM on a specific weekday          |

pub mod cadence;
pub mod error;
pub mod runner;
pub mod types;

pub use error::{Result, SchedulerError};
pub use runner::Runner;
pub use types::{Cadence, EntryInfo, EntryState, Job};
