use thiserror::Error;

/// Errors that can occur within the scheduler subsystem.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A cadence field is outside its calendar range.
    #[error("Invalid cadence: {field} = {value} is out of range")]
    InvalidCadence { field: &'static str, value: u8 },

    /// The runner has shut down and accepts no new registrations.
    #[error("Runner is shut down")]
    ShutDown,
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
