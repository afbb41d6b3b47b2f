use crate::dayparting::ScheduleError;

/// Errors that can occur during store operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("{kind} already exists: {id}")]
    Duplicate { kind: &'static str, id: u64 },

    #[error("{kind} not found: {id}")]
    Missing { kind: &'static str, id: u64 },

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}
