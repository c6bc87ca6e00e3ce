use thiserror::Error;

/// Errors raised by the calendar engine and the task record codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("malformed persisted record at index {index}: {reason}")]
    MalformedPersistedRecord { index: usize, reason: String },
}

pub type CalendarResult<T> = std::result::Result<T, CalendarError>;

impl CalendarError {
    pub fn invalid_date(msg: impl Into<String>) -> Self {
        Self::InvalidDate(msg.into())
    }
}
