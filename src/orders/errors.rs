use thiserror::Error;

use crate::workflows::PolicyError;

/// Failures of order queries and commands.
///
/// `Display` output is meant to be shown to staff as-is.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Fill in the {field} field")]
    Validation { field: &'static str },

    #[error("Order {0} already exists")]
    Duplicate(String),

    #[error("Order {0} not found")]
    NotFound(String),

    #[error("'{0}' is not a workflow stage")]
    InvalidStatus(String),

    #[error("'{0}' is not a valid date and time")]
    InvalidSchedule(String),

    #[error("Order store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Order store is busy, try again: {0}")]
    StoreBusy(String),

    #[error("Order {order} has an unreadable {field} value")]
    CorruptRow { order: String, field: &'static str },

    #[error("Order store error: {0}")]
    Store(sqlx::Error),

    #[error("Invalid workflow configuration: {0}")]
    Policy(#[from] PolicyError),
}

impl OrderError {
    /// Transient contention; the same call may succeed if repeated
    pub fn is_retryable(&self) -> bool {
        matches!(self, OrderError::StoreBusy(_))
    }

    /// The session cannot continue; nothing should be rendered
    pub fn is_fatal(&self) -> bool {
        matches!(self, OrderError::StoreUnavailable(_) | OrderError::Policy(_))
    }

    /// Expected outcome of a staff action rather than a system fault
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            OrderError::Validation { .. }
                | OrderError::Duplicate(_)
                | OrderError::NotFound(_)
                | OrderError::InvalidStatus(_)
                | OrderError::InvalidSchedule(_)
        )
    }
}

// SQLite primary result codes; extended codes carry these in the low byte
const SQLITE_BUSY: i64 = 5;
const SQLITE_LOCKED: i64 = 6;
const SQLITE_CANTOPEN: i64 = 14;

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        let primary_code = err
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .and_then(|code| code.parse::<i64>().ok())
            .map(|code| code & 0xff);

        match primary_code {
            Some(SQLITE_BUSY) | Some(SQLITE_LOCKED) => {
                return OrderError::StoreBusy(database_message(&err));
            }
            Some(SQLITE_CANTOPEN) => {
                return OrderError::StoreUnavailable(database_message(&err));
            }
            _ => {}
        }

        match err {
            sqlx::Error::PoolTimedOut => {
                OrderError::StoreBusy("timed out waiting for a connection".to_string())
            }
            sqlx::Error::Io(io_err) => OrderError::StoreUnavailable(io_err.to_string()),
            sqlx::Error::PoolClosed => {
                OrderError::StoreUnavailable("connection pool closed".to_string())
            }
            other => OrderError::Store(other),
        }
    }
}

fn database_message(err: &sqlx::Error) -> String {
    err.as_database_error()
        .map(|db_err| db_err.message().to_string())
        .unwrap_or_else(|| err.to_string())
}
