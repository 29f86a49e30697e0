use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::timestamps::parse_timestamp;
use crate::urgency::{urgency, Urgency};

/// Snapshot of one service order as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_number: String,
    pub plate: String,
    pub customer: String,
    pub status: String,
    /// Raw stored estimate; may not parse
    pub scheduled_completion: Option<String>,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
    pub last_modified_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
    pub same_day_departure: bool,
}

impl Order {
    /// Parsed scheduled completion, if present and readable
    pub fn scheduled_at(&self) -> Option<NaiveDateTime> {
        self.scheduled_completion.as_deref().and_then(parse_timestamp)
    }

    pub fn urgency(&self, now: NaiveDateTime) -> Urgency {
        urgency(self.scheduled_completion.as_deref(), now)
    }
}

/// Registration form for a new order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub order_number: String,
    pub plate: String,
    pub customer: String,
    pub note: Option<String>,
}

impl NewOrder {
    pub fn new(
        order_number: impl Into<String>,
        plate: impl Into<String>,
        customer: impl Into<String>,
    ) -> Self {
        Self {
            order_number: order_number.into(),
            plate: plate.into(),
            customer: customer.into(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Result of a successful command.
///
/// `invalidate` tells the presentation layer that any view it holds is stale
/// and should be re-queried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutcome<T> {
    pub value: T,
    pub message: String,
    pub invalidate: bool,
}

impl<T> CommandOutcome<T> {
    pub fn changed(value: T, message: impl Into<String>) -> Self {
        Self {
            value,
            message: message.into(),
            invalidate: true,
        }
    }
}
