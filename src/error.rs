//! Error types for the care scheduling core.
//!
//! Errors are classified by handling policy:
//! - Validation: rejected at the write path, surfaced to the caller,
//!   nothing persisted
//! - Data: a malformed stored record; skipped and logged, never fails a
//!   whole aggregation
//! - Store: propagation from the persistence collaborator

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CareError {
    // Validation errors (write path rejects)
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid schedule date: day {day} does not exist in {year}-{month:02}")]
    InvalidScheduleDate { year: i32, month: u32, day: u32 },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    // Data errors (skip-and-log during aggregation)
    #[error("Malformed record {id}: {reason}")]
    MalformedRecord { id: String, reason: String },

    // Store propagation
    #[error("Store error: {0}")]
    Store(String),
}

impl CareError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        CareError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Returns true if this error should be surfaced to the caller as a
    /// rejected request rather than degrading gracefully.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CareError::Validation(_)
                | CareError::InvalidScheduleDate { .. }
                | CareError::NotFound { .. }
        )
    }

    /// Returns true if this error follows the skip-and-log policy.
    pub fn is_data(&self) -> bool {
        matches!(self, CareError::MalformedRecord { .. })
    }
}

pub type CareResult<T> = Result<T, CareError>;
