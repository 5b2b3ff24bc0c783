use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::FilingStatus;

/// Errors raised by the filing orchestrator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilingError {
    /// The requested change would break the primary/secondary structure.
    #[error("invalid filing relationship: {0}")]
    InvalidFilingRelationship(String),

    #[error("filing {0} is submitted and can no longer be changed")]
    SubmittedFilingMutation(i64),

    #[error("filing {id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        id: i64,
        from: FilingStatus,
        to: FilingStatus,
    },

    #[error("filing {0} not found")]
    FilingNotFound(i64),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
