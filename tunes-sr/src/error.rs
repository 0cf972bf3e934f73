//! Error types for tunes-sr
//!
//! Most failures inside a search degrade to empty results and never reach
//! this type; what remains is infrastructure trouble (the catalog database).

use thiserror::Error;
use tunes_common::EntityKind;

/// Main error type for tunes-sr
#[derive(Error, Debug)]
pub enum Error {
    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Errors bubbled up from tunes-common
    #[error(transparent)]
    Common(#[from] tunes_common::Error),

    /// Candidate index could not serve one kind
    #[error("Candidate index unavailable for {kind}: {reason}")]
    IndexUnavailable { kind: EntityKind, reason: String },

    /// Stored row could not be mapped to a model
    #[error("Invalid catalog data: {0}")]
    InvalidData(String),
}

/// Convenience Result type using tunes-sr Error
pub type Result<T> = std::result::Result<T, Error>;
