//! Error types for the Turbo Desk engine.

use crate::Partition;
use thiserror::Error;

/// All possible errors from the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Validation errors
    #[error("unknown partition: {0}")]
    UnknownPartition(String),

    #[error("record has no string id")]
    MissingId,

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    // Index errors
    #[error("unique index '{field}' in {partition} already holds {value}")]
    UniqueViolation {
        partition: Partition,
        field: String,
        value: String,
    },

    // State errors
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
