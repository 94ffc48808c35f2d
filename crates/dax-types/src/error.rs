//! Error types for the Dax execution layer.
//!
//! All crates return `DaxResult<T>` from fallible operations. Violated
//! preconditions (for example a copy between arrays of different length)
//! are not errors: they panic.

use thiserror::Error;

use crate::domain::Domain;

/// Unified error type for the Dax execution layer.
#[derive(Debug, Error)]
pub enum DaxError {
    /// Grid data is malformed or inconsistent.
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// An argument cannot be bound to the requested invocation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Co-scheduled arguments disagree about the length of the domain.
    #[error("Domain length mismatch for {argument} over {domain} domain: expected {expected}, got {actual}")]
    DomainMismatch {
        argument: String,
        domain: Domain,
        expected: usize,
        actual: usize,
    },

    /// An index was dereferenced outside of its array.
    #[error("Index {index} out of range (length {len})")]
    IndexOutOfRange {
        index: usize,
        len: usize,
    },

    /// A scheduled functor raised an error.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for `Result<T, DaxError>`.
pub type DaxResult<T> = Result<T, DaxError>;
