//! Error types for the face landmark tracker library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input parameters provided (wrong point count, non-finite coordinates)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error, including noise settings that make correction ill-defined
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Filter creation error
    #[error("Filter error: {0}")]
    FilterError(String),

    /// Matrix inversion failed or the estimate became non-finite
    #[error("Numerical error: {0}")]
    NumericalError(String),

    /// The tracker refused to correct because an earlier correction failed
    #[error("Tracker diverged: {0}")]
    TrackerDiverged(String),

    /// Landmark frame text could not be parsed
    #[error("Parse error at line {line}: {message}")]
    ParseError {
        /// One-based line number in the input
        line: usize,
        /// What went wrong
        message: String,
    },
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
