//! Error types for the rebalance simulation engine.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the simulation engine.
///
/// Configuration and data errors are fatal preconditions caught before the
/// per-bar loop starts. Invariant violations abort a run mid-loop with the
/// offending bar index; they signal a broken contract between the lot sizer
/// and the ledger, never a recoverable condition.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (bad parameters, unknown symbol, bad schedule).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data error (malformed or misaligned market data).
    #[error("Data error: {0}")]
    Data(String),

    /// Accounting invariant broken during the simulation loop.
    #[error("Invariant violation at bar {bar}: {message}")]
    Invariant {
        /// Bar index where the violation was detected.
        bar: usize,
        /// What broke.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create an invariant violation error.
    pub fn invariant(bar: usize, msg: impl Into<String>) -> Self {
        Error::Invariant {
            bar,
            message: msg.into(),
        }
    }

    /// Rewrite the bar index of an invariant violation.
    ///
    /// The ledger detects violations without knowing which bar is being
    /// simulated; the driver stamps the index before propagating.
    pub fn at_bar(self, bar: usize) -> Self {
        match self {
            Error::Invariant { message, .. } => Error::Invariant { bar, message },
            other => other,
        }
    }
}
