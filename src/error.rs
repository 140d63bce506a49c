//! Error types for the simulator and its trace I/O.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Cache geometry that cannot be built. Never clamped.
    #[error("invalid cache geometry: {reason}")]
    InvalidGeometry { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Reading the trace failed partway, e.g. on invalid UTF-8.
    #[error("failed to read trace line {line}: {source}")]
    TraceRead {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    /// A trace line that is neither blank nor `<kind> <hex>,<size>`.
    #[error("malformed trace line {line}: {text:?}")]
    MalformedTrace { line: usize, text: String },

    #[error("failed to write results: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    pub(crate) fn geometry(reason: impl Into<String>) -> Self {
        Error::InvalidGeometry {
            reason: reason.into(),
        }
    }
}
