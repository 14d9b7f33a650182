//! Error types for DNG output operations.
//!
//! Provides unified error handling for session lifecycle, tag encoding,
//! and scanline writes.

use std::io;
use thiserror::Error;

/// DNG output error.
#[derive(Debug, Error)]
pub enum DngError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Destination could not be opened.
    #[error("could not open \"{path}\": {source}")]
    Open {
        /// Destination path as given by the caller.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// Feature outside the writer's capabilities (append mode, nonzero
    /// subimage index, unknown capability strings).
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// Operation requires an open session.
    #[error("no open file")]
    NotOpen,

    /// Scanline arrived out of row order.
    #[error("scanline out of order: expected row {expected}, got {actual}")]
    OutOfOrder {
        /// Next row the writer expects.
        expected: u32,
        /// Row the caller passed.
        actual: u32,
    },

    /// Buffer smaller than the resolved stride requires.
    #[error("dimension mismatch: expected {expected} bytes, got {actual}")]
    DimensionMismatch {
        /// Bytes needed for one full row.
        expected: usize,
        /// Bytes supplied.
        actual: usize,
    },

    /// Invalid argument (zero dimensions, degenerate stride).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for DNG output operations.
pub type DngResult<T> = Result<T, DngError>;
