//! # Core Error Types

use thiserror::Error;

/// Errors returned by [`crate::RollingWindow`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowError {
    /// Logical index outside `[0, len)`.
    #[error("index {index} out of range for window of length {len}")]
    IndexOutOfRange {
        /// The requested logical index.
        index: usize,
        /// Number of live elements at the time of the call.
        len: usize,
    },

    /// Insertion anywhere other than the front of the window.
    #[error("insert at index {index} is unsupported, only index 0 (front) is allowed")]
    UnsupportedInsert {
        /// The rejected logical index.
        index: usize,
    },
}

/// Result type for window operations.
pub type WindowResult<T> = Result<T, WindowError>;
