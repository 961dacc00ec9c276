//! Error types for accelerator operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for accelerator operations
pub type Result<T> = std::result::Result<T, LinregError>;

/// Errors that can occur while driving the accelerator block
#[derive(Debug, Error)]
pub enum LinregError {
    /// CSR window could not be mapped
    #[error("Failed to map CSR window at {path}: {reason}")]
    MapFailed {
        /// Resource file that was opened
        path: PathBuf,
        /// Reason for failure
        reason: String,
    },

    /// Input and weight vectors differ in length
    #[error("Vector length mismatch: {inputs} inputs vs {weights} weights")]
    LengthMismatch {
        /// Number of input elements
        inputs: usize,
        /// Number of weight elements
        weights: usize,
    },

    /// Operand slice does not match the engine lane count
    #[error("Lane count mismatch: got {got}, engine has {expected} lanes")]
    LaneMismatch {
        /// Elements supplied
        got: usize,
        /// Lanes the engine exposes
        expected: usize,
    },

    /// Engine did not signal completion in time
    #[error("Operation timeout after {duration_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds
        duration_ms: u64,
    },

    /// Engine is still processing a previous request
    #[error("Engine busy: previous computation still in flight")]
    Busy,

    /// Known-answer self test produced a wrong result
    #[error("Self test failed: expected {expected:#x}, got {got:#x}")]
    SelfTest {
        /// Expected register value
        expected: u32,
        /// Value the engine returned
        got: u32,
    },
}

impl LinregError {
    /// Create a map failed error
    pub fn map_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MapFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a timeout error from a duration
    pub fn timeout(duration: std::time::Duration) -> Self {
        Self::Timeout {
            duration_ms: duration.as_millis() as u64,
        }
    }
}
