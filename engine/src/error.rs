//! Error types for the cartform engine.

use thiserror::Error;

/// All possible errors from the cartform engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// An expand-eligible line carries component arrays that parse but
    /// disagree structurally. The whole invocation is rejected.
    #[error("Invalid bundle composition")]
    InvalidBundleComposition,

    /// The host handed over input that does not decode as a cart.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
