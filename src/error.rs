//! Error types for the cache
//!
//! Cache operations themselves never fail; only construction and
//! configuration loading can.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// No Tokio runtime is available to host the background sweep task
    #[error("No Tokio runtime available to run the sweep task")]
    RuntimeUnavailable,

    /// A configuration value could not be parsed
    #[error("Invalid configuration: {var}={value:?}")]
    InvalidConfig { var: String, value: String },
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
