//! Error types for zone synchronization
//!
//! This module defines all error types used throughout the crate.
//! Every error here is fatal: the core performs no retries and never
//! swallows a failure. Retry policy, if wanted, belongs to the caller.

use thiserror::Error;

/// Result type alias for zone synchronization operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the zone synchronization system
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or conflicting declarative records input.
    /// Raised before any remote interaction takes place.
    #[error("invalid records input: {0}")]
    Input(String),

    /// The remote zone contains a record type this tool cannot represent.
    /// Indicates schema/provider drift and must abort the run.
    #[error("unknown remote record type: {0}")]
    UnknownRemoteType(String),

    /// Live DNS resolution failed for a reason other than "no data".
    #[error("DNS resolution failed: {0}")]
    Resolution(String),

    /// The remote API rejected a record-set mutation. Aborts the remaining
    /// queue; already-applied mutations are not rolled back.
    #[error("mutation failed for {path} {record_type}: {message}")]
    Mutation {
        /// Record path relative to the zone
        path: String,
        /// Record type name
        record_type: String,
        /// Provider-reported failure
        message: String,
    },

    /// Provider-specific error
    #[error("provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O errors (records file reads/writes)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a declarative-input error
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Create an unknown-remote-type error
    pub fn unknown_remote_type(name: impl Into<String>) -> Self {
        Self::UnknownRemoteType(name.into())
    }

    /// Create a resolution error
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Create a mutation error
    pub fn mutation(
        path: impl Into<String>,
        record_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Mutation {
            path: path.into(),
            record_type: record_type.into(),
            message: message.into(),
        }
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
