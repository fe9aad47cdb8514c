//! Error types for the director core.
//!
//! Only configuration loading surfaces these to callers. Event validation
//! produces [`NightmareError::InvalidEvent`], but the observer swallows it:
//! a bad telemetry sample never interrupts the simulation.

use thiserror::Error;

/// Top-level error type for all director operations.
#[derive(Error, Debug)]
pub enum NightmareError {
    /// A gameplay event carried a payload that cannot be ingested.
    #[error("Invalid {kind} event: {reason}")]
    InvalidEvent {
        /// Which event kind was rejected.
        kind: &'static str,
        /// What was wrong with the payload.
        reason: String,
    },

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NightmareError {
    /// Build an [`NightmareError::InvalidEvent`] for the given event kind.
    #[must_use]
    pub fn invalid_event(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidEvent {
            kind,
            reason: reason.into(),
        }
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, NightmareError>;
