//! Error types for the combat core.
//!
//! Almost nothing in the core fails: illegal transitions are silently
//! suppressed and numbers saturate. The variants here are the few
//! conditions a caller actually needs to hear about.

use thiserror::Error;

use crate::fighter::FighterId;
use crate::math::Fixed;

/// Result type alias using [`FightError`].
pub type Result<T> = std::result::Result<T, FightError>;

/// Top-level error type for all combat core errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FightError {
    /// A hit was resolved against a fighter with no health left.
    #[error("Fighter {0:?} is already defeated")]
    AlreadyDefeated(FighterId),

    /// An input arrived with a timestamp older than the newest buffered one.
    #[error("Non-monotonic input timestamp: received {received} after {previous}")]
    NonMonotonicTimestamp {
        /// Timestamp of the newest buffered input.
        previous: Fixed,
        /// Timestamp that was rejected.
        received: Fixed,
    },

    /// No command with this name is configured.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Configuration text could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        /// Parser error message.
        message: String,
    },

    /// Configuration parsed but violates a constraint.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid duel state.
    #[error("Invalid duel state: {0}")]
    InvalidState(String),
}
