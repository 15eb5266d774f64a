//! Error types for the payroll cost engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every condition that aborts an employer cost computation. There is
//! no partial result: a computation either returns a complete output or one
//! of these errors.

use thiserror::Error;

/// The main error type for the payroll cost engine.
///
/// Configuration problems (missing files, unknown versions, missing rate
/// entries) and input validation problems share this type so callers can
/// handle them with a single `match`.
///
/// # Example
///
/// ```
/// use payroll_cost_engine::error::EngineError;
///
/// let error = EngineError::UnknownAfpProvider {
///     name: "futura".to_string(),
/// };
/// assert_eq!(error.to_string(), "Unknown AFP provider: futura");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A parameter version is structurally inconsistent.
    #[error("Invalid parameter version '{version_id}': {message}")]
    InvalidParameters {
        /// The offending version id.
        version_id: String,
        /// A description of the inconsistency.
        message: String,
    },

    /// The requested parameter version does not exist.
    #[error("Parameter version not found: {id}")]
    ParameterVersionNotFound {
        /// The version id that was requested.
        id: String,
    },

    /// No parameter version is currently flagged as active.
    #[error("No active parameter version is configured")]
    NoActiveParameterVersion,

    /// The AFP named by the worker has no commission entry.
    #[error("Unknown AFP provider: {name}")]
    UnknownAfpProvider {
        /// The AFP name as requested.
        name: String,
    },

    /// No currency reference value is known for the requested point in time.
    #[error("No {reference} value available for {at}")]
    ReferenceNotFound {
        /// The reference kind ("UF", "UTM" or "IMM").
        reference: String,
        /// The date or month the value was requested for.
        at: String,
    },

    /// A field of the cost request was invalid.
    #[error("Invalid input field '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for building an [`EngineError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
