//! Error types for the engine.
//!
//! - [`HandlerFault`]: a single capability read that failed or panicked.
//!   The fault barrier contains these; callers only see them through
//!   [`EngineError`] when a mutation override fails.
//! - [`EngineError`]: errors surfaced by engine operations.
//! - [`ConfigError`]: configuration loading failures.

use thiserror::Error;

use crate::entity::EntityId;

/// A failure inside one handler capability.
#[derive(Debug, Error)]
pub enum HandlerFault {
    /// The capability function returned an error.
    #[error("capability `{capability}` failed: {source:#}")]
    Capability {
        /// Capability name, e.g. `"sprite"`.
        capability: &'static str,
        /// Error produced by the handler.
        source: anyhow::Error,
    },

    /// The capability function panicked.
    #[error("handler panicked: {message}")]
    Panicked {
        /// Panic payload rendered as text.
        message: String,
    },
}

impl HandlerFault {
    /// Wraps a handler error with the capability that produced it.
    #[must_use]
    pub fn capability(capability: &'static str, source: anyhow::Error) -> Self {
        Self::Capability { capability, source }
    }

    /// Builds a fault from a caught panic payload.
    #[must_use]
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::Panicked { message }
    }
}

/// Errors returned by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A mutation override of a handler failed.
    #[error("handler for `{entity_type}` (entity {entity}) failed during {operation}: {fault}")]
    HandlerFault {
        /// Entity type of the failing handler.
        entity_type: String,
        /// Instance being mutated.
        entity: EntityId,
        /// Operation name, e.g. `"move"`.
        operation: &'static str,
        /// Underlying fault.
        #[source]
        fault: HandlerFault,
    },

    /// Placement template data could not be turned into an instance.
    #[error("invalid placement template `{placement}` for `{entity_type}`: {source}")]
    InvalidTemplate {
        /// Entity type the template belongs to.
        entity_type: String,
        /// Placement name.
        placement: String,
        /// Deserialization error.
        #[source]
        source: serde_json::Error,
    },
}

/// Errors loading an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Input was not valid configuration JSON.
    #[error("invalid engine configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value parsed but is out of range.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}
