//! Error taxonomy shared by every mutating and querying operation
//!
//! No operation mutates partially: a command either yields a new snapshot or
//! one of these values, and the previous snapshot stays untouched.

use miette::Diagnostic;
use thiserror::Error;

use crate::core::identity::EntityPrefix;

/// Errors produced by the domain model
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum CoreError {
    /// Malformed input, with one message per offending field
    #[error("Validation failed: {}", .messages.join("; "))]
    #[diagnostic(
        code(plantree::validation),
        help("Correct the listed fields and run the command again")
    )]
    Validation { messages: Vec<String> },

    /// A referenced id does not exist
    #[error("{kind} not found: {id}")]
    #[diagnostic(code(plantree::not_found))]
    NotFound { kind: &'static str, id: String },

    /// The operation would break a structural invariant
    #[error("Consistency error: {0}")]
    #[diagnostic(code(plantree::consistency))]
    Consistency(String),
}

impl CoreError {
    pub fn not_found(prefix: EntityPrefix, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            kind: prefix.kind(),
            id: id.into(),
        }
    }

    pub fn validation(messages: Vec<String>) -> Self {
        CoreError::Validation { messages }
    }

    pub fn consistency(message: impl Into<String>) -> Self {
        CoreError::Consistency(message.into())
    }
}
