//! Core error types for behavior-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering the
//! failure modes of loading and writing a behavior graph document.

use thiserror::Error;

/// Errors produced while reading or writing behavior graph documents.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The document is not valid JSON or does not match the graph schema.
    #[error("invalid behavior graph document: {reason}")]
    InvalidDocument { reason: String },

    /// A literal parameter object carries the `$node` marker and would be
    /// read back as a reference.
    #[error("literal {literal} carries the '$node' marker and cannot be written as a literal")]
    AmbiguousLiteral { literal: String },
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::InvalidDocument {
            reason: err.to_string(),
        }
    }
}
