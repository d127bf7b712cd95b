//! Error types for the query engine.
//!
//! Parsing never raises: combinators hand a [`ParseError`] back up the
//! grammar as a plain value. Only the query boundary turns it into a
//! [`QueryError`].

use thiserror::Error;

/// A failed parse: the most specific construct that was expected and the
/// byte offset where it was expected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("expected {expected} at position {position}")]
pub struct ParseError {
    pub expected: String,
    pub position: usize,
}

impl ParseError {
    pub fn new(expected: impl Into<String>, position: usize) -> Self {
        ParseError {
            expected: expected.into(),
            position,
        }
    }
}

/// Errors raised by a document store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("function '{0}' is not implemented")]
    NotImplemented(String),

    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("unknown source: {0}")]
    UnknownSource(String),

    #[error("invalid data set: {0}")]
    InvalidData(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while evaluating a parsed query.
#[derive(Error, Debug)]
pub enum EvalError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid arguments to {function}(): {reason}")]
    InvalidArgument { function: String, reason: String },
}

impl EvalError {
    pub(crate) fn invalid_argument(function: &str, reason: impl Into<String>) -> Self {
        EvalError::InvalidArgument {
            function: function.to_string(),
            reason: reason.into(),
        }
    }
}

/// The single fault type surfaced at the query-execution boundary.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),
}
