//! CLI support for rolls
//!
//! Provides programmatic access to the `rolls` commands so other tools can
//! run or check queries without going through a process.

mod check;
mod docs;

pub use check::{CheckOptions, RunOptions, execute_check, execute_run};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};

use std::io;

use thiserror::Error;

use crate::error::{ParseError, QueryError, StoreError};

/// Errors that can occur during CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The data set could not be loaded
    #[error("Data error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Unknown category: '{0}'\nRun 'rolls docs' to see available categories.")]
    UnknownCategory(String),
}

impl From<ParseError> for CliError {
    fn from(e: ParseError) -> Self {
        CliError::Query(QueryError::Parse(e))
    }
}
