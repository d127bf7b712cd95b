//! The document store contract.
//!
//! The evaluator knows nothing about how documents are represented. It
//! reads them from a [`DocumentStore`], asks the store to resolve paths
//! against them, and asks the store to build the projected output
//! documents. [`json::JsonStore`] is the bundled implementation over
//! `serde_json` trees.

pub mod json;

use rust_decimal::Decimal;

use crate::{error::StoreError, value::Value};

pub use json::{InMemorySource, JsonSource, JsonStore, json_to_value, value_to_json};

/// Lazily produced documents from a store read.
pub type Documents<'s, D> = Box<dyn Iterator<Item = D> + 's>;

/// Everything the evaluator needs from a backend.
pub trait DocumentStore {
    /// The backend's document representation
    type Document;

    /// An empty document, used for projected rows and FROM-less queries.
    fn new_document(&self) -> Self::Document;

    /// Set the named field on `document`. Null values may be left out.
    fn add(&self, document: Self::Document, name: &str, value: Value) -> Self::Document;

    /// Every document of `source`.
    fn read(&self, source: &str) -> Result<Documents<'_, Self::Document>, StoreError>;

    /// The documents of `source` whose key is one of `keys`.
    fn read_keys(
        &self,
        source: &str,
        keys: &[String],
    ) -> Result<Documents<'_, Self::Document>, StoreError>;

    /// Evaluate a path expression against a document.
    fn path(&self, document: &Self::Document, path: &str) -> Result<Value, StoreError>;

    /// Numeric coercion used by the aggregates.
    fn number(&self, value: &Value) -> Decimal {
        value.to_number()
    }

    /// Run a function that is not built in.
    fn execute(
        &self,
        document: &Self::Document,
        name: &str,
        args: &[Value],
    ) -> Result<Value, StoreError> {
        let _ = (document, args);
        Err(StoreError::NotImplemented(name.to_string()))
    }
}
