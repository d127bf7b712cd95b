pub mod ast;
pub mod cli;
pub mod combinator;
pub mod cursor;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;
pub mod store;
pub mod value;

pub use ast::{Expr, Logical, Query};
pub use error::{EvalError, ParseError, QueryError, StoreError};
pub use evaluator::{Evaluator, Rows, query};
pub use parser::parse_query;
pub use store::{DocumentStore, InMemorySource, JsonSource, JsonStore};
pub use value::Value;
