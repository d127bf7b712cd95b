//! # Query Language - Abstract Syntax Tree
//!
//! The tree the grammar builds from query text. Nodes are plain immutable
//! data: built once per query, read by the evaluator, then dropped.
//!
//! ## Architecture Overview
//!
//! - **[expressions]** - literals, paths, function calls ([`Expr`])
//! - **[operators]** - comparison operators, sort directions, aggregate kinds
//! - **[logical]** - comparisons and the AND/OR/NOT tree over them
//! - **[statements]** - SELECT projections, aggregates and ORDER BY keys
//! - **[query]** - the complete query
//!
//! ## Quick Start
//!
//! ```text
//! SELECT $.name, isManager: any($.roles[?(@.title == 'manager')])
//! FROM people
//! KEYS 1, 2, 3
//! WHERE starts($.name, 'Fred') OR $.age > 40
//! ORDER BY $.age DESC, $.name
//! LIMIT 2
//! ```
//!
//! ## Recursion
//!
//! The tree only recurses in two places: function arguments are [`Expr`]s,
//! and a logical [`Factor`] may be a nested [`Logical`] expression.
//!
//! ## Rendering
//!
//! Every node implements `Display`, producing normalized query text: a
//! comparison renders as `left op right`, a logical expression is always
//! parenthesized, and function arguments are joined without spaces.
//!
//! ```
//! use rolls_engine::parser::parse_logical;
//!
//! let logical = parse_logical("1 = 1 AND NOT 'a' = 'b' OR f($.x)").unwrap();
//! assert_eq!(logical.to_string(), "(1 = 1 AND NOT 'a' = 'b' OR f($.x))");
//! ```
pub mod expressions;
pub mod logical;
pub mod operators;
pub mod query;
pub mod statements;

pub use expressions::{Expr, FunctionCall, Literal, Path};
pub use logical::{Argument, Compare, Factor, Logical, Term};
pub use operators::{AggregateKind, CompareOp, OrderDirection};
pub use query::Query;
pub use statements::{AggregateFunction, OrderStatement, Select, SelectStatement};
