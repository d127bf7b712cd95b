//! Query evaluation.
//!
//! A query runs as one linear pipeline over the documents the store hands
//! out: read, filter, order, limit, then project or aggregate. Every stage
//! is a lazy iterator except ordering and aggregation, which have to see
//! all of their input first. Even those wait until the first result is
//! pulled.

mod aggregate;
mod ordering;

use std::{cmp::Ordering, iter};

use tracing::{debug, trace};

use crate::{
    ast::{
        AggregateFunction, Argument, Compare, CompareOp, Expr, Factor, Logical, OrderDirection,
        OrderStatement, Query, Select, SelectStatement, Term,
    },
    error::{EvalError, QueryError},
    functions,
    parser::parse_query,
    store::{DocumentStore, Documents},
    value::Value,
};

use aggregate::Accumulator;
use ordering::{SortKeys, stable_sort};

/// Lazily produced query results.
pub type Rows<'s, D> = Box<dyn Iterator<Item = Result<D, EvalError>> + 's>;

/// Evaluates queries against a [`DocumentStore`].
///
/// The evaluator holds nothing but the store reference, so it is `Copy` and
/// every result iterator carries its own.
///
/// # Examples
///
/// ```
/// use rolls_engine::{Evaluator, store::{InMemorySource, JsonStore}};
/// use serde_json::json;
///
/// let source = InMemorySource::from_json(json!({
///     "people": [
///         { "id": 1, "name": "Fred", "age": 23 },
///         { "id": 2, "name": "Tim", "age": 45 },
///     ],
/// })).unwrap();
/// let store = JsonStore::new(source);
///
/// let rows: Vec<_> = Evaluator::new(&store)
///     .run("SELECT $.name FROM people WHERE $.age > 30")
///     .unwrap()
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(rows, vec![json!({ "name": "Tim" })]);
/// ```
pub struct Evaluator<'s, S> {
    store: &'s S,
}

impl<S> Clone for Evaluator<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Evaluator<'_, S> {}

impl<'s, S> Evaluator<'s, S>
where
    S: DocumentStore,
    S::Document: 's,
{
    pub fn new(store: &'s S) -> Self {
        Evaluator { store }
    }

    /// Parse and execute query text.
    pub fn run(&self, text: &str) -> Result<Rows<'s, S::Document>, QueryError> {
        let query = parse_query(text)?;
        Ok(self.execute(&query)?)
    }

    /// Execute a parsed query.
    ///
    /// Reading the source happens here, so an unknown source fails before
    /// any rows exist. Everything after that fails lazily, as the rows are
    /// pulled.
    pub fn execute(&self, query: &Query) -> Result<Rows<'s, S::Document>, EvalError> {
        let evaluator = *self;
        let store = self.store;

        let documents: Documents<'s, S::Document> = match &query.from {
            Some(from) => match query.key_texts() {
                Some(keys) => store.read_keys(from, &keys)?,
                None => store.read(from)?,
            },
            None => Box::new(iter::once(store.new_document())),
        };
        let mut rows: Rows<'s, S::Document> = Box::new(documents.map(Ok));

        if let Some(condition) = query.where_clause.clone() {
            rows = Box::new(rows.filter_map(move |row| {
                let document = match row {
                    Ok(document) => document,
                    Err(e) => return Some(Err(e)),
                };
                match evaluator.eval_logical(&condition, &document) {
                    Ok(kept) => {
                        trace!(kept, "where");
                        kept.then_some(Ok(document))
                    }
                    Err(e) => Some(Err(e)),
                }
            }));
        }

        if let Some(order) = query.order_by.clone() {
            let unordered = rows;
            rows = deferred(move || evaluator.order(unordered, &order));
        }

        if let Some(limit) = query.limit_count() {
            rows = Box::new(rows.take(limit));
        }

        let output: Rows<'s, S::Document> = match &query.select {
            Select::Statements(statements) => {
                let statements = statements.clone();
                Box::new(rows.map(move |row| {
                    row.and_then(|document| evaluator.project(&statements, &document))
                }))
            }
            Select::Aggregates(aggregates) => {
                let aggregates = aggregates.clone();
                deferred(move || {
                    evaluator
                        .aggregate(rows, &aggregates)
                        .map(|document| vec![document])
                })
            }
        };

        Ok(output)
    }

    /// Evaluate a value: literals as written, paths through the store,
    /// functions built-in first and then through the store.
    pub fn eval_expr(&self, expr: &Expr, document: &S::Document) -> Result<Value, EvalError> {
        match expr {
            Expr::Literal(literal) => Ok(literal.to_value()),
            Expr::Path(path) => Ok(self.store.path(document, path.as_str())?),
            Expr::Function(call) => {
                let args = call
                    .args
                    .iter()
                    .map(|arg| self.eval_expr(arg, document))
                    .collect::<Result<Vec<_>, _>>()?;

                match functions::call(&call.name, &args)? {
                    Some(value) => Ok(value),
                    None => Ok(self.store.execute(document, &call.name, &args)?),
                }
            }
        }
    }

    pub fn eval_compare(&self, compare: &Compare, document: &S::Document) -> Result<bool, EvalError> {
        let left = self.eval_expr(&compare.left, document)?;
        match &compare.right {
            None => Ok(left.as_bool()),
            Some((op, right)) => {
                let right = self.eval_expr(right, document)?;
                Ok(compare_values(&left, *op, &right))
            }
        }
    }

    /// True if any term holds. Stops at the first term that does.
    pub fn eval_logical(&self, logical: &Logical, document: &S::Document) -> Result<bool, EvalError> {
        for term in logical.terms() {
            if self.eval_term(term, document)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn eval_term(&self, term: &Term, document: &S::Document) -> Result<bool, EvalError> {
        for argument in term.arguments() {
            if !self.eval_argument(argument, document)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn eval_argument(&self, argument: &Argument, document: &S::Document) -> Result<bool, EvalError> {
        let holds = match &argument.factor {
            Factor::Compare(compare) => self.eval_compare(compare, document)?,
            Factor::Nested(logical) => self.eval_logical(logical, document)?,
        };
        Ok(holds != argument.invert)
    }

    fn order(
        &self,
        rows: Rows<'s, S::Document>,
        order: &[OrderStatement],
    ) -> Result<Vec<S::Document>, EvalError> {
        let keyed = rows
            .map(|row| row.map(|document| SortKeys::new(document, order.len())))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(rows = keyed.len(), keys = order.len(), "ordering");

        let sorted = stable_sort(keyed, |a, b| self.compare_keys(order, a, b))?;
        Ok(sorted.into_iter().map(SortKeys::into_document).collect())
    }

    /// Compare two rows key by key; the first unequal key decides.
    fn compare_keys(
        &self,
        order: &[OrderStatement],
        a: &SortKeys<S::Document>,
        b: &SortKeys<S::Document>,
    ) -> Result<Ordering, EvalError> {
        for (i, statement) in order.iter().enumerate() {
            let left = a.key(i, |document| self.eval_expr(&statement.value, document))?;
            let right = b.key(i, |document| self.eval_expr(&statement.value, document))?;

            // null keys come first
            let result = match (left.is_null(), right.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (false, false) => left.compare(right),
            };
            if result != Ordering::Equal {
                return Ok(match statement.direction() {
                    OrderDirection::Asc => result,
                    OrderDirection::Desc => result.reverse(),
                });
            }
        }
        Ok(Ordering::Equal)
    }

    fn project(
        &self,
        statements: &[SelectStatement],
        document: &S::Document,
    ) -> Result<S::Document, EvalError> {
        let mut output = self.store.new_document();
        for (i, statement) in statements.iter().enumerate() {
            let name = statement.implied_name().unwrap_or_else(|| i.to_string());
            let value = self.eval_expr(&statement.value, document)?;
            output = self.store.add(output, &name, value);
        }
        Ok(output)
    }

    fn aggregate(
        &self,
        rows: Rows<'s, S::Document>,
        aggregates: &[AggregateFunction],
    ) -> Result<S::Document, EvalError> {
        let mut accumulators: Vec<Accumulator> = aggregates
            .iter()
            .map(|aggregate| Accumulator::new(aggregate.kind))
            .collect();

        let mut count = 0usize;
        for row in rows {
            let document = row?;
            for (aggregate, accumulator) in aggregates.iter().zip(accumulators.iter_mut()) {
                let value = self.eval_expr(&aggregate.value, &document)?;
                accumulator.add(self.store.number(&value));
            }
            count += 1;
        }
        debug!(rows = count, aggregates = aggregates.len(), "aggregated");

        let mut output = self.store.new_document();
        for (aggregate, accumulator) in aggregates.iter().zip(&accumulators) {
            output = self.store.add(
                output,
                &aggregate.implied_name(),
                Value::Number(accumulator.result()),
            );
        }
        Ok(output)
    }
}

/// Apply a comparison operator. A null left side is unequal to everything
/// and neither less nor greater than anything.
pub fn compare_values(left: &Value, op: CompareOp, right: &Value) -> bool {
    if left.is_null() {
        return op == CompareOp::Ne;
    }

    let ordering = left.compare(right);
    match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Gte => ordering != Ordering::Less,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Lte => ordering != Ordering::Greater,
    }
}

/// Rows produced all at once by `produce`, which only runs when the first
/// row is pulled.
fn deferred<'s, D, F>(produce: F) -> Rows<'s, D>
where
    D: 's,
    F: FnOnce() -> Result<Vec<D>, EvalError> + 's,
{
    Box::new(iter::once_with(produce).flat_map(|produced| {
        produced.map_or_else(
            |e| vec![Err(e)],
            |documents| documents.into_iter().map(Ok).collect(),
        )
    }))
}

/// Parse and run a query, collecting every result.
///
/// ```
/// use rolls_engine::store::{InMemorySource, JsonStore};
/// use serde_json::json;
///
/// let store = JsonStore::new(InMemorySource::new());
/// let rows = rolls_engine::query(&store, "SELECT 1 AS one, 'x' AS letter").unwrap();
/// assert_eq!(rows, vec![json!({ "one": 1, "letter": "x" })]);
/// ```
pub fn query<'s, S>(store: &'s S, text: &str) -> Result<Vec<S::Document>, QueryError>
where
    S: DocumentStore,
    S::Document: 's,
{
    let rows = Evaluator::new(store).run(text)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_left_is_only_unequal() {
        for op in [
            CompareOp::Eq,
            CompareOp::Gt,
            CompareOp::Gte,
            CompareOp::Lt,
            CompareOp::Lte,
        ] {
            assert!(!compare_values(&Value::Null, op, &Value::Null), "{}", op);
            assert!(!compare_values(&Value::Null, op, &Value::from(3)), "{}", op);
        }
        assert!(compare_values(&Value::Null, CompareOp::Ne, &Value::from(3)));
    }

    #[test]
    fn test_mismatched_kinds_compare_greater() {
        let text = Value::from("4");
        let number = Value::from(4);
        assert!(compare_values(&text, CompareOp::Gt, &number));
        assert!(compare_values(&number, CompareOp::Gt, &text));
        assert!(!compare_values(&number, CompareOp::Eq, &text));
        assert!(compare_values(&number, CompareOp::Ne, &text));
    }

    #[test]
    fn test_same_kind_comparisons() {
        let two = Value::from(2);
        let three = Value::from(3);
        assert!(compare_values(&two, CompareOp::Lt, &three));
        assert!(compare_values(&two, CompareOp::Lte, &two));
        assert!(compare_values(&three, CompareOp::Gte, &two));
        assert!(!compare_values(&three, CompareOp::Lt, &two));
    }
}
