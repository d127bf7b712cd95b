use std::fmt;

use crate::ast::{AggregateKind, Expr, OrderDirection};

/// Plain projection: `(name:)? value (AS name)?`
///
/// # Examples
/// ```text
/// $.name
/// isManager: any($.roles[?(@.title == 'manager')])
/// $.name AS 'the dudes name'
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub name: Option<String>,
    pub value: Expr,
}

impl SelectStatement {
    /// Explicit name, else the function name, else the path's last segment.
    /// Literals have no implied name; the evaluator falls back to the
    /// statement's position.
    pub fn implied_name(&self) -> Option<String> {
        if let Some(name) = &self.name {
            return Some(name.clone());
        }
        match &self.value {
            Expr::Function(f) => Some(f.name.clone()),
            Expr::Path(p) => Some(p.implied_name()),
            Expr::Literal(_) => None,
        }
    }
}

impl fmt::Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "'{}': ", name)?;
        }
        write!(f, "{}", self.value)
    }
}

/// Aggregate projection: `(name:)? KIND(value) (AS name)?`
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateFunction {
    pub name: Option<String>,
    pub kind: AggregateKind,
    pub value: Expr,
}

impl AggregateFunction {
    /// Explicit name, else `Kind(segment)` from the aggregated path.
    ///
    /// ```
    /// use rolls_engine::ast::{AggregateFunction, AggregateKind, Expr, Path};
    ///
    /// let sum = AggregateFunction {
    ///     name: None,
    ///     kind: AggregateKind::Sum,
    ///     value: Expr::Path(Path("$.age".into())),
    /// };
    /// assert_eq!(sum.implied_name(), "Sum(age)");
    /// ```
    pub fn implied_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        let segment = match &self.value {
            Expr::Path(p) => p.implied_name(),
            _ => String::new(),
        };
        format!("{}({})", self.kind.name(), segment)
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "'{}': ", name)?;
        }
        write!(f, "{}({})", self.kind, self.value)
    }
}

/// The SELECT clause: either all plain statements or all aggregates.
#[derive(Debug, Clone, PartialEq)]
pub enum Select {
    Statements(Vec<SelectStatement>),
    Aggregates(Vec<AggregateFunction>),
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        match self {
            Select::Statements(statements) => write_list(f, statements),
            Select::Aggregates(aggregates) => write_list(f, aggregates),
        }
    }
}

/// ORDER BY key: `value (ASC|DESC)?`
#[derive(Debug, Clone, PartialEq)]
pub struct OrderStatement {
    pub value: Expr,
    /// As written; `None` sorts ascending
    pub direction: Option<OrderDirection>,
}

impl OrderStatement {
    pub fn direction(&self) -> OrderDirection {
        self.direction.unwrap_or_default()
    }
}

impl fmt::Display for OrderStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        if let Some(direction) = self.direction {
            write!(f, " {}", direction)?;
        }
        Ok(())
    }
}

pub(crate) fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}
