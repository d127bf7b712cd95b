use std::fmt;

use crate::ast::{CompareOp, Expr};

/// `left (op right)?`
///
/// Without a right-hand side the left value is read as a boolean, which is
/// how predicate functions are used directly: `isThing($.value)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Compare {
    pub left: Expr,
    pub right: Option<(CompareOp, Expr)>,
}

impl fmt::Display for Compare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.left)?;
        if let Some((op, right)) = &self.right {
            write!(f, " {} {}", op, right)?;
        }
        Ok(())
    }
}

/// Operand of NOT/AND: a comparison or a nested expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Factor {
    Compare(Compare),
    Nested(Box<Logical>),
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Factor::Compare(c) => write!(f, "{}", c),
            Factor::Nested(l) => write!(f, "{}", l),
        }
    }
}

/// `NOT? factor`
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub invert: bool,
    pub factor: Factor,
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.invert {
            f.write_str("NOT ")?;
        }
        write!(f, "{}", self.factor)
    }
}

/// `argument (AND argument)*`
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub first: Argument,
    pub ands: Vec<Argument>,
}

impl Term {
    pub fn arguments(&self) -> impl Iterator<Item = &Argument> {
        std::iter::once(&self.first).chain(self.ands.iter())
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, argument) in self.arguments().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{}", argument)?;
        }
        Ok(())
    }
}

/// `term (OR term)*`, always rendered in parentheses.
#[derive(Debug, Clone, PartialEq)]
pub struct Logical {
    pub first: Term,
    pub ors: Vec<Term>,
}

impl Logical {
    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        std::iter::once(&self.first).chain(self.ors.iter())
    }
}

impl fmt::Display for Logical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, term) in self.terms().enumerate() {
            if i > 0 {
                f.write_str(" OR ")?;
            }
            write!(f, "{}", term)?;
        }
        f.write_str(")")
    }
}
