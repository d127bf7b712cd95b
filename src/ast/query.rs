use std::fmt;

use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::ast::{Literal, Logical, OrderStatement, Select, statements::write_list};

/// Complete query.
///
/// Only SELECT is required; the other clauses appear in this order when
/// present.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub select: Select,

    /// Source name for the store
    pub from: Option<String>,

    /// Keys restricting the source
    pub keys: Option<Vec<Literal>>,

    pub where_clause: Option<Logical>,

    pub order_by: Option<Vec<OrderStatement>>,

    pub limit: Option<Decimal>,
}

impl Query {
    /// KEYS as the strings handed to the store, whatever the literal kind.
    pub fn key_texts(&self) -> Option<Vec<String>> {
        self.keys
            .as_ref()
            .map(|keys| keys.iter().map(Literal::key_text).collect())
    }

    /// LIMIT truncated to a row count; negative limits allow no rows.
    pub fn limit_count(&self) -> Option<usize> {
        self.limit
            .map(|n| n.trunc().max(Decimal::ZERO).to_usize().unwrap_or(usize::MAX))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.select)?;
        if let Some(from) = &self.from {
            write!(f, " FROM {}", from)?;
        }
        if let Some(keys) = &self.keys {
            f.write_str(" KEYS ")?;
            write_list(f, keys)?;
        }
        if let Some(logical) = &self.where_clause {
            write!(f, " WHERE {}", logical)?;
        }
        if let Some(order_by) = &self.order_by {
            f.write_str(" ORDER BY ")?;
            write_list(f, order_by)?;
        }
        if let Some(limit) = &self.limit {
            write!(f, " LIMIT {}", limit)?;
        }
        Ok(())
    }
}
