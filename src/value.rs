use std::{cmp::Ordering, collections::HashMap, str::FromStr};

use rust_decimal::Decimal;

/// A runtime value produced by evaluating an expression.
///
/// Scalars (null, boolean, number, text) are what comparisons and ordering
/// work on. Arrays and objects come back from path reads that select
/// several nodes or a whole subtree; they can be projected and passed to
/// functions but never compare as equal or less than anything.
///
/// # Ordering
///
/// [`Value::compare`] is deliberately asymmetric: values of the same scalar
/// kind compare naturally, every other pairing reports the left side as
/// greater.
///
/// # Examples
///
/// ```
/// use rolls_engine::Value;
/// use rust_decimal::Decimal;
/// use std::cmp::Ordering;
///
/// let one = Value::Number(Decimal::ONE);
/// let two = Value::Number(Decimal::TWO);
/// assert_eq!(one.compare(&two), Ordering::Less);
///
/// // mismatched kinds: the left side always wins
/// let text = Value::Text("1".into());
/// assert_eq!(one.compare(&text), Ordering::Greater);
/// assert_eq!(text.compare(&one), Ordering::Greater);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing or null
    Null,

    Boolean(bool),

    /// Arbitrary-precision decimal
    Number(Decimal),

    /// UTF-8 text
    Text(String),

    /// Several selected nodes, or an array node
    Array(Vec<Value>),

    /// Object node
    Object(HashMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Total order over same-kind scalars; `Greater` for everything else.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            _ => Ordering::Greater,
        }
    }

    /// Read the value as a predicate result.
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Number(n) => !n.is_zero(),
            Value::Text(s) => s.trim().eq_ignore_ascii_case("true"),
            Value::Null => false,
            Value::Array(items) => !items.is_empty(),
            Value::Object(fields) => !fields.is_empty(),
        }
    }

    /// Best-effort numeric coercion: numbers as-is, text parsed, anything
    /// else 0.
    pub fn to_number(&self) -> Decimal {
        match self {
            Value::Number(n) => *n,
            Value::Text(s) => parse_decimal(s.trim()).unwrap_or(Decimal::ZERO),
            _ => Decimal::ZERO,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of an array value
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Get as string (concatenation)
    pub fn as_string(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => n.normalize().to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Null => String::new(),
            Value::Array(items) => items
                .iter()
                .map(Value::as_string)
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object]".to_string(),
        }
    }
}

/// Parse decimal text, accepting a leading `+`, a bare leading `.` and
/// scientific notation.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() {
        return None;
    }

    let mut normalized = String::with_capacity(digits.len() + 2);
    if negative {
        normalized.push('-');
    }
    if digits.starts_with('.') {
        normalized.push('0');
    }
    normalized.push_str(digits);

    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .ok()
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Decimal> for Value {
    fn from(n: Decimal) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(Decimal::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Decimal::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}
