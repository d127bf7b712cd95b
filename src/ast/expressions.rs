use std::fmt;

use rust_decimal::Decimal;

use crate::value::Value;

/// Literal constant written in the query.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Decimal number
    ///
    /// # Examples
    /// ```text
    /// 42
    /// -1.5
    /// +.25
    /// ```
    Number(Decimal),

    /// Quoted text, single or double quotes
    ///
    /// # Examples
    /// ```text
    /// 'Fred'
    /// "the dudes name"
    /// ```
    Text(String),

    /// `true` / `false`, any case
    Bool(bool),

    /// `null`, any case
    Null,
}

impl Literal {
    /// The runtime value of the literal.
    pub fn to_value(&self) -> Value {
        match self {
            Literal::Number(n) => Value::Number(*n),
            Literal::Text(s) => Value::Text(s.clone()),
            Literal::Bool(b) => Value::Boolean(*b),
            Literal::Null => Value::Null,
        }
    }

    /// The literal as a document key; KEYS always hands strings to the store.
    pub fn key_text(&self) -> String {
        match self {
            Literal::Number(n) => n.to_string(),
            Literal::Text(s) => s.clone(),
            Literal::Bool(b) => b.to_string(),
            Literal::Null => "null".to_string(),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Text(s) => write!(f, "'{}'", s),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Null => f.write_str("null"),
        }
    }
}

/// A raw path expression in the store's path dialect (e.g. JSONPath).
///
/// The grammar only finds where a path ends; what is inside belongs to the
/// store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path(pub String);

impl Path {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last segment of the path, used to name projected fields.
    ///
    /// A trailing bracket group (index, slice or filter) is dropped first,
    /// then the text after the last `.` is taken.
    ///
    /// ```
    /// use rolls_engine::ast::Path;
    ///
    /// assert_eq!(Path("$.name".into()).implied_name(), "name");
    /// assert_eq!(Path("$.roles[?(@.title == 'x')]".into()).implied_name(), "roles");
    /// assert_eq!(Path("$".into()).implied_name(), "$");
    /// ```
    pub fn implied_name(&self) -> String {
        let mut name = self.0.as_str();

        if name.ends_with(']') {
            let mut depth = 0usize;
            for (i, ch) in name.char_indices().rev() {
                match ch {
                    ']' => depth += 1,
                    '[' => {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            name = &name[..i];
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }

        match name.rfind('.') {
            Some(i) => name[i + 1..].to_string(),
            None => name.to_string(),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Named function applied to argument expressions.
///
/// # Example
/// ```text
/// starts($.name, 'Fred', true)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expr>,
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", arg)?;
        }
        f.write_str(")")
    }
}

/// A value expression: anything that evaluates to a [`Value`].
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Path read from the current document (`$...`)
    Path(Path),

    /// Constant
    Literal(Literal),

    /// Function call, arguments evaluated first
    Function(FunctionCall),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Path(p) => write!(f, "{}", p),
            Expr::Literal(l) => write!(f, "{}", l),
            Expr::Function(func) => write!(f, "{}", func),
        }
    }
}
