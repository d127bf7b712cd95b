//! The query grammar.
//!
//! Every rule is a [`Parser`] built from the combinators in
//! [`crate::combinator`]. The rules are assembled once, on first use, into
//! a process-wide [`Grammar`]; after that they are shared read-only by every
//! thread that parses.
//!
//! Paths are deliberately opaque here. The grammar only decides where a path
//! ends (see [`scan_path`]); the text in between belongs to the store.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::{
    ast::{
        AggregateFunction, AggregateKind, Argument, Compare, CompareOp, Expr, Factor,
        FunctionCall, Literal, Logical, OrderDirection, OrderStatement, Path, Query, Select,
        SelectStatement, Term,
    },
    combinator::{Forward, Parser, exact, literal, pattern, scan, whitespaces},
    cursor::Cursor,
    error::ParseError,
    value::parse_decimal,
};

/// Characters that end a path outside brackets and parentheses.
const PATH_TERMINATORS: &[char] = &[',', '<', '>', '=', ')', '}', ';'];

/// Clause keywords that end a path when preceded by whitespace. Any keyword
/// that may follow a value in the grammar has to be listed here, or paths
/// will run into it.
const PATH_TERMINATOR_KEYWORDS: &[&str] = &[
    "AS", "FROM", "KEYS", "WHERE", "ORDER", "LIMIT", "DESC", "AND", "OR",
];

static COMMENT: LazyLock<Regex> = LazyLock::new(|| regex(r"(?m)--.*$"));

static GRAMMAR: LazyLock<Grammar> = LazyLock::new(Grammar::build);

fn regex(source: &str) -> Regex {
    Regex::new(source).expect("grammar patterns are valid regular expressions")
}

/// Remove `--` line comments. Line breaks are kept so positions in error
/// messages still point at the right line.
pub fn strip_comments(text: &str) -> String {
    COMMENT.replace_all(text, "").into_owned()
}

/// Find the end of a path starting at `start`.
///
/// A path starts with `$` and runs until a terminator character or a
/// terminator keyword is found outside `(` `)` / `[` `]` nesting. A keyword
/// only counts when whitespace precedes it, so `$.order` and `$.brand` stay
/// intact. With no terminator the path runs to the end of the input.
pub fn scan_path(source: &str, start: usize) -> usize {
    let Some(text) = source.get(start..) else {
        return start;
    };
    if !text.starts_with('$') {
        return start;
    }

    let mut nesting: i32 = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, ch)) = chars.next() {
        match ch {
            '(' | '[' => nesting += 1,
            ')' | ']' => nesting -= 1,
            _ => {}
        }
        if nesting > 0 {
            continue;
        }

        if PATH_TERMINATORS.contains(&ch) {
            return start + i;
        }
        if ch == '!' && chars.peek().is_some_and(|&(_, next)| next == '=') {
            return start + i;
        }
        if ch.is_ascii_alphabetic() && ends_path_at(text, i) {
            return start + i;
        }
    }

    source.len()
}

fn ends_path_at(text: &str, at: usize) -> bool {
    let preceded_by_space = text[..at].chars().next_back().is_some_and(char::is_whitespace);
    preceded_by_space
        && PATH_TERMINATOR_KEYWORDS.iter().any(|keyword| {
            text.get(at..at + keyword.len())
                .is_some_and(|found| found.eq_ignore_ascii_case(keyword))
        })
}

/// A symbol surrounded by optional whitespace, matched case-insensitively.
pub fn token(expected: &str) -> Parser<String> {
    whitespaces()
        .take(exact(expected))
        .skip(whitespaces())
        .label(expected)
}

/// Like [`token`], but the match may not run on into an identifier:
/// `NOT` matches in `NOT $.x` and not in `nothing($.x)`.
pub fn keyword(word: &str) -> Parser<String> {
    let bounded = pattern(word, regex(&format!(r"(?i)^{}\b", regex::escape(word))));
    whitespaces()
        .take(bounded.map(|m| m.text))
        .skip(whitespaces())
        .label(word)
}

/// Succeeds only with nothing left to read.
fn end_of_input() -> Parser<()> {
    Parser::new("end of query", |input| {
        if input.remaining() == 0 {
            Ok((input, ()))
        } else {
            Err(ParseError::new("end of query", input.offset()))
        }
    })
}

/// All grammar rules, built once.
///
/// The fields are the individual rules so that tests and tools can parse a
/// fragment (a single comparison, a function call) without a whole query.
pub struct Grammar {
    pub number: Parser<Literal>,
    pub text: Parser<String>,
    pub boolean: Parser<Literal>,
    pub null: Parser<Literal>,
    pub literal: Parser<Literal>,
    pub identifier: Parser<String>,
    pub path: Parser<Path>,
    pub value: Parser<Expr>,
    pub function: Parser<FunctionCall>,
    pub compare_op: Parser<CompareOp>,
    pub compare: Parser<Compare>,
    pub logical: Parser<Logical>,
    pub aggregate: Parser<AggregateFunction>,
    pub select_statement: Parser<SelectStatement>,
    pub select: Parser<Select>,
    pub from: Parser<String>,
    pub keys: Parser<Vec<Literal>>,
    pub where_clause: Parser<Logical>,
    pub order_by: Parser<Vec<OrderStatement>>,
    pub limit: Parser<rust_decimal::Decimal>,
    pub query: Parser<Query>,

    /// The optional clauses, used to explain input left over after a query
    clauses: Vec<Parser<()>>,
}

impl Grammar {
    fn build() -> Grammar {
        let number_value = pattern("Number", regex(r"^[+-]?(\d*\.)?\d+"))
            .try_map(|m| {
                parse_decimal(&m.text).ok_or_else(|| "number out of range".to_string())
            });
        let number = number_value.clone().map(Literal::Number).label("Number");

        let text = pattern("Text", regex(r#"^(?:"([^"]*)"|'([^']*)')"#))
            .map(|m| m.group(1).or(m.group(2)).unwrap_or_default().to_string())
            .label("Text");

        let boolean = pattern("Bool", regex(r"(?i)^(true|false)\b"))
            .map(|m| Literal::Bool(m.text.eq_ignore_ascii_case("true")))
            .label("Bool");

        let null = pattern("Null", regex(r"(?i)^null\b"))
            .map(|_| Literal::Null)
            .label("Null");

        let literal_rule = number
            .clone()
            .or(text.clone().map(Literal::Text))
            .or(boolean.clone())
            .or(null.clone())
            .label("Literal");

        let identifier = pattern("Identifier", regex(r"^[A-Za-z_][\w\-]*"))
            .map(|m| m.text)
            .label("Identifier");

        let path = scan("Path", scan_path)
            .map(|raw| Path(raw.trim().to_string()))
            .label("Path");

        let function_forward: Forward<FunctionCall> = Forward::new("Function");

        let value = path
            .clone()
            .map(Expr::Path)
            .or(literal_rule.clone().map(Expr::Literal))
            .or(function_forward.parser().map(Expr::Function))
            .label("Value");

        let function = identifier
            .clone()
            .skip(token("("))
            .and(value.clone().separated(token(",")))
            .skip(token(")"))
            .map(|(name, args)| FunctionCall { name, args })
            .label("Function");
        function_forward.inject(function.clone());

        let compare_op = token(">=")
            .map(|_| CompareOp::Gte)
            .or(token(">").map(|_| CompareOp::Gt))
            .or(token("!=").map(|_| CompareOp::Ne))
            .or(token("=").map(|_| CompareOp::Eq))
            .or(token("<=").map(|_| CompareOp::Lte))
            .or(token("<").map(|_| CompareOp::Lt))
            .label("Comparison operator");

        let compare = value
            .clone()
            .and(compare_op.clone().and(value.clone()).optional())
            .map(|(left, right)| Compare { left, right })
            .label("Compare expression");

        let logical_forward: Forward<Logical> = Forward::new("Logical expression");

        // A nested expression must open with `(`, so every trip back into
        // the logical rule has consumed input.
        let factor = compare
            .clone()
            .map(Factor::Compare)
            .or(token("(")
                .take(logical_forward.parser())
                .skip(token(")"))
                .map(|nested| Factor::Nested(Box::new(nested))))
            .label("Logical factor");

        let argument = keyword("NOT")
            .optional()
            .and(factor)
            .map(|(not, factor)| Argument {
                invert: not.is_some(),
                factor,
            })
            .label("Logical argument");

        let term = argument
            .clone()
            .and(keyword("AND").take(argument).many())
            .map(|(first, ands)| Term { first, ands })
            .label("Logical term");

        // `OR(` is accepted without a space so `a OR(b)` parses.
        let or = token("OR(").or(keyword("OR"));

        let disjunction = term
            .clone()
            .and(or.take(term).many())
            .map(|(first, ors)| Logical { first, ors })
            .label("Logical expression");
        logical_forward.inject(disjunction.clone());

        // Only the outermost expression tolerates an unmatched parenthesis.
        let logical = token("(")
            .optional()
            .take(disjunction)
            .skip(token(")").optional())
            .label("Logical expression");

        let name = identifier.clone().or(text.clone()).label("Name");

        let aggregate_kind = literal("COUNT", "COUNT", false)
            .map(|_| AggregateKind::Count)
            .or(literal("SUM", "SUM", false).map(|_| AggregateKind::Sum))
            .or(literal("MIN", "MIN", false).map(|_| AggregateKind::Min))
            .or(literal("MAX", "MAX", false).map(|_| AggregateKind::Max))
            .or(literal("AVG", "AVG", false).map(|_| AggregateKind::Avg))
            .label("Aggregate function");

        let aggregate = name
            .clone()
            .skip(token(":"))
            .optional()
            .and(aggregate_kind)
            .skip(token("("))
            .and(value.clone())
            .skip(token(")"))
            .and(keyword("AS").take(name.clone()).optional())
            .map(|(((prefix, kind), value), alias)| AggregateFunction {
                name: prefix.or(alias),
                kind,
                value,
            })
            .label("Aggregate");

        let select_statement = name
            .clone()
            .skip(token(":"))
            .optional()
            .and(value.clone())
            .and(keyword("AS").take(name).optional())
            .map(|((prefix, value), alias)| SelectStatement {
                name: prefix.or(alias),
                value,
            })
            .label("Select statement");

        let projections = aggregate
            .clone()
            .separated1(token(","))
            .map(Select::Aggregates)
            .or(select_statement
                .clone()
                .separated1(token(","))
                .map(Select::Statements));

        let select = keyword("SELECT")
            .skip(token("{").optional())
            .take(projections)
            .skip(token("}").optional())
            .label("Select");

        let from = keyword("FROM").take(identifier.clone()).label("From");

        let keys = keyword("KEYS")
            .take(literal_rule.clone().separated1(token(",")))
            .label("Keys");

        let where_clause = keyword("WHERE").take(logical.clone()).label("Where");

        let direction = keyword("ASC")
            .map(|_| OrderDirection::Asc)
            .or(keyword("DESC").map(|_| OrderDirection::Desc))
            .label("Order direction");

        let order_statement = value
            .clone()
            .and(direction.optional())
            .map(|(value, direction)| OrderStatement { value, direction })
            .label("Order statement");

        let order_by = keyword("ORDER")
            .and(keyword("BY"))
            .take(order_statement.separated1(token(",")))
            .label("Order by");

        let limit = keyword("LIMIT").take(number_value).label("Limit");

        let query = select
            .clone()
            .and(from.clone().optional())
            .and(keys.clone().optional())
            .and(where_clause.clone().optional())
            .and(order_by.clone().optional())
            .and(limit.clone().optional())
            .skip(token(";").optional())
            .skip(whitespaces())
            .skip(end_of_input())
            .map(
                |(((((select, from), keys), where_clause), order_by), limit)| Query {
                    select,
                    from,
                    keys,
                    where_clause,
                    order_by,
                    limit,
                },
            )
            .label("Query");

        let clauses = vec![
            from.clone().map(|_| ()),
            keys.clone().map(|_| ()),
            where_clause.clone().map(|_| ()),
            order_by.clone().map(|_| ()),
            limit.clone().map(|_| ()),
        ];

        Grammar {
            number,
            text,
            boolean,
            null,
            literal: literal_rule,
            identifier,
            path,
            value,
            function,
            compare_op,
            compare,
            logical,
            aggregate,
            select_statement,
            select,
            from,
            keys,
            where_clause,
            order_by,
            limit,
            query,
            clauses,
        }
    }

    /// Explain why a query stopped short of the end of its input.
    ///
    /// Optional clauses that fail are silently absent, which leaves the
    /// query ending at the clause that broke. Re-running the clauses there
    /// recovers the failure that got furthest.
    fn explain(&self, error: ParseError, source: &str) -> ParseError {
        let Some(at) = source.get(error.position..) else {
            return error;
        };
        if at.trim().is_empty() {
            return error;
        }

        let start = error.position;
        let resume = Cursor::at(source, start);
        self.clauses
            .iter()
            .filter_map(|clause| clause.parse(resume).err())
            .filter(|e| e.position > start)
            .fold(error, |best, e| if e.position > best.position { e } else { best })
    }
}

/// The shared grammar.
pub fn grammar() -> &'static Grammar {
    &GRAMMAR
}

/// Parse a complete query. `--` comments are removed first; a trailing `;`
/// and whitespace are allowed.
///
/// ```
/// let query = rolls_engine::parser::parse_query(
///     "SELECT $.name FROM people WHERE $.age > 18 LIMIT 2",
/// ).unwrap();
/// assert_eq!(query.from.as_deref(), Some("people"));
/// assert_eq!(query.to_string(), "SELECT $.name FROM people WHERE ($.age > 18) LIMIT 2");
/// ```
pub fn parse_query(text: &str) -> Result<Query, ParseError> {
    let source = strip_comments(text);
    let grammar = grammar();

    match grammar.query.parse_str(&source) {
        Ok((_, query)) => {
            debug!(query = %query, "parsed query");
            Ok(query)
        }
        Err(error) => {
            let error = grammar.explain(error, &source);
            debug!(%error, "query did not parse");
            Err(error)
        }
    }
}

/// Parse a stand-alone logical expression, such as a WHERE condition.
pub fn parse_logical(text: &str) -> Result<Logical, ParseError> {
    parse_complete(&grammar().logical, text)
}

/// Parse a stand-alone value: a path, a literal or a function call.
pub fn parse_value(text: &str) -> Result<Expr, ParseError> {
    parse_complete(&grammar().value, text)
}

fn parse_complete<T: 'static>(parser: &Parser<T>, text: &str) -> Result<T, ParseError> {
    let source = strip_comments(text);
    let (rest, found) = parser.parse_str(&source)?;
    if rest.rest().trim().is_empty() {
        Ok(found)
    } else {
        Err(ParseError::new("end of input", rest.offset()))
    }
}
