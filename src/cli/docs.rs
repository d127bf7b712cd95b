//! Documentation content for the rolls CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Clauses,
    Comparisons,
    Functions,
    Aggregates,
}

impl DocCategory {
    pub const ALL: [DocCategory; 5] = [
        DocCategory::Syntax,
        DocCategory::Clauses,
        DocCategory::Comparisons,
        DocCategory::Functions,
        DocCategory::Aggregates,
    ];

    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "syntax" => Some(Self::Syntax),
            "clauses" | "clause" => Some(Self::Clauses),
            "comparisons" | "comparison" | "where" => Some(Self::Comparisons),
            "functions" | "function" | "fn" => Some(Self::Functions),
            "aggregates" | "aggregate" => Some(Self::Aggregates),
            _ => None,
        }
    }

    pub fn content(self) -> &'static str {
        match self {
            DocCategory::Syntax => SYNTAX_DOC,
            DocCategory::Clauses => CLAUSES_DOC,
            DocCategory::Comparisons => COMPARISONS_DOC,
            DocCategory::Functions => FUNCTIONS_DOC,
            DocCategory::Aggregates => AGGREGATES_DOC,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"ROLLS DOCUMENTATION

Rolls is a small SQL-like query language for JSON documents. A query selects
values from the documents of a named collection, optionally restricted by key,
filtered, ordered and limited.

DOCUMENTATION CATEGORIES

  syntax            Values: paths, literals, function calls, names, comments
  clauses           SELECT, FROM, KEYS, WHERE, ORDER BY, LIMIT
  comparisons       Comparison operators, NOT/AND/OR, and how mixed types compare
  functions         Built-in text, sequence, and date/time functions
  aggregates        COUNT, SUM, MIN, MAX, AVG

QUICK REFERENCE

  SELECT $.name, $.age FROM people WHERE $.age > 18 ORDER BY $.name LIMIT 10
  SELECT COUNT($) AS total, AVG($.age) FROM people
  SELECT utc()

Run 'rolls doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    DocCategory::from_name(name)
        .map(DocCategory::content)
        .ok_or_else(|| CliError::UnknownCategory(name.to_string()))
}

const SYNTAX_DOC: &str = r#"SYNTAX - Values and Names

PATHS
  $.field.nested
    A JSONPath expression read from the current document. A path starts with
    $ and runs until a comma, a comparison operator, a closing parenthesis or
    brace, a semicolon, or a clause keyword preceded by whitespace.

    Examples:
      $.name
      $.roles[0].title
      $.roles[?(@.title == 'manager')]

    Constraints:
      - A path ending in ] reads every matching node as an array
      - Any other path reads the first matching node, or null

LITERALS
  42  -1.5  +.25          Numbers (decimal, arbitrary precision)
  'text'  "text"          Text, single or double quoted
  true  false             Booleans, any case
  null                    Null, any case

FUNCTION CALLS
  name(arg, arg, ...)
    Arguments are values: paths, literals or other calls.

    Example:
      upper(sub($.name, 0, 3))

NAMES
  name: value
  value AS name
  'quoted name': value
    Names a projected field. Without a name a field is called after the
    function or the last path segment; literals are named by position.

COMMENTS
  -- everything to the end of the line is ignored
"#;

const CLAUSES_DOC: &str = r#"CLAUSES - Query Structure

  SELECT ... [FROM source] [KEYS key, ...] [WHERE condition]
             [ORDER BY value [ASC|DESC], ...] [LIMIT n] [;]

  Keywords are case-insensitive. Clauses must appear in this order.

SELECT
  SELECT value, value, ...
  SELECT { value, value, ... }
    Either plain values or aggregates, never both.

FROM
  FROM people
    The collection to read. Without FROM the query runs once against an
    empty document, which is handy for functions: SELECT utc()

KEYS
  KEYS 1, 3
  KEYS '1', '2'
    Only documents whose key ($.id by default) matches one of the keys.
    Keys are compared as text.

WHERE
  WHERE $.age > 18 AND NOT starts($.name, 'T')
    See 'rolls doc comparisons'.

ORDER BY
  ORDER BY $.age DESC, $.name
    Stable; later keys break ties of earlier ones. ASC is the default.

LIMIT
  LIMIT 10
    At most n rows, taken after ordering.
"#;

const COMPARISONS_DOC: &str = r#"COMPARISONS - Conditions

OPERATORS
  =   !=   >   >=   <   <=

  Examples:
    $.age >= 18
    $.name != 'Tim'

  A value on its own is read as a condition:
    any($.roles[?(@.title == 'manager')])

LOGIC
  NOT condition
  condition AND condition
  condition OR condition
  ( condition )

  AND binds tighter than OR. Evaluation stops as soon as the result is known.

  A parenthesis that opens a condition closes around all of it, so put a
  grouped part last:

    $.age > 18 AND ($.a = 1 OR $.b = 2)     accepted
    ($.a = 1 OR $.b = 2) AND $.age > 18     rejected

MIXED TYPES
  Numbers, text and booleans compare naturally against their own kind.
  Any other pairing counts the left side as greater, so:

    1 = '1'          false
    1 != '1'         true
    1 > '1'          true
    '1' > 1          true

  A null or missing left side is only ever unequal:

    $.missing = null     false
    $.missing != 3       true
"#;

const FUNCTIONS_DOC: &str = r#"FUNCTIONS - Built-in Functions

Names are case-insensitive. Unknown names are passed to the document store;
if the store does not know them either the query fails.

TEXT
  sub(s, start[, length])     Substring by character position
  trim(s)  ltrim(s)  rtrim(s) Remove surrounding whitespace
  upper(s)  lower(s)          Change case
  starts(s, prefix[, ignoreCase])
  split(s, separator)         Array of parts
  join(separator, array)      Text

  Non-text input gives null (starts gives false).

SEQUENCES
  any(array)                  True if the array is not empty
  first(array)  last(array)   Element or null
  at(array, index)            Element or null
  length(value)               Array length, or the character count of text

DATES
  now()                       Local time, RFC 3339
  utc()                       UTC time, RFC 3339
  year(d)  month(d)  day(d)  hour(d)  minute(d)  second(d)
    d is RFC 3339, 'YYYY-MM-DD HH:MM:SS' or 'YYYY-MM-DD'; anything else
    gives -1.
"#;

const AGGREGATES_DOC: &str = r#"AGGREGATES - Summaries

  SELECT COUNT($), SUM($.age), MIN($.age), MAX($.age), AVG($.age) FROM people

  Keywords are uppercase. An aggregate query returns exactly one row.

  COUNT(value)    Number of rows
  SUM(value)      Total
  MIN(value)      Smallest
  MAX(value)      Largest (never below 0)
  AVG(value)      Mean

  Values that are not numbers count as 0. With no rows every aggregate is 0.

NAMES
  SUM($.age)              field "Sum(age)"
  total: COUNT($)         field "total"
  AVG($.age) AS 'mean'    field "mean"
"#;
