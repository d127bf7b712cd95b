//! Parser combinators over [`Cursor`].
//!
//! A parser is a function from a cursor to either the advanced cursor plus a
//! value, or a [`ParseError`]. Failure never consumes input, so `or` can
//! always retry its second branch from the original position.
//!
//! Grammar rules that refer to each other are wired up with [`Forward`]: a
//! placeholder parser is handed out first and the real rule is injected once
//! it has been built.

use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::{
    cursor::{Cursor, Matched},
    error::ParseError,
};

pub type ParseResult<'a, T> = Result<(Cursor<'a>, T), ParseError>;

type ParseFn<T> = dyn for<'a> Fn(Cursor<'a>) -> ParseResult<'a, T> + Send + Sync;

/// A labelled, cheaply clonable parser producing `T`.
pub struct Parser<T> {
    label: Arc<str>,
    parse: Arc<ParseFn<T>>,
}

impl<T> Clone for Parser<T> {
    fn clone(&self) -> Self {
        Parser {
            label: Arc::clone(&self.label),
            parse: Arc::clone(&self.parse),
        }
    }
}

impl<T> std::fmt::Debug for Parser<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser").field("label", &self.label).finish()
    }
}

/// Of two failures keep the one that got further into the input.
fn deepest(first: ParseError, second: ParseError) -> ParseError {
    if second.position >= first.position {
        second
    } else {
        first
    }
}

impl<T: 'static> Parser<T> {
    pub fn new<F>(label: impl Into<String>, parse: F) -> Self
    where
        F: for<'a> Fn(Cursor<'a>) -> ParseResult<'a, T> + Send + Sync + 'static,
    {
        Parser {
            label: Arc::from(label.into()),
            parse: Arc::new(parse),
        }
    }

    pub fn label_text(&self) -> &str {
        &self.label
    }

    /// Run the parser. An exhausted cursor fails before the rule is tried.
    pub fn parse<'a>(&self, input: Cursor<'a>) -> ParseResult<'a, T> {
        if input.is_exhausted() {
            return Err(ParseError::new("more input", input.offset()));
        }
        (self.parse)(input)
    }

    /// Convenience for parsing a whole string from its start.
    pub fn parse_str<'a>(&self, source: &'a str) -> ParseResult<'a, T> {
        self.parse(Cursor::new(source))
    }

    /// Rename the parser. Failures that did not get past the starting
    /// position are reported under the new name; deeper failures keep
    /// their more specific label.
    pub fn label(self, label: impl Into<String>) -> Parser<T> {
        let label = label.into();
        if label.trim().is_empty() {
            return self;
        }

        let name: Arc<str> = Arc::from(label);
        let reported = Arc::clone(&name);
        Parser {
            label: name,
            parse: Arc::new(move |input| {
                self.parse(input).map_err(|e| {
                    if e.position == input.offset() {
                        ParseError::new(&*reported, e.position)
                    } else {
                        e
                    }
                })
            }),
        }
    }

    /// Sequence: both values, cursor after `next`.
    pub fn and<U: 'static>(self, next: Parser<U>) -> Parser<(T, U)> {
        Parser::new("", move |input| {
            let (rest, first) = self.parse(input)?;
            let (rest, second) = next.parse(rest)?;
            Ok((rest, (first, second)))
        })
    }

    /// Alternation with full backtrack to the original cursor.
    pub fn or(self, other: Parser<T>) -> Parser<T> {
        Parser::new("", move |input| match self.parse(input) {
            Ok(found) => Ok(found),
            Err(first) => other.parse(input).map_err(|second| deepest(first, second)),
        })
    }

    /// Sequence keeping only this parser's value.
    pub fn skip<U: 'static>(self, next: Parser<U>) -> Parser<T> {
        self.and(next).map(|(kept, _)| kept)
    }

    /// Sequence keeping only `next`'s value.
    pub fn take<U: 'static>(self, next: Parser<U>) -> Parser<U> {
        self.and(next).map(|(_, kept)| kept)
    }

    pub fn map<U, F>(self, mapper: F) -> Parser<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Parser::new("", move |input| {
            let (rest, value) = self.parse(input)?;
            Ok((rest, mapper(value)))
        })
    }

    /// Like [`Parser::map`], but the mapper may reject a syntactically valid
    /// match. The rejection is reported where the match ended.
    pub fn try_map<U, F>(self, mapper: F) -> Parser<U>
    where
        U: 'static,
        F: Fn(T) -> Result<U, String> + Send + Sync + 'static,
    {
        Parser::new("", move |input| {
            let (rest, value) = self.parse(input)?;
            match mapper(value) {
                Ok(mapped) => Ok((rest, mapped)),
                Err(expected) => Err(ParseError::new(expected, rest.offset())),
            }
        })
    }

    /// Zero or more repetitions. Never fails.
    pub fn many(self) -> Parser<Vec<T>> {
        Parser::new("", move |input| {
            let mut found = Vec::new();
            let mut remaining = input;

            while let Ok((rest, value)) = self.parse(remaining) {
                found.push(value);
                // a match that consumed nothing would repeat forever
                if rest.offset() == remaining.offset() {
                    break;
                }
                remaining = rest;
            }

            Ok((remaining, found))
        })
    }

    /// One or more repetitions.
    pub fn many1(self) -> Parser<Vec<T>> {
        self.clone().and(self.many()).map(|(first, rest)| {
            let mut all = Vec::with_capacity(rest.len() + 1);
            all.push(first);
            all.extend(rest);
            all
        })
    }

    /// Always succeeds; `None` leaves the cursor where it was.
    pub fn optional(self) -> Parser<Option<T>> {
        Parser::new("", move |input| match self.parse(input) {
            Ok((rest, value)) => Ok((rest, Some(value))),
            Err(_) => Ok((input, None)),
        })
    }

    /// Zero or more items, each optionally followed by `delimiter`.
    pub fn separated<D: 'static>(self, delimiter: Parser<D>) -> Parser<Vec<T>> {
        self.skip(delimiter.optional()).many()
    }

    /// One or more items, each optionally followed by `delimiter`.
    pub fn separated1<D: 'static>(self, delimiter: Parser<D>) -> Parser<Vec<T>> {
        self.skip(delimiter.optional()).many1()
    }
}

/// A placeholder for a rule that is defined later.
///
/// [`Forward::parser`] can be used while building the rules that the real
/// rule depends on; [`Forward::inject`] supplies the real rule afterwards.
/// Injecting twice, or running the placeholder before injection, is a bug
/// in the grammar and panics.
pub struct Forward<T> {
    label: Arc<str>,
    cell: Arc<OnceLock<Parser<T>>>,
}

impl<T: 'static> Forward<T> {
    pub fn new(label: impl Into<String>) -> Self {
        Forward {
            label: Arc::from(label.into()),
            cell: Arc::new(OnceLock::new()),
        }
    }

    pub fn parser(&self) -> Parser<T> {
        let cell = Arc::clone(&self.cell);
        let label = Arc::clone(&self.label);
        Parser::new(self.label.to_string(), move |input| match cell.get() {
            Some(parser) => parser.parse(input),
            None => panic!("forward parser '{}' used before injection", label),
        })
    }

    pub fn inject(&self, parser: Parser<T>) {
        if self.cell.set(parser).is_err() {
            panic!("forward parser '{}' injected twice", self.label);
        }
    }

    pub fn is_injected(&self) -> bool {
        self.cell.get().is_some()
    }
}

/// Match `expected` at the cursor.
pub fn literal(label: impl Into<String>, expected: &str, ignore_case: bool) -> Parser<String> {
    let expected = expected.to_string();
    let label: Arc<str> = Arc::from(label.into());
    let reported = Arc::clone(&label);
    Parser::new(label.to_string(), move |input| {
        match input.take_literal(&expected, ignore_case) {
            Some((rest, found)) => Ok((rest, found.to_string())),
            None => Err(ParseError::new(&*reported, input.offset())),
        }
    })
}

/// Case-insensitive literal labelled by its own text.
pub fn exact(expected: &str) -> Parser<String> {
    literal(expected, expected, true)
}

/// Match `regex` anchored at the cursor.
pub fn pattern(label: impl Into<String>, regex: Regex) -> Parser<Matched> {
    let label: Arc<str> = Arc::from(label.into());
    let reported = Arc::clone(&label);
    Parser::new(label.to_string(), move |input| match input.take_pattern(&regex) {
        Some((rest, matched)) => Ok((rest, matched)),
        None => Err(ParseError::new(&*reported, input.offset())),
    })
}

/// Consume whatever extent `scanner` reports; see [`Cursor::take_scan`].
pub fn scan<F>(label: impl Into<String>, scanner: F) -> Parser<String>
where
    F: Fn(&str, usize) -> usize + Send + Sync + 'static,
{
    let label: Arc<str> = Arc::from(label.into());
    let reported = Arc::clone(&label);
    Parser::new(label.to_string(), move |input| match input.take_scan(&scanner) {
        Some((rest, found)) => Ok((rest, found.to_string())),
        None => Err(ParseError::new(&*reported, input.offset())),
    })
}

pub fn whitespace() -> Parser<String> {
    exact(" ")
        .or(exact("\t"))
        .or(exact("\r"))
        .or(exact("\n"))
        .label("whitespace")
}

pub fn whitespaces() -> Parser<String> {
    whitespace().many().map(|w| w.concat())
}
