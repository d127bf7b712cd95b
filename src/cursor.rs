use regex::Regex;

/// An immutable position over query source text.
///
/// A successful match returns a new cursor advanced past it and leaves
/// `self` untouched, which is what makes backtracking free for the
/// combinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor<'a> {
    source: &'a str,
    offset: usize,
}

/// Owned result of a successful pattern match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matched {
    /// The full matched text
    pub text: String,
    groups: Vec<Option<String>>,
}

impl Matched {
    /// Capture group `index` (0 is the whole match)
    pub fn group(&self, index: usize) -> Option<&str> {
        self.groups.get(index).and_then(|g| g.as_deref())
    }
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Cursor { source, offset: 0 }
    }

    /// A cursor over `source` positioned at `offset`.
    pub fn at(source: &'a str, offset: usize) -> Self {
        Cursor { source, offset }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left between the offset and the end of the source.
    pub fn remaining(&self) -> usize {
        self.source.len().saturating_sub(self.offset)
    }

    /// True once the offset has moved beyond the source.
    ///
    /// A cursor sitting exactly at the end is not exhausted: rules such as
    /// `many` and `optional` still get to run (and fail softly) there.
    pub fn is_exhausted(&self) -> bool {
        self.offset > self.source.len()
    }

    /// The unconsumed tail of the source.
    pub fn rest(&self) -> &'a str {
        self.source.get(self.offset..).unwrap_or("")
    }

    fn advanced(&self, by: usize) -> Self {
        Cursor {
            source: self.source,
            offset: self.offset + by,
        }
    }

    /// Match `expected` exactly at the current offset.
    pub fn take_literal(&self, expected: &str, ignore_case: bool) -> Option<(Self, &'a str)> {
        if expected.is_empty() {
            return None;
        }

        let candidate = self.rest().get(..expected.len())?;
        let equal = if ignore_case {
            candidate.eq_ignore_ascii_case(expected)
        } else {
            candidate == expected
        };

        equal.then(|| (self.advanced(candidate.len()), candidate))
    }

    /// Match `pattern` anchored at the current offset; matches found further
    /// ahead do not count.
    pub fn take_pattern(&self, pattern: &Regex) -> Option<(Self, Matched)> {
        let captures = pattern.captures(self.rest())?;
        let whole = captures.get(0)?;
        if whole.start() != 0 {
            return None;
        }

        let matched = Matched {
            text: whole.as_str().to_string(),
            groups: captures
                .iter()
                .map(|g| g.map(|m| m.as_str().to_string()))
                .collect(),
        };
        Some((self.advanced(whole.end()), matched))
    }

    /// Let `scan` decide the extent of the next token.
    ///
    /// `scan` receives the whole source and the current offset and returns
    /// the offset where the token ends; anything not strictly past the
    /// current offset is no match.
    pub fn take_scan<F>(&self, scan: F) -> Option<(Self, &'a str)>
    where
        F: Fn(&str, usize) -> usize,
    {
        let end = scan(self.source, self.offset);
        if end <= self.offset {
            return None;
        }

        let found = self.source.get(self.offset..end)?;
        Some((self.advanced(found.len()), found))
    }
}

#[test]
fn test_take_literal() {
    let cursor = Cursor::new("SELECT $");
    let (next, found) = cursor.take_literal("select", true).unwrap();
    assert_eq!(found, "SELECT");
    assert_eq!(next.offset(), 6);
    assert_eq!(next.rest(), " $");

    assert!(cursor.take_literal("select", false).is_none());
    assert_eq!(cursor.offset(), 0);
}

#[test]
fn test_take_literal_past_end() {
    let cursor = Cursor::new("SEL");
    assert!(cursor.take_literal("SELECT", true).is_none());
}

#[test]
fn test_take_pattern_is_anchored() {
    let digits = Regex::new(r"\d+").unwrap();
    assert!(Cursor::new("abc123").take_pattern(&digits).is_none());

    let (next, matched) = Cursor::new("123abc").take_pattern(&digits).unwrap();
    assert_eq!(matched.text, "123");
    assert_eq!(next.rest(), "abc");
}

#[test]
fn test_take_scan() {
    let cursor = Cursor::new("abc,def");
    let (next, found) = cursor
        .take_scan(|source, start| source[start..].find(',').map_or(source.len(), |i| start + i))
        .unwrap();
    assert_eq!(found, "abc");
    assert_eq!(next.offset(), 3);

    assert!(next.take_scan(|_, start| start).is_none());
}
