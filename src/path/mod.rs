//! Path strings and the read/write engine that walks them.
//!
//! A path such as `server.hosts[2].name` addresses one node of an
//! [`Element`](crate::element::Element) tree. It parses into [`Segment`]s:
//!
//! - `.` separates keys. A literal `.` inside a key is written `\.`; `\`,
//!   `[` and `]` are escaped the same way.
//! - `[N]` is an index segment. It binds to the preceding segment without a
//!   dot, so `a[0][1]` is three segments. `a.[0]` is accepted as well.
//!
//! [`Path`]'s `Display` re-derives the canonical, fully escaped form, which
//! is also what [`keys`] emits.

mod error;
mod resolver;

#[cfg(test)]
#[path = "parse_tests.rs"]
mod parse_tests;

pub use error::PathError;
pub use resolver::{
    keys, resolve, resolve_at, resolve_element, resolve_element_at, update, update_at,
    update_element,
};

use std::fmt;
use std::str::{CharIndices, FromStr};

/// One parsed unit of a path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    /// Object key, unescaped.
    Key(String),
    /// Array index.
    Index(usize),
}

impl Segment {
    /// Returns `true` for index segments.
    #[must_use]
    pub const fn is_index(&self) -> bool {
        matches!(self, Self::Index(_))
    }
}

/// A parsed, non-empty path.
///
/// Ordering compares segment by segment with numeric indices, so sorting
/// paths places `a[2]` before `a[10]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// Returns the segments in order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always `false`; parsing rejects empty paths.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tokenizer::new(s).run().map(|segments| Self { segments })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(key) if i == 0 => f.write_str(&escape_key(key))?,
                Segment::Key(key) => write!(f, ".{}", escape_key(key))?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Escapes a raw object key for use as a path segment.
#[must_use]
pub fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.chars() {
        if matches!(c, '\\' | '.' | '[' | ']') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

struct Tokenizer<'a> {
    input: &'a str,
    chars: CharIndices<'a>,
    segments: Vec<Segment>,
    key: Option<String>,
    // A '.' (or the start of input) was seen and no segment followed yet.
    expect_segment: bool,
    // The last segment was an index; key text must be preceded by '.'.
    after_index: bool,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices(),
            segments: Vec::new(),
            key: None,
            expect_segment: true,
            after_index: false,
        }
    }

    fn run(mut self) -> Result<Vec<Segment>, PathError> {
        if self.input.is_empty() {
            return Err(PathError::Empty);
        }

        while let Some((position, c)) = self.chars.next() {
            match c {
                '.' => self.separator(position)?,
                '[' => self.index(position)?,
                ']' => return Err(PathError::UnexpectedBracket { position }),
                '\\' => {
                    let (_, escaped) = self
                        .chars
                        .next()
                        .ok_or(PathError::DanglingEscape { position })?;
                    self.push_key_char(position, escaped)?;
                }
                _ => self.push_key_char(position, c)?,
            }
        }

        if let Some(key) = self.key.take() {
            self.segments.push(Segment::Key(key));
        } else if self.expect_segment {
            return Err(PathError::EmptyKey {
                position: self.input.len(),
            });
        }

        Ok(self.segments)
    }

    fn separator(&mut self, position: usize) -> Result<(), PathError> {
        match self.key.take() {
            Some(key) => self.segments.push(Segment::Key(key)),
            None if self.expect_segment => return Err(PathError::EmptyKey { position }),
            None => {}
        }
        self.expect_segment = true;
        self.after_index = false;
        Ok(())
    }

    fn push_key_char(&mut self, position: usize, c: char) -> Result<(), PathError> {
        if self.after_index {
            return Err(PathError::MissingSeparator { position });
        }
        self.key.get_or_insert_with(String::new).push(c);
        self.expect_segment = false;
        Ok(())
    }

    fn index(&mut self, position: usize) -> Result<(), PathError> {
        if let Some(key) = self.key.take() {
            self.segments.push(Segment::Key(key));
        }

        let mut text = String::new();
        loop {
            match self.chars.next() {
                Some((_, ']')) => break,
                Some((_, c)) => text.push(c),
                None => return Err(PathError::UnclosedIndex { position }),
            }
        }

        let index = parse_index(&text, position)?;
        self.segments.push(Segment::Index(index));
        self.expect_segment = false;
        self.after_index = true;
        Ok(())
    }
}

fn parse_index(text: &str, position: usize) -> Result<usize, PathError> {
    let invalid = || PathError::InvalidIndex {
        text: text.to_string(),
        position,
    };

    if !text.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
        return Err(invalid());
    }
    if let Some(digits) = text.strip_prefix('-') {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let index = text.parse::<i64>().map_err(|_| invalid())?;
        return Err(PathError::NegativeIndex { index, position });
    }
    text.parse::<usize>().map_err(|_| invalid())
}
