//! Error types for path parsing.

use thiserror::Error;

/// A malformed path string.
///
/// Positions are byte offsets into the original path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The path is empty.
    #[error("Path is empty")]
    Empty,

    /// A key between separators is empty (e.g. `a..b` or a trailing `.`).
    #[error("Empty key at position {position}")]
    EmptyKey {
        /// Offset of the offending separator or end of input
        position: usize,
    },

    /// A `[` without a matching `]`.
    #[error("Unclosed index starting at position {position}")]
    UnclosedIndex {
        /// Offset of the opening bracket
        position: usize,
    },

    /// The text between brackets is not a nonnegative integer.
    #[error("Invalid index '{text}' at position {position}")]
    InvalidIndex {
        /// Bracket contents
        text: String,
        /// Offset of the opening bracket
        position: usize,
    },

    /// The index is negative.
    ///
    /// Path reads and writes treat this as a missing node rather than an
    /// error; it only surfaces from [`Path`](super::Path) parsing.
    #[error("Negative index {index} at position {position}")]
    NegativeIndex {
        /// The parsed index
        index: i64,
        /// Offset of the opening bracket
        position: usize,
    },

    /// A `]` outside of an index.
    #[error("Unexpected ']' at position {position}")]
    UnexpectedBracket {
        /// Offset of the bracket
        position: usize,
    },

    /// Key text directly after an index without a `.` separator.
    #[error("Missing '.' separator at position {position}")]
    MissingSeparator {
        /// Offset of the first key character
        position: usize,
    },

    /// A trailing `\` with nothing to escape.
    #[error("Dangling escape at position {position}")]
    DanglingEscape {
        /// Offset of the backslash
        position: usize,
    },
}
