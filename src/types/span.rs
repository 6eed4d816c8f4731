//! Defines [`Position`] and [`Span`] which locate regions of the template
//! source code.

use std::ops::Index;

/// A location in the template source.
///
/// `offset` is a byte offset into the source, `line` is 1-based and `column`
/// is the 0-based column within the line.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

/// A region of the template source.
///
/// `start` points at the first character of the construct and `end` at the
/// first character after it.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Position {
    /// The position of the first character in any source.
    pub const fn origin() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 0,
        }
    }
}

impl Span {
    /// A zero-width span at the given position.
    pub const fn empty(at: Position) -> Self {
        Self { start: at, end: at }
    }

    /// The smallest span covering both `self` and `other`.
    pub fn combine(self, other: Self) -> Self {
        let start = if other.start.offset < self.start.offset {
            other.start
        } else {
            self.start
        };
        let end = if other.end.offset > self.end.offset {
            other.end
        } else {
            self.end
        };
        Self { start, end }
    }
}

impl Index<Span> for str {
    type Output = str;

    fn index(&self, span: Span) -> &Self::Output {
        &self[span.start.offset..span.end.offset]
    }
}

impl std::fmt::Debug for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}@{}", self.line, self.column, self.offset)
    }
}

impl std::fmt::Debug for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&(self.start.offset..self.end.offset), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(offset: usize) -> Position {
        Position {
            offset,
            line: 1,
            column: offset,
        }
    }

    #[test]
    fn combine_is_commutative() {
        let a = Span {
            start: at(2),
            end: at(5),
        };
        let b = Span {
            start: at(4),
            end: at(9),
        };
        assert_eq!(a.combine(b), b.combine(a));
        assert_eq!(a.combine(b).start.offset, 2);
        assert_eq!(a.combine(b).end.offset, 9);
    }

    #[test]
    fn index_str() {
        let span = Span {
            start: at(6),
            end: at(11),
        };
        assert_eq!(&"lorem ipsum"[span], "ipsum");
    }
}
