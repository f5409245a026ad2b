//! Character cursor over source text.
use std::str::CharIndices;

use itertools::{multipeek, MultiPeek};

/// Character reported when the cursor has moved past the end of the source.
pub const EOF_CHAR: char = '\0';

/// Scans source text one character at a time, keeping track of
/// the current line.
///
/// The cursor starts out before the first character. It must be primed
/// with [`Cursor::next`] before [`Cursor::current`] is meaningful.
pub struct Cursor<'a> {
    /// Iterator over UTF-8 encoded source code.
    ///
    /// Peeking advances an internal peek cursor, which is restored
    /// on every call to `next()` or `reset_peek()`.
    chars: MultiPeek<CharIndices<'a>>,
    /// Byte position and value of the current character.
    current: (usize, char),
    /// Line of the current character, 1-based.
    line: u32,
    /// Number of bytes in the source.
    len: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: multipeek(source.char_indices()),
            current: (0, EOF_CHAR),
            line: 1,
            len: source.len(),
        }
    }

    /// Advance to the next character and return it.
    ///
    /// Every newline that the cursor moves past increments
    /// the line counter, regardless of what the caller is
    /// scanning at the time.
    pub fn next(&mut self) -> char {
        if self.current.1 == '\n' {
            self.line += 1;
        }

        self.current = match self.chars.next() {
            Some((index, c)) => (index, c),
            // There is no end-of-file character in the source,
            // so the position is set to the size of the source.
            None => (self.len, EOF_CHAR),
        };

        self.current.1
    }

    #[inline]
    pub fn current(&self) -> char {
        self.current.1
    }

    /// Character following the current one, without advancing.
    #[inline]
    pub fn peek(&mut self) -> char {
        self.chars.reset_peek();
        let c = self.chars.peek().map(|(_, c)| *c).unwrap_or(EOF_CHAR);
        self.chars.reset_peek();
        c
    }

    /// Byte offset of the current character.
    #[inline]
    pub fn offset(&self) -> usize {
        self.current.0
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Indicates whether the cursor is past the last character.
    ///
    /// Source text may contain literal null characters, so a current
    /// character of [`EOF_CHAR`] alone does not mean the end was reached.
    #[inline]
    pub fn at_end(&self) -> bool {
        self.current.0 >= self.len
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cursor_lines() {
        let mut cursor = Cursor::new("a\nb\n\nc");
        assert_eq!(cursor.next(), 'a');
        assert_eq!(cursor.line(), 1);
        assert_eq!(cursor.next(), '\n');
        assert_eq!(cursor.line(), 1);
        assert_eq!(cursor.next(), 'b');
        assert_eq!(cursor.line(), 2);
        cursor.next();
        cursor.next();
        assert_eq!(cursor.next(), 'c');
        assert_eq!(cursor.line(), 4);
        assert!(!cursor.at_end());
        assert_eq!(cursor.next(), EOF_CHAR);
        assert!(cursor.at_end());
    }

    #[test]
    fn test_cursor_peek_does_not_advance() {
        let mut cursor = Cursor::new("/*");
        cursor.next();
        assert_eq!(cursor.peek(), '*');
        assert_eq!(cursor.peek(), '*');
        assert_eq!(cursor.current(), '/');
        assert_eq!(cursor.offset(), 0);
    }
}
