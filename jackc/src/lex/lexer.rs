//! Lexical analysis
use smol_str::SmolStr;

use super::{
    cursor::Cursor,
    tokens::{Keyword, Symbol, Token, TokenKind},
};
use crate::error::{Diagnostic, JackError, JackResult};

/// Largest value an integer constant may take.
pub const MAX_INTEGER: u16 = 0x7FFF; // 32767

pub struct Lexer<'a> {
    /// Character scanner
    cursor: Cursor<'a>,
    /// Keep reference to the source so tokens can
    /// slice their lexemes from it.
    original: &'a str,
    /// Name of the unit, for diagnostics.
    unit: SmolStr,
    /// Start absolute byte position of the current token
    /// in the source.
    start_pos: usize,
    /// Line the current token starts on.
    start_line: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(unit: impl Into<SmolStr>, source_code: &'a str) -> Self {
        let mut cursor = Cursor::new(source_code);

        // Initial state of the cursor is a non-existant EOF char,
        // but the initial state of the lexer should be a valid
        // token starting character.
        cursor.next();

        let start_pos = cursor.offset();
        let start_line = cursor.line();

        Self {
            cursor,
            original: source_code,
            unit: unit.into(),
            start_pos,
            start_line,
        }
    }

    pub fn unit(&self) -> &SmolStr {
        &self.unit
    }

    /// Scan the source characters and construct the next token.
    ///
    /// ## Implementation
    ///
    /// Each iteration starts with the assumption that the internal cursor
    /// is pointing to the start of the remaining source to be consumed,
    /// and leaves the cursor on the first character after its token.
    ///
    /// Once the end of the source is reached every call returns
    /// a [`TokenKind::Eof`] token.
    pub fn next_token(&mut self) -> JackResult<Token> {
        self.skip_trivia()?;
        self.start_token();

        if self.cursor.at_end() {
            return Ok(self.make_token(TokenKind::Eof));
        }

        match self.cursor.current() {
            '"' => self.consume_string(),
            c => match Symbol::parse(c) {
                Some(symbol) => {
                    self.cursor.next();
                    Ok(self.make_token(TokenKind::Symbol(symbol)))
                }
                None => self.consume_text(),
            },
        }
    }

    /// Primes the lexer to consume the next token.
    fn start_token(&mut self) {
        self.start_pos = self.cursor.offset();
        self.start_line = self.cursor.line();
    }

    /// Source text from the start of the current token up to,
    /// but not including, the cursor.
    fn fragment(&self) -> &'a str {
        &self.original[self.start_pos..self.cursor.offset()]
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token {
            kind,
            lexeme: SmolStr::from(self.fragment()),
            line: self.start_line,
        }
    }

    #[inline(never)]
    #[cold]
    fn error(&self, line: u32, message: impl ToString) -> JackError {
        JackError::Lexical(Diagnostic::new(self.unit.clone(), line, message))
    }
}

/// Specialised tokens.
impl<'a> Lexer<'a> {
    /// Erase whitespace and comments.
    fn skip_trivia(&mut self) -> JackResult<()> {
        while !self.cursor.at_end() {
            let c = self.cursor.current();
            if c.is_whitespace() {
                self.cursor.next();
            } else if c == '/' {
                match self.cursor.peek() {
                    '/' => self.erase_line_comment(),
                    '*' => self.erase_block_comment()?,
                    _ => break,
                }
            } else {
                break;
            }
        }

        Ok(())
    }

    /// Erase comment line up to, but not including, the trailing newline.
    fn erase_line_comment(&mut self) {
        debug_assert_eq!(self.cursor.current(), '/');

        while !self.cursor.at_end() && !is_newline(self.cursor.current()) {
            self.cursor.next();
        }
    }

    /// Erase a `/* */` or `/** */` comment, including the closing marker.
    fn erase_block_comment(&mut self) -> JackResult<()> {
        debug_assert_eq!(self.cursor.current(), '/');

        let line = self.cursor.line();

        // opening marker
        self.cursor.next();
        self.cursor.next();

        loop {
            if self.cursor.at_end() {
                return Err(self.error(line, "unterminated comment"));
            }
            if self.cursor.current() == '*' && self.cursor.peek() == '/' {
                self.cursor.next();
                self.cursor.next();
                return Ok(());
            }
            self.cursor.next();
        }
    }

    /// Make a string constant token, excluding the quotes.
    fn consume_string(&mut self) -> JackResult<Token> {
        debug_assert_eq!(self.cursor.current(), '"');

        // opening quote
        self.cursor.next();
        let content_start = self.cursor.offset();

        loop {
            if self.cursor.at_end() {
                return Err(self.error(self.start_line, "unterminated string constant"));
            }

            match self.cursor.current() {
                '"' => break,
                c if is_newline(c) => {
                    return Err(self.error(self.cursor.line(), "string constant may not contain a line break"));
                }
                c if !c.is_ascii() => {
                    return Err(self.error(
                        self.cursor.line(),
                        format!("unsupported character {c:?} in string constant"),
                    ));
                }
                _ => {
                    self.cursor.next();
                }
            }
        }

        let content = &self.original[content_start..self.cursor.offset()];

        // closing quote
        self.cursor.next();

        Ok(Token {
            kind: TokenKind::StringConstant,
            lexeme: SmolStr::from(content),
            line: self.start_line,
        })
    }

    /// Consume text up to whitespace, a symbol or a quote, then
    /// classify it as a keyword, integer constant or identifier.
    fn consume_text(&mut self) -> JackResult<Token> {
        while !self.cursor.at_end() && !is_text_delimiter(self.cursor.current()) {
            self.cursor.next();
        }

        let fragment = self.fragment();
        debug_assert!(!fragment.is_empty());

        if let Some(keyword) = Keyword::parse(fragment) {
            return Ok(self.make_token(TokenKind::Keyword(keyword)));
        }

        // Digit-led text is screened here, so identifiers
        // never start with a digit.
        if fragment.starts_with(|c: char| c.is_ascii_digit()) {
            let value = self.parse_integer(fragment)?;
            return Ok(self.make_token(TokenKind::IntegerConstant(value)));
        }

        if fragment.chars().all(is_letter_or_digit) {
            Ok(self.make_token(TokenKind::Identifier))
        } else {
            Err(self.error(self.start_line, format!("unrecognized token \"{fragment}\"")))
        }
    }

    fn parse_integer(&self, fragment: &str) -> JackResult<u16> {
        if !fragment.chars().all(|c| c.is_ascii_digit()) {
            return Err(self.error(self.start_line, format!("invalid integer constant \"{fragment}\"")));
        }

        match fragment.parse::<u16>() {
            Ok(value) if value <= MAX_INTEGER => Ok(value),
            _ => Err(self.error(
                self.start_line,
                format!("integer constant {fragment} exceeds {MAX_INTEGER}"),
            )),
        }
    }
}

fn is_newline(c: char) -> bool {
    matches!(c, '\r' | '\n')
}

fn is_text_delimiter(c: char) -> bool {
    c.is_whitespace() || c == '"' || Symbol::parse(c).is_some()
}

fn is_letter_or_digit(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl<'a> IntoIterator for Lexer<'a> {
    type Item = JackResult<Token>;
    type IntoIter = LexerIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        LexerIter {
            lexer: self,
            done: false,
        }
    }
}

/// Convenience iterator that wraps the lexer.
///
/// Yields every token including the final end-of-file token,
/// or stops after the first error.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct LexerIter<'a> {
    // Track end so an EOF token is emitted once.
    done: bool,
    lexer: Lexer<'a>,
}

impl<'a> Iterator for LexerIter<'a> {
    type Item = JackResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.lexer.next_token();
        match result {
            Ok(ref token) if token.is_eof() => self.done = true,
            Err(_) => self.done = true,
            _ => {}
        }
        Some(result)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new("Test", source)
            .into_iter()
            .map(|result| result.unwrap().kind)
            .collect()
    }

    #[test]
    fn test_lex_class_header() {
        use TokenKind as TK;

        assert_eq!(
            kinds("class Main {\n  field int x_1;\n}"),
            vec![
                TK::Keyword(Keyword::Class),
                TK::Identifier,
                TK::Symbol(Symbol::LeftBrace),
                TK::Keyword(Keyword::Field),
                TK::Keyword(Keyword::Int),
                TK::Identifier,
                TK::Symbol(Symbol::Semicolon),
                TK::Symbol(Symbol::RightBrace),
                TK::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_lexemes_and_lines() {
        let tokens = Lexer::new("Test", "let x = 12;\n\ndo Output.printString(\"hi there\");")
            .into_iter()
            .collect::<JackResult<Vec<_>>>()
            .unwrap();

        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[3].kind, TokenKind::IntegerConstant(12));
        assert_eq!(tokens[3].line, 1);
        assert_eq!(tokens[5].lexeme, "do");
        assert_eq!(tokens[5].line, 3);
        assert_eq!(tokens[10].kind, TokenKind::StringConstant);
        assert_eq!(tokens[10].lexeme, "hi there");
    }

    #[test]
    fn test_lex_comments_count_lines() {
        let source = "// line comment\n/* block\n comment */ /** doc\n\n */ return";
        let tokens = Lexer::new("Test", source)
            .into_iter()
            .collect::<JackResult<Vec<_>>>()
            .unwrap();

        assert_eq!(tokens.len(), 2);
        assert!(tokens[0].is_keyword(Keyword::Return));
        assert_eq!(tokens[0].line, 5);
    }

    #[test]
    fn test_lex_slash_is_symbol() {
        use TokenKind as TK;

        assert_eq!(
            kinds("a/b"),
            vec![TK::Identifier, TK::Symbol(Symbol::Slash), TK::Identifier, TK::Eof]
        );
    }

    #[test]
    fn test_lex_unterminated_string() {
        let err = Lexer::new("Test", "let s = \"abc\nlet t = 1;")
            .into_iter()
            .find_map(|result| result.err())
            .unwrap();

        assert!(err.is_lexical());
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn test_lex_string_at_end_of_input() {
        let err = Lexer::new("Test", "\n\"abc").into_iter().find_map(|r| r.err()).unwrap();
        assert!(err.is_lexical());
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_lex_invalid_integer() {
        let err = Lexer::new("Test", "\n\n12ab").into_iter().find_map(|r| r.err()).unwrap();
        assert!(err.is_lexical());
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_lex_integer_range() {
        assert_eq!(kinds("32767")[0], TokenKind::IntegerConstant(32767));
        let err = Lexer::new("Test", "32768").into_iter().find_map(|r| r.err()).unwrap();
        assert!(err.is_lexical());
    }

    #[test]
    fn test_lex_unrecognized_text() {
        let err = Lexer::new("Test", "let a$b = 1;").into_iter().find_map(|r| r.err()).unwrap();
        assert!(err.is_lexical());
        assert!(err.to_string().contains("a$b"));
    }

    #[test]
    fn test_lex_unterminated_comment() {
        let err = Lexer::new("Test", "x\n/* never closed").into_iter().find_map(|r| r.err()).unwrap();
        assert!(err.is_lexical());
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_lex_eof_repeats() {
        let mut lexer = Lexer::new("Test", "  ");
        assert!(lexer.next_token().unwrap().is_eof());
        assert!(lexer.next_token().unwrap().is_eof());
    }
}
