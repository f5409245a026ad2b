//! Token stream with a single token of look ahead.
use smol_str::SmolStr;

use super::{Keyword, Lexer, Symbol, Token, TokenKind};
use crate::{
    error::{Diagnostic, JackError, JackResult},
    trace::TokenSink,
};

/// Stream of tokens that keeps exactly one token of look ahead.
///
/// Tokens are lazily lexed. Consuming the current token triggers
/// the internal lexer to scan the next one, so lexical errors surface
/// at the point the parser advances past the preceding token.
pub struct TokenStream<'a> {
    lexer: Lexer<'a>,
    /// Next token to be consumed.
    current: Token,
    /// Receives a copy of every consumed token.
    sink: Option<&'a mut dyn TokenSink>,
}

impl<'a> TokenStream<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> JackResult<Self> {
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            sink: None,
        })
    }

    /// Mirror consumed tokens to the given sink.
    pub fn with_sink(mut self, sink: &'a mut dyn TokenSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn unit(&self) -> &SmolStr {
        self.lexer.unit()
    }

    /// Return the current token without advancing the cursor.
    #[inline]
    pub fn peek(&self) -> &Token {
        &self.current
    }

    #[inline]
    pub fn peek_kind(&self) -> TokenKind {
        self.current.kind
    }

    #[inline]
    pub fn peek_symbol(&self) -> Option<Symbol> {
        match self.current.kind {
            TokenKind::Symbol(symbol) => Some(symbol),
            _ => None,
        }
    }

    #[inline]
    pub fn peek_keyword(&self) -> Option<Keyword> {
        match self.current.kind {
            TokenKind::Keyword(keyword) => Some(keyword),
            _ => None,
        }
    }

    /// Line of the current token.
    #[inline]
    pub fn line(&self) -> u32 {
        self.current.line
    }

    /// Indicates whether the current token closes a block.
    ///
    /// End-of-file is treated as a closing brace here, so loops over
    /// block contents terminate. This is the only place where that
    /// coercion applies: consuming a `}` at end-of-file is still an error.
    #[inline]
    pub fn at_block_end(&self) -> bool {
        self.current.is_symbol(Symbol::RightBrace) || self.current.is_eof()
    }

    /// Consumes the current token regardless of kind.
    pub fn next_token(&mut self) -> JackResult<Token> {
        if let Some(sink) = self.sink.as_mut() {
            sink.token(&self.current)?;
        }

        let next = if self.current.is_eof() {
            self.current.clone()
        } else {
            self.lexer.next_token()?
        };

        Ok(std::mem::replace(&mut self.current, next))
    }

    /// Consumes the current token if it is the given symbol.
    ///
    /// Returns true when matched. Does not consume the token
    /// if it doesn't match.
    pub fn match_symbol(&mut self, symbol: Symbol) -> JackResult<bool> {
        if self.current.is_symbol(symbol) {
            self.next_token()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consumes the current token if it is the given keyword.
    pub fn match_keyword(&mut self, keyword: Keyword) -> JackResult<bool> {
        if self.current.is_keyword(keyword) {
            self.next_token()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Return the current token and advance the cursor.
    ///
    /// The cursor is not advanced if the token doesn't match.
    ///
    /// # Errors
    ///
    /// Returns a syntax error if the current token is not the given symbol.
    pub fn consume_symbol(&mut self, symbol: Symbol) -> JackResult<Token> {
        if self.current.is_symbol(symbol) {
            self.next_token()
        } else {
            Err(self.unexpected(format!("'{symbol}'")))
        }
    }

    pub fn consume_keyword(&mut self, keyword: Keyword) -> JackResult<Token> {
        if self.current.is_keyword(keyword) {
            self.next_token()
        } else {
            Err(self.unexpected(format!("'{keyword}'")))
        }
    }

    /// Consume an identifier and return its name.
    pub fn consume_identifier(&mut self) -> JackResult<SmolStr> {
        if self.current.kind == TokenKind::Identifier {
            self.next_token().map(|token| token.lexeme)
        } else {
            Err(self.unexpected("identifier"))
        }
    }

    /// Ensure all tokens were consumed, and notify the sink.
    pub fn finish(&mut self) -> JackResult<()> {
        if !self.current.is_eof() {
            return Err(self.unexpected("end of input"));
        }

        if let Some(sink) = self.sink.as_mut() {
            sink.finish()?;
        }

        Ok(())
    }

    /// Build a syntax error at the current token.
    #[inline(never)]
    #[cold]
    pub fn error(&self, message: impl ToString) -> JackError {
        JackError::Syntax(Diagnostic::new(self.unit().clone(), self.current.line, message))
    }

    /// Build a syntax error describing what was expected instead of
    /// the current token.
    #[inline(never)]
    #[cold]
    pub fn unexpected(&self, expected: impl std::fmt::Display) -> JackError {
        let encountered = match self.current.kind {
            TokenKind::Identifier => format!("identifier \"{}\"", self.current.lexeme),
            TokenKind::StringConstant => format!("string constant \"{}\"", self.current.lexeme),
            kind => kind.to_string(),
        };
        self.error(format!("expected {expected}, encountered {encountered}"))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn stream(source: &str) -> TokenStream {
        TokenStream::new(Lexer::new("Test", source)).unwrap()
    }

    #[test]
    fn test_consume_mismatch_does_not_advance() {
        let mut stream = stream("x ;");
        let err = stream.consume_symbol(Symbol::Semicolon).unwrap_err();
        assert!(matches!(err, JackError::Syntax(_)));
        assert_eq!(stream.consume_identifier().unwrap(), "x");
        assert!(stream.match_symbol(Symbol::Semicolon).unwrap());
        assert!(stream.peek().is_eof());
    }

    #[test]
    fn test_block_end_at_eof() {
        let mut stream = stream("}");
        assert!(stream.at_block_end());
        stream.consume_symbol(Symbol::RightBrace).unwrap();
        assert!(stream.at_block_end());
        assert!(stream.consume_symbol(Symbol::RightBrace).is_err());
        stream.finish().unwrap();
    }

    #[test]
    fn test_lexical_error_surfaces_on_advance() {
        let mut stream = stream("x 9z");
        let err = stream.next_token().unwrap_err();
        assert!(err.is_lexical());
    }

    #[test]
    fn test_sink_receives_consumed_tokens() {
        struct Collect(Vec<SmolStr>);

        impl TokenSink for Collect {
            fn token(&mut self, token: &Token) -> std::io::Result<()> {
                self.0.push(token.lexeme.clone());
                Ok(())
            }
        }

        let mut sink = Collect(vec![]);
        {
            let mut stream = TokenStream::new(Lexer::new("Test", "do f();"))
                .unwrap()
                .with_sink(&mut sink);
            while !stream.peek().is_eof() {
                stream.next_token().unwrap();
            }
            stream.finish().unwrap();
        }
        assert_eq!(sink.0, vec!["do", "f", "(", ")", ";"]);
    }
}
