//! Token trace.
//!
//! Debug side-channel that mirrors every token consumed by the
//! compiler. It has no effect on the generated code.
use std::io::{self, Write};

use crate::lex::{Token, TokenKind};

/// Receiver of consumed tokens.
pub trait TokenSink {
    fn token(&mut self, token: &Token) -> io::Result<()>;

    /// Called once after the last token of a unit was consumed.
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writes tokens as an XML listing, one element per line.
///
/// ```text
/// <tokens>
/// <keyword> class </keyword>
/// <identifier> Main </identifier>
/// <symbol> { </symbol>
/// ...
/// </tokens>
/// ```
pub struct XmlTokenTrace<W: Write> {
    out: W,
    started: bool,
}

impl<W: Write> XmlTokenTrace<W> {
    pub fn new(out: W) -> Self {
        Self { out, started: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn start(&mut self) -> io::Result<()> {
        if !self.started {
            self.started = true;
            writeln!(self.out, "<tokens>")?;
        }
        Ok(())
    }
}

impl<W: Write> TokenSink for XmlTokenTrace<W> {
    fn token(&mut self, token: &Token) -> io::Result<()> {
        if token.kind == TokenKind::Eof {
            return Ok(());
        }

        self.start()?;
        let tag = token.kind.tag();
        writeln!(self.out, "<{tag}> {} </{tag}>", escape(&token.lexeme))
    }

    fn finish(&mut self) -> io::Result<()> {
        self.start()?;
        writeln!(self.out, "</tokens>")?;
        self.out.flush()
    }
}

/// Escape characters that are reserved in XML.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '&' => escaped.push_str("&amp;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
