//! Expressions, terms and subroutine calls.
use std::io::Write;

use smol_str::SmolStr;

use super::Compiler;
use crate::{
    constants::{DIVIDE, INDIRECT_REGISTER, MULTIPLY, RECEIVER_REGISTER, STRING_APPEND, STRING_NEW},
    error::JackResult,
    lex::{Keyword, Symbol, TokenKind as TK, MAX_INTEGER},
    symbol::Lookup,
    vm::{ArithOp, Segment},
};

/// Binary operators. All share the same precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Lt,
    Gt,
    Eq,
}

impl BinaryOp {
    #[rustfmt::skip]
    fn from_symbol(symbol: Symbol) -> Option<Self> {
        match symbol {
            Symbol::Plus    => Some(Self::Add),
            Symbol::Minus   => Some(Self::Sub),
            Symbol::Star    => Some(Self::Mul),
            Symbol::Slash   => Some(Self::Div),
            Symbol::Amp     => Some(Self::And),
            Symbol::Pipe    => Some(Self::Or),
            Symbol::Less    => Some(Self::Lt),
            Symbol::Greater => Some(Self::Gt),
            Symbol::Eq      => Some(Self::Eq),
            _               => None,
        }
    }
}

impl<'a, W: Write> Compiler<'a, W> {
    /// Operators are applied left to right as they are encountered,
    /// so `a - b - c` computes `(a - b) - c`.
    pub(super) fn compile_expression(&mut self) -> JackResult<()> {
        self.compile_term()?;

        while let Some(op) = self.tokens.peek_symbol().and_then(BinaryOp::from_symbol) {
            self.tokens.next_token()?;
            self.compile_term()?;
            self.compile_binary(op)?;
        }

        Ok(())
    }

    fn compile_binary(&mut self, op: BinaryOp) -> JackResult<()> {
        match op {
            BinaryOp::Add => self.writer.write_arithmetic(ArithOp::Add)?,
            BinaryOp::Sub => self.writer.write_arithmetic(ArithOp::Sub)?,
            BinaryOp::Mul => self.writer.write_call(MULTIPLY, 2)?,
            BinaryOp::Div => self.writer.write_call(DIVIDE, 2)?,
            BinaryOp::And => self.writer.write_arithmetic(ArithOp::And)?,
            BinaryOp::Or => self.writer.write_arithmetic(ArithOp::Or)?,
            BinaryOp::Lt => self.writer.write_arithmetic(ArithOp::Lt)?,
            BinaryOp::Gt => self.writer.write_arithmetic(ArithOp::Gt)?,
            BinaryOp::Eq => self.writer.write_arithmetic(ArithOp::Eq)?,
        }
        Ok(())
    }

    fn compile_term(&mut self) -> JackResult<()> {
        match self.tokens.peek_kind() {
            TK::IntegerConstant(value) => {
                self.tokens.next_token()?;
                self.writer.write_push(Segment::Constant, value)?;
            }
            TK::StringConstant => {
                let token = self.tokens.next_token()?;
                self.compile_string(&token.lexeme)?;
            }
            TK::Keyword(keyword) => self.compile_keyword_constant(keyword)?,
            TK::Identifier => {
                let line = self.tokens.line();
                let name = self.tokens.consume_identifier()?;

                match self.tokens.peek_symbol() {
                    Some(Symbol::LeftBracket) => {
                        let (segment, index) = self.variable(&name, line)?;
                        self.tokens.next_token()?;
                        self.writer.write_push(segment, index)?;
                        self.compile_expression()?;
                        self.tokens.consume_symbol(Symbol::RightBracket)?;
                        self.writer.write_arithmetic(ArithOp::Add)?;
                        self.writer.write_pop(Segment::Pointer, INDIRECT_REGISTER)?;
                        self.writer.write_push(Segment::That, 0)?;
                    }
                    Some(Symbol::LeftParen | Symbol::Dot) => self.compile_call(name, line)?,
                    _ => {
                        let (segment, index) = self.variable(&name, line)?;
                        self.writer.write_push(segment, index)?;
                    }
                }
            }
            TK::Symbol(Symbol::LeftParen) => {
                self.tokens.next_token()?;
                self.compile_expression()?;
                self.tokens.consume_symbol(Symbol::RightParen)?;
            }
            TK::Symbol(Symbol::Minus) => {
                self.tokens.next_token()?;
                self.compile_term()?;
                self.writer.write_arithmetic(ArithOp::Neg)?;
            }
            TK::Symbol(Symbol::Tilde) => {
                self.tokens.next_token()?;
                self.compile_term()?;
                self.writer.write_arithmetic(ArithOp::Not)?;
            }
            TK::Symbol(_) | TK::Eof => return Err(self.tokens.unexpected("term")),
        }
        Ok(())
    }

    fn compile_keyword_constant(&mut self, keyword: Keyword) -> JackResult<()> {
        match keyword {
            Keyword::True => {
                self.writer.write_push(Segment::Constant, 1)?;
                self.writer.write_arithmetic(ArithOp::Neg)?;
            }
            Keyword::False | Keyword::Null => {
                self.writer.write_push(Segment::Constant, 0)?;
            }
            Keyword::This => {
                self.writer.write_push(Segment::Pointer, RECEIVER_REGISTER)?;
            }
            _ => return Err(self.tokens.unexpected("term")),
        }
        self.tokens.next_token()?;
        Ok(())
    }

    /// A new string object, filled one character at a time.
    fn compile_string(&mut self, text: &str) -> JackResult<()> {
        let len = match u16::try_from(text.len()) {
            Ok(len) if len <= MAX_INTEGER => len,
            _ => return Err(self.tokens.error(format!("string constant exceeds {MAX_INTEGER} characters"))),
        };
        self.writer.write_push(Segment::Constant, len)?;
        self.writer.write_call(STRING_NEW, 1)?;

        // The lexer only admits ASCII inside string constants.
        for byte in text.bytes() {
            self.writer.write_push(Segment::Constant, u16::from(byte))?;
            self.writer.write_call(STRING_APPEND, 2)?;
        }
        Ok(())
    }

    /// Subroutine call, after its leading identifier was consumed.
    ///
    /// The identifier either names the subroutine itself, called on the
    /// current object, or is followed by a member access. A member access
    /// on a variable calls a method of the variable's type with the
    /// variable as receiver. Any other name is taken to be a class.
    pub(super) fn compile_call(&mut self, name: SmolStr, line: u32) -> JackResult<()> {
        let (callee, implicit) = match self.tokens.peek_symbol() {
            Some(Symbol::LeftParen) => {
                self.writer.write_push(Segment::Pointer, RECEIVER_REGISTER)?;
                (format!("{}.{}", self.class_name, name), 1)
            }
            Some(Symbol::Dot) => {
                self.tokens.next_token()?;
                let member = self.tokens.consume_identifier()?;

                let receiver = match self.lookup(&name) {
                    Lookup::Resolved(symbol) => Some((symbol.kind.segment(), symbol.index, symbol.ty.clone())),
                    Lookup::AssumedExternal => None,
                };

                match receiver {
                    Some((segment, index, ty)) => {
                        self.writer.write_push(segment, index)?;
                        (format!("{ty}.{member}"), 1)
                    }
                    None => {
                        log::trace!("{}:{}: assuming \"{}\" names a class", self.tokens.unit(), line, name);
                        (format!("{name}.{member}"), 0)
                    }
                }
            }
            _ => return Err(self.tokens.unexpected("'(' or '.'")),
        };

        self.tokens.consume_symbol(Symbol::LeftParen)?;
        let nargs = self
            .compile_expression_list()?
            .checked_add(implicit)
            .ok_or_else(|| self.tokens.error("too many arguments"))?;
        self.tokens.consume_symbol(Symbol::RightParen)?;

        self.writer.write_call(callee, nargs)?;
        Ok(())
    }

    /// Comma separated arguments. Returns the number of expressions.
    fn compile_expression_list(&mut self) -> JackResult<u16> {
        if self.tokens.peek_symbol() == Some(Symbol::RightParen) {
            return Ok(0);
        }

        let mut count: u16 = 1;
        self.compile_expression()?;
        while self.tokens.match_symbol(Symbol::Comma)? {
            self.compile_expression()?;
            count = count
                .checked_add(1)
                .ok_or_else(|| self.tokens.error("too many arguments"))?;
        }
        Ok(count)
    }
}
