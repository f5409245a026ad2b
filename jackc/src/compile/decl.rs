//! Class and subroutine declarations.
use std::io::Write;

use smol_str::SmolStr;

use super::{listing, Compiler};
use crate::{
    constants::{ALLOC, RECEIVER_REGISTER},
    error::JackResult,
    lex::{Keyword, Symbol, TokenKind},
    symbol::{SubroutineKind, SubroutineScope, SymbolKind},
    vm::Segment,
};

impl<'a, W: Write> Compiler<'a, W> {
    /// Compile the unit's class declaration, which must span the
    /// whole input, and return the output.
    pub fn compile_class(mut self) -> JackResult<W> {
        self.tokens.consume_keyword(Keyword::Class)?;
        self.class_name = self.tokens.consume_identifier()?;
        log::debug!("{}: compiling class {}", self.tokens.unit(), self.class_name);
        self.tokens.consume_symbol(Symbol::LeftBrace)?;

        loop {
            let kind = match self.tokens.peek_keyword() {
                Some(Keyword::Static) => SymbolKind::Static,
                Some(Keyword::Field) => SymbolKind::Field,
                _ => break,
            };
            self.tokens.next_token()?;
            self.compile_var_dec(kind)?;
        }

        if self.conf.annotate {
            let lines = listing(&self.class);
            self.annotate(format!("class {}", self.class_name), lines)?;
        }

        loop {
            let kind = match self.tokens.peek_keyword() {
                Some(Keyword::Constructor) => SubroutineKind::Constructor,
                Some(Keyword::Function) => SubroutineKind::Function,
                Some(Keyword::Method) => SubroutineKind::Method,
                _ => break,
            };
            self.tokens.next_token()?;
            self.compile_subroutine(kind)?;
        }

        self.tokens.consume_symbol(Symbol::RightBrace)?;
        self.tokens.finish()?;

        Ok(self.writer.into_inner()?)
    }

    /// Type name of a declaration, either a primitive keyword or a class name.
    fn compile_type(&mut self) -> JackResult<SmolStr> {
        match self.tokens.peek_kind() {
            TokenKind::Keyword(keyword) if keyword.is_type() => Ok(self.tokens.next_token()?.lexeme),
            TokenKind::Identifier => self.tokens.consume_identifier(),
            _ => Err(self.tokens.unexpected("type")),
        }
    }

    /// Variable declaration following its leading keyword.
    ///
    /// Shared by `static`, `field` and `var`, which only differ in the kind
    /// of storage they declare.
    fn compile_var_dec(&mut self, kind: SymbolKind) -> JackResult<()> {
        let ty = self.compile_type()?;

        loop {
            let line = self.tokens.line();
            let name = self.tokens.consume_identifier()?;
            self.declare(name, ty.clone(), kind, line)?;

            if !self.tokens.match_symbol(Symbol::Comma)? {
                break;
            }
        }

        self.tokens.consume_symbol(Symbol::Semicolon)?;
        Ok(())
    }

    fn compile_subroutine(&mut self, kind: SubroutineKind) -> JackResult<()> {
        // Return types are not checked.
        if !self.tokens.match_keyword(Keyword::Void)? {
            self.compile_type()?;
        }

        let name = self.tokens.consume_identifier()?;
        let scope = SubroutineScope::new(&self.class_name, &name, kind);
        log::debug!("{}: compiling {:?} {}", self.tokens.unit(), kind, scope.name());
        self.subroutine = Some(scope);

        self.tokens.consume_symbol(Symbol::LeftParen)?;
        self.compile_parameter_list()?;
        self.tokens.consume_symbol(Symbol::RightParen)?;

        self.compile_subroutine_body()
    }

    fn compile_parameter_list(&mut self) -> JackResult<()> {
        if self.tokens.peek_symbol() == Some(Symbol::RightParen) {
            return Ok(());
        }

        loop {
            let ty = self.compile_type()?;
            let line = self.tokens.line();
            let name = self.tokens.consume_identifier()?;
            self.declare(name, ty, SymbolKind::Argument, line)?;

            if !self.tokens.match_symbol(Symbol::Comma)? {
                return Ok(());
            }
        }
    }

    fn compile_subroutine_body(&mut self) -> JackResult<()> {
        self.tokens.consume_symbol(Symbol::LeftBrace)?;

        while self.tokens.match_keyword(Keyword::Var)? {
            self.compile_var_dec(SymbolKind::Local)?;
        }

        // Locals are all declared up front, so their count is known
        // before the first instruction of the body.
        let scope = self.scope()?;
        let kind = scope.kind();
        let name = scope.name().clone();
        let nlocals = scope.table().var_count(SymbolKind::Local);
        let lines = if self.conf.annotate {
            Some(listing(scope.table()))
        } else {
            None
        };

        self.writer.write_function(name.clone(), nlocals)?;
        if let Some(lines) = lines {
            self.annotate(format!("{} {}", kind_name(kind), name), lines)?;
        }

        match kind {
            SubroutineKind::Constructor => {
                let nfields = self.class.var_count(SymbolKind::Field);
                self.writer.write_push(Segment::Constant, nfields)?;
                self.writer.write_call(ALLOC, 1)?;
                self.writer.write_pop(Segment::Pointer, RECEIVER_REGISTER)?;
            }
            SubroutineKind::Method => {
                self.writer.write_push(Segment::Argument, 0)?;
                self.writer.write_pop(Segment::Pointer, RECEIVER_REGISTER)?;
            }
            SubroutineKind::Function => {}
        }

        self.compile_statements()?;
        self.tokens.consume_symbol(Symbol::RightBrace)?;
        Ok(())
    }
}

#[rustfmt::skip]
fn kind_name(kind: SubroutineKind) -> &'static str {
    match kind {
        SubroutineKind::Constructor => "constructor",
        SubroutineKind::Function    => "function",
        SubroutineKind::Method      => "method",
    }
}
