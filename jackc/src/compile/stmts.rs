//! Statements.
use std::io::Write;

use super::Compiler;
use crate::{
    constants::{INDIRECT_REGISTER, SCRATCH},
    error::JackResult,
    lex::{Keyword, Symbol},
    vm::{ArithOp, Segment},
};

impl<'a, W: Write> Compiler<'a, W> {
    /// Statements up to the end of the enclosing block.
    pub(super) fn compile_statements(&mut self) -> JackResult<()> {
        while !self.tokens.at_block_end() {
            match self.tokens.peek_keyword() {
                Some(Keyword::Let) => self.compile_let()?,
                Some(Keyword::If) => self.compile_if()?,
                Some(Keyword::While) => self.compile_while()?,
                Some(Keyword::Do) => self.compile_do()?,
                Some(Keyword::Return) => self.compile_return()?,
                _ => return Err(self.tokens.unexpected("statement")),
            }
        }
        Ok(())
    }

    /// Statements enclosed in braces.
    fn compile_block(&mut self) -> JackResult<()> {
        self.tokens.consume_symbol(Symbol::LeftBrace)?;
        self.compile_statements()?;
        self.tokens.consume_symbol(Symbol::RightBrace)?;
        Ok(())
    }

    fn compile_let(&mut self) -> JackResult<()> {
        self.tokens.consume_keyword(Keyword::Let)?;
        let line = self.tokens.line();
        let name = self.tokens.consume_identifier()?;
        let (segment, index) = self.variable(&name, line)?;

        if self.tokens.match_symbol(Symbol::LeftBracket)? {
            self.writer.write_push(segment, index)?;
            self.compile_expression()?;
            self.tokens.consume_symbol(Symbol::RightBracket)?;
            self.writer.write_arithmetic(ArithOp::Add)?;

            self.tokens.consume_symbol(Symbol::Eq)?;
            self.compile_expression()?;

            // The value may itself have used the indirect register,
            // so the target address is only bound after it is evaluated.
            self.writer.write_pop(Segment::Temp, SCRATCH)?;
            self.writer.write_pop(Segment::Pointer, INDIRECT_REGISTER)?;
            self.writer.write_push(Segment::Temp, SCRATCH)?;
            self.writer.write_pop(Segment::That, 0)?;
        } else {
            self.tokens.consume_symbol(Symbol::Eq)?;
            self.compile_expression()?;
            self.writer.write_pop(segment, index)?;
        }

        self.tokens.consume_symbol(Symbol::Semicolon)?;
        Ok(())
    }

    fn compile_if(&mut self) -> JackResult<()> {
        self.tokens.consume_keyword(Keyword::If)?;
        let n = self.scope_mut()?.next_branch();
        let if_false = self.label("IF_FALSE", n)?;
        let if_end = self.label("IF_END", n)?;

        self.tokens.consume_symbol(Symbol::LeftParen)?;
        self.compile_expression()?;
        self.tokens.consume_symbol(Symbol::RightParen)?;
        self.writer.write_arithmetic(ArithOp::Not)?;
        self.writer.write_if(&*if_false)?;

        self.compile_block()?;

        if self.tokens.match_keyword(Keyword::Else)? {
            self.writer.write_goto(&*if_end)?;
            self.writer.write_label(if_false)?;
            self.compile_block()?;
            self.writer.write_label(if_end)?;
        } else {
            self.writer.write_label(if_false)?;
        }

        Ok(())
    }

    fn compile_while(&mut self) -> JackResult<()> {
        self.tokens.consume_keyword(Keyword::While)?;
        let n = self.scope_mut()?.next_loop();
        let while_exp = self.label("WHILE_EXP", n)?;
        let while_end = self.label("WHILE_END", n)?;

        self.writer.write_label(&*while_exp)?;
        self.tokens.consume_symbol(Symbol::LeftParen)?;
        self.compile_expression()?;
        self.tokens.consume_symbol(Symbol::RightParen)?;
        self.writer.write_arithmetic(ArithOp::Not)?;
        self.writer.write_if(&*while_end)?;

        self.compile_block()?;

        self.writer.write_goto(while_exp)?;
        self.writer.write_label(while_end)?;
        Ok(())
    }

    fn compile_do(&mut self) -> JackResult<()> {
        self.tokens.consume_keyword(Keyword::Do)?;
        let line = self.tokens.line();
        let name = self.tokens.consume_identifier()?;
        self.compile_call(name, line)?;

        // Every subroutine returns a value, even when declared void.
        self.writer.write_pop(Segment::Temp, SCRATCH)?;
        self.tokens.consume_symbol(Symbol::Semicolon)?;
        Ok(())
    }

    fn compile_return(&mut self) -> JackResult<()> {
        self.tokens.consume_keyword(Keyword::Return)?;

        if self.tokens.peek_symbol() == Some(Symbol::Semicolon) {
            self.writer.write_push(Segment::Constant, 0)?;
        } else {
            self.compile_expression()?;
        }

        self.tokens.consume_symbol(Symbol::Semicolon)?;
        self.writer.write_return()?;
        Ok(())
    }
}
