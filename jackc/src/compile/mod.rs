//! Single pass compiler.
//!
//! Parsing, scope resolution and code generation are interleaved. Each
//! grammar rule is a method that consumes its tokens from the stream and
//! writes the instructions for them before returning, so no syntax tree
//! is ever built.
mod decl;
mod expr;
mod stmts;

use std::io::Write;

use smol_str::SmolStr;

use crate::{
    conf::CompilerConf,
    error::{Diagnostic, JackError, JackResult},
    lex::TokenStream,
    symbol::{resolve, Lookup, SubroutineScope, SymbolKind, SymbolTable},
    vm::{Segment, VmWriter},
};

/// Compiles one unit, a single class, into virtual machine instructions.
///
/// A compiler is used for exactly one unit. Nothing it holds is
/// shared with the compilation of other units.
pub struct Compiler<'a, W: Write> {
    tokens: TokenStream<'a>,
    writer: VmWriter<W>,
    conf: CompilerConf,
    /// Name of the class declared by the unit.
    class_name: SmolStr,
    /// Static and field variables. Lives for the whole unit.
    class: SymbolTable,
    /// Arguments and locals of the subroutine being compiled.
    ///
    /// Replaced at every subroutine declaration.
    subroutine: Option<SubroutineScope>,
}

impl<'a, W: Write> Compiler<'a, W> {
    pub fn new(tokens: TokenStream<'a>, out: W, conf: CompilerConf) -> Self {
        Self {
            tokens,
            writer: VmWriter::new(out),
            conf,
            class_name: SmolStr::default(),
            class: SymbolTable::default(),
            subroutine: None,
        }
    }
}

/// Scope handling
impl<'a, W: Write> Compiler<'a, W> {
    fn scope(&self) -> JackResult<&SubroutineScope> {
        match self.subroutine.as_ref() {
            Some(scope) => Ok(scope),
            None => Err(self.tokens.error("statement outside of a subroutine")),
        }
    }

    fn scope_mut(&mut self) -> JackResult<&mut SubroutineScope> {
        match self.subroutine.as_mut() {
            Some(scope) => Ok(scope),
            None => Err(self.tokens.error("statement outside of a subroutine")),
        }
    }

    /// Resolve a bare identifier against the subroutine scope, then the class scope.
    fn lookup(&self, name: &str) -> Lookup<'_> {
        resolve(self.subroutine.as_ref().map(SubroutineScope::table), &self.class, name)
    }

    /// Storage location of a variable used as a value or assignment target.
    fn variable(&self, name: &str, line: u32) -> JackResult<(Segment, u16)> {
        match self.lookup(name) {
            Lookup::Resolved(symbol) => Ok((symbol.kind.segment(), symbol.index)),
            Lookup::AssumedExternal => Err(JackError::Resolution(Diagnostic::new(
                self.tokens.unit().clone(),
                line,
                format!("\"{name}\" is not a variable in scope"),
            ))),
        }
    }

    /// Add a variable to the scope its kind belongs to.
    fn declare(&mut self, name: SmolStr, ty: SmolStr, kind: SymbolKind, line: u32) -> JackResult<()> {
        let strict = self.conf.strict_declarations;
        let unit = self.tokens.unit().clone();

        let table = if kind.is_class_level() {
            &mut self.class
        } else {
            match self.subroutine.as_mut() {
                Some(scope) => scope.table_mut(),
                None => return Err(self.tokens.error("declaration outside of a subroutine")),
            }
        };

        if strict && table.contains(&name) {
            return Err(JackError::Declaration(Diagnostic::new(
                unit,
                line,
                format!("\"{name}\" is already declared in this scope"),
            )));
        }

        table.define(name, ty, kind);
        Ok(())
    }

    /// Branch label qualified by class and subroutine name.
    fn label(&self, tag: &str, n: u32) -> JackResult<String> {
        Ok(format!("{}${tag}{n}", self.scope()?.name()))
    }

    /// Write a symbol table listing as comments.
    fn annotate(&mut self, title: String, listing: Vec<String>) -> JackResult<()> {
        self.writer.write_comment(title)?;
        for line in listing {
            self.writer.write_comment(line)?;
        }
        Ok(())
    }
}

/// One line per symbol, ordered by kind and slot.
fn listing(table: &SymbolTable) -> Vec<String> {
    table
        .ordered()
        .into_iter()
        .map(|symbol| {
            format!(
                "{} {} {} -> {} {}",
                symbol.kind,
                symbol.ty,
                symbol.name,
                symbol.kind.segment(),
                symbol.index
            )
        })
        .collect()
}
