mod compile;
pub mod conf;
pub mod constants;
mod error;
pub mod lex;
pub mod symbol;
pub mod trace;
pub mod vm;

use std::io;

use self::{
    compile::Compiler,
    conf::CompilerConf,
    error::{JackError, JackResult},
    lex::{Lexer, TokenStream},
    trace::TokenSink,
};

pub mod prelude {
    pub use super::{
        compile::Compiler,
        compile_str, compile_with,
        conf::CompilerConf,
        error::{Diagnostic, JackError, JackResult},
        trace::{TokenSink, XmlTokenTrace},
    };
}

/// Compile one unit with the default configuration.
pub fn compile_str(unit: &str, source: &str) -> JackResult<String> {
    compile_with(unit, source, &CompilerConf::default(), None)
}

/// Compile one unit, returning the generated instructions.
///
/// Consumed tokens are mirrored to `sink` when one is given. Nothing is
/// returned for a unit that fails to compile, so callers never observe
/// partial output.
pub fn compile_with<'a>(
    unit: &str,
    source: &'a str,
    conf: &CompilerConf,
    sink: Option<&'a mut dyn TokenSink>,
) -> JackResult<String> {
    let mut tokens = TokenStream::new(Lexer::new(unit, source))?;
    if let Some(sink) = sink {
        tokens = tokens.with_sink(sink);
    }

    let out = Compiler::new(tokens, Vec::new(), conf.clone()).compile_class()?;
    String::from_utf8(out).map_err(|err| JackError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
}
