//! Result and errors.
use std::{
    fmt::{self, Display, Formatter},
    io,
};

use smol_str::SmolStr;

pub type JackResult<T> = std::result::Result<T, JackError>;

#[derive(Debug)]
pub enum JackError {
    /// Malformed literal, disallowed character sequence,
    /// or unterminated string or comment.
    Lexical(Diagnostic),
    /// Source does not match the grammar at this position.
    Syntax(Diagnostic),
    /// Identifier used as a value, but it names no variable in scope.
    Resolution(Diagnostic),
    /// Name declared twice in one scope. Only raised when strict
    /// declarations are enabled.
    Declaration(Diagnostic),
    Io(io::Error),
}

/// Location and message of a compilation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Name of the unit being compiled.
    pub unit: SmolStr,
    /// Line in the unit's source, 1-based.
    pub line: u32,
    pub message: String,
}

impl Diagnostic {
    pub fn new(unit: impl Into<SmolStr>, line: u32, message: impl ToString) -> Self {
        Self {
            unit: unit.into(),
            line,
            message: message.to_string(),
        }
    }
}

impl JackError {
    /// Diagnostic for errors that originate in the source code.
    ///
    /// Returns `None` for output failures.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::Lexical(diag) | Self::Syntax(diag) | Self::Resolution(diag) | Self::Declaration(diag) => {
                Some(diag)
            }
            Self::Io(_) => None,
        }
    }

    /// Source line the error was reported on.
    pub fn line(&self) -> Option<u32> {
        self.diagnostic().map(|diag| diag.line)
    }

    #[inline]
    pub fn is_lexical(&self) -> bool {
        matches!(self, Self::Lexical(_))
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.unit, self.line, self.message)
    }
}

impl Display for JackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexical(diag) => write!(f, "lexical error: {}", diag),
            Self::Syntax(diag) => write!(f, "syntax error: {}", diag),
            Self::Resolution(diag) => write!(f, "resolution error: {}", diag),
            Self::Declaration(diag) => write!(f, "declaration error: {}", diag),
            Self::Io(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for JackError {}

impl From<io::Error> for JackError {
    fn from(err: io::Error) -> Self {
        JackError::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_display_names_unit_and_line() {
        let err = JackError::Lexical(Diagnostic::new("Main", 7, "unterminated string constant"));
        assert_eq!(err.to_string(), "lexical error: Main:7: unterminated string constant");
        assert_eq!(err.line(), Some(7));
        assert!(err.is_lexical());
    }
}
