//! Driver errors
use std::fmt;

use jackc::prelude::JackError;

pub type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub kind: ErrorKind,
}

impl std::error::Error for CliError {}

#[derive(Debug)]
pub enum ErrorKind {
    Compile(JackError),
    Io(std::io::Error),
    Config(serde_yaml::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            ErrorKind::Compile(err) => write!(f, "{err}"),
            ErrorKind::Io(err) => write!(f, "io error: {err}"),
            ErrorKind::Config(err) => write!(f, "config error: {err}"),
        }
    }
}

impl From<JackError> for CliError {
    fn from(err: JackError) -> Self {
        Self {
            kind: ErrorKind::Compile(err),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self {
            kind: ErrorKind::Io(err),
        }
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        Self {
            kind: ErrorKind::Config(err),
        }
    }
}
