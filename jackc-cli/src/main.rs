//! Entrypoint for CLI
mod compare;
mod config;
mod driver;
mod error;

use std::{env, error::Error, fs};

use jackc::lex::{Lexer, TokenKind};
use log::{error, info};

use self::{
    compare::{compare_files, Comparison},
    config::Config,
    driver::Driver,
};

static USAGE: &str = r#"
usage: jackc CMD [ARGS]

commands:
    build   Compile a source file, or every source file in a directory
    tokens  Print the tokens of a source file
    cmp     Compare two files line by line

examples:
    jackc build Square/
    jackc build Square/ jackc.yaml
    jackc tokens Square/Main.jack
    jackc cmp Square/Main.vm expected/Main.vm
"#;

fn run_build(path: String, config: Option<String>) -> Result<bool, Box<dyn Error>> {
    let config = match config {
        Some(filepath) => Config::from_file(&filepath)?,
        None => Config::default(),
    };

    let report = Driver::new(config).build(&path)?;
    info!("{} compiled, {} failed", report.compiled, report.failed);

    Ok(report.failed == 0)
}

fn run_tokens(filepath: String) -> Result<bool, Box<dyn Error>> {
    use TokenKind as TK;

    let source_code = fs::read_to_string(&filepath)?;
    let lexer = Lexer::new(filepath.as_str(), source_code.as_str());

    println!("line | kind            | lexeme");
    for token in lexer {
        match token {
            Ok(token) => match token.kind {
                TK::Eof => println!("{0:4}   {1: <16}", token.line, token.kind.tag()),
                _ => {
                    let line = token.line;
                    let tag = token.kind.tag();
                    let lexeme = token.lexeme;
                    println!("{line:4}   {tag: <16} \"{lexeme}\"")
                }
            },
            Err(err) => {
                error!("{err}");
                return Ok(false);
            }
        }
    }

    Ok(true)
}

fn run_compare(left: String, right: String) -> Result<bool, Box<dyn Error>> {
    match compare_files(&left, &right)? {
        Comparison::Identical => {
            println!("{left} and {right} are identical");
            Ok(true)
        }
        Comparison::Mismatch { line } => {
            println!("{left} and {right} differ at line {line}");
            Ok(false)
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new().env().init()?;

    let success = match parse_args() {
        Some(Cmd::Build { path, config }) => run_build(path, config)?,
        Some(Cmd::Tokens { filepath }) => run_tokens(filepath)?,
        Some(Cmd::Cmp { left, right }) => run_compare(left, right)?,
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            std::process::exit(64)
        }
    };

    if !success {
        std::process::exit(1)
    }

    Ok(())
}

fn parse_args() -> Option<Cmd> {
    let mut args = env::args().skip(1);
    match args.next() {
        Some(cmd) => match cmd.as_str() {
            "build" => Some(Cmd::Build {
                path: consume_arg(&mut args)?,
                config: consume_arg(&mut args),
            }),
            "tokens" => Some(Cmd::Tokens {
                filepath: consume_arg(&mut args)?,
            }),
            "cmp" => Some(Cmd::Cmp {
                left: consume_arg(&mut args)?,
                right: consume_arg(&mut args)?,
            }),
            _ => None,
        },
        None => None,
    }
}

/// Consumes the next argument, if any.
fn consume_arg(args: &mut impl Iterator<Item = String>) -> Option<String> {
    args.next()
}

fn print_usage() {
    println!("jackc v{}", env!("CARGO_PKG_VERSION"));
    println!("{USAGE}");
}

enum Cmd {
    /// Compile a file or directory, with an optional config file.
    Build { path: String, config: Option<String> },
    /// Print tokens
    Tokens { filepath: String },
    /// Compare files
    Cmp { left: String, right: String },
}
