//! Build configuration file.
use std::{fs, path::PathBuf};

use jackc::prelude::CompilerConf;
use serde::Deserialize;

use crate::error::CliResult;

/// Build settings, read from a YAML file.
///
/// ```yaml
/// compiler:
///   annotate: true
///   strict_declarations: false
/// trace_tokens: true
/// output_dir: build
/// ```
///
/// Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub compiler: CompilerConf,
    /// Write the consumed tokens of each unit to `<Unit>T.xml`.
    pub trace_tokens: bool,
    /// Directory the output files are written to. When not set, output
    /// is written next to each source file.
    pub output_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_file(filepath: &str) -> CliResult<Self> {
        let mut file = fs::File::open(filepath)?;

        let config: Config = serde_yaml::from_reader(&mut file)?;
        log::debug!("loaded config: {:#?}", config);

        Ok(config)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_config() {
        let config: Config = serde_yaml::from_str("compiler:\n  annotate: true\ntrace_tokens: true\n").unwrap();

        assert!(config.compiler.annotate);
        assert!(!config.compiler.strict_declarations);
        assert!(config.trace_tokens);
        assert_eq!(config.output_dir, None);
    }

    #[test]
    fn test_output_dir() {
        let config: Config = serde_yaml::from_str("output_dir: build/vm\n").unwrap();

        assert_eq!(config.output_dir, Some(PathBuf::from("build/vm")));
        assert_eq!(config.compiler, CompilerConf::default());
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(serde_yaml::from_str::<Config>("trace_tokens: maybe\n").is_err());
    }
}
