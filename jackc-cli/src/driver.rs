//! Whole program build.
//!
//! Every source file found is compiled as an independent unit. A failing
//! unit is reported and skipped, without affecting the others.
use std::{
    fs,
    path::{Path, PathBuf},
};

use jackc::prelude::*;
use log::{error, info, warn};

use crate::{config::Config, error::CliResult};

/// Extension of source files.
pub const SOURCE_EXT: &str = "jack";

/// Extension of generated files.
pub const OUTPUT_EXT: &str = "vm";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub compiled: usize,
    pub failed: usize,
}

pub struct Driver {
    config: Config,
}

impl Driver {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Compile a single source file, or every source file below a directory.
    pub fn build(&self, path: impl AsRef<Path>) -> CliResult<Report> {
        let path = path.as_ref();
        let sources = discover(path)?;
        if sources.is_empty() {
            warn!("no .{SOURCE_EXT} files found in {}", path.display());
        }

        // Relative layout below the output directory mirrors the sources.
        let root = if path.is_dir() {
            path
        } else {
            path.parent().unwrap_or(path)
        };

        let mut report = Report::default();
        for source in &sources {
            match self.compile_file(root, source) {
                Ok(output) => {
                    info!("compiled {} -> {}", source.display(), output.display());
                    report.compiled += 1;
                }
                Err(err) => {
                    error!("{}: {err}", source.display());
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Compile one unit and write its output files. Returns the path of
    /// the generated instructions.
    ///
    /// Nothing is written when compilation fails.
    fn compile_file(&self, root: &Path, source: &Path) -> CliResult<PathBuf> {
        let unit = unit_name(source);
        let text = fs::read_to_string(source)?;

        let mut trace = if self.config.trace_tokens {
            Some(XmlTokenTrace::new(Vec::new()))
        } else {
            None
        };
        let vm = compile_with(
            &unit,
            &text,
            &self.config.compiler,
            trace.as_mut().map(|trace| trace as &mut dyn TokenSink),
        )?;

        let source_dir = source.parent().unwrap_or(Path::new(""));
        let dir = match &self.config.output_dir {
            Some(dir) => dir.join(source_dir.strip_prefix(root).unwrap_or(Path::new(""))),
            None => source_dir.to_path_buf(),
        };
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(&dir)?;
        }

        let output = dir.join(format!("{unit}.{OUTPUT_EXT}"));
        fs::write(&output, vm)?;

        if let Some(trace) = trace {
            fs::write(dir.join(format!("{unit}T.xml")), trace.into_inner())?;
        }

        Ok(output)
    }
}

/// Unit name of a source file, its file name without extension.
fn unit_name(source: &Path) -> String {
    source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Source files to compile, in a stable order.
///
/// A file path is taken as is. A directory is searched recursively.
pub fn discover(path: &Path) -> CliResult<Vec<PathBuf>> {
    let mut sources = vec![];
    if path.is_dir() {
        walk(path, &mut sources)?;
    } else {
        sources.push(path.to_path_buf());
    }
    Ok(sources)
}

fn walk(dir: &Path, sources: &mut Vec<PathBuf>) -> CliResult<()> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();

    for entry in entries {
        if entry.is_dir() {
            walk(&entry, sources)?;
        } else if entry.extension().map_or(false, |ext| ext == SOURCE_EXT) {
            sources.push(entry);
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    /// Fresh scratch directory below the system temp dir.
    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("jackc-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_discover_sorted_recursive() {
        let dir = scratch("discover");
        fs::create_dir_all(dir.join("b")).unwrap();
        fs::write(dir.join("b/Z.jack"), "").unwrap();
        fs::write(dir.join("Main.jack"), "").unwrap();
        fs::write(dir.join("A.jack"), "").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();

        let sources = discover(&dir).unwrap();
        let names = sources
            .iter()
            .map(|path| path.strip_prefix(&dir).unwrap().to_path_buf())
            .collect::<Vec<_>>();

        assert_eq!(
            names,
            vec![PathBuf::from("A.jack"), PathBuf::from("Main.jack"), PathBuf::from("b/Z.jack")]
        );
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_output_dir_keeps_layout() {
        let dir = scratch("layout");
        let out = dir.join("out");
        for sub in ["src/a", "src/b"] {
            fs::create_dir_all(dir.join(sub)).unwrap();
            fs::write(
                dir.join(sub).join("Main.jack"),
                "class Main { function void main() { return; } }",
            )
            .unwrap();
        }

        let config = Config {
            output_dir: Some(out.clone()),
            ..Config::default()
        };
        let report = Driver::new(config).build(dir.join("src")).unwrap();

        assert_eq!(report, Report { compiled: 2, failed: 0 });
        assert!(out.join("a/Main.vm").exists());
        assert!(out.join("b/Main.vm").exists());
        assert!(!out.join("Main.vm").exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_failed_unit_writes_nothing() {
        let dir = scratch("build");
        fs::write(
            dir.join("Good.jack"),
            "class Good { function int f() { return 1; } }",
        )
        .unwrap();
        fs::write(
            dir.join("Bad.jack"),
            "class Bad { function void f() { do Output.printString(\"oops\n); } }",
        )
        .unwrap();

        let config = Config {
            trace_tokens: true,
            ..Config::default()
        };
        let report = Driver::new(config).build(&dir).unwrap();

        assert_eq!(report, Report { compiled: 1, failed: 1 });
        assert_eq!(
            fs::read_to_string(dir.join("Good.vm")).unwrap(),
            "function Good.f 0\npush constant 1\nreturn\n"
        );
        assert!(dir.join("GoodT.xml").exists());
        assert!(!dir.join("Bad.vm").exists());
        assert!(!dir.join("BadT.xml").exists());
        fs::remove_dir_all(&dir).unwrap();
    }
}
