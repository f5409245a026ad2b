//! Line by line comparison of generated output against a reference.
use std::{fs, path::Path};

use itertools::{EitherOrBoth, Itertools};

use crate::error::CliResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Identical,
    /// First line, 1-based, that differs or exists in only one text.
    Mismatch { line: usize },
}

/// Compare two texts, ignoring whitespace surrounding each line.
pub fn compare(left: &str, right: &str) -> Comparison {
    for (index, pair) in left.lines().zip_longest(right.lines()).enumerate() {
        match pair {
            EitherOrBoth::Both(a, b) if a.trim() == b.trim() => {}
            _ => return Comparison::Mismatch { line: index + 1 },
        }
    }
    Comparison::Identical
}

pub fn compare_files(left: impl AsRef<Path>, right: impl AsRef<Path>) -> CliResult<Comparison> {
    let left = fs::read_to_string(left)?;
    let right = fs::read_to_string(right)?;
    Ok(compare(&left, &right))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_surrounding_whitespace_ignored() {
        let left = "push constant 1\n  add\r\nreturn\n";
        let right = "push constant 1\nadd  \nreturn";
        assert_eq!(compare(left, right), Comparison::Identical);
    }

    #[test]
    fn test_first_mismatch() {
        let left = "push constant 1\npush constant 2\nadd\nreturn\n";
        let right = "push constant 1\npush constant 2\nsub\nneg\n";
        assert_eq!(compare(left, right), Comparison::Mismatch { line: 3 });
    }

    #[test]
    fn test_extra_lines() {
        assert_eq!(compare("a\nb\n", "a\nb\nc\n"), Comparison::Mismatch { line: 3 });
        assert_eq!(compare("a\nb\nc", "a"), Comparison::Mismatch { line: 2 });
        assert_eq!(compare("", ""), Comparison::Identical);
    }
}
