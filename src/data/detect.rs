use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::DataError;

use super::model::{CellValue, Table};

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").expect("static regex")
});

/// Which malformation signature fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Signature {
    /// The loader returned an error.
    LoadFailed,
    /// The raw text holds a backslash followed by `t`.
    LiteralEscapedTab,
    /// One column whose first value contains whitespace: a tab or space
    /// separated file read as comma separated.
    SingleColumnWhitespace,
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Signature::LoadFailed => "file could not be loaded",
            Signature::LiteralEscapedTab => "literal \\t sequences in file",
            Signature::SingleColumnWhitespace => "single column with embedded whitespace",
        };
        f.write_str(text)
    }
}

/// Outcome of a single inspection. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Clean,
    Malformed(Signature),
}

impl Verdict {
    pub fn is_malformed(&self) -> bool {
        matches!(self, Verdict::Malformed(_))
    }

    pub fn signature(&self) -> Option<Signature> {
        match self {
            Verdict::Clean => None,
            Verdict::Malformed(sig) => Some(*sig),
        }
    }
}

/// Decide whether the file at `path` needs repair, given what loading it produced.
///
/// Checks run in order and the first hit wins: failed load, literal `\t`
/// in the raw text, then a one-column table whose first value has a
/// whitespace run. Only the first row is sampled.
pub fn inspect(path: &Path, loaded: &Result<Table, DataError>) -> Verdict {
    let table = match loaded {
        Ok(table) => table,
        Err(e) => {
            log::debug!("{} failed to load: {e}", path.display());
            return Verdict::Malformed(Signature::LoadFailed);
        }
    };

    let raw = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Could not re-read {} for inspection: {e}", path.display());
            return Verdict::Malformed(Signature::LoadFailed);
        }
    };
    if has_literal_tab(&String::from_utf8_lossy(&raw)) {
        return Verdict::Malformed(Signature::LiteralEscapedTab);
    }

    if looks_single_column_misparse(table) {
        return Verdict::Malformed(Signature::SingleColumnWhitespace);
    }

    Verdict::Clean
}

fn has_literal_tab(text: &str) -> bool {
    text.contains("\\t")
}

fn looks_single_column_misparse(table: &Table) -> bool {
    if table.n_cols() != 1 {
        return false;
    }
    match table.columns()[0].values.first() {
        Some(CellValue::Text(s)) => WHITESPACE_RUN.is_match(s),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader;

    fn write(dir: &tempfile::TempDir, name: &str, text: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    fn verdict_for(path: &Path) -> Verdict {
        inspect(path, &loader::load(path))
    }

    #[test]
    fn clean_comma_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "ok.csv", "a,b\n1,2\n3,4\n");
        assert_eq!(verdict_for(&path), Verdict::Clean);
    }

    #[test]
    fn load_failure_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "bad.csv", "a,b\n1,2,3\n");
        assert_eq!(verdict_for(&path), Verdict::Malformed(Signature::LoadFailed));
    }

    #[test]
    fn literal_escaped_tab_is_flagged_even_when_load_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "esc.csv", "a,b\n1,x\\ty\n");
        assert!(loader::load(&path).is_ok());
        assert_eq!(verdict_for(&path), Verdict::Malformed(Signature::LiteralEscapedTab));
    }

    #[test]
    fn real_tab_bytes_in_multi_column_file_are_not_escaped_tabs() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "tabs.csv", "a,b\n1,x\ty\n");
        assert_eq!(verdict_for(&path), Verdict::Clean);
    }

    #[test]
    fn tab_separated_file_reads_as_single_whitespace_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "tsv.csv", "time\ttemp\n0\t20.5\n1\t21.0\n");
        assert_eq!(
            verdict_for(&path),
            Verdict::Malformed(Signature::SingleColumnWhitespace)
        );
    }

    #[test]
    fn space_separated_first_value_is_flagged() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "spaces.csv", "x y\n1 2\n");
        let table = loader::load(&path).unwrap();
        assert_eq!(table.n_cols(), 1);
        assert_eq!(
            verdict_for(&path),
            Verdict::Malformed(Signature::SingleColumnWhitespace)
        );
    }

    #[test]
    fn single_column_without_whitespace_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "one.csv", "name\nalpha\nbeta gamma\n");
        // Only the first row is sampled.
        assert_eq!(verdict_for(&path), Verdict::Clean);
    }

    #[test]
    fn single_numeric_column_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "nums.csv", "x\n1\n2\n");
        assert_eq!(verdict_for(&path), Verdict::Clean);
    }
}
