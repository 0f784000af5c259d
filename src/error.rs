use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the ingestion and analysis engine.
///
/// Numeric coercion never fails, and per-column "no data" / "unavailable"
/// conditions are reported as values, so nothing here is raised for a
/// single bad cell.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("could not parse {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("{} contains no data rows", .0.display())]
    EmptyTable(PathBuf),

    #[error("repair of {} failed: {reason}", .path.display())]
    Repair { path: PathBuf, reason: String },

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("column '{column}' has {len} values, expected {expected}")]
    Ragged {
        column: String,
        len: usize,
        expected: usize,
    },

    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
}

impl DataError {
    pub(crate) fn parse(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        DataError::Parse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn repair(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        DataError::Repair {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
