use std::path::{Path, PathBuf};

use crate::data::model::{ColumnRef, Table};
use crate::error::DataError;
use crate::stats::StatRequest;

// ---------------------------------------------------------------------------
// Shell input: everything here fails with `InvalidSelection` so the shell
// can re-prompt.
// ---------------------------------------------------------------------------

/// `.csv` files (any case) directly inside `folder`, sorted by name.
pub fn list_csv_files(folder: &Path) -> Result<Vec<PathBuf>, DataError> {
    if !folder.is_dir() {
        return Err(DataError::NotFound(folder.to_path_buf()));
    }
    let entries = std::fs::read_dir(folder).map_err(|e| DataError::parse(folder, e))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(DataError::InvalidSelection(format!(
            "no CSV files found in {}",
            folder.display()
        )));
    }
    Ok(files)
}

/// A menu number in `0..len`.
pub fn parse_choice(input: &str, len: usize) -> Result<usize, DataError> {
    let idx: usize = input
        .trim()
        .parse()
        .map_err(|_| DataError::InvalidSelection(format!("'{}' is not a number", input.trim())))?;
    if idx >= len {
        return Err(DataError::InvalidSelection(format!(
            "please enter a number between 0 and {}",
            len.saturating_sub(1)
        )));
    }
    Ok(idx)
}

/// A column index or an exact column name, checked against `table`.
pub fn parse_column(input: &str, table: &Table) -> Result<ColumnRef, DataError> {
    let input = input.trim();
    let col = match input.parse::<usize>() {
        Ok(idx) => ColumnRef::Index(idx),
        Err(_) => ColumnRef::Name(input.to_string()),
    };
    // A numeric-looking header name wins over an out-of-range index.
    if table.resolve(&col).is_none() {
        let by_name = ColumnRef::Name(input.to_string());
        if table.resolve(&by_name).is_some() {
            return Ok(by_name);
        }
        return Err(DataError::InvalidSelection(format!("no column {col}")));
    }
    Ok(col)
}

/// Comma or whitespace separated columns.
pub fn parse_columns(input: &str, table: &Table) -> Result<Vec<ColumnRef>, DataError> {
    let cols: Vec<ColumnRef> = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| parse_column(s, table))
        .collect::<Result<_, _>>()?;
    if cols.is_empty() {
        return Err(DataError::InvalidSelection("no columns given".into()));
    }
    Ok(cols)
}

/// A finite number for a filter predicate.
pub fn parse_literal(input: &str) -> Result<f64, DataError> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DataError::InvalidSelection(format!("'{}' is not a number", input.trim())))
}

/// Comma or whitespace separated stat names.
pub fn parse_stat_requests(input: &str) -> Result<Vec<StatRequest>, DataError> {
    let reqs: Vec<StatRequest> = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()?;
    if reqs.is_empty() {
        return Err(DataError::InvalidSelection("no statistics given".into()));
    }
    Ok(reqs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column};

    fn table() -> Table {
        Table::new(vec![
            Column::new("time", vec![CellValue::Integer(0)]),
            Column::new("temp", vec![CellValue::Float(20.5)]),
            Column::new("2024", vec![CellValue::Integer(1)]),
        ])
        .unwrap()
    }

    #[test]
    fn lists_csv_files_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.CSV", "a.csv", "notes.txt"] {
            std::fs::write(dir.path().join(name), "x\n1\n").unwrap();
        }
        let files = list_csv_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.CSV"]);
    }

    #[test]
    fn folder_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            list_csv_files(dir.path()).unwrap_err(),
            DataError::InvalidSelection(_)
        ));
        assert!(matches!(
            list_csv_files(&dir.path().join("missing")).unwrap_err(),
            DataError::NotFound(_)
        ));
    }

    #[test]
    fn choices_are_range_checked() {
        assert_eq!(parse_choice(" 1 ", 3).unwrap(), 1);
        assert!(parse_choice("3", 3).is_err());
        assert!(parse_choice("one", 3).is_err());
    }

    #[test]
    fn columns_by_index_or_name() {
        let t = table();
        assert_eq!(parse_column("1", &t).unwrap(), ColumnRef::Index(1));
        assert_eq!(parse_column("temp", &t).unwrap(), ColumnRef::Name("temp".into()));
        assert_eq!(parse_column("2024", &t).unwrap(), ColumnRef::Name("2024".into()));
        assert!(matches!(
            parse_column("7", &t).unwrap_err(),
            DataError::InvalidSelection(_)
        ));
        assert_eq!(parse_columns("0, temp", &t).unwrap().len(), 2);
        assert!(parse_columns(" , ", &t).is_err());
    }

    #[test]
    fn literals_and_stats() {
        assert_eq!(parse_literal(" -2.5 ").unwrap(), -2.5);
        assert!(parse_literal("abc").is_err());
        assert!(parse_literal("inf").is_err());
        assert_eq!(parse_stat_requests("mean, std").unwrap().len(), 2);
        assert!(parse_stat_requests("mean, mode").is_err());
    }
}
