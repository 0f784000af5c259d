use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use crate::error::DataError;

use super::model::{CellValue, Column, Table};

/// Tokens read as missing values, on top of the empty string.
const NA_TOKENS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "-nan", "null", "NULL", "None", "#N/A", "<NA>",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a comma-delimited file with a header row into a [`Table`].
///
/// * `NotFound`   – `path` is not a regular file
/// * `Parse`      – the csv reader fails, the header is empty, or a row has
///                  more fields than the header
/// * `EmptyTable` – the header parsed but no data rows follow
///
/// Rows shorter than the header are padded with `Null`.
pub fn load(path: &Path) -> Result<Table, DataError> {
    if !path.is_file() {
        return Err(DataError::NotFound(path.to_path_buf()));
    }
    let file = std::fs::File::open(path).map_err(|e| DataError::parse(path, e))?;
    let table = read_table(file, path)?;
    log::debug!("Loaded {} with shape {:?}", path.display(), table.shape());
    Ok(table)
}

/// Parse delimited text from any reader. `origin` only labels errors.
pub fn read_table<R: Read>(input: R, origin: &Path) -> Result<Table, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let raw_headers: Vec<String> = reader
        .headers()
        .map_err(|e| DataError::parse(origin, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if raw_headers.is_empty() || raw_headers.iter().all(|h| h.trim().is_empty()) {
        return Err(DataError::parse(origin, "no columns to parse from file"));
    }
    let headers = dedupe_headers(&raw_headers);
    let width = headers.len();

    let mut values: Vec<Vec<CellValue>> = vec![Vec::new(); width];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| DataError::parse(origin, format!("row {row_no}: {e}")))?;
        if record.len() > width {
            return Err(DataError::parse(
                origin,
                format!("row {row_no}: expected {width} fields, saw {}", record.len()),
            ));
        }
        for (col_idx, col_values) in values.iter_mut().enumerate() {
            let cell = record.get(col_idx).map_or(CellValue::Null, guess_cell_type);
            col_values.push(cell);
        }
    }

    if values[0].is_empty() {
        return Err(DataError::EmptyTable(origin.to_path_buf()));
    }

    let columns = headers
        .into_iter()
        .zip(values)
        .map(|(name, vals)| Column::new(name, vals))
        .collect();
    Table::new(columns)
}

/// Blank names become `Unnamed: i`; repeated names get `.1`, `.2`, … suffixes.
fn dedupe_headers(raw: &[String]) -> Vec<String> {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    raw.iter()
        .enumerate()
        .map(|(i, h)| {
            let base = if h.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                h.clone()
            };
            let mut name = base.clone();
            let mut n = 1;
            while seen.contains(&name) {
                name = format!("{base}.{n}");
                n += 1;
            }
            seen.insert(name.clone());
            name
        })
        .collect()
}

/// Integer, then float, then bool, else text. NA tokens are `Null`.
pub(crate) fn guess_cell_type(s: &str) -> CellValue {
    let trimmed = s.trim();
    if trimmed.is_empty() || NA_TOKENS.contains(&trimmed) {
        return CellValue::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_nan() {
            return CellValue::Null;
        }
        return CellValue::Float(f);
    }
    if trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("false") {
        return CellValue::Bool(trimmed.eq_ignore_ascii_case("true"));
    }
    CellValue::Text(s.to_string())
}
