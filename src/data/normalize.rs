use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Sibling directory that receives repaired files.
pub const OUTPUT_DIR: &str = "normalized";
/// Appended to the file stem of a repaired file.
pub const OUTPUT_SUFFIX: &str = "_comma";

/// Switches for [`normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    /// Turn literal `\t` pairs into real tabs before splitting.
    pub replace_literal_tabs: bool,
    /// Re-segment rows whose field count disagrees with the header.
    pub group_by_header: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            replace_literal_tabs: true,
            group_by_header: true,
        }
    }
}

/// `<parent>/normalized/<stem>_comma<.ext>`.
pub fn repaired_path(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{stem}{OUTPUT_SUFFIX}");
    if let Some(ext) = path.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    parent.join(OUTPUT_DIR).join(name)
}

/// Rewrite `path` as a strictly comma-delimited file at [`repaired_path`].
///
/// The source is never modified. Fails with `Repair` when any written row
/// still disagrees with the header's field count.
pub fn normalize(path: &Path, options: &NormalizeOptions) -> Result<PathBuf, DataError> {
    if !path.is_file() {
        return Err(DataError::NotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(|e| DataError::parse(path, e))?;
    let mut text = String::from_utf8_lossy(&bytes).into_owned();
    if options.replace_literal_tabs {
        text = text.replace("\\t", "\t");
    }

    let rows = split_rows(&text, options.group_by_header);
    if rows.is_empty() {
        return Err(DataError::repair(path, "file has no content"));
    }

    let out = repaired_path(path);
    write_rows(&out, &rows).map_err(|e| DataError::repair(path, e))?;
    verify_rectangular(&out)?;

    log::info!(
        "Normalized {} into {} ({} rows, {} columns)",
        path.display(),
        out.display(),
        rows.len() - 1,
        rows[0].len()
    );
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tokenizing
// ---------------------------------------------------------------------------

/// Split every non-blank line; the first line is the header.
fn split_rows(text: &str, group_by_header: bool) -> Vec<Vec<String>> {
    let mut lines = text
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let delimiter = Delimiter::sniff(header_line);
    let header = delimiter.split(header_line);
    let width = header.len();

    let mut rows = vec![header];
    for (row_no, line) in lines.enumerate() {
        let mut fields = delimiter.split(line);
        if fields.len() != width && group_by_header {
            log::debug!(
                "Row {row_no}: {} fields against {width} header fields, regrouping",
                fields.len()
            );
            fields = regroup(line, fields, width);
        }
        rows.push(fields);
    }
    rows
}

/// Field separator, chosen once from the header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Tab,
    Comma,
    Whitespace,
}

impl Delimiter {
    /// Tab wins over comma, comma over bare whitespace. A header with no
    /// separator at all is a one-column comma file.
    fn sniff(header: &str) -> Self {
        if header.contains('\t') {
            Delimiter::Tab
        } else if header.contains(',') || !header.trim().contains(char::is_whitespace) {
            Delimiter::Comma
        } else {
            Delimiter::Whitespace
        }
    }

    /// Tab and comma rows go through a quote-aware reader so that a
    /// comma-decimal number in a tab-separated row stays one field.
    fn split(self, line: &str) -> Vec<String> {
        match self {
            Delimiter::Tab => split_delimited(line, b'\t'),
            Delimiter::Comma => split_delimited(line, b','),
            Delimiter::Whitespace => split_whitespace(line),
        }
    }
}

fn split_delimited(line: &str, delimiter: u8) -> Vec<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(line.as_bytes());

    match reader.records().next() {
        Some(Ok(record)) => record.iter().map(str::to_string).collect(),
        _ => line
            .split(char::from(delimiter))
            .map(str::to_string)
            .collect(),
    }
}

fn split_whitespace(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

/// Bring a row to `width` fields if the ambiguity allows it.
///
/// A whitespace re-split that matches the header wins. Otherwise surplus
/// trailing fields are folded into the last column. Short rows stay short
/// and fail verification.
fn regroup(line: &str, fields: Vec<String>, width: usize) -> Vec<String> {
    let tokens = split_whitespace(line);
    if tokens.len() == width {
        return tokens;
    }
    let surplus = if fields.len() > width {
        fields
    } else if tokens.len() > width {
        tokens
    } else {
        return fields;
    };
    merge_tail(surplus, width)
}

fn merge_tail(mut fields: Vec<String>, width: usize) -> Vec<String> {
    if width == 0 || fields.len() <= width {
        return fields;
    }
    let tail: Vec<String> = fields
        .split_off(width - 1)
        .into_iter()
        .filter(|f| !f.trim().is_empty())
        .collect();
    fields.push(tail.join(" "));
    fields
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn write_rows(out: &Path, rows: &[Vec<String>]) -> anyhow::Result<()> {
    if let Some(dir) = out.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(out)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Re-read the written file and require every row to match the header width.
fn verify_rectangular(out: &Path) -> Result<(), DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(out)
        .map_err(|e| DataError::repair(out, e))?;

    let mut width = None;
    for (line_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| DataError::repair(out, e))?;
        match width {
            None => width = Some(record.len()),
            Some(w) if w != record.len() => {
                return Err(DataError::repair(
                    out,
                    format!(
                        "line {}: {} fields, header has {w}",
                        line_no + 1,
                        record.len()
                    ),
                ));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader;
    use crate::data::model::CellValue;

    fn write(dir: &tempfile::TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn repaired_path_is_deterministic() {
        assert_eq!(
            repaired_path(Path::new("data/run.csv")),
            PathBuf::from("data/normalized/run_comma.csv")
        );
        assert_eq!(
            repaired_path(Path::new("data/run")),
            PathBuf::from("data/normalized/run_comma")
        );
    }

    #[test]
    fn tab_separated_file_becomes_comma_separated() {
        let dir = tempfile::tempdir().unwrap();
        let src = write(&dir, "tsv.csv", "time\ttemp\n0\t20.5\n1\t21.0\n");
        let out = normalize(&src, &NormalizeOptions::default()).unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "time,temp\n0,20.5\n1,21.0\n");
        // Source untouched.
        assert!(std::fs::read_to_string(&src).unwrap().contains('\t'));
    }

    #[test]
    fn literal_tabs_are_replaced_and_rows_regrouped() {
        let dir = tempfile::tempdir().unwrap();
        let src = write(&dir, "esc.csv", "a\\tb\\tc\n1\\t2\\t3\n4\\t5\\t6\\t\n7 8\\t9\n");
        let out = normalize(&src, &NormalizeOptions::default()).unwrap();
        let table = loader::load(&out).unwrap();
        assert_eq!(table.column_names(), vec!["a", "b", "c"]);
        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.row(2).unwrap()[1], &CellValue::Integer(8));
    }

    #[test]
    fn comma_decimals_in_tab_rows_stay_one_field() {
        let dir = tempfile::tempdir().unwrap();
        let src = write(&dir, "dec.csv", "x\ty\n1,5\t2\n");
        let out = normalize(&src, &NormalizeOptions::default()).unwrap();
        let table = loader::load(&out).unwrap();
        assert_eq!(table.shape(), (1, 2));
        assert_eq!(table.row(0).unwrap()[0], &CellValue::Text("1,5".into()));
    }

    #[test]
    fn tab_inside_comma_cell_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let src = write(&dir, "cell_tab.csv", "a,b\n1,x\ty\n2,z\n");
        let out = normalize(&src, &NormalizeOptions::default()).unwrap();
        assert_eq!(loader::load(&out).unwrap(), loader::load(&src).unwrap());
        assert_eq!(
            loader::load(&out).unwrap().row(0).unwrap()[1],
            &CellValue::Text("x\ty".into())
        );
    }

    #[test]
    fn delimiter_follows_header() {
        assert_eq!(Delimiter::sniff("a\tb"), Delimiter::Tab);
        assert_eq!(Delimiter::sniff("a,b"), Delimiter::Comma);
        assert_eq!(Delimiter::sniff("a b"), Delimiter::Whitespace);
        assert_eq!(Delimiter::sniff("name"), Delimiter::Comma);
        assert_eq!(Delimiter::Comma.split("1,x\ty"), vec!["1", "x\ty"]);
    }

    #[test]
    fn surplus_fields_merge_into_last_column() {
        let dir = tempfile::tempdir().unwrap();
        let src = write(&dir, "notes.csv", "id\tnote\n1\tgood\trun\textra\n");
        let out = normalize(&src, &NormalizeOptions::default()).unwrap();
        let table = loader::load(&out).unwrap();
        assert_eq!(
            table.row(0).unwrap()[1],
            &CellValue::Text("good run extra".into())
        );
    }

    #[test]
    fn mismatch_without_grouping_is_repair_error() {
        let dir = tempfile::tempdir().unwrap();
        let src = write(&dir, "ragged.csv", "a\tb\n1\t2\t3\n");
        let options = NormalizeOptions {
            replace_literal_tabs: true,
            group_by_header: false,
        };
        let err = normalize(&src, &options).unwrap_err();
        assert!(matches!(err, DataError::Repair { .. }));
    }

    #[test]
    fn short_rows_are_repair_errors() {
        let dir = tempfile::tempdir().unwrap();
        let src = write(&dir, "short.csv", "a\tb\tc\n1\t2\n");
        let err = normalize(&src, &NormalizeOptions::default()).unwrap_err();
        assert!(matches!(err, DataError::Repair { .. }));
    }

    #[test]
    fn canonical_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let src = write(&dir, "ok.csv", "a,b,label\n1,2.5,\"x, y\"\n3,,z\n");
        let out = normalize(&src, &NormalizeOptions::default()).unwrap();
        assert_eq!(loader::load(&out).unwrap(), loader::load(&src).unwrap());
    }

    #[test]
    fn empty_file_cannot_be_repaired() {
        let dir = tempfile::tempdir().unwrap();
        let src = write(&dir, "empty.csv", "\n\n");
        assert!(matches!(
            normalize(&src, &NormalizeOptions::default()).unwrap_err(),
            DataError::Repair { .. }
        ));
        assert!(matches!(
            normalize(&dir.path().join("missing.csv"), &NormalizeOptions::default()).unwrap_err(),
            DataError::NotFound(_)
        ));
    }
}
