use std::path::{Path, PathBuf};

use crate::error::DataError;

use super::detect::{inspect, Signature, Verdict};
use super::loader::load;
use super::model::Table;
use super::normalize::{normalize, NormalizeOptions};

/// A loaded table and how it was obtained.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub table: Table,
    /// The file the caller asked for.
    pub source: PathBuf,
    /// The file the table was read from: `source`, or its repaired copy.
    pub loaded_from: PathBuf,
    /// Why a repair ran, if it did.
    pub repair: Option<Signature>,
}

/// Load `path`, repairing it first when it looks malformed.
///
/// A missing file is returned as `NotFound` without attempting repair.
/// After a repair the expected output must exist and load cleanly.
pub fn load_with_repair(path: &Path, options: &NormalizeOptions) -> Result<Ingested, DataError> {
    let first = match load(path) {
        Err(DataError::NotFound(p)) => return Err(DataError::NotFound(p)),
        other => other,
    };

    let signature = match inspect(path, &first) {
        Verdict::Clean => {
            // `inspect` only reports Clean for a successful load.
            let table = first?;
            return Ok(Ingested {
                table,
                source: path.to_path_buf(),
                loaded_from: path.to_path_buf(),
                repair: None,
            });
        }
        Verdict::Malformed(sig) => sig,
    };

    log::warn!("{} looks malformed ({signature}), repairing", path.display());
    let repaired = normalize(path, options)?;
    if !repaired.is_file() {
        return Err(DataError::repair(
            path,
            format!("expected output {} was not written", repaired.display()),
        ));
    }
    let table = load(&repaired)?;

    Ok(Ingested {
        table,
        source: path.to_path_buf(),
        loaded_from: repaired,
        repair: Some(signature),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_file_loads_directly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.csv");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();
        let got = load_with_repair(&path, &NormalizeOptions::default()).unwrap();
        assert_eq!(got.repair, None);
        assert_eq!(got.loaded_from, path);
    }

    #[test]
    fn tab_file_is_repaired_and_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tsv.csv");
        std::fs::write(&path, "a\tb\n1\t2\n").unwrap();
        let got = load_with_repair(&path, &NormalizeOptions::default()).unwrap();
        assert_eq!(got.repair, Some(Signature::SingleColumnWhitespace));
        assert_eq!(got.table.shape(), (1, 2));
        assert!(got.loaded_from.ends_with("normalized/tsv_comma.csv"));
    }

    #[test]
    fn missing_file_skips_repair() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_with_repair(&dir.path().join("x.csv"), &NormalizeOptions::default())
            .unwrap_err();
        assert!(matches!(err, DataError::NotFound(_)));
        assert!(!dir.path().join("normalized").exists());
    }
}
