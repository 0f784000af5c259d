use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Settings;
use crate::data::detect::Signature;
use crate::data::filter::{filter, Predicate};
use crate::data::ingest::{load_with_repair, Ingested};
use crate::data::model::{ColumnRef, Table};
use crate::plot::{prepare_histogram, prepare_scatter, HistogramPlot, PlotData};
use crate::stats::describe::expand_requests;
use crate::stats::{describe, regress, ColumnSummary, FitKind, RegressionOutcome, StatRequest};

// ---------------------------------------------------------------------------
// Analysis session
// ---------------------------------------------------------------------------

/// The analysis state the shell drives, independent of any console I/O.
pub struct Session {
    /// How the data was loaded.
    pub ingested: Ingested,

    /// Active row filter, if any.
    pub filter: Option<Predicate>,

    /// Rows passing `filter` (cached); `None` without a filter.
    pub filtered: Option<Table>,

    pub settings: Settings,
}

impl Session {
    /// Load (and if needed repair) `path`.
    pub fn open(path: &Path, settings: Settings) -> Result<Self> {
        let ingested = load_with_repair(path, &settings.normalize)
            .with_context(|| format!("loading {}", path.display()))?;
        log::info!(
            "Loaded {} rows with columns {:?}",
            ingested.table.n_rows(),
            ingested.table.column_names()
        );
        Ok(Self {
            ingested,
            filter: None,
            filtered: None,
            settings,
        })
    }

    pub fn table(&self) -> &Table {
        &self.ingested.table
    }

    pub fn repair(&self) -> Option<Signature> {
        self.ingested.repair
    }

    /// The filtered view when a filter is set, the full table otherwise.
    pub fn active(&self) -> &Table {
        self.filtered.as_ref().unwrap_or(&self.ingested.table)
    }

    /// Replace the active filter. Filters always apply to the full table.
    pub fn apply_filter(&mut self, predicate: Predicate) -> Result<&Table> {
        let rows = filter(&self.ingested.table, &predicate)
            .with_context(|| format!("applying filter {predicate}"))?;
        log::info!("Filter {predicate}: {} rows remain", rows.n_rows());
        self.filter = Some(predicate);
        let rows: &Table = self.filtered.insert(rows);
        Ok(rows)
    }

    pub fn clear_filter(&mut self) {
        self.filter = None;
        self.filtered = None;
    }

    pub fn describe(
        &self,
        columns: &[ColumnRef],
        requests: &[StatRequest],
    ) -> Result<Vec<ColumnSummary>> {
        Ok(describe(self.active(), columns, &expand_requests(requests))?)
    }

    pub fn regress(
        &self,
        x: &ColumnRef,
        ys: &[ColumnRef],
    ) -> Result<Vec<(String, RegressionOutcome)>> {
        Ok(regress(self.active(), x, ys)?)
    }

    pub fn scatter(&self, x: &ColumnRef, ys: &[ColumnRef], trend: Option<FitKind>) -> Result<PlotData> {
        Ok(prepare_scatter(
            self.active(),
            x,
            ys,
            trend,
            self.settings.fit_grid_points,
        )?)
    }

    pub fn histogram(&self, column: &ColumnRef, trend: Option<FitKind>) -> Result<HistogramPlot> {
        Ok(prepare_histogram(
            self.active(),
            column,
            trend,
            self.settings.fit_grid_points,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::Operator;

    fn open(text: &str) -> (tempfile::TempDir, Session) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.csv");
        std::fs::write(&path, text).unwrap();
        let session = Session::open(&path, Settings::default()).unwrap();
        (dir, session)
    }

    #[test]
    fn filter_narrows_then_clears() {
        let (_dir, mut s) = open("v,w\n1,2\n2,4\n3,6\n4,8\n5,10\n");
        let kept = s
            .apply_filter(Predicate {
                column: "v".into(),
                op: Operator::Gt,
                literal: 3.0,
            })
            .unwrap()
            .n_rows();
        assert_eq!(kept, 2);
        assert_eq!(s.active().n_rows(), 2);
        assert_eq!(s.table().n_rows(), 5);

        s.clear_filter();
        assert_eq!(s.active().n_rows(), 5);
    }

    #[test]
    fn stats_follow_the_active_view() {
        let (_dir, mut s) = open("v,w\n1,2\n2,4\n3,6\n4,8\n5,10\n");
        s.apply_filter(Predicate {
            column: ColumnRef::Index(0),
            op: Operator::Le,
            literal: 2.0,
        })
        .unwrap();
        let out = s
            .describe(&["w".into()], &[StatRequest::All, StatRequest::Regression])
            .unwrap();
        let crate::stats::ColumnStats::Values(v) = &out[0].stats else {
            panic!("expected values");
        };
        assert_eq!(v[&crate::stats::StatKind::Mean], 3.0);

        let fits = s.regress(&"v".into(), &["w".into()]).unwrap();
        let RegressionOutcome::Fit(r) = fits[0].1 else {
            panic!("expected a fit");
        };
        assert!((r.slope - 2.0).abs() < 1e-12);
    }

    #[test]
    fn open_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Session::open(&dir.path().join("none.csv"), Settings::default())
            .err()
            .unwrap();
        assert!(matches!(
            err.downcast_ref::<crate::error::DataError>(),
            Some(crate::error::DataError::NotFound(_))
        ));
    }
}
