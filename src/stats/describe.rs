use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::data::model::{ColumnRef, Table};
use crate::data::numeric::to_numeric;
use crate::error::DataError;

/// One descriptive statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum StatKind {
    Min,
    Max,
    Mean,
    Median,
    Std,
}

impl StatKind {
    pub const ALL: [StatKind; 5] = [
        StatKind::Min,
        StatKind::Max,
        StatKind::Mean,
        StatKind::Median,
        StatKind::Std,
    ];
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatKind::Min => "min",
            StatKind::Max => "max",
            StatKind::Mean => "mean",
            StatKind::Median => "median",
            StatKind::Std => "std",
        };
        f.write_str(name)
    }
}

/// What a caller may ask the engine for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatRequest {
    Stat(StatKind),
    All,
    Regression,
}

impl FromStr for StatRequest {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min" => Ok(StatRequest::Stat(StatKind::Min)),
            "max" => Ok(StatRequest::Stat(StatKind::Max)),
            "mean" => Ok(StatRequest::Stat(StatKind::Mean)),
            "median" => Ok(StatRequest::Stat(StatKind::Median)),
            "std" => Ok(StatRequest::Stat(StatKind::Std)),
            "all" => Ok(StatRequest::All),
            "regression" => Ok(StatRequest::Regression),
            other => Err(DataError::InvalidSelection(format!(
                "unknown statistic '{other}'"
            ))),
        }
    }
}

/// Flatten requests into the distinct stats they name, in canonical order.
/// `Regression` contributes nothing here.
pub fn expand_requests(requests: &[StatRequest]) -> Vec<StatKind> {
    let mut kinds: Vec<StatKind> = requests
        .iter()
        .flat_map(|r| match r {
            StatRequest::Stat(kind) => vec![*kind],
            StatRequest::All => StatKind::ALL.to_vec(),
            StatRequest::Regression => Vec::new(),
        })
        .collect();
    kinds.sort();
    kinds.dedup();
    kinds
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ColumnStats {
    /// Nothing in the column converted to a number.
    NoNumericData,
    Values(BTreeMap<StatKind, f64>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub stats: ColumnStats,
}

/// Compute the requested stats for each column over its numeric cells.
pub fn describe(
    table: &Table,
    columns: &[ColumnRef],
    kinds: &[StatKind],
) -> Result<Vec<ColumnSummary>, DataError> {
    columns
        .iter()
        .map(|col_ref| {
            let column = table.require(col_ref)?;
            let mut values = to_numeric(column).valid_values();
            let stats = if values.is_empty() {
                log::debug!("Column '{}' has no numeric data", column.name);
                ColumnStats::NoNumericData
            } else {
                ColumnStats::Values(summarize(&mut values, kinds))
            };
            Ok(ColumnSummary {
                column: column.name.clone(),
                stats,
            })
        })
        .collect()
}

/// `values` must be non-empty; it is sorted in place when a median is asked for.
fn summarize(values: &mut [f64], kinds: &[StatKind]) -> BTreeMap<StatKind, f64> {
    let mut out = BTreeMap::new();
    for &kind in kinds {
        let value = match kind {
            StatKind::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            StatKind::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            StatKind::Mean => mean(values),
            StatKind::Median => median(values),
            StatKind::Std => match sample_std(values) {
                Some(s) => s,
                None => continue,
            },
        };
        out.insert(kind, value);
    }
    out
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

/// n − 1 denominator; undefined below two values.
fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}
