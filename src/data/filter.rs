use std::fmt;
use std::str::FromStr;

use crate::error::DataError;

use super::model::{ColumnRef, Table};
use super::numeric::to_numeric;

// ---------------------------------------------------------------------------
// Filter predicate: column, comparison, numeric literal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
}

impl Operator {
    pub fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Operator::Gt => lhs > rhs,
            Operator::Lt => lhs < rhs,
            Operator::Ge => lhs >= rhs,
            Operator::Le => lhs <= rhs,
            Operator::Eq => lhs == rhs,
            Operator::Ne => lhs != rhs,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Eq => "==",
            Operator::Ne => "!=",
        }
    }
}

impl FromStr for Operator {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            ">" => Ok(Operator::Gt),
            "<" => Ok(Operator::Lt),
            ">=" => Ok(Operator::Ge),
            "<=" => Ok(Operator::Le),
            "==" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Ne),
            other => Err(DataError::InvalidSelection(format!(
                "unknown operator '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// `column <op> literal`.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: ColumnRef,
    pub op: Operator,
    pub literal: f64,
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.column, self.op, self.literal)
    }
}

/// Per-row match flags. Missing cells never match, whatever the operator.
pub fn mask(table: &Table, predicate: &Predicate) -> Result<Vec<bool>, DataError> {
    let series = to_numeric(table.require(&predicate.column)?);
    Ok(series
        .values
        .iter()
        .map(|v| v.is_some_and(|v| predicate.op.apply(v, predicate.literal)))
        .collect())
}

/// Return a new table holding only the matching rows, renumbered from zero.
pub fn filter(table: &Table, predicate: &Predicate) -> Result<Table, DataError> {
    let rows: Vec<usize> = mask(table, predicate)?
        .into_iter()
        .enumerate()
        .filter(|(_, keep)| *keep)
        .map(|(i, _)| i)
        .collect();
    log::debug!(
        "Filter {predicate} kept {} of {} rows",
        rows.len(),
        table.n_rows()
    );
    Ok(table.take_rows(&rows))
}
