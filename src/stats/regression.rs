use std::fmt;

use serde::Serialize;

use crate::data::model::{ColumnRef, Table};
use crate::data::numeric::{aligned_pairs, to_numeric};
use crate::error::DataError;

use super::describe::mean;

/// Slope, intercept and coefficient of determination of a fitted line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
    /// Absent when every y is identical.
    pub r_squared: Option<f64>,
}

/// Why a fit could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unavailable {
    InsufficientPoints { found: usize },
    /// Every x is identical, so no slope exists.
    ConstantX,
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::InsufficientPoints { found } => {
                write!(f, "needs at least 2 paired values, found {found}")
            }
            Unavailable::ConstantX => write!(f, "independent values are all identical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum RegressionOutcome {
    Fit(RegressionResult),
    Unavailable(Unavailable),
}

/// Fit `y = slope * x + intercept` by ordinary least squares.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> RegressionOutcome {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return RegressionOutcome::Unavailable(Unavailable::InsufficientPoints { found: n });
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    if all_equal(xs) {
        return RegressionOutcome::Unavailable(Unavailable::ConstantX);
    }
    let mx = mean(xs);
    let my = mean(ys);
    let sxx: f64 = xs.iter().map(|x| (x - mx).powi(2)).sum();
    let sxy: f64 = xs.iter().zip(ys).map(|(x, y)| (x - mx) * (y - my)).sum();
    let slope = sxy / sxx;
    let intercept = my - slope * mx;
    let line = Polynomial::new(vec![intercept, slope]);

    RegressionOutcome::Fit(RegressionResult {
        slope,
        intercept,
        r_squared: r_squared(xs, ys, &line),
    })
}

/// Regress each `y` column on `x`, using only rows where both are numeric.
pub fn regress(
    table: &Table,
    x: &ColumnRef,
    ys: &[ColumnRef],
) -> Result<Vec<(String, RegressionOutcome)>, DataError> {
    let x_series = to_numeric(table.require(x)?);
    ys.iter()
        .map(|y_ref| {
            let y_col = table.require(y_ref)?;
            let (xs, yv) = aligned_pairs(&x_series, &to_numeric(y_col));
            let outcome = linear_fit(&xs, &yv);
            if let RegressionOutcome::Unavailable(why) = outcome {
                log::info!("Regression for '{}' unavailable: {why}", y_col.name);
            }
            Ok((y_col.name.clone(), outcome))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Polynomials
// ---------------------------------------------------------------------------

/// Coefficients in ascending powers: `c[0] + c[1] x + c[2] x² + …`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polynomial {
    pub coefficients: Vec<f64>,
}

impl Polynomial {
    pub fn new(coefficients: Vec<f64>) -> Self {
        Polynomial { coefficients }
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut terms = Vec::new();
        for (power, c) in self.coefficients.iter().enumerate().rev() {
            let term = match power {
                0 => format!("{c:.4}"),
                1 => format!("{c:.4}x"),
                p => format!("{c:.4}x^{p}"),
            };
            terms.push(term);
        }
        write!(f, "y = {}", terms.join(" + ").replace("+ -", "- "))
    }
}

/// Least-squares polynomial of the given degree.
///
/// Returns `None` with fewer than `degree + 1` distinct x values or when the
/// normal equations are singular.
pub fn polyfit(xs: &[f64], ys: &[f64], degree: usize) -> Option<Polynomial> {
    let n = xs.len().min(ys.len());
    let mut distinct: Vec<f64> = xs[..n].to_vec();
    distinct.sort_by(f64::total_cmp);
    distinct.dedup();
    if distinct.len() <= degree {
        return None;
    }

    // Center and scale x into [-1, 1] for conditioning, then expand back.
    let shift = mean(&xs[..n]);
    let scale = xs[..n]
        .iter()
        .map(|x| (x - shift).abs())
        .fold(0.0, f64::max);
    if scale == 0.0 {
        return None;
    }
    let terms = degree + 1;
    let mut ata = vec![vec![0.0; terms]; terms];
    let mut aty = vec![0.0; terms];
    for (&x, &y) in xs[..n].iter().zip(&ys[..n]) {
        let u = (x - shift) / scale;
        let powers: Vec<f64> = (0..terms).map(|p| u.powi(p as i32)).collect();
        for i in 0..terms {
            aty[i] += powers[i] * y;
            for j in 0..terms {
                ata[i][j] += powers[i] * powers[j];
            }
        }
    }
    let scaled = solve(ata, aty)?;
    let centered: Vec<f64> = scaled
        .iter()
        .enumerate()
        .map(|(p, c)| c / scale.powi(p as i32))
        .collect();
    Some(Polynomial::new(uncenter(&centered, shift)))
}

/// Gaussian elimination with partial pivoting.
///
/// A pivot is treated as zero relative to the largest entry of the matrix.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    let magnitude = a
        .iter()
        .flatten()
        .map(|v| v.abs())
        .fold(0.0, f64::max);
    let tolerance = magnitude * n as f64 * f64::EPSILON;
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() <= tolerance {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}

/// Turn coefficients in `(x - shift)` into coefficients in `x`.
fn uncenter(centered: &[f64], shift: f64) -> Vec<f64> {
    let mut out = vec![0.0; centered.len()];
    for (p, &c) in centered.iter().enumerate() {
        // c (x - s)^p = c Σ_k C(p,k) x^k (-s)^(p-k)
        let mut binom = 1.0;
        for k in 0..=p {
            out[k] += c * binom * (-shift).powi((p - k) as i32);
            binom = binom * (p - k) as f64 / (k + 1) as f64;
        }
    }
    out
}

/// `1 − SS_res / SS_tot`, or `None` when every y is identical.
pub fn r_squared(xs: &[f64], ys: &[f64], model: &Polynomial) -> Option<f64> {
    if ys.is_empty() || all_equal(ys) {
        return None;
    }
    let my = mean(ys);
    let ss_tot: f64 = ys.iter().map(|y| (y - my).powi(2)).sum();
    let ss_res: f64 = xs
        .iter()
        .zip(ys)
        .map(|(&x, &y)| (y - model.evaluate(x)).powi(2))
        .sum();
    Some(1.0 - ss_res / ss_tot)
}

/// Compared directly: a floating-point mean of equal values need not equal them.
fn all_equal(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

// ---------------------------------------------------------------------------
// Trend curves
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FitKind {
    Linear,
    Quadratic,
}

impl FitKind {
    pub fn degree(self) -> usize {
        match self {
            FitKind::Linear => 1,
            FitKind::Quadratic => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveFit {
    pub kind: FitKind,
    pub polynomial: Polynomial,
    pub r_squared: Option<f64>,
}

pub fn fit_curve(xs: &[f64], ys: &[f64], kind: FitKind) -> Option<CurveFit> {
    let polynomial = polyfit(xs, ys, kind.degree())?;
    let r_squared = r_squared(xs, ys, &polynomial);
    Some(CurveFit {
        kind,
        polynomial,
        r_squared,
    })
}

/// `n` evenly spaced points from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}
