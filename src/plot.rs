use serde::Serialize;

use crate::color::{generate_palette, Rgb, TREND_COLOR};
use crate::data::model::{ColumnRef, Table};
use crate::data::numeric::{aligned_pairs, to_numeric};
use crate::error::DataError;
use crate::stats::counts::value_counts;
use crate::stats::regression::{fit_curve, linspace, FitKind};

// ---------------------------------------------------------------------------
// Plot-ready data handed to the external renderer
// ---------------------------------------------------------------------------

/// A fitted curve sampled over the observed x range, with its annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendCurve {
    pub kind: FitKind,
    pub points: Vec<[f64; 2]>,
    /// Ascending powers of x.
    pub coefficients: Vec<f64>,
    pub r_squared: Option<f64>,
    pub annotation: String,
    pub color: Rgb,
}

/// One dependent column against the shared independent column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPlot {
    pub label: String,
    pub points: Vec<[f64; 2]>,
    pub color: Rgb,
    pub trend: Option<TrendCurve>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotData {
    pub x_label: String,
    pub series: Vec<SeriesPlot>,
}

/// Value-count bars of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramPlot {
    pub column: String,
    /// `[value, count]`, ascending by value.
    pub bars: Vec<[f64; 2]>,
    pub total: usize,
    pub trend: Option<TrendCurve>,
}

/// Scatter series of every `y` against `x`, optionally with a trend curve each.
///
/// Rows missing either coordinate are dropped per series. A series with too
/// few points for the fit keeps its points and gets no curve.
pub fn prepare_scatter(
    table: &Table,
    x: &ColumnRef,
    ys: &[ColumnRef],
    trend: Option<FitKind>,
    grid_points: usize,
) -> Result<PlotData, DataError> {
    let x_col = table.require(x)?;
    let x_series = to_numeric(x_col);
    let palette = generate_palette(ys.len());

    let series = ys
        .iter()
        .zip(palette)
        .map(|(y_ref, color)| {
            let y_col = table.require(y_ref)?;
            let (xs, yv) = aligned_pairs(&x_series, &to_numeric(y_col));
            let trend = trend.and_then(|kind| trend_curve(&xs, &yv, kind, grid_points));
            Ok(SeriesPlot {
                label: y_col.name.clone(),
                points: xs.iter().zip(&yv).map(|(&a, &b)| [a, b]).collect(),
                color,
                trend,
            })
        })
        .collect::<Result<Vec<_>, DataError>>()?;

    Ok(PlotData {
        x_label: x_col.name.clone(),
        series,
    })
}

/// Value counts of `column`, optionally with a trend through the bar tops.
pub fn prepare_histogram(
    table: &Table,
    column: &ColumnRef,
    trend: Option<FitKind>,
    grid_points: usize,
) -> Result<HistogramPlot, DataError> {
    let col = table.require(column)?;
    let series = to_numeric(col);
    let counts = value_counts(&series);

    let xs: Vec<f64> = counts.iter().map(|(v, _)| *v).collect();
    let ys: Vec<f64> = counts.iter().map(|(_, n)| *n as f64).collect();
    let trend = trend.and_then(|kind| trend_curve(&xs, &ys, kind, grid_points));

    Ok(HistogramPlot {
        column: col.name.clone(),
        bars: xs.iter().zip(&ys).map(|(&v, &n)| [v, n]).collect(),
        total: series.valid_count(),
        trend,
    })
}

fn trend_curve(xs: &[f64], ys: &[f64], kind: FitKind, grid_points: usize) -> Option<TrendCurve> {
    let curve = fit_curve(xs, ys, kind)?;
    let lo = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let points = linspace(lo, hi, grid_points)
        .into_iter()
        .map(|x| [x, curve.polynomial.evaluate(x)])
        .collect();
    let r2 = curve
        .r_squared
        .map_or_else(|| "n/a".to_string(), |r| format!("{r:.4}"));

    Some(TrendCurve {
        kind,
        points,
        annotation: format!("{}, R² = {r2}", curve.polynomial),
        coefficients: curve.polynomial.coefficients,
        r_squared: curve.r_squared,
        color: TREND_COLOR,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column};

    fn table() -> Table {
        let x: Vec<CellValue> = (0..5).map(CellValue::Integer).collect();
        let y: Vec<CellValue> = (0..5).map(|i| CellValue::Integer(3 * i + 2)).collect();
        let mut z: Vec<CellValue> = vec![CellValue::Null; 5];
        z[2] = CellValue::Float(1.0);
        Table::new(vec![
            Column::new("x", x),
            Column::new("y", y),
            Column::new("z", z),
        ])
        .unwrap()
    }

    #[test]
    fn scatter_with_linear_trend() {
        let plot =
            prepare_scatter(&table(), &"x".into(), &["y".into()], Some(FitKind::Linear), 200)
                .unwrap();
        assert_eq!(plot.x_label, "x");
        let s = &plot.series[0];
        assert_eq!(s.points.len(), 5);
        let trend = s.trend.as_ref().unwrap();
        assert_eq!(trend.points.len(), 200);
        assert_eq!(trend.points[0][0], 0.0);
        assert!((trend.points[199][0] - 4.0).abs() < 1e-12);
        assert!((trend.coefficients[1] - 3.0).abs() < 1e-9);
        assert!(trend.annotation.contains("R² = 1.0000"));
    }

    #[test]
    fn sparse_series_keeps_points_without_trend() {
        let plot = prepare_scatter(
            &table(),
            &"x".into(),
            &["y".into(), "z".into()],
            Some(FitKind::Linear),
            50,
        )
        .unwrap();
        assert_eq!(plot.series[1].points, vec![[2.0, 1.0]]);
        assert!(plot.series[1].trend.is_none());
        assert_ne!(plot.series[0].color, plot.series[1].color);
    }

    #[test]
    fn histogram_counts_and_trend() {
        let v: Vec<CellValue> = [1, 2, 2, 3, 3, 3, 4, 4, 5]
            .iter()
            .map(|&i| CellValue::Integer(i))
            .collect();
        let t = Table::new(vec![Column::new("v", v)]).unwrap();
        let h = prepare_histogram(&t, &0usize.into(), Some(FitKind::Quadratic), 200).unwrap();
        assert_eq!(h.total, 9);
        assert_eq!(h.bars[2], [3.0, 3.0]);
        assert_eq!(h.trend.unwrap().coefficients.len(), 3);
    }
}
