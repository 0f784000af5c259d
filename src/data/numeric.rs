use super::model::{CellValue, Column};

/// A column coerced to `f64`; `None` marks a missing or non-numeric cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NumericSeries {
    pub values: Vec<Option<f64>>,
}

impl NumericSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<f64> {
        self.values.get(i).copied().flatten()
    }

    /// `true` where the cell converted.
    pub fn mask(&self) -> Vec<bool> {
        self.values.iter().map(Option::is_some).collect()
    }

    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn valid_values(&self) -> Vec<f64> {
        self.values.iter().flatten().copied().collect()
    }
}

/// Coerce every cell of `column`. Never fails: bad cells become missing.
pub fn to_numeric(column: &Column) -> NumericSeries {
    NumericSeries {
        values: column.values.iter().map(coerce).collect(),
    }
}

fn coerce(value: &CellValue) -> Option<f64> {
    let v = match value {
        CellValue::Integer(i) => *i as f64,
        CellValue::Float(f) => *f,
        CellValue::Bool(b) => f64::from(u8::from(*b)),
        CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
        CellValue::Null => return None,
    };
    (!v.is_nan()).then_some(v)
}

/// Rows where both series hold a value, as two aligned vectors.
pub fn aligned_pairs(x: &NumericSeries, y: &NumericSeries) -> (Vec<f64>, Vec<f64>) {
    x.values
        .iter()
        .zip(&y.values)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(values: Vec<CellValue>) -> Column {
        Column::new("c", values)
    }

    #[test]
    fn mixed_column_degrades_to_missing() {
        let col = column(vec![
            CellValue::Integer(1),
            CellValue::Text("abc".into()),
            CellValue::Float(2.5),
            CellValue::Null,
            CellValue::Text(" 4 ".into()),
            CellValue::Bool(true),
        ]);
        let series = to_numeric(&col);
        assert_eq!(
            series.values,
            vec![Some(1.0), None, Some(2.5), None, Some(4.0), Some(1.0)]
        );
        assert_eq!(series.mask(), vec![true, false, true, false, true, true]);
        assert_eq!(series.valid_count(), 4);
    }

    #[test]
    fn all_text_column_is_all_missing() {
        let col = column(vec![CellValue::Text("a".into()), CellValue::Text("nan".into())]);
        let series = to_numeric(&col);
        assert_eq!(series.valid_count(), 0);
        assert!(series.valid_values().is_empty());
    }

    #[test]
    fn alignment_drops_rows_missing_on_either_side() {
        let x = NumericSeries {
            values: vec![Some(1.0), None, Some(3.0), Some(4.0)],
        };
        let y = NumericSeries {
            values: vec![Some(10.0), Some(20.0), None, Some(40.0)],
        };
        let (xs, ys) = aligned_pairs(&x, &y);
        assert_eq!(xs, vec![1.0, 4.0]);
        assert_eq!(ys, vec![10.0, 40.0]);
    }
}
