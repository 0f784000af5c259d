use crate::data::numeric::NumericSeries;

/// Occurrences of each distinct numeric value, ascending by value.
pub fn value_counts(series: &NumericSeries) -> Vec<(f64, usize)> {
    let mut values = series.valid_values();
    values.sort_by(f64::total_cmp);

    let mut counts: Vec<(f64, usize)> = Vec::new();
    for v in values {
        match counts.last_mut() {
            Some((last, n)) if *last == v => *n += 1,
            _ => counts.push((v, 1)),
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_sorted_by_value() {
        let series = NumericSeries {
            values: vec![Some(3.0), Some(1.0), None, Some(3.0), Some(2.0), Some(3.0)],
        };
        assert_eq!(value_counts(&series), vec![(1.0, 1), (2.0, 1), (3.0, 3)]);
    }

    #[test]
    fn empty_series_has_no_counts() {
        assert!(value_counts(&NumericSeries::default()).is_empty());
    }
}
