/// Statistics engine: descriptive stats, least-squares fits and value counts.
/// Every computation coerces its columns through `data::numeric` first, so a
/// bad cell only narrows the sample.

pub mod counts;
pub mod describe;
pub mod regression;

pub use describe::{describe, ColumnStats, ColumnSummary, StatKind, StatRequest};
pub use regression::{regress, FitKind, RegressionOutcome, RegressionResult, Unavailable};
