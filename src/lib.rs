/// Lab data ingestion and curve fitting.
///
/// Loads delimiter-ambiguous lab exports, repairs the known malformations
/// into canonical comma-separated files, and computes descriptive
/// statistics, least-squares fits, value counts and row filters over the
/// resulting tables. Plot-ready series are produced for an external
/// renderer; nothing here draws.

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod plot;
pub mod selection;
pub mod session;
pub mod stats;

pub use data::model::{CellValue, Column, ColumnRef, Table};
pub use error::DataError;
