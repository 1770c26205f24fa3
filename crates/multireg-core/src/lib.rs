//! multireg-core: fit many regression specifications and compare them
//!
//! This crate formats `response ~ terms` formulas, delegates estimation to
//! anofox-regression (OLS with a selectable covariance estimator, or quantile
//! regression), and collects coefficients, p-values and fit statistics of a
//! list of specifications into one [`SummaryTable`].
//!
//! ```rust,ignore
//! use multireg_core::{Dataset, SpecificationRunner, SummaryOptions};
//!
//! let runner = SpecificationRunner::default();
//! let options = SummaryOptions {
//!     names: Some(vec!["base".into(), "full".into()]),
//!     ..Default::default()
//! };
//! let table = runner.summarize("y", &["x1", "x1 + x2"], &["x1"], &data, &options)?;
//! println!("{}", table);
//! ```

pub mod dataset;
pub mod diagnostics;
pub mod errors;
pub mod formula;
pub mod models;
pub mod summary;
pub mod types;

#[cfg(test)]
mod testing;

pub use dataset::Dataset;
pub use errors::{ErrorKind, StatsError, StatsResult};
pub use formula::{Formula, INTERCEPT};
pub use models::{AnofoxEngine, RegressionEngine};
pub use summary::{
    Cell, CellLayout, ProgressEvent, ProgressObserver, RecordingObserver, Specification,
    SpecificationRunner, SummaryOptions, SummaryRow, SummaryTable, TracingObserver,
};
pub use types::*;
