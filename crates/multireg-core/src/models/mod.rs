//! Regression model implementations
//!
//! [`RegressionEngine`] is the seam between specification summaries and the
//! estimator. [`AnofoxEngine`] is the default implementation on top of
//! anofox-regression; tests and callers may substitute their own.

mod ols;
mod quantile;

pub use ols::fit_ols;
pub use quantile::fit_quantile;

use crate::dataset::Dataset;
use crate::errors::StatsResult;
use crate::formula::{Design, Formula};
use crate::types::{CovarianceType, FittedModel, OlsOptions, QuantileOptions};
use faer::{Col, Mat};

/// Capability that turns a formula and a dataset into a fitted model
pub trait RegressionEngine: Send + Sync {
    /// Fit by ordinary least squares with the given covariance estimator
    fn fit_ols(
        &self,
        formula: &Formula,
        data: &Dataset,
        covariance: CovarianceType,
    ) -> StatsResult<FittedModel>;

    /// Fit by quantile regression at `quantile` (0 < quantile < 1)
    fn fit_quantile(
        &self,
        formula: &Formula,
        data: &Dataset,
        quantile: f64,
    ) -> StatsResult<FittedModel>;
}

impl<T: RegressionEngine + ?Sized> RegressionEngine for &T {
    fn fit_ols(
        &self,
        formula: &Formula,
        data: &Dataset,
        covariance: CovarianceType,
    ) -> StatsResult<FittedModel> {
        (**self).fit_ols(formula, data, covariance)
    }

    fn fit_quantile(
        &self,
        formula: &Formula,
        data: &Dataset,
        quantile: f64,
    ) -> StatsResult<FittedModel> {
        (**self).fit_quantile(formula, data, quantile)
    }
}

/// Engine backed by anofox-regression
#[derive(Debug, Clone, Copy, Default)]
pub struct AnofoxEngine;

impl RegressionEngine for AnofoxEngine {
    fn fit_ols(
        &self,
        formula: &Formula,
        data: &Dataset,
        covariance: CovarianceType,
    ) -> StatsResult<FittedModel> {
        fit_ols(formula, data, &OlsOptions { covariance })
    }

    fn fit_quantile(
        &self,
        formula: &Formula,
        data: &Dataset,
        quantile: f64,
    ) -> StatsResult<FittedModel> {
        fit_quantile(formula, data, &QuantileOptions { tau: quantile })
    }
}

/// Feature columns of a design as an n x p matrix, without the intercept
pub(crate) fn feature_matrix(design: &Design) -> Mat<f64> {
    Mat::from_fn(design.n_observations(), design.x.len(), |i, j| design.x[j][i])
}

pub(crate) fn response_column(design: &Design) -> Col<f64> {
    Col::from_fn(design.n_observations(), |i| design.y[i])
}

/// Per-term values in design order: the intercept's value first when the
/// design has one, NaN for whatever the library left unset
pub(crate) fn in_term_order(
    design: &Design,
    intercept: Option<f64>,
    features: Option<&Col<f64>>,
) -> Vec<f64> {
    let mut values = Vec::with_capacity(design.n_params());
    if design.intercept {
        values.push(intercept.unwrap_or(f64::NAN));
    }
    match features {
        Some(col) => values.extend(col.iter().copied()),
        None => values.extend(std::iter::repeat(f64::NAN).take(design.x.len())),
    }
    values
}
