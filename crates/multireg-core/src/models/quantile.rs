//! Quantile regression wrapper

use super::{feature_matrix, in_term_order, response_column};
use crate::dataset::Dataset;
use crate::errors::{StatsError, StatsResult};
use crate::formula::Formula;
use crate::types::{Estimator, FittedModel, QuantileOptions};
use anofox_regression::prelude::*;
use tracing::debug;

/// Fit a Quantile regression model for one formula
///
/// Quantile regression estimates conditional quantiles of the response variable,
/// rather than the conditional mean. It is robust to outliers and useful for
/// understanding the full distribution of the response.
///
/// The regressor always estimates an intercept, so formulas that drop it
/// (`- 1`, `0 +`) are rejected. An intercept-only formula (`y ~ 1`) is the
/// sample τ-quantile of the response. No inference is available from the library:
/// standard errors and p-values are NaN. The adjusted R-squared slot holds the
/// Koenker-Machado pseudo R-squared.
///
/// # Arguments
/// * `formula` - Parsed `response ~ terms` formula
/// * `data` - Dataset holding every referenced column
/// * `options` - Fitting options (quantile)
pub fn fit_quantile(
    formula: &Formula,
    data: &Dataset,
    options: &QuantileOptions,
) -> StatsResult<FittedModel> {
    // Validate tau
    if options.tau <= 0.0 || options.tau >= 1.0 || options.tau.is_nan() {
        return Err(StatsError::InvalidValue {
            field: "tau",
            message: "tau must be in (0, 1)".to_string(),
        });
    }
    if !formula.intercept {
        return Err(StatsError::InvalidValue {
            field: "formula",
            message: "quantile regression requires an intercept".to_string(),
        });
    }

    let design = formula.design(data)?;
    let n_valid = design.n_observations();
    let n_params = design.n_params();
    let n_features = design.x.len();

    if n_valid < n_params {
        return Err(StatsError::InsufficientData {
            rows: n_valid,
            cols: n_params,
        });
    }

    // Convert to faer types
    let y_col = response_column(&design);
    let x_mat = feature_matrix(&design);

    let coefficients = if n_features == 0 {
        vec![sample_quantile(&design.y, options.tau)]
    } else {
        let fitted = QuantileRegressor::new(options.tau)
            .fit(&x_mat, &y_col)
            .map_err(|e| StatsError::RegressError(format!("{:?}", e)))?;

        let result = fitted.result();
        in_term_order(&design, result.intercept, Some(&result.coefficients))
    };

    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(StatsError::SingularMatrix);
    }

    let fitted_loss: f64 = (0..n_valid)
        .map(|i| {
            let prediction: f64 = design
                .row(i)
                .iter()
                .zip(coefficients.iter())
                .map(|(a, b)| a * b)
                .sum();
            check_loss(design.y[i] - prediction, options.tau)
        })
        .sum();
    let pseudo_r_squared = pseudo_r_squared(&design.y, fitted_loss, options.tau);

    debug!(
        formula = %formula,
        n_obs = n_valid,
        tau = options.tau,
        "fitted quantile specification"
    );

    Ok(FittedModel {
        terms: design.terms,
        coefficients,
        std_errors: vec![f64::NAN; n_params],
        p_values: vec![f64::NAN; n_params],
        n_observations: n_valid,
        adj_r_squared: pseudo_r_squared,
        condition_number: condition_number(&x_mat, design.intercept),
        estimator: Estimator::Quantile { tau: options.tau },
    })
}

/// Koenker's check function ρτ(u) = u (τ - 1{u < 0})
fn check_loss(u: f64, tau: f64) -> f64 {
    if u < 0.0 {
        u * (tau - 1.0)
    } else {
        u * tau
    }
}

/// Sample τ-quantile as the order statistic minimizing the check loss,
/// i.e. the intercept-only quantile regression fit
fn sample_quantile(values: &[f64], tau: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let k = ((n as f64 * tau).ceil() as usize).clamp(1, n);
    sorted[k - 1]
}

/// Koenker-Machado pseudo R² = 1 - V(τ) / Ṽ(τ), against the intercept-only fit
fn pseudo_r_squared(y: &[f64], fitted_loss: f64, tau: f64) -> f64 {
    let q = sample_quantile(y, tau);
    let restricted_loss: f64 = y.iter().map(|&v| check_loss(v - q, tau)).sum();
    if restricted_loss == 0.0 {
        return f64::NAN;
    }
    1.0 - fitted_loss / restricted_loss
}
