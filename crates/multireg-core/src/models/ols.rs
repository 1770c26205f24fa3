//! Ordinary Least Squares (OLS) regression wrapper

use super::{feature_matrix, in_term_order, response_column};
use crate::dataset::Dataset;
use crate::errors::{StatsError, StatsResult};
use crate::formula::Formula;
use crate::types::{CovarianceType, Estimator, FittedModel, OlsOptions};
use anofox_regression::prelude::*;
use tracing::debug;

/// Fit an OLS regression model for one formula
///
/// Standard errors and p-values come from the library: the classical ones
/// for [`CovarianceType::Nonrobust`], the HC sandwich estimators otherwise.
/// Both use Student's t with n - k degrees of freedom.
///
/// # Arguments
/// * `formula` - Parsed `response ~ terms` formula
/// * `data` - Dataset holding every referenced column
/// * `options` - Fitting options (covariance estimator)
///
/// # Returns
/// * `FittedModel` with coefficients, p-values under the requested
///   covariance estimator, adjusted R-squared and condition number
pub fn fit_ols(
    formula: &Formula,
    data: &Dataset,
    options: &OlsOptions,
) -> StatsResult<FittedModel> {
    let design = formula.design(data)?;

    let n_valid = design.n_observations();
    let n_params = design.n_params();
    if n_params == 0 {
        return Err(StatsError::EmptyInput { field: "terms" });
    }
    if n_valid <= n_params {
        return Err(StatsError::InsufficientData {
            rows: n_valid,
            cols: n_params,
        });
    }

    // Convert to faer types
    let y_col = response_column(&design);
    let x_mat = feature_matrix(&design);

    let fitted = OlsRegressor::builder()
        .with_intercept(design.intercept)
        .compute_inference(true)
        .build()
        .fit(&x_mat, &y_col)
        .map_err(|e| StatsError::RegressError(format!("{:?}", e)))?;

    let result = fitted.result();
    let coefficients = in_term_order(&design, result.intercept, Some(&result.coefficients));

    // Aliased columns come back as NaN
    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(StatsError::SingularMatrix);
    }

    let (std_errors, p_values) = match hc_type(options.covariance) {
        None => (
            in_term_order(
                &design,
                result.intercept_std_error,
                result.std_errors.as_ref(),
            ),
            in_term_order(&design, result.intercept_p_value, result.p_values.as_ref()),
        ),
        Some(hc) => {
            let inference = fitted
                .hc_inference(&x_mat, hc)
                .map_err(|e| StatsError::RegressError(e.to_string()))?;
            let intercept = inference.intercept.as_ref();
            (
                in_term_order(
                    &design,
                    intercept.map(|i| i.std_error),
                    Some(&inference.std_errors),
                ),
                in_term_order(
                    &design,
                    intercept.map(|i| i.p_value),
                    Some(&inference.p_values),
                ),
            )
        }
    };

    // An intercept-only fit explains nothing
    let adj_r_squared = if x_mat.ncols() == 0 {
        0.0
    } else {
        result.adj_r_squared
    };

    debug!(
        formula = %formula,
        n_obs = n_valid,
        n_dropped = design.n_dropped,
        covariance = %options.covariance,
        "fitted OLS specification"
    );

    Ok(FittedModel {
        terms: design.terms,
        coefficients,
        std_errors,
        p_values,
        n_observations: n_valid,
        adj_r_squared,
        condition_number: condition_number(&x_mat, design.intercept),
        estimator: Estimator::Ols {
            covariance: options.covariance,
        },
    })
}

/// HC flavour of a robust covariance type; `None` for the classical estimator
fn hc_type(covariance: CovarianceType) -> Option<HcType> {
    match covariance {
        CovarianceType::Nonrobust => None,
        CovarianceType::HC0 => Some(HcType::HC0),
        CovarianceType::HC1 => Some(HcType::HC1),
        CovarianceType::HC2 => Some(HcType::HC2),
        CovarianceType::HC3 => Some(HcType::HC3),
    }
}
