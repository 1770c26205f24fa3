//! Deterministic engine and data for unit tests

use crate::dataset::Dataset;
use crate::errors::{StatsError, StatsResult};
use crate::formula::Formula;
use crate::models::RegressionEngine;
use crate::types::{CovarianceType, Estimator, FittedModel};
use std::sync::atomic::{AtomicUsize, Ordering};

/// p-values handed out by term position, cycling
pub const P_VALUES: [f64; 5] = [0.5, 0.004, 0.03, 0.08, 0.2];

/// Engine that returns fixed estimates without solving anything
///
/// Term `i` (design order, intercept first) gets coefficient
/// `0.5 * (i + 1)`, negated for even `i > 0`, and p-value `P_VALUES[i % 5]`.
/// Adjusted R² is `0.12345 + 0.1 * k` and the condition number `10 * k` for
/// `k` terms.
#[derive(Debug, Default)]
pub struct StubEngine {
    singular_on: Option<String>,
    calls: AtomicUsize,
}

impl StubEngine {
    /// Engine that fails with `SingularMatrix` when a formula contains `term`
    pub fn singular_on(term: &str) -> Self {
        Self {
            singular_on: Some(term.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fit(
        &self,
        formula: &Formula,
        data: &Dataset,
        estimator: Estimator,
    ) -> StatsResult<FittedModel> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let design = formula.design(data)?;
        if let Some(term) = &self.singular_on {
            if design.terms.contains(term) {
                return Err(StatsError::SingularMatrix);
            }
        }

        let k = design.n_params();
        let coefficients = (0..k)
            .map(|i| {
                let c = 0.5 * (i + 1) as f64;
                if i > 0 && i % 2 == 0 {
                    -c
                } else {
                    c
                }
            })
            .collect();

        Ok(FittedModel {
            terms: design.terms.clone(),
            coefficients,
            std_errors: vec![0.1; k],
            p_values: (0..k).map(|i| P_VALUES[i % P_VALUES.len()]).collect(),
            n_observations: design.n_observations(),
            adj_r_squared: 0.12345 + 0.1 * k as f64,
            condition_number: 10.0 * k as f64,
            estimator,
        })
    }
}

impl RegressionEngine for StubEngine {
    fn fit_ols(
        &self,
        formula: &Formula,
        data: &Dataset,
        covariance: CovarianceType,
    ) -> StatsResult<FittedModel> {
        self.fit(formula, data, Estimator::Ols { covariance })
    }

    fn fit_quantile(
        &self,
        formula: &Formula,
        data: &Dataset,
        quantile: f64,
    ) -> StatsResult<FittedModel> {
        self.fit(formula, data, Estimator::Quantile { tau: quantile })
    }
}

/// Eight complete rows of y, x1, x2 (all positive)
pub fn sample_data() -> Dataset {
    Dataset::from_columns([
        ("y", vec![3.1, 4.8, 7.2, 8.9, 11.1, 13.0, 14.8, 17.2]),
        ("x1", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]),
        ("x2", vec![2.5, 1.0, 4.0, 3.5, 0.5, 6.0, 2.0, 5.0]),
    ])
    .expect("sample data columns have equal length")
}
