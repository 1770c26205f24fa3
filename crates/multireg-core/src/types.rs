use crate::errors::StatsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Covariance estimator used for coefficient standard errors
///
/// Names follow the statsmodels `cov_type` convention, so `"HC0"` parses to
/// [`CovarianceType::HC0`] and `"nonrobust"` to [`CovarianceType::Nonrobust`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CovarianceType {
    /// Classical OLS covariance: s² (XᵀX)⁻¹
    #[serde(rename = "nonrobust")]
    Nonrobust,
    /// White's heteroskedasticity-consistent estimator
    #[default]
    HC0,
    /// HC0 with a n / (n - k) small-sample correction
    HC1,
    /// HC0 with squared residuals scaled by 1 / (1 - h_ii)
    HC2,
    /// HC0 with squared residuals scaled by 1 / (1 - h_ii)²
    HC3,
}

impl CovarianceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CovarianceType::Nonrobust => "nonrobust",
            CovarianceType::HC0 => "HC0",
            CovarianceType::HC1 => "HC1",
            CovarianceType::HC2 => "HC2",
            CovarianceType::HC3 => "HC3",
        }
    }

    /// Robust estimators report z-based p-values, the classical one t-based
    pub fn is_robust(&self) -> bool {
        !matches!(self, CovarianceType::Nonrobust)
    }
}

impl fmt::Display for CovarianceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CovarianceType {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nonrobust" => Ok(CovarianceType::Nonrobust),
            "hc0" => Ok(CovarianceType::HC0),
            "hc1" => Ok(CovarianceType::HC1),
            "hc2" => Ok(CovarianceType::HC2),
            "hc3" => Ok(CovarianceType::HC3),
            other => Err(StatsError::InvalidValue {
                field: "covariance",
                message: format!("unknown covariance type '{}'", other),
            }),
        }
    }
}

/// Options for OLS fitting
#[derive(Debug, Clone, Default)]
pub struct OlsOptions {
    /// Covariance estimator for standard errors and p-values
    pub covariance: CovarianceType,
}

/// Options for Quantile regression
#[derive(Debug, Clone)]
pub struct QuantileOptions {
    /// Quantile to estimate (0 < tau < 1)
    pub tau: f64,
}

impl Default for QuantileOptions {
    fn default() -> Self {
        Self { tau: 0.5 }
    }
}

/// Estimator that produced a [`FittedModel`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Estimator {
    Ols { covariance: CovarianceType },
    Quantile { tau: f64 },
}

/// Result of fitting one specification
///
/// All per-term vectors are aligned with `terms`. The intercept, when the
/// formula keeps it, is the term named `Intercept`.
#[derive(Debug, Clone)]
pub struct FittedModel {
    /// Term names in design-matrix order
    pub terms: Vec<String>,
    /// Estimated coefficients
    pub coefficients: Vec<f64>,
    /// Standard errors (NaN when the estimator provides none)
    pub std_errors: Vec<f64>,
    /// Two-sided p-values (NaN when the estimator provides none)
    pub p_values: Vec<f64>,
    /// Number of observations used after dropping incomplete rows
    pub n_observations: usize,
    /// Adjusted R-squared (pseudo R-squared for quantile fits)
    pub adj_r_squared: f64,
    /// Condition number of the design matrix
    pub condition_number: f64,
    pub estimator: Estimator,
}

impl FittedModel {
    fn position(&self, term: &str) -> Option<usize> {
        self.terms.iter().position(|t| t == term)
    }

    /// Coefficient for `term`, if the model has it
    pub fn coefficient(&self, term: &str) -> Option<f64> {
        self.position(term).map(|i| self.coefficients[i])
    }

    /// p-value for `term`, if the model has it
    pub fn p_value(&self, term: &str) -> Option<f64> {
        self.position(term).map(|i| self.p_values[i])
    }

    /// Iterate over `(term, coefficient, p_value)` in design order
    pub fn estimates(&self) -> impl Iterator<Item = (&str, f64, f64)> + '_ {
        self.terms
            .iter()
            .zip(self.coefficients.iter())
            .zip(self.p_values.iter())
            .map(|((t, &c), &p)| (t.as_str(), c, p))
    }
}
