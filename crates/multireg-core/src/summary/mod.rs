//! Multi-specification regression summaries
//!
//! [`SpecificationRunner`] fits one model per formula through an injected
//! [`RegressionEngine`] and collects coefficients, significance and fit
//! statistics of every specification into a [`SummaryTable`].
//!
//! Two cell layouts exist and they do not share a column set:
//!
//! - [`CellLayout::KeyVariablesWithPValues`]: one `"coef (p)"` column per
//!   requested variable; every specification must contain every variable.
//! - [`CellLayout::AllCoefficientsWithStars`]: one `"coef***"` column per
//!   coefficient of any specification; the requested variables are ignored
//!   and coefficients a specification lacks are left empty.

mod progress;
mod table;

pub use progress::{ProgressEvent, ProgressObserver, RecordingObserver, TracingObserver};
pub use table::{
    Cell, SummaryRow, SummaryTable, ADJ_R_SQUARED, CONDITION_NUMBER, INDEX_NAME, N_OBS,
    STAT_COLUMNS,
};

use crate::dataset::Dataset;
use crate::diagnostics::significance_stars;
use crate::errors::{StatsError, StatsResult};
use crate::formula::Formula;
use crate::models::{AnofoxEngine, RegressionEngine};
use crate::types::{CovarianceType, FittedModel};
use rayon::prelude::*;
use std::collections::HashSet;

/// One candidate model: a named right-hand-side formula
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specification {
    pub name: String,
    pub formula: String,
}

/// Which cells a summary row carries besides the fit statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellLayout {
    /// `"{coef:.4} ({p:.3})"` for each variable of interest
    #[default]
    KeyVariablesWithPValues,
    /// `"{coef:.3}{stars}"` for every coefficient of the model
    AllCoefficientsWithStars,
}

/// Options for [`SpecificationRunner::summarize`]
#[derive(Debug, Clone, Default)]
pub struct SummaryOptions {
    /// Row labels; positional indices ("0", "1", ...) when `None`
    pub names: Option<Vec<String>>,
    /// Covariance estimator used for every specification
    pub covariance: CovarianceType,
    pub layout: CellLayout,
    /// Fit specifications on the rayon thread pool
    pub parallel: bool,
}

/// Fits a list of specifications and summarizes them side by side
#[derive(Debug, Clone)]
pub struct SpecificationRunner<E, O = TracingObserver> {
    engine: E,
    observer: O,
}

impl Default for SpecificationRunner<AnofoxEngine> {
    fn default() -> Self {
        Self::new(AnofoxEngine)
    }
}

impl<E: RegressionEngine> SpecificationRunner<E> {
    /// Create a runner that reports progress through `tracing`
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            observer: TracingObserver,
        }
    }
}

impl<E: RegressionEngine, O: ProgressObserver> SpecificationRunner<E, O> {
    /// Replace the progress observer
    pub fn with_observer<P: ProgressObserver>(self, observer: P) -> SpecificationRunner<E, P> {
        SpecificationRunner {
            engine: self.engine,
            observer,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Fit `response ~ formula` by OLS with the given covariance estimator
    pub fn fit_one(
        &self,
        response: &str,
        formula: &str,
        data: &Dataset,
        covariance: CovarianceType,
    ) -> StatsResult<FittedModel> {
        let formula = Formula::from_parts(response, formula)?;
        self.engine.fit_ols(&formula, data, covariance)
    }

    /// Fit `response ~ formula` by quantile regression (0.5 is the median)
    pub fn fit_quantile(
        &self,
        response: &str,
        formula: &str,
        data: &Dataset,
        quantile: f64,
    ) -> StatsResult<FittedModel> {
        let formula = Formula::from_parts(response, formula)?;
        self.engine.fit_quantile(&formula, data, quantile)
    }

    /// Fit every formula against `response` and build the comparison table
    ///
    /// # Arguments
    /// * `response` - Dependent-variable column
    /// * `formulas` - Right-hand sides, one per specification
    /// * `variables` - Variables of interest (used by the p-value layout)
    /// * `data` - Dataset holding every referenced column
    /// * `options` - Names, covariance estimator, layout, parallelism
    ///
    /// # Errors
    /// Fails fast, without a partial table, on mismatched or duplicate
    /// names, an invalid formula, a failed fit, or a variable of interest
    /// missing from a model.
    pub fn summarize<F, V>(
        &self,
        response: &str,
        formulas: &[F],
        variables: &[V],
        data: &Dataset,
        options: &SummaryOptions,
    ) -> StatsResult<SummaryTable>
    where
        F: AsRef<str>,
        V: AsRef<str>,
    {
        let specifications = resolve_specifications(formulas, options.names.as_deref())?;

        let fit = |spec: &Specification| {
            self.observer.on_event(&ProgressEvent::Estimating {
                specification: spec.name.clone(),
                covariance: options.covariance,
            });
            self.fit_one(response, &spec.formula, data, options.covariance)
        };
        let models: Vec<FittedModel> = if options.parallel {
            specifications.par_iter().map(fit).collect::<StatsResult<_>>()?
        } else {
            specifications.iter().map(fit).collect::<StatsResult<_>>()?
        };
        self.observer.on_event(&ProgressEvent::EstimationDone {
            specifications: models.len(),
        });

        self.observer.on_event(&ProgressEvent::ExtractingResults);
        let variables: Vec<&str> = unique(variables.iter().map(|v| v.as_ref()));
        let rows = specifications
            .iter()
            .zip(models.iter())
            .map(|(spec, model)| summary_row(&spec.name, model, &variables, options.layout))
            .collect::<StatsResult<Vec<_>>>()?;

        let columns = match options.layout {
            CellLayout::KeyVariablesWithPValues => {
                variables.iter().map(|v| v.to_string()).collect()
            }
            CellLayout::AllCoefficientsWithStars => unique(
                models
                    .iter()
                    .flat_map(|m| m.terms.iter().map(String::as_str)),
            )
            .into_iter()
            .map(String::from)
            .collect(),
        };

        Ok(SummaryTable::new(columns, rows))
    }

    /// [`summarize`](Self::summarize) with the `"coef (p)"` layout for `variables`
    pub fn summarize_with_pvalues<F, V>(
        &self,
        response: &str,
        formulas: &[F],
        variables: &[V],
        data: &Dataset,
        options: &SummaryOptions,
    ) -> StatsResult<SummaryTable>
    where
        F: AsRef<str>,
        V: AsRef<str>,
    {
        let options = SummaryOptions {
            layout: CellLayout::KeyVariablesWithPValues,
            ..options.clone()
        };
        self.summarize(response, formulas, variables, data, &options)
    }

    /// [`summarize`](Self::summarize) with the `"coef***"` layout for every coefficient
    pub fn summarize_with_stars<F>(
        &self,
        response: &str,
        formulas: &[F],
        data: &Dataset,
        options: &SummaryOptions,
    ) -> StatsResult<SummaryTable>
    where
        F: AsRef<str>,
    {
        let options = SummaryOptions {
            layout: CellLayout::AllCoefficientsWithStars,
            ..options.clone()
        };
        self.summarize::<F, &str>(response, formulas, &[], data, &options)
    }
}

/// Pair formulas with names, defaulting to positional indices
pub fn resolve_specifications<F: AsRef<str>>(
    formulas: &[F],
    names: Option<&[String]>,
) -> StatsResult<Vec<Specification>> {
    let names: Vec<String> = match names {
        Some(names) if names.len() != formulas.len() => {
            return Err(StatsError::NameCountMismatch {
                names: names.len(),
                formulas: formulas.len(),
            });
        }
        Some(names) => names.to_vec(),
        None => (0..formulas.len()).map(|i| i.to_string()).collect(),
    };

    let mut seen = HashSet::with_capacity(names.len());
    for name in &names {
        if !seen.insert(name.as_str()) {
            return Err(StatsError::DuplicateSpecificationName(name.clone()));
        }
    }

    Ok(names
        .into_iter()
        .zip(formulas.iter())
        .map(|(name, formula)| Specification {
            name,
            formula: formula.as_ref().to_string(),
        })
        .collect())
}

fn summary_row(
    specification: &str,
    model: &FittedModel,
    variables: &[&str],
    layout: CellLayout,
) -> StatsResult<SummaryRow> {
    let estimates = match layout {
        CellLayout::KeyVariablesWithPValues => variables
            .iter()
            .map(|&var| -> StatsResult<(String, String)> {
                let missing = || StatsError::MissingVariable {
                    specification: specification.to_string(),
                    variable: var.to_string(),
                };
                let coef = model.coefficient(var).ok_or_else(missing)?;
                let p = model.p_value(var).ok_or_else(missing)?;
                Ok((var.to_string(), format!("{:.4} ({:.3})", coef, p)))
            })
            .collect::<StatsResult<Vec<_>>>()?,
        CellLayout::AllCoefficientsWithStars => model
            .estimates()
            .map(|(term, coef, p)| {
                (
                    term.to_string(),
                    format!("{:.3}{}", coef, significance_stars(p)),
                )
            })
            .collect(),
    };

    Ok(SummaryRow {
        specification: specification.to_string(),
        n_observations: model.n_observations,
        adj_r_squared: round_to(model.adj_r_squared, 3),
        condition_number: model.condition_number,
        estimates,
    })
}

/// Round half to even, like `numpy.round`
fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

/// Drop repeated items, keeping first occurrences in order
fn unique<'a>(items: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    items.filter(|item| seen.insert(*item)).collect()
}
