use multireg_core::{
    Cell, CovarianceType, Dataset, ErrorKind, Estimator, FittedModel, Formula, RegressionEngine,
    SpecificationRunner, StatsResult, SummaryOptions,
};
use proptest::prelude::*;
use regex::Regex;

/// Engine reporting the same coefficient and p-value for every term
struct FixedEngine {
    coefficient: f64,
    p_value: f64,
}

impl FixedEngine {
    fn fit(
        &self,
        formula: &Formula,
        data: &Dataset,
        estimator: Estimator,
    ) -> StatsResult<FittedModel> {
        let design = formula.design(data)?;
        let k = design.n_params();
        Ok(FittedModel {
            terms: design.terms.clone(),
            coefficients: vec![self.coefficient; k],
            std_errors: vec![1.0; k],
            p_values: vec![self.p_value; k],
            n_observations: design.n_observations(),
            adj_r_squared: 0.5,
            condition_number: 3.0,
            estimator,
        })
    }
}

impl RegressionEngine for FixedEngine {
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

const POOL: [&str; 5] = ["x1", "x1 + x2", "x1 * x2", "x1 + x3", "x1 + x2 + x3"];

fn data() -> Dataset {
    Dataset::from_columns([
        ("y", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
        ("x1", vec![0.1, 0.4, 0.2, 0.9, 0.5, 0.3]),
        ("x2", vec![1.5, 2.5, 0.5, 3.0, 1.0, 2.0]),
        ("x3", vec![7.0, 3.0, 5.0, 1.0, 2.0, 4.0]),
    ])
    .unwrap()
}

fn runner(coefficient: f64, p_value: f64) -> SpecificationRunner<FixedEngine> {
    SpecificationRunner::new(FixedEngine {
        coefficient,
        p_value,
    })
}

fn is_coef_p_cell(cell: &str) -> bool {
    let pattern = Regex::new(r"^-?\d+\.\d{4} \(\d+\.\d{3}\)$").unwrap();
    pattern.is_match(cell)
}

fn expected_stars(p: f64) -> &'static str {
    if p <= 0.01 {
        "***"
    } else if p <= 0.05 {
        "**"
    } else if p <= 0.10 {
        "*"
    } else {
        ""
    }
}

proptest! {
    #[test]
    fn row_count_and_order_follow_formulas(picks in proptest::collection::vec(0usize..5, 0..8)) {
        let formulas: Vec<&str> = picks.iter().map(|&i| POOL[i]).collect();
        let names: Vec<String> = (0..formulas.len()).map(|i| format!("spec_{}", i)).collect();
        let options = SummaryOptions { names: Some(names.clone()), ..Default::default() };

        let table = runner(1.0, 0.2)
            .summarize("y", &formulas, &["x1"], &data(), &options)
            .unwrap();

        prop_assert_eq!(table.len(), formulas.len());
        prop_assert_eq!(table.row_names(), names.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn default_names_are_positions(n in 0usize..8) {
        let formulas = vec!["x1"; n];
        let table = runner(1.0, 0.2)
            .summarize("y", &formulas, &["x1"], &data(), &SummaryOptions::default())
            .unwrap();

        let expected: Vec<String> = (0..n).map(|i| i.to_string()).collect();
        prop_assert_eq!(table.row_names(), expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn mismatched_names_fail(n_formulas in 0usize..6, n_names in 0usize..6) {
        prop_assume!(n_formulas != n_names);
        let formulas = vec!["x1"; n_formulas];
        let options = SummaryOptions {
            names: Some((0..n_names).map(|i| format!("n{}", i)).collect()),
            ..Default::default()
        };

        let err = runner(1.0, 0.2)
            .summarize("y", &formulas, &["x1"], &data(), &options)
            .unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn pvalue_cells_have_fixed_shape(coef in -1000.0f64..1000.0, p in 0.0f64..=1.0) {
        let table = runner(coef, p)
            .summarize("y", &["x1", "x1 + x2"], &["x1", "x2"], &data(), &SummaryOptions::default());
        // x2 is absent from the first specification
        prop_assert_eq!(table.unwrap_err().kind(), ErrorKind::MissingVariable);

        let table = runner(coef, p)
            .summarize("y", &["x1 + x2", "x1 * x2"], &["x1", "x2"], &data(), &SummaryOptions::default())
            .unwrap();
        for name in ["0", "1"] {
            for var in ["x1", "x2"] {
                let cell = table.cell(name, var).unwrap();
                let text = cell.as_text().unwrap();
                prop_assert!(is_coef_p_cell(text), "bad cell '{}'", text);
            }
        }
    }

    #[test]
    fn star_suffix_follows_p_value_bins(p in 0.0f64..=1.0) {
        let table = runner(0.25, p)
            .summarize_with_stars("y", &["x1 + x2"], &data(), &SummaryOptions::default())
            .unwrap();

        for term in ["Intercept", "x1", "x2"] {
            let cell = table.cell("0", term).unwrap();
            prop_assert_eq!(cell, Cell::Text(format!("0.250{}", expected_stars(p))));
        }
    }
}

#[test]
fn star_bins_are_inclusive_at_boundaries() {
    for (p, stars) in [(0.01, "***"), (0.05, "**"), (0.10, "*"), (0.1000001, "")] {
        let table = runner(-2.0, p)
            .summarize_with_stars("y", &["x1"], &data(), &SummaryOptions::default())
            .unwrap();
        assert_eq!(
            table.cell("0", "x1"),
            Some(Cell::Text(format!("-2.000{}", stars)))
        );
    }
}

#[test]
fn example_table_layout() {
    let options = SummaryOptions {
        names: Some(vec!["base".into(), "full".into()]),
        ..Default::default()
    };
    let table = runner(0.5, 0.03)
        .summarize("y", &["x1", "x1+x2"], &["x1"], &data(), &options)
        .unwrap();

    assert_eq!(table.row_names(), vec!["base", "full"]);
    assert_eq!(table.columns(), &["nObs", "R^2 adj", "cond. num", "x1"]);
    assert_eq!(
        table.cell("base", "x1"),
        Some(Cell::Text("0.5000 (0.030)".into()))
    );
}
