//! Column-oriented numeric dataset

use crate::errors::{StatsError, StatsResult};

/// A set of equally long, named numeric columns
///
/// Missing values are represented as NaN; they are dropped row-wise when a
/// formula is turned into a design matrix.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    n_rows: usize,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from `(name, values)` pairs
    pub fn from_columns<I, S>(columns: I) -> StatsResult<Self>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        columns
            .into_iter()
            .try_fold(Self::new(), |data, (name, values)| {
                data.with_column(name, values)
            })
    }

    /// Add a column, replacing any existing column of the same name
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> StatsResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(StatsError::EmptyInput {
                field: "column name",
            });
        }
        if self.columns.is_empty() {
            self.n_rows = values.len();
        } else if values.len() != self.n_rows {
            return Err(StatsError::DimensionMismatch {
                column: name,
                len: values.len(),
                expected: self.n_rows,
            });
        }

        match self.names.iter().position(|n| *n == name) {
            Some(i) => self.columns[i] = values,
            None => {
                self.names.push(name);
                self.columns.push(values);
            }
        }
        Ok(self)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }
}
