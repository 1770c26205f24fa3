//! Summary table of fitted specifications

use crate::errors::{StatsError, StatsResult};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// Label of the row index
pub const INDEX_NAME: &str = "specification";
/// Column holding the observation count
pub const N_OBS: &str = "nObs";
/// Column holding the adjusted R-squared
pub const ADJ_R_SQUARED: &str = "R^2 adj";
/// Column holding the condition number
pub const CONDITION_NUMBER: &str = "cond. num";

/// Fit-statistic columns present in every table, in order
pub const STAT_COLUMNS: [&str; 3] = [N_OBS, ADJ_R_SQUARED, CONDITION_NUMBER];

/// One table cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Count(usize),
    Number(f64),
    Text(String),
    /// The specification has no value for this column
    Empty,
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Count(n) => write!(f, "{}", n),
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => f.write_str(s),
            Cell::Empty => Ok(()),
        }
    }
}

/// Summary of one specification
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub specification: String,
    pub n_observations: usize,
    /// Adjusted R-squared rounded to 3 decimals
    pub adj_r_squared: f64,
    pub condition_number: f64,
    /// Formatted estimates as `(column, cell)` pairs, in column order
    pub estimates: Vec<(String, String)>,
}

impl SummaryRow {
    /// Value of `column` in this row; `Cell::Empty` if the row has none
    pub fn get(&self, column: &str) -> Cell {
        match column {
            N_OBS => Cell::Count(self.n_observations),
            ADJ_R_SQUARED => Cell::Number(self.adj_r_squared),
            CONDITION_NUMBER => Cell::Number(self.condition_number),
            _ => self
                .estimates
                .iter()
                .find(|(name, _)| name == column)
                .map(|(_, value)| Cell::Text(value.clone()))
                .unwrap_or(Cell::Empty),
        }
    }
}

impl Serialize for SummaryRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4 + self.estimates.len()))?;
        map.serialize_entry(INDEX_NAME, &self.specification)?;
        map.serialize_entry(N_OBS, &self.n_observations)?;
        map.serialize_entry(ADJ_R_SQUARED, &self.adj_r_squared)?;
        map.serialize_entry(CONDITION_NUMBER, &self.condition_number)?;
        for (column, value) in &self.estimates {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Comparison table: one row per specification, in input order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    columns: Vec<String>,
    rows: Vec<SummaryRow>,
}

impl SummaryTable {
    /// Assemble a table; `estimate_columns` follow the three fit-statistic columns
    pub fn new(estimate_columns: Vec<String>, rows: Vec<SummaryRow>) -> Self {
        let mut columns: Vec<String> = STAT_COLUMNS.iter().map(|c| c.to_string()).collect();
        columns.extend(estimate_columns);
        Self { columns, rows }
    }

    /// All column names, fit statistics first
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    /// Specification names in row order
    pub fn row_names(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.specification.as_str()).collect()
    }

    pub fn row(&self, specification: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.specification == specification)
    }

    /// Cell at (`specification`, `column`), `None` if either is unknown
    pub fn cell(&self, specification: &str, column: &str) -> Option<Cell> {
        if !self.columns.iter().any(|c| c == column) {
            return None;
        }
        self.row(specification).map(|r| r.get(column))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as CSV with a leading `specification` column
    pub fn to_csv(&self) -> StatsResult<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let header = std::iter::once(INDEX_NAME).chain(self.columns.iter().map(String::as_str));
        writer.write_record(header).map_err(csv_error)?;

        for row in &self.rows {
            let mut record = vec![row.specification.clone()];
            record.extend(self.columns.iter().map(|c| row.get(c).to_string()));
            writer.write_record(&record).map_err(csv_error)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| StatsError::SerializationError(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| StatsError::SerializationError(e.to_string()))
    }

    /// Render as pretty-printed JSON
    pub fn to_json(&self) -> StatsResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| StatsError::SerializationError(e.to_string()))
    }
}

fn csv_error(e: csv::Error) -> StatsError {
    StatsError::SerializationError(e.to_string())
}

/// Aligned plain-text rendering, one line per specification
impl fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                std::iter::once(row.specification.clone())
                    .chain(self.columns.iter().map(|c| row.get(c).to_string()))
                    .collect()
            })
            .collect();

        let header: Vec<&str> = std::iter::once(INDEX_NAME)
            .chain(self.columns.iter().map(String::as_str))
            .collect();
        let widths: Vec<usize> = header
            .iter()
            .enumerate()
            .map(|(i, h)| {
                body.iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let write_line = |f: &mut fmt::Formatter<'_>, cells: &[&str]| -> fmt::Result {
            let line: Vec<String> = cells
                .iter()
                .zip(widths.iter())
                .enumerate()
                .map(|(i, (cell, &w))| {
                    if i == 0 {
                        format!("{:<w$}", cell, w = w)
                    } else {
                        format!("{:>w$}", cell, w = w)
                    }
                })
                .collect();
            writeln!(f, "{}", line.join("  ").trim_end())
        };

        write_line(f, &header)?;
        for row in &body {
            let cells: Vec<&str> = row.iter().map(String::as_str).collect();
            write_line(f, &cells)?;
        }
        Ok(())
    }
}
