use thiserror::Error;

/// Errors that can occur while fitting or summarizing specifications
#[derive(Error, Debug)]
pub enum StatsError {
    // Configuration errors
    #[error("Specification names ({names}) do not match the number of formulas ({formulas})")]
    NameCountMismatch { names: usize, formulas: usize },

    #[error("Duplicate specification name: {0}")]
    DuplicateSpecificationName(String),

    // Formula errors
    #[error("Invalid formula '{formula}': {message}")]
    InvalidFormula { formula: String, message: String },

    #[error("Column '{0}' referenced by the formula is not in the dataset")]
    UnknownColumn(String),

    // Fit errors
    #[error("Matrix is singular or near-singular")]
    SingularMatrix,

    #[error("Insufficient data: {rows} rows, {cols} parameters (need rows > parameters)")]
    InsufficientData { rows: usize, cols: usize },

    #[error("All rows filtered due to NaN/infinite values")]
    NoValidData,

    #[error("anofox-regression error: {0}")]
    RegressError(String),

    // Reporting errors
    #[error("Variable '{variable}' is not a coefficient of specification '{specification}'")]
    MissingVariable {
        specification: String,
        variable: String,
    },

    // Input validation errors
    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },

    #[error("Dimension mismatch: column '{column}' has {len} rows, dataset has {expected}")]
    DimensionMismatch {
        column: String,
        len: usize,
        expected: usize,
    },

    #[error("Empty input: {field} cannot be empty")]
    EmptyInput { field: &'static str },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Coarse classification of [`StatsError`] variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Run configuration is inconsistent (names vs formulas)
    Configuration,
    /// Formula could not be parsed or refers to unknown columns
    Formula,
    /// The estimator failed (singular design, too few rows, library error)
    Fit,
    /// A requested variable is not among a model's coefficients
    MissingVariable,
    /// Any other invalid argument
    InvalidInput,
}

impl StatsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StatsError::NameCountMismatch { .. } | StatsError::DuplicateSpecificationName(_) => {
                ErrorKind::Configuration
            }
            StatsError::InvalidFormula { .. } | StatsError::UnknownColumn(_) => ErrorKind::Formula,
            StatsError::SingularMatrix
            | StatsError::InsufficientData { .. }
            | StatsError::NoValidData
            | StatsError::RegressError(_) => ErrorKind::Fit,
            StatsError::MissingVariable { .. } => ErrorKind::MissingVariable,
            StatsError::InvalidValue { .. }
            | StatsError::DimensionMismatch { .. }
            | StatsError::EmptyInput { .. }
            | StatsError::SerializationError(_) => ErrorKind::InvalidInput,
        }
    }
}

/// Result type for statistical operations
pub type StatsResult<T> = Result<T, StatsError>;
