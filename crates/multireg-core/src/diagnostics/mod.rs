//! Diagnostic functions for fitted specifications

mod significance;

pub use significance::significance_stars;
