//! Significance stars for coefficient tables

/// Map a p-value to the conventional star suffix
///
/// Thresholds are inclusive: p ≤ 0.01 -> `***`, p ≤ 0.05 -> `**`,
/// p ≤ 0.10 -> `*`, anything larger (or NaN) -> no stars.
pub fn significance_stars(p_value: f64) -> &'static str {
    if p_value <= 0.01 {
        "***"
    } else if p_value <= 0.05 {
        "**"
    } else if p_value <= 0.10 {
        "*"
    } else {
        ""
    }
}
