/// Percentage of `part` in `total`, rounded to one decimal place.
///
/// Returns 0.0 when `total` is zero instead of dividing.
pub fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round1(part as f64 / total as f64 * 100.0)
    }
}

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
