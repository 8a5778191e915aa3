/// Divides `part` by `total`. Returns `None` when `total` is zero.
pub fn ratio(part: usize, total: usize) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(part as f64 / total as f64)
}

/// Formats a `[0, 1]` ratio as a percentage.
pub fn pct(ratio: f64) -> f64 {
    ratio * 100.0
}
