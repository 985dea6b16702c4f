/// Percentile helpers for already-sorted slices.
///
/// - Empty input => `None` (or `0.0` for the f64 convenience wrapper).
/// - `percentile <= 0` => first element.
/// - `percentile >= 100` => last element.
/// - Otherwise we compute a position within `[0, len-1]` and interpolate
///   linearly between the two neighbouring order statistics.

/// Returns the percentile value from a slice that is already sorted in
/// ascending order.
pub fn value_sorted(sorted_values: &[f64], percentile: f64) -> Option<f64> {
    let last = sorted_values.len().checked_sub(1)?;

    if percentile <= 0.0 {
        return sorted_values.first().copied();
    }
    if percentile >= 100.0 {
        return sorted_values.get(last).copied();
    }

    let position = (percentile / 100.0) * last as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    let low_value = sorted_values[lower];
    let high_value = sorted_values[upper];
    Some(low_value + (high_value - low_value) * fraction)
}

/// Convenience wrapper returning `0.0` for empty input.
pub fn value_f64_sorted(sorted_values: &[f64], percentile: f64) -> f64 {
    value_sorted(sorted_values, percentile).unwrap_or(0.0)
}

/// Sorts `values` in place and returns the requested percentiles in order.
pub fn percentiles_of(values: &mut [f64], percentiles: &[f64]) -> Vec<f64> {
    values.sort_by(|a, b| a.total_cmp(b));
    percentiles
        .iter()
        .map(|percentile| value_f64_sorted(values, *percentile))
        .collect()
}
