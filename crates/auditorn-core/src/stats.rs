//! Reducers applied across trials.
//!
//! `sum`, `min` and `max` have no value for an empty input and return `None`.

pub fn sum(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(|acc, v| acc + v)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

/// Middle value of `values`, `0` when empty.
///
/// Parity is taken on the middle index `c = n / 2`, not on the length: an even
/// `c` returns `sorted[c]`, an odd `c` averages `sorted[c - 1]` and
/// `sorted[c]`. For `[1, 2, 3, 4]` this yields `3` and for `[1, 2, 3]` it
/// yields `1.5`, which differs from the textbook median. Published summaries
/// were computed this way, so the rule is kept.
pub fn median(values: &[f64]) -> f64 {
    match values {
        [] => 0.0,
        [only] => *only,
        _ => {
            let mut sorted = values.to_vec();
            sorted.sort_by(f64::total_cmp);
            let center = sorted.len() / 2;
            if center.is_multiple_of(2) {
                sorted[center]
            } else {
                (sorted[center - 1] + sorted[center]) / 2.0
            }
        }
    }
}
