//! Numerically stable primitives for log-domain Bayesian math.

/// Stable log(sum(exp(values))).
///
/// Returns NEG_INFINITY for empty input or all -inf inputs.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NEG_INFINITY;
    }
    if values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    if max == f64::INFINITY {
        return f64::INFINITY;
    }
    let mut sum = 0.0;
    for v in values {
        sum += (*v - max).exp();
    }
    max + sum.ln()
}

/// Normalize a vector of log-scores into a probability vector.
///
/// Subtracts the maximum before exponentiating, so the result is invariant
/// to adding a constant to every entry and safe for very negative scores.
/// Returns None for empty input, NaN entries, or all -inf entries.
pub fn normalize_log_probs(log_scores: &[f64]) -> Option<Vec<f64>> {
    if log_scores.is_empty() {
        return None;
    }
    if log_scores.iter().any(|v| v.is_nan()) {
        return None;
    }
    let max = log_scores
        .iter()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return None;
    }
    let unnorm: Vec<f64> = log_scores.iter().map(|lp| (lp - max).exp()).collect();
    let sum: f64 = unnorm.iter().sum();
    if sum <= 0.0 || !sum.is_finite() {
        return None;
    }
    Some(unnorm.into_iter().map(|x| x / sum).collect())
}

/// Clamp a probability into [eps, 1 - eps].
///
/// Means fed into logarithms must never be exactly 0 or 1; an extreme but
/// proper posterior stays strictly inside the unit interval.
pub fn clamp_unit(p: f64, eps: f64) -> f64 {
    if p.is_nan() {
        return f64::NAN;
    }
    p.max(eps).min(1.0 - eps)
}
