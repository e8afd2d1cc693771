//! Beta-Bernoulli conjugate model for binary features.
//!
//! This module provides posterior updates for per-(class, feature)
//! Bernoulli success probabilities.
//!
//! The model uses:
//! - Prior: `p ~ Beta(α, β)`
//! - Likelihood: `x | p ~ Bernoulli(p)` for binary observations
//! - Posterior after weighted evidence (w1 true, w0 false):
//!   `p | data ~ Beta(α + w1, β + w0)`
//!
//! Weights may be fractional: soft responsibilities from a partially
//! labeled training set contribute effective counts, not just 0/1 tallies.

use serde::{Deserialize, Serialize};

/// Floor applied to method-of-moments shape estimates.
const MOMENT_EPS: f64 = 1e-6;

/// Parameters for a Beta distribution used in Beta-Bernoulli conjugate updates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaParams {
    /// Shape parameter alpha (true-evidence weight + prior)
    pub alpha: f64,
    /// Shape parameter beta (false-evidence weight + prior)
    pub beta: f64,
}

impl BetaParams {
    /// Create new Beta parameters with validation.
    ///
    /// Returns None if parameters are invalid (non-positive, NaN, or infinite).
    pub fn new(alpha: f64, beta: f64) -> Option<Self> {
        if !alpha.is_finite() || !beta.is_finite() || alpha <= 0.0 || beta <= 0.0 {
            return None;
        }
        Some(Self { alpha, beta })
    }

    /// Create Beta(1, 1) non-informative prior.
    pub fn uniform() -> Self {
        Self {
            alpha: 1.0,
            beta: 1.0,
        }
    }

    /// Reconstruct shape parameters from a target mean and variance.
    ///
    /// Method of moments: for mean m in (0,1) and variance v > 0,
    /// t = m(1-m)/v - 1, alpha = m·t, beta = (1-m)·t, each floored at
    /// a small epsilon. Degenerate inputs (boundary mean, zero or
    /// negative variance, NaN) are repaired to Beta(1, 1) rather than
    /// propagating a zero-width distribution.
    pub fn from_mean_variance(mean: f64, variance: f64) -> Self {
        if !(mean > 0.0 && mean < 1.0) || !(variance > 0.0) || !variance.is_finite() {
            return Self::uniform();
        }
        let t = mean * (1.0 - mean) / variance - 1.0;
        let alpha = (mean * t).max(MOMENT_EPS);
        let beta = ((1.0 - mean) * t).max(MOMENT_EPS);
        Self { alpha, beta }
    }

    /// Posterior mean E[p] = α / (α + β).
    pub fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    /// Posterior variance Var[p] = αβ / ((α+β)²(α+β+1)).
    pub fn variance(&self) -> f64 {
        let sum = self.alpha + self.beta;
        (self.alpha * self.beta) / (sum * sum * (sum + 1.0))
    }
}

/// Compute posterior parameters from weighted binary evidence.
///
/// # Arguments
/// * `prior` - Prior Beta parameters
/// * `w1` - Accumulated weight of "true" observations (can be fractional)
/// * `w0` - Accumulated weight of "false" observations (can be fractional)
///
/// # Returns
/// Posterior BetaParams, or None if the weights are negative or non-finite.
///
/// # Example
/// ```
/// use sb_math::bernoulli::{posterior_params, BetaParams};
///
/// let prior = BetaParams::uniform();
/// let posterior = posterior_params(&prior, 7.0, 3.0).unwrap();
/// assert!((posterior.mean() - 8.0 / 12.0).abs() < 1e-12);
/// ```
pub fn posterior_params(prior: &BetaParams, w1: f64, w0: f64) -> Option<BetaParams> {
    if !w1.is_finite() || !w0.is_finite() || w1 < 0.0 || w0 < 0.0 {
        return None;
    }
    BetaParams::new(prior.alpha + w1, prior.beta + w0)
}
