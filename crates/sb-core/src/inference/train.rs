//! Coordinate-ascent training loop.
//!
//! Alternates M-step (posteriors from responsibilities) and E-step
//! (responsibilities from posteriors) until the posterior means stop
//! moving or the cycle cap is reached. Given identical inputs the
//! produced sequence of posteriors is fully deterministic; no randomized
//! initialization is used anywhere.

use crate::config::Priors;
use crate::data::Dataset;
use crate::inference::posterior::ModelPosterior;
use crate::inference::responsibility::Responsibilities;
use sb_common::{Error, Result};
use tracing::debug;

/// Stopping configuration for the training loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainOptions {
    /// Number of classes C.
    pub num_classes: usize,
    /// Convergence tolerance on the maximum absolute change of any
    /// posterior mean between cycles.
    pub tolerance: f64,
    /// Hard cap on the number of cycles.
    pub max_cycles: usize,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            num_classes: 2,
            tolerance: 1e-6,
            max_cycles: 100,
        }
    }
}

impl TrainOptions {
    /// Validate the stopping configuration.
    pub fn validate(&self) -> Result<()> {
        if self.num_classes < 2 {
            return Err(Error::Config(format!(
                "at least 2 classes required, got {}",
                self.num_classes
            )));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(Error::Config(format!(
                "tolerance must be a positive finite number, got {}",
                self.tolerance
            )));
        }
        if self.max_cycles == 0 {
            return Err(Error::Config("max cycles must be at least 1".into()));
        }
        Ok(())
    }
}

/// How the loop stopped. Both states are terminal and non-error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Posterior means moved less than the tolerance.
    Converged,
    /// The cycle cap was reached first.
    MaxCycles,
}

/// Finalized training state.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainResult {
    /// Finalized parameter posteriors.
    pub posterior: ModelPosterior,
    /// Final responsibility rows for every instance, labeled or not.
    pub responsibilities: Responsibilities,
    /// How the loop stopped.
    pub termination: Termination,
    /// Number of cycles run.
    pub cycles: usize,
}

/// Train posteriors on a partially labeled dataset.
///
/// A pure function of its inputs: no ambient state, no randomness.
pub fn train(dataset: &Dataset, priors: &Priors, options: &TrainOptions) -> Result<TrainResult> {
    options.validate()?;
    dataset.validate_labels(options.num_classes)?;
    let resp = Responsibilities::initialize(dataset, options.num_classes);
    run_cycles(dataset, priors, options, resp)
}

/// Run the loop from an explicit responsibility seed.
///
/// `train` always seeds one-hot/uniform rows; this seam exists so the loop
/// can be re-entered at a previously computed fixed point.
pub(crate) fn run_cycles(
    dataset: &Dataset,
    priors: &Priors,
    options: &TrainOptions,
    mut resp: Responsibilities,
) -> Result<TrainResult> {
    let mut posterior =
        ModelPosterior::from_priors(priors, options.num_classes, dataset.num_features())?;
    let mut prev_feature_means = posterior.feature_means();
    let mut prev_class_means = posterior.class_means();

    for cycle in 1..=options.max_cycles {
        // M-step commits the posteriors the E-step reads; no pipelining
        // across cycles.
        posterior.update(dataset, &resp)?;
        resp.e_step(dataset, &posterior)?;

        let feature_means = posterior.feature_means();
        let class_means = posterior.class_means();
        let delta = max_abs_change(
            &prev_feature_means,
            &prev_class_means,
            &feature_means,
            &class_means,
        );
        debug!(cycle, delta, "training cycle complete");

        if delta < options.tolerance {
            return Ok(TrainResult {
                posterior,
                responsibilities: resp,
                termination: Termination::Converged,
                cycles: cycle,
            });
        }
        prev_feature_means = feature_means;
        prev_class_means = class_means;
    }

    Ok(TrainResult {
        posterior,
        responsibilities: resp,
        termination: Termination::MaxCycles,
        cycles: options.max_cycles,
    })
}

/// Maximum absolute change across the feature-mean grid and the class-mean
/// vector.
fn max_abs_change(
    prev_features: &[Vec<f64>],
    prev_classes: &[f64],
    features: &[Vec<f64>],
    classes: &[f64],
) -> f64 {
    let mut max = 0.0f64;
    for (prev_row, row) in prev_features.iter().zip(features) {
        for (&a, &b) in prev_row.iter().zip(row) {
            max = max.max((a - b).abs());
        }
    }
    for (&a, &b) in prev_classes.iter().zip(classes) {
        max = max.max((a - b).abs());
    }
    max
}
