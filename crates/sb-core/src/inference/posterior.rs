//! Parameter posteriors: a C×F Beta grid plus one class Dirichlet.
//!
//! Each M-step recomputes every cell from the prior with the current
//! responsibility-weighted counts; cells are mutually independent and
//! addressed by (class, feature) index.

use crate::config::Priors;
use crate::data::Dataset;
use crate::inference::responsibility::Responsibilities;
use sb_common::{Error, Result};
use sb_math::bernoulli::{self, BetaParams};
use sb_math::dirichlet::{self, DirichletParams};
use sb_math::clamp_unit;

/// Means fed into logarithms are clamped to [ε, 1-ε].
pub const LOG_CLAMP_EPS: f64 = 1e-9;

/// Current belief about all model parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPosterior {
    feature_prior: BetaParams,
    class_prior: DirichletParams,
    /// feature[c][f]: belief about P(feature f = true | class c).
    feature: Vec<Vec<BetaParams>>,
    class: DirichletParams,
}

impl ModelPosterior {
    /// Allocate all posteriors at the prior.
    pub fn from_priors(priors: &Priors, num_classes: usize, num_features: usize) -> Result<Self> {
        priors.validate()?;
        if num_classes < 2 {
            return Err(Error::Config(format!(
                "at least 2 classes required, got {num_classes}"
            )));
        }
        if num_features == 0 {
            return Err(Error::Config("at least one feature required".into()));
        }

        let feature_prior = BetaParams::new(priors.feature_alpha, priors.feature_beta)
            .ok_or_else(|| Error::InvalidPriors("feature Beta prior is degenerate".into()))?;
        let class_prior = DirichletParams::symmetric(num_classes, priors.class_alpha)
            .ok_or_else(|| Error::InvalidPriors("class Dirichlet prior is degenerate".into()))?;

        let feature = vec![vec![feature_prior; num_features]; num_classes];
        let class = class_prior.clone();

        Ok(Self {
            feature_prior,
            class_prior,
            feature,
            class,
        })
    }

    /// Number of classes C.
    pub fn num_classes(&self) -> usize {
        self.feature.len()
    }

    /// Number of features F.
    pub fn num_features(&self) -> usize {
        self.feature[0].len()
    }

    /// The Beta posterior for (class, feature).
    pub fn feature_cell(&self, class: usize, feature: usize) -> &BetaParams {
        &self.feature[class][feature]
    }

    /// The class-proportion Dirichlet posterior.
    pub fn class_posterior(&self) -> &DirichletParams {
        &self.class
    }

    /// M-step: recompute every posterior from the prior using
    /// responsibility-weighted counts.
    ///
    /// For cell (c,f): w1 = Σ_i resp(i,c)·[x_if], w0 = Σ_i resp(i,c)·[¬x_if].
    /// The Dirichlet sees per-class responsibility sums.
    pub fn update(&mut self, dataset: &Dataset, resp: &Responsibilities) -> Result<()> {
        let num_classes = self.num_classes();
        let num_features = self.num_features();
        if dataset.num_features() != num_features {
            return Err(Error::DimensionMismatch {
                what: "feature vector",
                expected: num_features,
                actual: dataset.num_features(),
            });
        }
        if resp.len() != dataset.len() {
            return Err(Error::DimensionMismatch {
                what: "responsibility matrix",
                expected: dataset.len(),
                actual: resp.len(),
            });
        }

        // Per-class responsibility mass and per-(class, feature) true-mass.
        let class_totals = resp.class_totals(num_classes);
        let mut true_weight = vec![vec![0.0; num_features]; num_classes];
        for (inst, row) in dataset.instances().iter().zip(resp.rows()) {
            for (c, &r) in row.iter().enumerate() {
                for (f, &x) in inst.features.iter().enumerate() {
                    if x {
                        true_weight[c][f] += r;
                    }
                }
            }
        }

        for c in 0..num_classes {
            for f in 0..num_features {
                let w1 = true_weight[c][f];
                let w0 = class_totals[c] - w1;
                // Tiny negative residue from float accumulation is not evidence.
                let w0 = w0.max(0.0);
                self.feature[c][f] = bernoulli::posterior_params(&self.feature_prior, w1, w0)
                    .ok_or_else(|| {
                        Error::NumericalInstability(format!(
                            "Beta update for class {c}, feature {f} produced invalid weights ({w1}, {w0})"
                        ))
                    })?;
            }
        }

        self.class = dirichlet::posterior_params(&self.class_prior, &class_totals).ok_or_else(
            || {
                Error::NumericalInstability(
                    "Dirichlet update produced invalid class counts".into(),
                )
            },
        )?;

        Ok(())
    }

    /// The C×F grid of feature-probability posterior means.
    pub fn feature_means(&self) -> Vec<Vec<f64>> {
        self.feature
            .iter()
            .map(|row| row.iter().map(BetaParams::mean).collect())
            .collect()
    }

    /// The C-length vector of class-proportion posterior means.
    pub fn class_means(&self) -> Vec<f64> {
        self.class.mean()
    }

    /// log E[θ_cf] and log(1 - E[θ_cf]) grids, clamped away from ±∞.
    pub fn log_feature_means(&self) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let mut log_true = Vec::with_capacity(self.feature.len());
        let mut log_false = Vec::with_capacity(self.feature.len());
        for row in &self.feature {
            let mut lt = Vec::with_capacity(row.len());
            let mut lf = Vec::with_capacity(row.len());
            for cell in row {
                let mean = clamp_unit(cell.mean(), LOG_CLAMP_EPS);
                lt.push(mean.ln());
                lf.push((1.0 - mean).ln());
            }
            log_true.push(lt);
            log_false.push(lf);
        }
        (log_true, log_false)
    }

    /// log E[π_c] vector, clamped away from -∞.
    pub fn log_class_means(&self) -> Vec<f64> {
        self.class
            .mean()
            .into_iter()
            .map(|m| clamp_unit(m, LOG_CLAMP_EPS).ln())
            .collect()
    }
}
