//! Soft class assignments (responsibilities) per instance.
//!
//! Rows for labeled instances are the one-hot encoding of the observed
//! label and never change; rows for unlabeled instances start uniform and
//! are recomputed from the current posteriors each E-step.

use crate::data::{Dataset, Label};
use crate::inference::posterior::ModelPosterior;
use sb_common::{Error, Result};
use sb_math::normalize_log_probs;

/// N×C matrix of non-negative weights; every row sums to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Responsibilities {
    rows: Vec<Vec<f64>>,
}

impl Responsibilities {
    /// Seed responsibilities: one-hot for labeled instances, uniform for
    /// unlabeled ones.
    ///
    /// Labels must have been validated against `num_classes` beforehand.
    pub fn initialize(dataset: &Dataset, num_classes: usize) -> Self {
        let rows = dataset
            .instances()
            .iter()
            .map(|inst| match inst.label {
                Label::Known(class) => {
                    let mut row = vec![0.0; num_classes];
                    row[class] = 1.0;
                    row
                }
                Label::Unknown => vec![1.0 / num_classes as f64; num_classes],
            })
            .collect();
        Self { rows }
    }

    /// Rebuild a responsibility matrix from explicit rows.
    ///
    /// Used to re-enter the training loop at a previously computed fixed
    /// point. Rows for labeled instances are reset to one-hot regardless of
    /// the given values; unlabeled rows must be distributions of width C.
    pub(crate) fn from_rows(
        rows: Vec<Vec<f64>>,
        dataset: &Dataset,
        num_classes: usize,
    ) -> Result<Self> {
        if rows.len() != dataset.len() {
            return Err(Error::DimensionMismatch {
                what: "responsibility matrix",
                expected: dataset.len(),
                actual: rows.len(),
            });
        }
        let mut out = Vec::with_capacity(rows.len());
        for (inst, row) in dataset.instances().iter().zip(rows) {
            match inst.label {
                Label::Known(class) => {
                    let mut fixed = vec![0.0; num_classes];
                    fixed[class] = 1.0;
                    out.push(fixed);
                }
                Label::Unknown => {
                    if row.len() != num_classes {
                        return Err(Error::DimensionMismatch {
                            what: "responsibility row",
                            expected: num_classes,
                            actual: row.len(),
                        });
                    }
                    let sum: f64 = row.iter().sum();
                    if row.iter().any(|&r| !(0.0..=1.0).contains(&r)) || (sum - 1.0).abs() > 1e-6 {
                        return Err(Error::Inference(
                            "responsibility row is not a probability distribution".into(),
                        ));
                    }
                    out.push(row);
                }
            }
        }
        Ok(Self { rows: out })
    }

    /// Number of instances N.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the matrix has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows in instance order.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// The responsibility row for one instance.
    pub fn row(&self, instance: usize) -> &[f64] {
        &self.rows[instance]
    }

    /// E-step: recompute rows for unlabeled instances from the current
    /// posteriors. Labeled rows are left untouched.
    ///
    /// For each unlabeled instance i and class c the unnormalized log-score
    /// is log E[π_c] + Σ_f x_if·log E[θ_cf] + (1-x_if)·log(1-E[θ_cf]),
    /// normalized per row with the log-sum-exp trick.
    pub fn e_step(&mut self, dataset: &Dataset, posterior: &ModelPosterior) -> Result<()> {
        let num_classes = posterior.num_classes();
        let log_class = posterior.log_class_means();
        let (log_true, log_false) = posterior.log_feature_means();

        for (inst, row) in dataset.instances().iter().zip(self.rows.iter_mut()) {
            if inst.label.is_known() {
                continue;
            }
            let mut scores = Vec::with_capacity(num_classes);
            for c in 0..num_classes {
                let mut score = log_class[c];
                for (f, &x) in inst.features.iter().enumerate() {
                    score += if x { log_true[c][f] } else { log_false[c][f] };
                }
                scores.push(score);
            }
            *row = normalize_log_probs(&scores).ok_or_else(|| {
                Error::NumericalInstability(
                    "responsibility row failed to normalize (non-finite log-scores)".into(),
                )
            })?;
        }
        Ok(())
    }

    /// Per-class responsibility sums Σ_i resp(i,c).
    pub fn class_totals(&self, num_classes: usize) -> Vec<f64> {
        let mut totals = vec![0.0; num_classes];
        for row in &self.rows {
            for (c, &r) in row.iter().enumerate() {
                totals[c] += r;
            }
        }
        totals
    }
}
