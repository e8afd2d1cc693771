//! Model artifact serialization.
//!
//! The artifact is the only training state that survives a run: per-cell
//! Beta summaries (mean, variance, shape parameters), the class-proportion
//! means, and optionally the soft label posteriors inferred for unlabeled
//! training rows. Loading is strict: required sections must be present and
//! consistent, though individual cells may fall back to their stored mean
//! when the shape parameters are invalid.

use crate::data::Dataset;
use crate::inference::{Termination, TrainResult};
use chrono::{DateTime, Utc};
use sb_common::{Error, Result, SCHEMA_VERSION};
use sb_math::bernoulli::BetaParams;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serialized summary of one feature-probability posterior cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FeatureCell {
    /// Posterior mean of P(feature = true | class).
    pub mean: f64,
    /// Posterior variance.
    pub variance: f64,
    /// Derived Beta shape parameter alpha.
    pub alpha: f64,
    /// Derived Beta shape parameter beta.
    pub beta: f64,
}

impl FeatureCell {
    /// Summarize a Beta posterior.
    pub fn from_params(params: &BetaParams) -> Self {
        Self {
            mean: params.mean(),
            variance: params.variance(),
            alpha: params.alpha,
            beta: params.beta,
        }
    }

    /// True when the stored shape parameters describe a proper Beta.
    pub fn has_valid_shapes(&self) -> bool {
        self.alpha.is_finite() && self.beta.is_finite() && self.alpha > 0.0 && self.beta > 0.0
    }

    /// Point estimate for prediction: α/(α+β) when the shapes are valid,
    /// else the stored mean.
    pub fn point_mean(&self) -> f64 {
        if self.has_valid_shapes() {
            self.alpha / (self.alpha + self.beta)
        } else {
            self.mean
        }
    }

    /// Reconstruct a full Beta posterior: the stored shapes when valid,
    /// else method-of-moments from the stored mean and variance.
    pub fn to_params(&self) -> BetaParams {
        BetaParams::new(self.alpha, self.beta)
            .unwrap_or_else(|| BetaParams::from_mean_variance(self.mean, self.variance))
    }
}

/// Soft label posterior for one instance that was unlabeled during training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SoftLabel {
    /// 0-based position in the training table.
    pub instance: usize,
    /// Probability per class; sums to 1.
    pub probs: Vec<f64>,
}

/// The serialized form of finalized posteriors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModelArtifact {
    /// Artifact layout version; loaders reject other versions.
    pub schema_version: u32,
    /// When training finished.
    pub trained_at: DateTime<Utc>,
    /// Number of classes C.
    pub num_classes: usize,
    /// Number of features F.
    pub num_features: usize,
    /// Whether the training loop converged (vs. hitting the cycle cap).
    pub converged: bool,
    /// Number of training cycles run.
    pub cycles: usize,
    /// C×F grid of feature-probability posterior summaries.
    pub feature_prob: Vec<Vec<FeatureCell>>,
    /// Class-proportion posterior means; sums to 1.
    pub class_prob: Vec<f64>,
    /// Soft label posteriors for rows unlabeled during training.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_posteriors: Option<Vec<SoftLabel>>,
}

impl ModelArtifact {
    /// Build an artifact from a finished training run.
    ///
    /// Soft label posteriors are included only when requested, and only for
    /// rows whose label was unknown during training.
    pub fn from_training(
        result: &TrainResult,
        dataset: &Dataset,
        include_soft_labels: bool,
    ) -> Self {
        let posterior = &result.posterior;
        let num_classes = posterior.num_classes();
        let num_features = posterior.num_features();

        let feature_prob = (0..num_classes)
            .map(|c| {
                (0..num_features)
                    .map(|f| FeatureCell::from_params(posterior.feature_cell(c, f)))
                    .collect()
            })
            .collect();

        let label_posteriors = include_soft_labels.then(|| {
            dataset
                .unlabeled_indices()
                .into_iter()
                .map(|i| SoftLabel {
                    instance: i,
                    probs: result.responsibilities.row(i).to_vec(),
                })
                .collect()
        });

        Self {
            schema_version: SCHEMA_VERSION,
            trained_at: Utc::now(),
            num_classes,
            num_features,
            converged: result.termination == Termination::Converged,
            cycles: result.cycles,
            feature_prob,
            class_prob: posterior.class_means(),
            label_posteriors,
        }
    }

    /// Write the artifact as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate an artifact.
    ///
    /// Missing top-level sections are a data-integrity error, never
    /// silently defaulted.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let value: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| Error::ArtifactCorrupted(format!("{}: {e}", path.display())))?;

        if !value.is_object() {
            return Err(Error::ArtifactCorrupted(
                "top level is not a JSON object".into(),
            ));
        }
        for field in ["feature_prob", "class_prob"] {
            if value.get(field).is_none() {
                return Err(Error::ArtifactMissingField { field });
            }
        }

        let artifact: ModelArtifact = serde_json::from_value(value)
            .map_err(|e| Error::ArtifactCorrupted(format!("{}: {e}", path.display())))?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(Error::SchemaVersionMismatch {
                found: self.schema_version,
                expected: SCHEMA_VERSION,
            });
        }
        if self.feature_prob.is_empty() || self.feature_prob[0].is_empty() {
            return Err(Error::ArtifactCorrupted(
                "feature_prob grid is empty".into(),
            ));
        }
        if self.feature_prob.len() != self.num_classes {
            return Err(Error::ArtifactCorrupted(format!(
                "feature_prob has {} classes, header says {}",
                self.feature_prob.len(),
                self.num_classes
            )));
        }
        for (c, row) in self.feature_prob.iter().enumerate() {
            if row.len() != self.num_features {
                return Err(Error::ArtifactCorrupted(format!(
                    "feature_prob row {c} has {} features, header says {}",
                    row.len(),
                    self.num_features
                )));
            }
        }
        if self.class_prob.len() != self.num_classes {
            return Err(Error::ArtifactCorrupted(format!(
                "class_prob has {} entries, header says {} classes",
                self.class_prob.len(),
                self.num_classes
            )));
        }
        Ok(())
    }

    /// Number of cells whose shape parameters were invalid and will fall
    /// back to the stored mean.
    pub fn degenerate_cells(&self) -> usize {
        self.feature_prob
            .iter()
            .flatten()
            .filter(|cell| !cell.has_valid_shapes())
            .count()
    }

    /// Collapse the artifact to the point estimates used for prediction.
    pub fn point_model(&self) -> PointModel {
        PointModel {
            feature_means: self
                .feature_prob
                .iter()
                .map(|row| row.iter().map(FeatureCell::point_mean).collect())
                .collect(),
            class_means: self.class_prob.clone(),
        }
    }
}

/// Point summaries of the finalized posteriors, as consumed by the
/// predictor. Immutable once built; safe to share across prediction calls.
#[derive(Debug, Clone, PartialEq)]
pub struct PointModel {
    /// feature_means[c][f] = E[θ_cf].
    pub feature_means: Vec<Vec<f64>>,
    /// class_means[c] = E[π_c].
    pub class_means: Vec<f64>,
}

impl PointModel {
    /// Number of classes C.
    pub fn num_classes(&self) -> usize {
        self.feature_means.len()
    }

    /// Number of features F.
    pub fn num_features(&self) -> usize {
        self.feature_means.first().map_or(0, Vec::len)
    }
}
