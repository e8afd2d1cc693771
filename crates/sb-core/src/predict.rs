//! Posterior predictive classification.
//!
//! A pure function from point summaries of the finalized posteriors and a
//! new feature vector to a class probability vector: log-space Naive Bayes
//! combination, normalized with the log-sum-exp trick.

use crate::inference::LOG_CLAMP_EPS;
use crate::model::PointModel;
use sb_common::{Error, Result};
use sb_math::{clamp_unit, normalize_log_probs};

/// Posterior predictive class distribution for one feature vector.
///
/// For each class c:
/// logp(c) = log(classMean_c) + Σ_f [ x_f·log(p_cf) + (1-x_f)·log(1-p_cf) ]
/// with every mean clamped into [ε, 1-ε] before the logarithm. Fails with
/// a dimension mismatch if the vector width disagrees with the model.
pub fn predict_probs(model: &PointModel, features: &[bool]) -> Result<Vec<f64>> {
    let num_features = model.num_features();
    if features.len() != num_features {
        return Err(Error::DimensionMismatch {
            what: "feature vector",
            expected: num_features,
            actual: features.len(),
        });
    }

    let mut log_scores = Vec::with_capacity(model.num_classes());
    for (class_mean, feature_row) in model.class_means.iter().zip(&model.feature_means) {
        let mut score = clamp_unit(*class_mean, LOG_CLAMP_EPS).ln();
        for (&p, &x) in feature_row.iter().zip(features) {
            let p = clamp_unit(p, LOG_CLAMP_EPS);
            score += if x { p.ln() } else { (1.0 - p).ln() };
        }
        log_scores.push(score);
    }

    normalize_log_probs(&log_scores).ok_or_else(|| {
        Error::NumericalInstability("predictive distribution failed to normalize".into())
    })
}

/// Argmax of a probability vector; ties break toward the lower class index.
pub fn predicted_class(probs: &[f64]) -> usize {
    let mut best = 0;
    for (c, &p) in probs.iter().enumerate().skip(1) {
        if p > probs[best] {
            best = c;
        }
    }
    best
}
