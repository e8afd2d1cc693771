//! Prior hyperparameter configuration.
//!
//! Priors are configuration, not learned state: a scalar Beta(α, β) shared
//! across every (class, feature) cell at initialization, and a scalar
//! symmetric Dirichlet concentration for the class proportions.

use sb_common::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bayesian hyperparameters for a training run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Priors {
    /// Alpha of the Beta prior on each (class, feature) success probability.
    #[serde(default = "default_unit")]
    pub feature_alpha: f64,
    /// Beta of the Beta prior on each (class, feature) success probability.
    #[serde(default = "default_unit")]
    pub feature_beta: f64,
    /// Symmetric Dirichlet concentration for the class proportions.
    #[serde(default = "default_unit")]
    pub class_alpha: f64,
}

fn default_unit() -> f64 {
    1.0
}

impl Default for Priors {
    fn default() -> Self {
        Self {
            feature_alpha: 1.0,
            feature_beta: 1.0,
            class_alpha: 1.0,
        }
    }
}

impl Priors {
    /// Validate that every hyperparameter is strictly positive and finite.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("feature_alpha", self.feature_alpha),
            ("feature_beta", self.feature_beta),
            ("class_alpha", self.class_alpha),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidPriors(format!(
                    "{name} must be a strictly positive finite number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Load priors from a JSON file and validate them.
pub fn load_priors(path: &Path) -> Result<Priors> {
    let text = std::fs::read_to_string(path)?;
    let priors: Priors = serde_json::from_str(&text)
        .map_err(|e| Error::InvalidPriors(format!("{}: {e}", path.display())))?;
    priors.validate()?;
    Ok(priors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_non_informative() {
        let p = Priors::default();
        assert_eq!(p.feature_alpha, 1.0);
        assert_eq!(p.feature_beta, 1.0);
        assert_eq!(p.class_alpha, 1.0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_positive() {
        let p = Priors {
            feature_alpha: 0.0,
            ..Priors::default()
        };
        assert!(matches!(p.validate(), Err(Error::InvalidPriors(_))));

        let p = Priors {
            class_alpha: -2.0,
            ..Priors::default()
        };
        assert!(matches!(p.validate(), Err(Error::InvalidPriors(_))));

        let p = Priors {
            feature_beta: f64::NAN,
            ..Priors::default()
        };
        assert!(matches!(p.validate(), Err(Error::InvalidPriors(_))));
    }

    #[test]
    fn json_round_trip_with_partial_fields() {
        // Missing fields fall back to the non-informative default.
        let p: Priors = serde_json::from_str(r#"{ "feature_alpha": 2.5 }"#).unwrap();
        assert_eq!(p.feature_alpha, 2.5);
        assert_eq!(p.feature_beta, 1.0);
        assert_eq!(p.class_alpha, 1.0);
    }

    #[test]
    fn json_rejects_unknown_fields() {
        let res: std::result::Result<Priors, _> =
            serde_json::from_str(r#"{ "feature_alpha": 2.5, "unknown": 1 }"#);
        assert!(res.is_err());
    }
}
