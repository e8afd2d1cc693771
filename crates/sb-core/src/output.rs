//! Prediction and report payloads.
//!
//! stdout is reserved for these payloads; logs go to stderr. Prediction
//! rows are keyed by the instance's position in the input table and carry
//! the full probability vector plus the argmax class.

use sb_common::{OutputFormat, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One scored instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PredictionRecord {
    /// 0-based position in the input table.
    pub instance: usize,
    /// Probability per class; sums to 1.
    pub probs: Vec<f64>,
    /// Argmax class (ties toward the lower index).
    pub predicted: usize,
}

/// Render prediction records in the requested format.
///
/// CSV shape matches the original tooling: `instance,p0,...,predicted`
/// with probabilities at six decimal places.
pub fn render_predictions(
    format: OutputFormat,
    records: &[PredictionRecord],
    num_classes: usize,
) -> Result<String> {
    match format {
        OutputFormat::Csv => Ok(predictions_to_csv(records, num_classes)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
    }
}

fn predictions_to_csv(records: &[PredictionRecord], num_classes: usize) -> String {
    let mut out = String::from("instance");
    for c in 0..num_classes {
        out.push_str(&format!(",p{c}"));
    }
    out.push_str(",predicted\n");

    for record in records {
        out.push_str(&record.instance.to_string());
        for &p in &record.probs {
            out.push_str(&format!(",{p:.6}"));
        }
        out.push_str(&format!(",{}\n", record.predicted));
    }
    out
}

/// Training run summary printed to stdout.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TrainReport {
    /// Where the artifact was written.
    pub model: String,
    /// Whether the loop converged before the cycle cap.
    pub converged: bool,
    /// Number of cycles run.
    pub cycles: usize,
    /// Table dimensions.
    pub instances: usize,
    pub features: usize,
    pub classes: usize,
    /// Rows without an observed label.
    pub unlabeled: usize,
    /// Where soft posteriors were written, if requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_labels: Option<String>,
}

impl TrainReport {
    /// Human line or JSON, per `--format`.
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Csv => {
                let outcome = if self.converged {
                    format!("converged in {} cycles", self.cycles)
                } else {
                    format!("cycle cap reached after {} cycles", self.cycles)
                };
                let mut line = format!(
                    "Model saved to {} ({outcome}; {} instances, {} features, {} unlabeled)",
                    self.model, self.instances, self.features, self.unlabeled
                );
                if let Some(path) = &self.soft_labels {
                    line.push_str(&format!("\nSoft posteriors for unlabeled rows saved to {path}"));
                }
                Ok(line)
            }
        }
    }
}

/// Prediction run summary printed to stdout.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PredictReport {
    /// Where predictions were written.
    pub output: String,
    /// Rows scored (blank label).
    pub scored: usize,
    /// Total rows in the input table.
    pub total: usize,
}

impl PredictReport {
    /// Human line or JSON, per `--format`.
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Csv => Ok(format!(
                "Predictions written to {} ({} of {} rows scored)",
                self.output, self.scored, self.total
            )),
        }
    }
}

/// `check` command summary.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CheckReport {
    /// Set when a priors file was checked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priors_ok: Option<bool>,
    /// Set when a model artifact was checked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelCheck>,
}

/// Artifact findings for `check`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ModelCheck {
    pub classes: usize,
    pub features: usize,
    /// Cells whose shapes were invalid and fall back to the stored mean.
    pub repaired_cells: usize,
    pub converged: bool,
    pub cycles: usize,
}

impl CheckReport {
    /// Human lines or JSON, per `--format`.
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Csv => {
                let mut lines = Vec::new();
                if let Some(ok) = self.priors_ok {
                    lines.push(if ok {
                        "✓ priors: ok".to_string()
                    } else {
                        "✗ priors: invalid".to_string()
                    });
                }
                if let Some(model) = &self.model {
                    lines.push(format!(
                        "✓ model: {} classes × {} features, {} repaired cells, {}",
                        model.classes,
                        model.features,
                        model.repaired_cells,
                        if model.converged {
                            format!("converged in {} cycles", model.cycles)
                        } else {
                            format!("cycle cap reached after {} cycles", model.cycles)
                        }
                    ));
                }
                Ok(lines.join("\n"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<PredictionRecord> {
        vec![
            PredictionRecord {
                instance: 1,
                probs: vec![0.75, 0.25],
                predicted: 0,
            },
            PredictionRecord {
                instance: 4,
                probs: vec![0.119203, 0.880797],
                predicted: 1,
            },
        ]
    }

    #[test]
    fn csv_shape_matches_original_tooling() {
        let csv = render_predictions(OutputFormat::Csv, &records(), 2).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("instance,p0,p1,predicted"));
        assert_eq!(lines.next(), Some("1,0.750000,0.250000,0"));
        assert_eq!(lines.next(), Some("4,0.119203,0.880797,1"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn csv_header_generalizes_over_classes() {
        let csv = render_predictions(OutputFormat::Csv, &[], 3).unwrap();
        assert_eq!(csv, "instance,p0,p1,p2,predicted\n");
    }

    #[test]
    fn json_predictions_round_trip() {
        let json = render_predictions(OutputFormat::Json, &records(), 2).unwrap();
        let back: Vec<PredictionRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, records());
    }

    #[test]
    fn train_report_renders_both_formats() {
        let report = TrainReport {
            model: "model.json".into(),
            converged: true,
            cycles: 4,
            instances: 10,
            features: 3,
            classes: 2,
            unlabeled: 2,
            soft_labels: Some("soft.csv".into()),
        };
        let human = report.render(OutputFormat::Csv).unwrap();
        assert!(human.contains("converged in 4 cycles"));
        assert!(human.contains("soft.csv"));

        let json = report.render(OutputFormat::Json).unwrap();
        assert!(json.contains("\"converged\": true"));
    }

    #[test]
    fn check_report_mentions_repairs() {
        let report = CheckReport {
            priors_ok: Some(true),
            model: Some(ModelCheck {
                classes: 2,
                features: 4,
                repaired_cells: 1,
                converged: false,
                cycles: 100,
            }),
        };
        let human = report.render(OutputFormat::Csv).unwrap();
        assert!(human.contains("priors: ok"));
        assert!(human.contains("1 repaired cells"));
        assert!(human.contains("cycle cap reached"));
    }
}
