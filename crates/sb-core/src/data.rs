//! CSV ingestion of partially labeled binary feature tables.
//!
//! Table shape: a header row (skipped), then one row per instance with
//! comma-separated feature columns and a trailing label column. Feature
//! tokens equal to `1` or `true` (case-insensitive) are true, all else
//! false. A blank label marks the instance as unlabeled; anything else
//! must parse as a non-negative class index.
//!
//! All validation is fail-fast: a malformed row aborts loading with its
//! 1-based row number before any posterior work begins.

use sb_common::{Error, Result};
use std::path::Path;

/// Class label state for one instance.
///
/// "Unknown" is a first-class state, not a sentinel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    /// Observed class index in [0, C).
    Known(usize),
    /// No label observed; the training loop infers a soft posterior.
    Unknown,
}

impl Label {
    /// True when the label was observed.
    pub fn is_known(&self) -> bool {
        matches!(self, Label::Known(_))
    }
}

/// One training or prediction instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    /// Fixed-length boolean feature vector.
    pub features: Vec<bool>,
    /// Observed label, if any.
    pub label: Label,
}

/// A fixed-width table of instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    instances: Vec<Instance>,
    num_features: usize,
}

impl Dataset {
    /// Build a dataset from instances, enforcing rectangularity.
    pub fn new(instances: Vec<Instance>) -> Result<Self> {
        let num_features = match instances.first() {
            Some(first) => first.features.len(),
            None => return Err(Error::Data("table contains no instances".into())),
        };
        if num_features == 0 {
            return Err(Error::Data("instances have no feature columns".into()));
        }
        for inst in &instances {
            if inst.features.len() != num_features {
                return Err(Error::DimensionMismatch {
                    what: "feature vector",
                    expected: num_features,
                    actual: inst.features.len(),
                });
            }
        }
        Ok(Self {
            instances,
            num_features,
        })
    }

    /// All instances in table order.
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Number of instances N.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// True when the table holds no instances.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Feature-vector width F.
    pub fn num_features(&self) -> usize {
        self.num_features
    }

    /// Indices of instances without an observed label, in table order.
    pub fn unlabeled_indices(&self) -> Vec<usize> {
        self.instances
            .iter()
            .enumerate()
            .filter(|(_, inst)| !inst.label.is_known())
            .map(|(i, _)| i)
            .collect()
    }

    /// Reject any observed label outside [0, num_classes).
    pub fn validate_labels(&self, num_classes: usize) -> Result<()> {
        for (idx, inst) in self.instances.iter().enumerate() {
            if let Label::Known(c) = inst.label {
                if c >= num_classes {
                    return Err(Error::Data(format!(
                        "instance {idx}: label {c} is outside the configured {num_classes} classes"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Load a dataset from a CSV file.
///
/// The first line is treated as a header and skipped; empty lines are
/// ignored.
pub fn load_csv(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path)?;
    parse_csv(&text)
}

/// Parse CSV text into a dataset. See [`load_csv`].
pub fn parse_csv(text: &str) -> Result<Dataset> {
    let mut instances = Vec::new();
    let mut expected_width: Option<usize> = None;

    // Row numbers are 1-based and include the header, so error messages
    // match what an editor shows.
    for (line_idx, line) in text.lines().enumerate() {
        let row = line_idx + 1;
        if line_idx == 0 {
            continue; // header
        }
        if line.trim().is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() < 2 {
            return Err(Error::MalformedRow {
                row,
                message: "expected at least one feature column and a label column".into(),
            });
        }

        let label_part = parts[parts.len() - 1];
        let feature_parts = &parts[..parts.len() - 1];

        let features: Vec<bool> = feature_parts
            .iter()
            .map(|raw| {
                let token = raw.trim().to_ascii_lowercase();
                token == "1" || token == "true"
            })
            .collect();

        match expected_width {
            None => expected_width = Some(features.len()),
            Some(width) if width != features.len() => {
                return Err(Error::MalformedRow {
                    row,
                    message: format!(
                        "expected {width} feature columns, found {}",
                        features.len()
                    ),
                });
            }
            Some(_) => {}
        }

        let label_token = label_part.trim();
        let label = if label_token.is_empty() {
            Label::Unknown
        } else {
            let class = label_token.parse::<usize>().map_err(|_| Error::MalformedRow {
                row,
                message: format!("label '{label_token}' is neither blank nor an integer"),
            })?;
            Label::Known(class)
        };

        instances.push(Instance { features, label });
    }

    Dataset::new(instances)
}
