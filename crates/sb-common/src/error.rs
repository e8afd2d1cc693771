//! Error types for semibayes.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints for automation
//! - Remediation suggestions for humans
//!
//! # Human-Facing Output
//!
//! Errors can be formatted for human consumption with headline, reason, and fix:
//! ```text
//! ✗ Malformed Training Data
//!   Reason: row 7: label 'x' is neither blank nor an integer
//!   Fix: Labels must be a class index (e.g. 0 or 1) or left blank for unlabeled rows.
//! ```
//!
//! # Machine-Facing Output
//!
//! Errors serialize to structured JSON:
//! ```json
//! {
//!   "code": 22,
//!   "category": "data",
//!   "message": "dimension mismatch for feature vector: expected 2, got 3",
//!   "recoverable": true
//! }
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for semibayes operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Configuration errors (priors, hyperparameters).
    Config,
    /// Training/prediction input errors (CSV rows, labels, dimensions).
    Data,
    /// Bayesian inference and numerical errors.
    Inference,
    /// Model artifact errors (missing sections, schema mismatch).
    Artifact,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Data => write!(f, "data"),
            ErrorCategory::Inference => write!(f, "inference"),
            ErrorCategory::Artifact => write!(f, "artifact"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for semibayes.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid priors: {0}")]
    InvalidPriors(String),

    // Data errors (20-29)
    #[error("data loading failed: {0}")]
    Data(String),

    #[error("row {row}: {message}")]
    MalformedRow { row: usize, message: String },

    #[error("dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    // Inference errors (30-39)
    #[error("inference failed: {0}")]
    Inference(String),

    #[error("numerical instability detected: {0}")]
    NumericalInstability(String),

    // Artifact errors (40-49)
    #[error("model artifact missing required section: {field}")]
    ArtifactMissingField { field: &'static str },

    #[error("model artifact corrupted: {0}")]
    ArtifactCorrupted(String),

    #[error("model schema version mismatch: found {found}, expected {expected}")]
    SchemaVersionMismatch { found: u32, expected: u32 },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Data errors
    /// - 30-39: Inference errors
    /// - 40-49: Artifact errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidPriors(_) => 11,
            Error::Data(_) => 20,
            Error::MalformedRow { .. } => 21,
            Error::DimensionMismatch { .. } => 22,
            Error::Inference(_) => 30,
            Error::NumericalInstability(_) => 31,
            Error::ArtifactMissingField { .. } => 40,
            Error::ArtifactCorrupted(_) => 41,
            Error::SchemaVersionMismatch { .. } => 42,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::InvalidPriors(_) => ErrorCategory::Config,

            Error::Data(_) | Error::MalformedRow { .. } | Error::DimensionMismatch { .. } => {
                ErrorCategory::Data
            }

            Error::Inference(_) | Error::NumericalInstability(_) => ErrorCategory::Inference,

            Error::ArtifactMissingField { .. }
            | Error::ArtifactCorrupted(_)
            | Error::SchemaVersionMismatch { .. } => ErrorCategory::Artifact,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable by user action.
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Config errors: recoverable by fixing the priors/flags
            Error::Config(_) => true,
            Error::InvalidPriors(_) => true,

            // Data errors: recoverable by fixing the input table
            Error::Data(_) => true,
            Error::MalformedRow { .. } => true,
            Error::DimensionMismatch { .. } => true,

            // Inference errors: deterministic, so a retry cannot help
            Error::Inference(_) => false,
            Error::NumericalInstability(_) => false,

            // Artifact errors: recoverable by retraining
            Error::ArtifactMissingField { .. } => true,
            Error::ArtifactCorrupted(_) => true,
            Error::SchemaVersionMismatch { .. } => true,

            // I/O: often transient
            Error::Io(_) => true,
            Error::Json(_) => true,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => {
                "Check the training flags (--classes, --tolerance, --max-cycles) for valid values."
            }
            Error::InvalidPriors(_) => {
                "Prior hyperparameters must be strictly positive. Fix the priors file or the --feature-alpha/--feature-beta/--class-alpha flags."
            }

            Error::Data(_) => {
                "Check that the CSV has a header row, comma-separated feature columns, and a trailing label column."
            }
            Error::MalformedRow { .. } => {
                "Labels must be a class index (e.g. 0 or 1) or left blank for unlabeled rows; every row needs the same number of feature columns."
            }
            Error::DimensionMismatch { .. } => {
                "The input table must have exactly as many feature columns as the model was trained on."
            }

            Error::Inference(_) => {
                "Internal inference invariant breached. Report this with the training input that triggered it."
            }
            Error::NumericalInstability(_) => {
                "Internal numerical issue. Report this with the training input that triggered it."
            }

            Error::ArtifactMissingField { .. } => {
                "The model file is incomplete. Retrain with 'semibayes train' to produce a fresh artifact."
            }
            Error::ArtifactCorrupted(_) => {
                "Invalid model JSON. Check syntax with 'cat <file> | jq .' or retrain to produce a fresh artifact."
            }
            Error::SchemaVersionMismatch { .. } => {
                "The model was written by an incompatible version. Retrain with this version of semibayes."
            }

            Error::Io(_) => {
                "Check disk space, permissions, and that the given paths exist. Retry the operation."
            }
            Error::Json(_) => "Invalid JSON input. Check syntax with 'cat <file> | jq .'.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidPriors(_) => "Invalid Priors",

            Error::Data(_) => "Data Loading Error",
            Error::MalformedRow { .. } => "Malformed Training Data",
            Error::DimensionMismatch { .. } => "Dimension Mismatch",

            Error::Inference(_) => "Inference Error",
            Error::NumericalInstability(_) => "Numerical Instability",

            Error::ArtifactMissingField { .. } => "Incomplete Model Artifact",
            Error::ArtifactCorrupted(_) => "Corrupted Model Artifact",
            Error::SchemaVersionMismatch { .. } => "Model Schema Mismatch",

            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Additional structured context (e.g., row number, expected width).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::MalformedRow { row, .. } => {
                context.insert("row".to_string(), serde_json::json!(row));
            }
            Error::DimensionMismatch {
                what,
                expected,
                actual,
            } => {
                context.insert("what".to_string(), serde_json::json!(what));
                context.insert("expected".to_string(), serde_json::json!(expected));
                context.insert("actual".to_string(), serde_json::json!(actual));
            }
            Error::SchemaVersionMismatch { found, expected } => {
                context.insert("found".to_string(), serde_json::json!(found));
                context.insert("expected".to_string(), serde_json::json!(expected));
            }
            Error::ArtifactMissingField { field } => {
                context.insert("field".to_string(), serde_json::json!(field));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context,
        }
    }
}

impl StructuredError {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(Error::Config("test".into()).code(), 10);
        assert_eq!(
            Error::MalformedRow {
                row: 3,
                message: "bad".into()
            }
            .code(),
            21
        );
        assert_eq!(
            Error::DimensionMismatch {
                what: "feature vector",
                expected: 2,
                actual: 3
            }
            .code(),
            22
        );
        assert_eq!(Error::ArtifactMissingField { field: "class_prob" }.code(), 40);
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            Error::InvalidPriors("test".into()).category(),
            ErrorCategory::Config
        );
        assert_eq!(
            Error::DimensionMismatch {
                what: "feature vector",
                expected: 2,
                actual: 3
            }
            .category(),
            ErrorCategory::Data
        );
        assert_eq!(
            Error::SchemaVersionMismatch {
                found: 0,
                expected: 1
            }
            .category(),
            ErrorCategory::Artifact
        );
    }

    #[test]
    fn test_error_recoverable() {
        assert!(Error::InvalidPriors("test".into()).is_recoverable());
        assert!(Error::ArtifactCorrupted("test".into()).is_recoverable());
        assert!(!Error::NumericalInstability("test".into()).is_recoverable());
    }

    #[test]
    fn test_structured_error_from_error() {
        let err = Error::DimensionMismatch {
            what: "feature vector",
            expected: 2,
            actual: 3,
        };
        let structured = StructuredError::from(&err);

        assert_eq!(structured.code, 22);
        assert_eq!(structured.category, ErrorCategory::Data);
        assert!(structured.recoverable);
        assert_eq!(structured.context.get("expected"), Some(&serde_json::json!(2)));
        assert_eq!(structured.context.get("actual"), Some(&serde_json::json!(3)));
    }

    #[test]
    fn test_structured_error_json() {
        let err = Error::MalformedRow {
            row: 7,
            message: "label 'x' is neither blank nor an integer".into(),
        };
        let json = StructuredError::from(&err).to_json();

        assert!(json.contains(r#""code":21"#));
        assert!(json.contains(r#""category":"data""#));
        assert!(json.contains(r#""recoverable":true"#));
    }

    #[test]
    fn test_format_error_human() {
        let err = Error::DimensionMismatch {
            what: "feature vector",
            expected: 2,
            actual: 3,
        };
        let formatted = format_error_human(&err, false);

        assert!(formatted.contains("Dimension Mismatch"));
        assert!(formatted.contains("expected 2, got 3"));
        assert!(formatted.contains("feature columns"));
    }

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Config.to_string(), "config");
        assert_eq!(ErrorCategory::Artifact.to_string(), "artifact");
    }
}
