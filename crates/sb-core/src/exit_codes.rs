//! Exit codes for the semibayes CLI.
//!
//! Exit codes communicate operation outcome without requiring output parsing.
//!
//! Exit code ranges:
//! - 0-1: Success/operational outcomes (parse outcome from code, not output)
//! - 10-19: User/environment errors (recoverable by user action)
//! - 20-29: Internal errors (bugs, should be reported)

use sb_common::error::{Error, ErrorCategory};

/// Exit codes for semibayes operations.
///
/// These codes are a stable contract for automation. Changes require
/// a major version bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    // ========================================================================
    // Success / Operational Outcomes (0-1)
    // ========================================================================
    /// Success: training converged / operation completed cleanly
    Clean = 0,

    /// Training hit the cycle cap before converging; artifact still written
    MaxCycles = 1,

    // ========================================================================
    // User / Environment Errors (10-19)
    // ========================================================================
    /// Invalid arguments
    ArgsError = 10,

    /// Malformed training or prediction input
    DataError = 11,

    /// Invalid priors or hyperparameters
    ConfigError = 12,

    /// Feature-vector width disagrees with the model
    DimensionError = 13,

    /// Model artifact missing, corrupted, or incompatible
    ArtifactError = 14,

    // ========================================================================
    // Internal Errors (20-29)
    // ========================================================================
    /// Internal error (bug - please report)
    InternalError = 20,

    /// I/O error
    IoError = 21,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::DimensionMismatch { .. } => ExitCode::DimensionError,
            _ => match err.category() {
                ErrorCategory::Config => ExitCode::ConfigError,
                ErrorCategory::Data => ExitCode::DataError,
                ErrorCategory::Inference => ExitCode::InternalError,
                ErrorCategory::Artifact => ExitCode::ArtifactError,
                ErrorCategory::Io => ExitCode::IoError,
            },
        }
    }
}
