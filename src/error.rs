//! Error taxonomy for Mantel comparisons
//!
//! Recoverable variants (`GroupNotFound`, `NoCommonSamples`, `TooFewSamples`)
//! are turned into skipped comparisons by the runner. Everything else is fatal.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MantelError {
    #[error("group '{prefix}' not found in {dataset}")]
    GroupNotFound { dataset: String, prefix: String },

    #[error("no common samples between {dataset} and {other} for prefix '{prefix}'")]
    NoCommonSamples {
        dataset: String,
        other: String,
        prefix: String,
    },

    #[error("at least {needed} samples required, found {found}")]
    TooFewSamples { needed: usize, found: usize },

    #[error("distance matrices differ in size ({left} vs {right})")]
    DimensionMismatch { left: usize, right: usize },

    #[error("sample prefix must not be empty")]
    EmptyPrefix,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MantelError {
    /// Whether the batch should skip this comparison and carry on
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MantelError::GroupNotFound { .. }
                | MantelError::NoCommonSamples { .. }
                | MantelError::TooFewSamples { .. }
        )
    }
}
