//! Error kinds surfaced by the exposure pipeline.

use thiserror::Error;

/// Errors that can occur while loading reference data or running a query.
#[derive(Debug, Error)]
pub enum ExposureError {
    /// A reference dataset is missing, unreadable or malformed.
    #[error("failed to load {dataset}: {message}")]
    Load { dataset: String, message: String },

    /// The caller supplied an out-of-range coordinate or radius.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Reprojection or geometric intersection failed.
    #[error("computation failed: {0}")]
    Computation(String),
}

impl ExposureError {
    pub fn load(dataset: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Load {
            dataset: dataset.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExposureError>;
