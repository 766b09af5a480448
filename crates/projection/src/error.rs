//! Error types for projection operations.

use thiserror::Error;

/// Errors raised by projection math.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProjectionError {
    /// The input coordinate lies outside the domain of the projection.
    #[error("coordinate ({x}, {y}) is outside the projection domain: {reason}")]
    OutOfDomain { x: f64, y: f64, reason: String },

    /// Projection parameters are invalid.
    #[error("invalid projection parameters: {0}")]
    InvalidParameters(String),
}

impl ProjectionError {
    pub(crate) fn out_of_domain(x: f64, y: f64, reason: impl Into<String>) -> Self {
        Self::OutOfDomain {
            x,
            y,
            reason: reason.into(),
        }
    }
}
