//! Error types for data cube construction.

use thiserror::Error;

/// Result type alias using CubeError.
pub type CubeResult<T> = Result<T, CubeError>;

/// Construction-time failures.
///
/// These are configuration or programming errors, never data-quality
/// findings. Data-quality findings are reported as issues by the verifier.
#[derive(Debug, Error)]
pub enum CubeError {
    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid CRS: {0}")]
    InvalidCrs(String),

    #[error("Invalid time specification: {0}")]
    InvalidTime(String),

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Projection error: {0}")]
    Projection(#[from] projection::ProjectionError),
}

impl CubeError {
    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an InvalidCrs error.
    pub fn invalid_crs(msg: impl Into<String>) -> Self {
        Self::InvalidCrs(msg.into())
    }

    /// Create an InvalidTime error.
    pub fn invalid_time(msg: impl Into<String>) -> Self {
        Self::InvalidTime(msg.into())
    }

    /// Create an InvalidDimensions error.
    pub fn invalid_dimensions(msg: impl Into<String>) -> Self {
        Self::InvalidDimensions(msg.into())
    }
}

impl From<serde_json::Error> for CubeError {
    fn from(err: serde_json::Error) -> Self {
        CubeError::Config(format!("JSON error: {}", err))
    }
}
