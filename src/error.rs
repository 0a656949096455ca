//! Error types
//!
//! Configuration errors are raised before any draw; numerical errors come from
//! degenerate family parameters.

use thiserror::Error;

/// Errors raised by timestep sampling and its configuration layer.
#[derive(Debug, Error)]
pub enum SamplerError {
    /// Bounds or counts that make the request meaningless.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// A family's shaping parameters produce a degenerate or non-finite density.
    #[error("numerical error: {0}")]
    Numerical(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl SamplerError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn numerical(message: impl Into<String>) -> Self {
        Self::Numerical(message.into())
    }

    /// True for the `Configuration` variant.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// True for the `Numerical` variant.
    pub fn is_numerical(&self) -> bool {
        matches!(self, Self::Numerical(_))
    }
}

pub type Result<T> = std::result::Result<T, SamplerError>;
