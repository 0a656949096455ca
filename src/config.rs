//! Sampling configuration
//!
//! Loaded from JSON or built in code, and validated before every sampling call.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::distribution::DistributionKind;
use crate::error::{Result, SamplerError};

/// The five scalars that drive timestep sampling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamplingConfig {
    pub distribution: DistributionKind,
    /// Lower end of the noising-strength window, in `[0, 1]`.
    pub min_strength: f64,
    /// Upper end of the noising-strength window, in `[0, 1]`.
    pub max_strength: f64,
    /// Shape parameter; meaning depends on `distribution`.
    pub weight: f64,
    /// Shift parameter; meaning depends on `distribution`.
    pub bias: f64,
}

impl SamplingConfig {
    pub fn new(
        distribution: DistributionKind,
        min_strength: f64,
        max_strength: f64,
        weight: f64,
        bias: f64,
    ) -> Self {
        Self {
            distribution,
            min_strength,
            max_strength,
            weight,
            bias,
        }
    }

    /// Unshaped config for `distribution` over the full strength range.
    pub fn baseline(distribution: DistributionKind) -> Self {
        Self {
            distribution,
            ..Self::default()
        }
    }

    pub fn with_strength_range(mut self, min_strength: f64, max_strength: f64) -> Self {
        self.min_strength = min_strength;
        self.max_strength = max_strength;
        self
    }

    pub fn with_shape(mut self, weight: f64, bias: f64) -> Self {
        self.weight = weight;
        self.bias = bias;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min_strength.is_finite() || !self.max_strength.is_finite() {
            return Err(SamplerError::config(
                "min_strength and max_strength must be finite",
            ));
        }

        if !(0.0..=1.0).contains(&self.min_strength) || !(0.0..=1.0).contains(&self.max_strength)
        {
            return Err(SamplerError::config(format!(
                "strengths must lie in [0, 1] (got min={}, max={})",
                self.min_strength, self.max_strength
            )));
        }

        if self.min_strength > self.max_strength {
            return Err(SamplerError::config(format!(
                "min_strength {} is greater than max_strength {}",
                self.min_strength, self.max_strength
            )));
        }

        if !self.weight.is_finite() || !self.bias.is_finite() {
            return Err(SamplerError::config("weight and bias must be finite"));
        }

        Ok(())
    }

    /// Width of the strength window.
    pub fn span(&self) -> f64 {
        self.max_strength - self.min_strength
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: SamplingConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            distribution: DistributionKind::Uniform,
            min_strength: 0.0,
            max_strength: 1.0,
            weight: 1.0,
            bias: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid_baseline() {
        let config = SamplingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.weight, 1.0);
        assert_eq!(config.bias, 0.0);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let config = SamplingConfig::default().with_strength_range(0.6, 0.3);
        assert!(config.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn test_out_of_range_strength_rejected() {
        let config = SamplingConfig::default().with_strength_range(-0.1, 0.5);
        assert!(config.validate().is_err());
        let config = SamplingConfig::default().with_strength_range(0.2, 1.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nan_rejected() {
        let config = SamplingConfig::default().with_shape(f64::NAN, 0.0);
        assert!(config.validate().unwrap_err().is_configuration());
        let config = SamplingConfig::default().with_strength_range(f64::NAN, 0.5);
        assert!(config.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config =
            SamplingConfig::from_json_str(r#"{"distribution": "LOGIT_NORMAL", "bias": -0.5}"#)
                .unwrap();
        assert_eq!(config.distribution, DistributionKind::LogitNormal);
        assert_eq!(config.bias, -0.5);
        assert_eq!(config.max_strength, 1.0);
    }

    #[test]
    fn test_json_validation_runs() {
        let err = SamplingConfig::from_json_str(r#"{"min_strength": 0.9, "max_strength": 0.1}"#)
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_unknown_json_field_rejected() {
        let err = SamplingConfig::from_json_str(r#"{"noise_offset": 0.1}"#).unwrap_err();
        assert!(matches!(err, SamplerError::Json(_)));
    }
}
