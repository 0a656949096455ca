//! Timestep distribution families
//!
//! Each family draws a normalized noising strength on `[0, 1]` and is
//! reshaped by two scalars, `weight` and `bias`. With `weight = 1` and
//! `bias = 0` every family reduces to its unshaped baseline:
//!
//! | family             | weight                    | bias                  | baseline                   |
//! |--------------------|---------------------------|-----------------------|----------------------------|
//! | `Uniform`          | unused                    | timestep shift        | `U[0, 1]`                  |
//! | `Sigmoid`          | slope of the density      | centre of the density | density `∝ σ(x)`           |
//! | `LogitNormal`      | std-dev in logit space    | mean in logit space   | standard logit-normal      |
//! | `HeavyTail`        | `1 + k`, tail scale `k`   | timestep shift        | `U[0, 1]`                  |
//! | `CosMap`           | exponent on the odds      | timestep shift        | `1 - 1/(tan(πu/2) + 1)`    |
//! | `InvertedParabola` | `Beta(w + 1, w + 1)`      | timestep shift        | `6x(1 - x)`                |
//!
//! The timestep shift is `s·t / (1 + (s - 1)·t)` with `s = e^bias`, a
//! monotone bijection of `[0, 1]` that is the identity at `bias = 0`.

use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand_distr::{Beta, Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SamplerError};

/// Upper bound of the heavy-tail scale that keeps the mapping monotone.
pub const HEAVY_TAIL_MAX_SCALE: f64 = 2.0 / (PI - 2.0);

/// Below this slope the sigmoid density is treated as flat.
const SIGMOID_FLAT_SLOPE: f64 = 1e-6;

/// Below this logit the sigmoid equals `e^z` to double precision.
const SIGMOID_EXP_TAIL: f64 = -30.0;

/// Sampling family for training timesteps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistributionKind {
    #[default]
    Uniform,
    Sigmoid,
    LogitNormal,
    HeavyTail,
    CosMap,
    InvertedParabola,
}

impl DistributionKind {
    pub const ALL: [DistributionKind; 6] = [
        DistributionKind::Uniform,
        DistributionKind::Sigmoid,
        DistributionKind::LogitNormal,
        DistributionKind::HeavyTail,
        DistributionKind::CosMap,
        DistributionKind::InvertedParabola,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DistributionKind::Uniform => "UNIFORM",
            DistributionKind::Sigmoid => "SIGMOID",
            DistributionKind::LogitNormal => "LOGIT_NORMAL",
            DistributionKind::HeavyTail => "HEAVY_TAIL",
            DistributionKind::CosMap => "COS_MAP",
            DistributionKind::InvertedParabola => "INVERTED_PARABOLA",
        }
    }

    /// Check the family's parameter domain and precompute what each draw needs.
    pub fn shape(self, weight: f64, bias: f64) -> Result<Shape> {
        if !weight.is_finite() || !bias.is_finite() {
            return Err(SamplerError::config(format!(
                "weight and bias must be finite (got weight={weight}, bias={bias})"
            )));
        }

        let shaped = match self {
            DistributionKind::Uniform => Shape::Uniform {
                shift: shift_factor(bias)?,
            },
            DistributionKind::Sigmoid => {
                let z0 = -weight * bias;
                let z1 = weight * (1.0 - bias);
                if weight.abs() < SIGMOID_FLAT_SLOPE {
                    Shape::Uniform { shift: 1.0 }
                } else if z0.max(z1) < SIGMOID_EXP_TAIL {
                    // density ∝ e^{weight·x}; softplus would underflow to zero here
                    Shape::ExpTail { rate: weight }
                } else {
                    let lo = softplus(z0);
                    let hi = softplus(z1);
                    if !lo.is_finite() || !hi.is_finite() {
                        return Err(SamplerError::numerical(format!(
                            "sigmoid density overflows for weight={weight}, bias={bias}"
                        )));
                    }
                    if hi == lo {
                        return Err(SamplerError::numerical(format!(
                            "sigmoid density has no mass on [0, 1] for weight={weight}, bias={bias}"
                        )));
                    }
                    Shape::Sigmoid {
                        slope: weight,
                        centre: bias,
                        lo,
                        hi,
                    }
                }
            }
            DistributionKind::LogitNormal => {
                if weight <= 0.0 {
                    return Err(SamplerError::numerical(format!(
                        "logit-normal scale must be positive (got weight={weight})"
                    )));
                }
                Shape::LogitNormal {
                    mean: bias,
                    std_dev: weight,
                }
            }
            DistributionKind::HeavyTail => {
                let scale = weight - 1.0;
                if !(-1.0..=HEAVY_TAIL_MAX_SCALE).contains(&scale) {
                    return Err(SamplerError::numerical(format!(
                        "heavy-tail scale {scale} outside [-1, {HEAVY_TAIL_MAX_SCALE:.4}] gives a negative density"
                    )));
                }
                Shape::HeavyTail {
                    scale,
                    shift: shift_factor(bias)?,
                }
            }
            DistributionKind::CosMap => {
                if weight <= 0.0 {
                    return Err(SamplerError::numerical(format!(
                        "cos-map exponent must be positive (got weight={weight})"
                    )));
                }
                Shape::CosMap {
                    exponent: weight,
                    shift: shift_factor(bias)?,
                }
            }
            DistributionKind::InvertedParabola => {
                let concentration = weight + 1.0;
                let beta = Beta::new(concentration, concentration).map_err(|err| {
                    SamplerError::numerical(format!(
                        "inverted-parabola concentration {concentration} rejected: {err}"
                    ))
                })?;
                Shape::InvertedParabola {
                    beta,
                    shift: shift_factor(bias)?,
                }
            }
        };

        Ok(shaped)
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistributionKind {
    type Err = SamplerError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        DistributionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| SamplerError::config(format!("unknown timestep distribution: {s}")))
    }
}

/// A family with validated parameters, ready to draw strengths on `[0, 1]`.
#[derive(Debug, Clone)]
pub enum Shape {
    Uniform {
        shift: f64,
    },
    Sigmoid {
        slope: f64,
        centre: f64,
        lo: f64,
        hi: f64,
    },
    /// Sigmoid far below its centre: truncated exponential on `[0, 1]`.
    ExpTail {
        rate: f64,
    },
    LogitNormal {
        mean: f64,
        std_dev: f64,
    },
    HeavyTail {
        scale: f64,
        shift: f64,
    },
    CosMap {
        exponent: f64,
        shift: f64,
    },
    InvertedParabola {
        beta: Beta<f64>,
        shift: f64,
    },
}

impl Shape {
    /// Draw one normalized strength. May be non-finite only for extreme
    /// parameters; the caller checks.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Shape::Uniform { shift } => apply_shift(rng.gen::<f64>(), shift),
            Shape::Sigmoid {
                slope,
                centre,
                lo,
                hi,
            } => {
                // Inverse CDF: softplus(slope * (x - centre)) is linear in the CDF.
                let u: f64 = rng.gen();
                let target = lo + u * (hi - lo);
                (centre + softplus_inv(target) / slope).clamp(0.0, 1.0)
            }
            Shape::ExpTail { rate } => {
                let u: f64 = rng.gen();
                let x = if rate > 0.0 {
                    1.0 + (u + (1.0 - u) * (-rate).exp()).ln() / rate
                } else {
                    (u * rate.exp_m1()).ln_1p() / rate
                };
                x.clamp(0.0, 1.0)
            }
            Shape::LogitNormal { mean, std_dev } => {
                let n: f64 = rng.sample(StandardNormal);
                sigmoid(mean + std_dev * n)
            }
            Shape::HeavyTail { scale, shift } => {
                let u: f64 = rng.gen();
                let c = (FRAC_PI_2 * u).cos();
                let t = 1.0 - u - scale * (c * c - 1.0 + u);
                apply_shift(t.clamp(0.0, 1.0), shift)
            }
            Shape::CosMap { exponent, shift } => {
                let u: f64 = rng.gen();
                // tan^w / (1 + tan^w), written so tan = 0 and tan = inf stay finite
                let t = 1.0 / (1.0 + (FRAC_PI_2 * u).tan().powf(-exponent));
                apply_shift(t, shift)
            }
            Shape::InvertedParabola { ref beta, shift } => apply_shift(beta.sample(rng), shift),
        }
    }
}

fn shift_factor(bias: f64) -> Result<f64> {
    let factor = bias.exp();
    if !factor.is_finite() || factor <= 0.0 {
        return Err(SamplerError::numerical(format!(
            "timestep shift e^{bias} is not a positive finite factor"
        )));
    }
    Ok(factor)
}

/// Timestep shift `s·t / (1 + (s - 1)·t)`.
pub fn apply_shift(t: f64, factor: f64) -> f64 {
    if factor == 1.0 {
        return t;
    }
    factor * t / (1.0 + (factor - 1.0) * t)
}

pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

pub fn softplus(z: f64) -> f64 {
    z.max(0.0) + (-z.abs()).exp().ln_1p()
}

/// Inverse of [`softplus`] for `y > 0`.
pub fn softplus_inv(y: f64) -> f64 {
    y + (-(-y).exp_m1()).ln()
}
