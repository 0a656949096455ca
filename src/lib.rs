//! Cascade timesteps - training timestep sampling
//!
//! Draws discrete diffusion timesteps for Wuerstchen / Stable Cascade
//! fine-tuning from a configurable, seedable distribution family, restricted
//! to a window of noising strengths.

pub mod batch;
pub mod config;
pub mod distribution;
pub mod error;
pub mod histogram;
pub mod sampler;

// Re-export main types
pub use batch::TimestepBatch;
pub use config::SamplingConfig;
pub use distribution::DistributionKind;
pub use error::{Result, SamplerError};
pub use histogram::Histogram;
pub use sampler::{sample, TimestepSampler, DEFAULT_SEED};
