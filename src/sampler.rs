//! Timestep sampler
//!
//! Draws normalized strengths from the configured family, rescales them into
//! `[min_strength, max_strength]` and rounds them onto the discrete schedule.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::batch::TimestepBatch;
use crate::config::SamplingConfig;
use crate::error::{Result, SamplerError};

/// Seed used when a deterministic run does not name one.
pub const DEFAULT_SEED: u64 = 42;

/// Samples discrete training timesteps for a schedule of fixed length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestepSampler {
    num_train_timesteps: u32,
}

impl TimestepSampler {
    pub fn new(num_train_timesteps: usize) -> Result<Self> {
        if num_train_timesteps == 0 {
            return Err(SamplerError::config(
                "num_train_timesteps must be greater than zero",
            ));
        }
        let num_train_timesteps = u32::try_from(num_train_timesteps).map_err(|_| {
            SamplerError::config(format!(
                "num_train_timesteps {num_train_timesteps} exceeds {}",
                u32::MAX
            ))
        })?;
        Ok(Self {
            num_train_timesteps,
        })
    }

    pub fn num_train_timesteps(&self) -> u32 {
        self.num_train_timesteps
    }

    /// Round a strength in `[0, 1]` to its timestep index.
    pub fn discretize(&self, strength: f64) -> u32 {
        let last = self.num_train_timesteps - 1;
        let index = (strength * last as f64).round();
        if index <= 0.0 {
            0
        } else if index >= last as f64 {
            last
        } else {
            index as u32
        }
    }

    /// Continuous strengths in `[min_strength, max_strength]`, in draw order.
    pub fn sample_strengths<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        config: &SamplingConfig,
        batch_size: usize,
    ) -> Result<Vec<f64>> {
        if batch_size == 0 {
            return Err(SamplerError::config("batch_size must be greater than zero"));
        }
        config.validate()?;
        let shape = config.distribution.shape(config.weight, config.bias)?;

        debug!(
            distribution = %config.distribution,
            min_strength = config.min_strength,
            max_strength = config.max_strength,
            weight = config.weight,
            bias = config.bias,
            batch_size,
            "sampling timesteps"
        );

        let lo = config.min_strength;
        let hi = config.max_strength;
        let span = config.span();

        let mut strengths = Vec::with_capacity(batch_size);
        for _ in 0..batch_size {
            let x = shape.draw(rng);
            if !x.is_finite() {
                return Err(SamplerError::numerical(format!(
                    "{} produced a non-finite draw for weight={}, bias={}",
                    config.distribution, config.weight, config.bias
                )));
            }
            strengths.push((lo + x * span).clamp(lo, hi));
        }

        Ok(strengths)
    }

    /// Sample a batch with a caller-owned generator.
    pub fn sample_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        config: &SamplingConfig,
        batch_size: usize,
    ) -> Result<TimestepBatch> {
        let strengths = self.sample_strengths(rng, config, batch_size)?;
        let timesteps = strengths.into_iter().map(|s| self.discretize(s)).collect();
        Ok(TimestepBatch::new(timesteps, self.num_train_timesteps))
    }

    /// Sample a batch with a generator built from `seed`.
    ///
    /// A deterministic call without a seed uses [`DEFAULT_SEED`]; a
    /// non-deterministic call without one seeds from OS entropy.
    pub fn sample_seeded(
        &self,
        config: &SamplingConfig,
        batch_size: usize,
        seed: Option<u64>,
        deterministic: bool,
    ) -> Result<TimestepBatch> {
        // Fail before touching the entropy source.
        if batch_size == 0 {
            return Err(SamplerError::config("batch_size must be greater than zero"));
        }
        config.validate()?;

        let mut rng = generator(seed, deterministic);
        self.sample_with(&mut rng, config, batch_size)
    }
}

/// Build the generator for a sampling call.
pub fn generator(seed: Option<u64>, deterministic: bool) -> StdRng {
    match (seed, deterministic) {
        (Some(seed), _) => {
            trace!(seed, deterministic, "seeding timestep generator");
            StdRng::seed_from_u64(seed)
        }
        (None, true) => {
            trace!(seed = DEFAULT_SEED, "seeding timestep generator with default seed");
            StdRng::seed_from_u64(DEFAULT_SEED)
        }
        (None, false) => {
            trace!("seeding timestep generator from entropy");
            StdRng::from_entropy()
        }
    }
}

/// One-shot sampling entry point.
pub fn sample(
    num_train_timesteps: usize,
    batch_size: usize,
    config: SamplingConfig,
    generator_seed: Option<u64>,
    deterministic: bool,
) -> Result<TimestepBatch> {
    TimestepSampler::new(num_train_timesteps)?.sample_seeded(
        &config,
        batch_size,
        generator_seed,
        deterministic,
    )
}
