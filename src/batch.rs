//! Sampled timestep batches

use crate::error::Result;
use crate::histogram::Histogram;

/// Discrete timestep indices in draw order, each in `[0, num_train_timesteps)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestepBatch {
    timesteps: Vec<u32>,
    num_train_timesteps: u32,
}

impl TimestepBatch {
    pub(crate) fn new(timesteps: Vec<u32>, num_train_timesteps: u32) -> Self {
        Self {
            timesteps,
            num_train_timesteps,
        }
    }

    pub fn len(&self) -> usize {
        self.timesteps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timesteps.is_empty()
    }

    pub fn num_train_timesteps(&self) -> u32 {
        self.num_train_timesteps
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.timesteps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, u32> {
        self.timesteps.iter()
    }

    pub fn into_vec(self) -> Vec<u32> {
        self.timesteps
    }

    /// Mean timestep index, or `None` for an empty batch.
    pub fn mean(&self) -> Option<f64> {
        if self.timesteps.is_empty() {
            return None;
        }
        let sum: f64 = self.timesteps.iter().map(|&t| t as f64).sum();
        Some(sum / self.timesteps.len() as f64)
    }

    /// Bucket the batch into `num_bins` equal-width bins over the schedule.
    pub fn histogram(&self, num_bins: usize) -> Result<Histogram> {
        Histogram::from_batch(self, num_bins)
    }
}

impl<'a> IntoIterator for &'a TimestepBatch {
    type Item = &'a u32;
    type IntoIter = std::slice::Iter<'a, u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.timesteps.iter()
    }
}

impl AsRef<[u32]> for TimestepBatch {
    fn as_ref(&self) -> &[u32] {
        &self.timesteps
    }
}
