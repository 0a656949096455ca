//! Fixed-bin histogram over a timestep schedule
//!
//! Bin `i` of `b` bins over `N` timesteps covers the indices `t` with
//! `t * b / N == i`, so every index lands in exactly one bin.

use std::io::Write;

use crate::batch::TimestepBatch;
use crate::error::{Result, SamplerError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    counts: Vec<u64>,
    num_train_timesteps: u32,
}

impl Histogram {
    pub fn from_batch(batch: &TimestepBatch, num_bins: usize) -> Result<Self> {
        Self::from_timesteps(batch.as_slice(), batch.num_train_timesteps(), num_bins)
    }

    pub fn from_timesteps(
        timesteps: &[u32],
        num_train_timesteps: u32,
        num_bins: usize,
    ) -> Result<Self> {
        if num_bins == 0 {
            return Err(SamplerError::config("histogram needs at least one bin"));
        }
        if num_train_timesteps == 0 {
            return Err(SamplerError::config(
                "num_train_timesteps must be greater than zero",
            ));
        }

        let n = num_train_timesteps as u64;
        let bins = num_bins as u64;
        let mut counts = vec![0u64; num_bins];
        for &t in timesteps {
            let t = (t as u64).min(n - 1);
            counts[(t * bins / n) as usize] += 1;
        }

        Ok(Self {
            counts,
            num_train_timesteps,
        })
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn num_bins(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Half-open range of timestep indices covered by bin `bin`.
    pub fn bin_range(&self, bin: usize) -> std::ops::Range<u32> {
        let n = self.num_train_timesteps as u64;
        let bins = self.counts.len() as u64;
        // smallest t with t * bins / n >= bin
        let start = (bin as u64 * n).div_ceil(bins);
        let end = ((bin as u64 + 1) * n).div_ceil(bins);
        start.min(n) as u32..end.min(n) as u32
    }

    /// Horizontal bar chart, one line per bin, bars scaled to `width` columns.
    pub fn render_text(&self, width: usize) -> String {
        let max = self.max_count().max(1);
        let mut out = String::new();
        for (bin, &count) in self.counts.iter().enumerate() {
            let range = self.bin_range(bin);
            let bar = ((count as f64 / max as f64) * width as f64).round() as usize;
            out.push_str(&format!(
                "{:>6}..{:<6} {:>10} {}\n",
                range.start,
                range.end,
                count,
                "#".repeat(bar)
            ));
        }
        out
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["bin_start", "bin_end", "count"])?;
        for (bin, &count) in self.counts.iter().enumerate() {
            let range = self.bin_range(bin);
            wtr.write_record([
                range.start.to_string(),
                range.end.to_string(),
                count.to_string(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_bin_per_timestep() {
        let hist = Histogram::from_timesteps(&[0, 1, 1, 9], 10, 10).unwrap();
        assert_eq!(hist.counts(), &[1, 2, 0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(hist.total(), 4);
        assert_eq!(hist.bin_range(3), 3..4);
    }

    #[test]
    fn test_coarse_bins_cover_schedule() {
        let hist = Histogram::from_timesteps(&[], 1000, 3).unwrap();
        assert_eq!(hist.bin_range(0), 0..334);
        assert_eq!(hist.bin_range(1), 334..667);
        assert_eq!(hist.bin_range(2), 667..1000);
    }

    #[test]
    fn test_bin_assignment_matches_ranges() {
        let timesteps: Vec<u32> = (0..1000).collect();
        let hist = Histogram::from_timesteps(&timesteps, 1000, 7).unwrap();
        for bin in 0..7 {
            let range = hist.bin_range(bin);
            assert_eq!(hist.counts()[bin], (range.end - range.start) as u64);
        }
    }

    #[test]
    fn test_zero_bins_rejected() {
        let err = Histogram::from_timesteps(&[1], 10, 0).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_csv_output() {
        let hist = Histogram::from_timesteps(&[0, 3], 4, 2).unwrap();
        let mut buf = Vec::new();
        hist.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "bin_start,bin_end,count\n0,2,1\n2,4,1\n");
    }

    #[test]
    fn test_render_text_scales_to_width() {
        let hist = Histogram::from_timesteps(&[0, 0, 1], 2, 2).unwrap();
        let text = hist.render_text(4);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" ####"));
        assert!(lines[1].ends_with(" ##"));
    }
}
