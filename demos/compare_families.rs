//! Distribution Comparison Example
//!
//! Samples every timestep family at its baseline shape and compares where
//! each one puts its mass along the schedule

use cascade_timesteps::{DistributionKind, SamplingConfig, TimestepSampler};
use std::fs::{self, File};

fn quantile(sorted: &[u32], q: f64) -> u32 {
    let idx = ((sorted.len() - 1) as f64 * q).round() as usize;
    sorted[idx]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Comparing timestep distributions...\n");

    fs::create_dir_all("out")?;

    let num_train_timesteps = 1000;
    let batch_size = 200_000;
    let num_bins = 50;
    let seed = 42;

    println!("Configuration:");
    println!("  Schedule length: {}", num_train_timesteps);
    println!("  Draws per family: {}", batch_size);
    println!("  Histogram bins: {}", num_bins);
    println!("  Seed: {}", seed);
    println!();

    let sampler = TimestepSampler::new(num_train_timesteps)?;

    println!("METRICS SUMMARY");
    println!("===============");
    println!(
        "{:<18} {:>8} {:>6} {:>6} {:>6}",
        "family", "mean", "p10", "p50", "p90"
    );

    let mut histograms = Vec::new();
    for kind in DistributionKind::ALL {
        let config = SamplingConfig::baseline(kind);
        let batch = sampler.sample_seeded(&config, batch_size, Some(seed), true)?;

        let mut sorted = batch.as_slice().to_vec();
        sorted.sort_unstable();
        println!(
            "{:<18} {:>8.2} {:>6} {:>6} {:>6}",
            kind.to_string(),
            batch.mean().unwrap_or(0.0),
            quantile(&sorted, 0.1),
            quantile(&sorted, 0.5),
            quantile(&sorted, 0.9),
        );

        histograms.push((kind, batch.histogram(num_bins)?));
    }

    // One column per family
    let csv_path = "out/families.csv";
    let mut wtr = csv::Writer::from_writer(File::create(csv_path)?);

    let mut header = vec!["bin_start".to_string()];
    header.extend(histograms.iter().map(|(kind, _)| kind.to_string()));
    wtr.write_record(&header)?;

    for bin in 0..num_bins {
        let mut row = vec![histograms[0].1.bin_range(bin).start.to_string()];
        row.extend(histograms.iter().map(|(_, hist)| hist.counts()[bin].to_string()));
        wtr.write_record(&row)?;
    }
    wtr.flush()?;

    println!("\nCSV output written to: {}", csv_path);
    println!("Done!");

    Ok(())
}
