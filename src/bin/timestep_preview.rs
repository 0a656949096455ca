//! Preview a timestep distribution as a text histogram or CSV.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use cascade_timesteps::{DistributionKind, SamplerError, SamplingConfig, TimestepSampler};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "timestep-preview")]
#[command(version)]
#[command(about = "Sample training timesteps and show their distribution")]
struct Cli {
    /// JSON sampling config; flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Distribution family (UNIFORM, SIGMOID, LOGIT_NORMAL, HEAVY_TAIL, COS_MAP, INVERTED_PARABOLA)
    #[arg(short, long)]
    distribution: Option<DistributionKind>,

    #[arg(long)]
    min_strength: Option<f64>,

    #[arg(long)]
    max_strength: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    weight: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    bias: Option<f64>,

    /// Length of the diffusion schedule
    #[arg(short, long, default_value = "1000")]
    timesteps: usize,

    /// Number of draws
    #[arg(short, long, default_value = "1000000")]
    batch_size: usize,

    /// Histogram bins
    #[arg(long, default_value = "1000")]
    bins: usize,

    #[arg(long)]
    seed: Option<u64>,

    /// Reproducible run (uses the default seed when --seed is absent)
    #[arg(long)]
    deterministic: bool,

    /// Write the histogram as CSV instead of printing bars
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Bar width in columns
    #[arg(short, long, default_value = "60")]
    width: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn sampling_config(&self) -> Result<SamplingConfig, SamplerError> {
        let base = match &self.config {
            Some(path) => SamplingConfig::load(path)?,
            None => SamplingConfig::default(),
        };

        let config = self.apply_overrides(base);
        config.validate()?;
        Ok(config)
    }

    /// Flags win over whatever the config file set.
    fn apply_overrides(&self, mut config: SamplingConfig) -> SamplingConfig {
        if let Some(distribution) = self.distribution {
            config.distribution = distribution;
        }
        if let Some(min_strength) = self.min_strength {
            config.min_strength = min_strength;
        }
        if let Some(max_strength) = self.max_strength {
            config.max_strength = max_strength;
        }
        if let Some(weight) = self.weight {
            config.weight = weight;
        }
        if let Some(bias) = self.bias {
            config.bias = bias;
        }
        config
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("timestep-preview: a global tracing subscriber is already installed");
    }
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if let Err(error) = run(&cli) {
        eprintln!("timestep-preview failed: {error}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), SamplerError> {
    let config = cli.sampling_config()?;
    let sampler = TimestepSampler::new(cli.timesteps)?;

    info!(
        distribution = %config.distribution,
        timesteps = cli.timesteps,
        batch_size = cli.batch_size,
        "generating preview"
    );

    let batch = sampler.sample_seeded(&config, cli.batch_size, cli.seed, cli.deterministic)?;
    let histogram = batch.histogram(cli.bins)?;

    match &cli.csv {
        Some(path) => {
            let file = File::create(path)?;
            histogram.write_csv(BufWriter::new(file))?;
            info!(path = %path.display(), "histogram written");
        }
        None => print!("{}", histogram.render_text(cli.width)),
    }

    if let Some(mean) = batch.mean() {
        info!("mean timestep {mean:.2}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_file(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_no_flags_gives_default_config() {
        let cli = Cli::try_parse_from(["timestep-preview"]).unwrap();
        assert_eq!(cli.sampling_config().unwrap(), SamplingConfig::default());
        assert_eq!(cli.timesteps, 1000);
        assert_eq!(cli.batch_size, 1_000_000);
        assert_eq!(cli.bins, 1000);
    }

    #[test]
    fn test_flags_override_file_fields() {
        let file = config_file(
            r#"{"distribution": "HEAVY_TAIL", "min_strength": 0.2, "max_strength": 0.8, "weight": 1.5}"#,
        );
        let path = file.path().to_str().unwrap();
        let cli = Cli::try_parse_from([
            "timestep-preview",
            "--config",
            path,
            "--distribution",
            "logit_normal",
            "--max-strength",
            "0.9",
            "--bias",
            "-0.5",
        ])
        .unwrap();

        let config = cli.sampling_config().unwrap();
        assert_eq!(config.distribution, DistributionKind::LogitNormal);
        assert_eq!(config.min_strength, 0.2);
        assert_eq!(config.max_strength, 0.9);
        assert_eq!(config.weight, 1.5);
        assert_eq!(config.bias, -0.5);
    }

    #[test]
    fn test_overrides_are_validated() {
        let cli = Cli::try_parse_from([
            "timestep-preview",
            "--min-strength",
            "0.6",
            "--max-strength",
            "0.3",
        ])
        .unwrap();
        assert!(cli.sampling_config().unwrap_err().is_configuration());
    }

    #[test]
    fn test_unknown_distribution_flag_rejected() {
        assert!(Cli::try_parse_from(["timestep-preview", "--distribution", "gaussian"]).is_err());
    }
}
