use crate::{manifest_path, read_distribution, write_probabilities, RunManifest};
use anyhow::Context;
use clap::{Parser, ValueEnum};
use peelmc_core::{CascadeStrategy, DegreeSampler, PacketGenerator, Universe};
use peelmc_sampler::{RunMode, Sampler, TrialSpec};
use std::path::PathBuf;
use tracing::{info, warn};

pub const USAGE: &str = "Usage: peelmc <degree-distribution-file> <output-file>";

#[derive(Parser, Debug)]
#[command(name = "peelmc")]
#[command(version)]
#[command(about = "Monte Carlo estimate of how many path hops a peeling decoder recovers")]
pub struct Cli {
    /// Whitespace-separated degree weights, one per hop
    pub distribution: PathBuf,

    /// File receiving one tab-separated line of milestone probabilities
    pub output: PathBuf,

    /// Number of trials
    #[arg(long, default_value_t = TrialSpec::DEFAULT_TRIALS)]
    pub trials: usize,

    /// Bit-vector width including the sentinel (default 256, widened to fit the hops)
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Random seed (drawn at random and logged when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Packets a trial may consume before it is counted as stalled
    #[arg(long = "max-packets", default_value_t = TrialSpec::DEFAULT_MAX_PACKETS)]
    pub max_packets: u64,

    /// Spread trials over all cores with per-trial random sources
    #[arg(long)]
    pub parallel: bool,

    /// Cascade strategy after a hop is resolved
    #[arg(long, value_enum, default_value = "rescan")]
    pub cascade: CascadeType,

    /// Also write `<output>.manifest.json`
    #[arg(long)]
    pub manifest: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CascadeType {
    #[value(name = "rescan")]
    Rescan,
    #[value(name = "work-queue")]
    WorkQueue,
}

impl From<CascadeType> for CascadeStrategy {
    fn from(cascade: CascadeType) -> Self {
        match cascade {
            CascadeType::Rescan => CascadeStrategy::Rescan,
            CascadeType::WorkQueue => CascadeStrategy::WorkQueue,
        }
    }
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let weights = read_distribution(&cli.distribution)
        .with_context(|| "failed to read degree distribution")?;
    let hop_num = weights.len();

    let universe = match cli.capacity {
        Some(capacity) => Universe::new(hop_num, capacity)?,
        None => Universe::with_default_capacity(hop_num),
    };
    let degrees = DegreeSampler::new(weights.clone())
        .with_context(|| format!("invalid degree distribution in {}", cli.distribution.display()))?;
    let max_degree = degrees.max_degree();
    let generator = PacketGenerator::new(universe, degrees);

    let cascade = CascadeStrategy::from(cli.cascade);
    let mode = if cli.parallel {
        RunMode::Parallel
    } else {
        RunMode::Sequential
    };
    let seed = cli.seed.unwrap_or_else(rand::random);
    let spec = TrialSpec::new(cli.trials).with_max_packets(cli.max_packets);

    info!(
        distribution = %cli.distribution.display(),
        hop_num,
        max_degree,
        capacity = universe.capacity(),
        trials = spec.trials,
        seed,
        ?cascade,
        ?mode,
        "starting run"
    );

    let sampler = Sampler::new(generator, cascade);
    let counts = sampler.run(&spec, seed, mode)?;

    if counts.stalled_trials() > 0 {
        warn!(
            stalled = counts.stalled_trials(),
            trials = counts.trials(),
            "some trials stopped before decoding every hop"
        );
    }
    info!(
        mean_packets = counts.mean_packets(),
        total_packets = counts.total_packets(),
        "run finished"
    );

    write_probabilities(&cli.output, &counts.probabilities())
        .with_context(|| "failed to write results")?;

    if cli.manifest {
        let path = manifest_path(&cli.output);
        RunManifest::new(seed, &universe, &spec, cascade, mode, &weights)
            .with_counts(&counts)
            .save_to_file(&path)?;
        info!(path = %path.display(), "wrote run manifest");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["peelmc", "dist.txt", "out.txt"]).unwrap();
        assert_eq!(cli.trials, 100_000);
        assert_eq!(cli.max_packets, 1_000_000);
        assert_eq!(cli.capacity, None);
        assert_eq!(cli.seed, None);
        assert_eq!(cli.cascade, CascadeType::Rescan);
        assert!(!cli.parallel && !cli.manifest);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "peelmc",
            "dist.txt",
            "out.txt",
            "--trials",
            "10",
            "--seed",
            "3",
            "--cascade",
            "work-queue",
            "--parallel",
        ])
        .unwrap();
        assert_eq!(cli.trials, 10);
        assert_eq!(cli.seed, Some(3));
        assert_eq!(CascadeStrategy::from(cli.cascade), CascadeStrategy::WorkQueue);
        assert!(cli.parallel);
    }

    #[test]
    fn test_missing_output_is_an_error() {
        let err = Cli::try_parse_from(["peelmc", "dist.txt"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_capacity_too_small_fails() {
        let dir = tempfile::tempdir().unwrap();
        let dist = dir.path().join("dist.txt");
        std::fs::write(&dist, "0 1 0 0").unwrap();
        let out = dir.path().join("out.txt");
        let args: Vec<std::ffi::OsString> = vec![
            "peelmc".into(),
            dist.into_os_string(),
            out.into_os_string(),
            "--capacity".into(),
            "4".into(),
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(run(cli).is_err());
    }
}
