use peelmc_core::{CascadeStrategy, Universe};
use peelmc_sampler::{MilestoneCounts, RunMode, TrialSpec, Z_95};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

pub mod cli;
pub mod distribution;
pub mod error;

pub use cli::*;
pub use distribution::{parse_weights, read_distribution};
pub use error::IoError;

/// Run manifest for reproducing a run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub timestamp: String,
    pub seed: u64,
    pub trials: usize,
    pub max_packets_per_trial: u64,
    pub capacity: usize,
    pub hop_num: usize,
    pub cascade: CascadeStrategy,
    pub mode: RunMode,
    pub weights: Vec<f64>,
    pub stalled_trials: u64,
    pub total_packets: u64,
    pub probabilities: Vec<f64>,
    /// 95% Wilson interval per milestone.
    pub confidence_intervals: Vec<(f64, f64)>,
    pub commit_hash: Option<String>,
    pub version: String,
}

impl RunManifest {
    pub fn new(
        seed: u64,
        universe: &Universe,
        spec: &TrialSpec,
        cascade: CascadeStrategy,
        mode: RunMode,
        weights: &[f64],
    ) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            seed,
            trials: spec.trials,
            max_packets_per_trial: spec.max_packets_per_trial,
            capacity: universe.capacity(),
            hop_num: universe.hop_num(),
            cascade,
            mode,
            weights: weights.to_vec(),
            stalled_trials: 0,
            total_packets: 0,
            probabilities: Vec::new(),
            confidence_intervals: Vec::new(),
            commit_hash: get_git_commit(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Fill in the run summary once trials are done.
    pub fn with_counts(mut self, counts: &MilestoneCounts) -> Self {
        self.stalled_trials = counts.stalled_trials();
        self.total_packets = counts.total_packets();
        self.probabilities = counts.probabilities();
        self.confidence_intervals = counts.confidence_intervals(Z_95);
        self
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| IoError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let json = fs::read_to_string(path).map_err(|source| IoError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest = serde_json::from_str(&json)?;
        Ok(manifest)
    }
}

/// Manifest path next to an output file: `<output>.manifest.json`.
pub fn manifest_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".manifest.json");
    PathBuf::from(name)
}

/// Format probabilities as one tab-separated line.
pub fn format_probabilities(probabilities: &[f64]) -> String {
    let mut line = probabilities
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join("\t");
    line.push('\n');
    line
}

pub fn write_probabilities(path: &Path, probabilities: &[f64]) -> Result<(), IoError> {
    fs::write(path, format_probabilities(probabilities)).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), values = probabilities.len(), "wrote milestone probabilities");
    Ok(())
}

fn get_git_commit() -> Option<String> {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout).ok()
            } else {
                None
            }
        })
        .map(|s| s.trim().to_string())
}
