use peelmc_core::MilestoneVector;
use serde::{Deserialize, Serialize};

use crate::TrialOutcome;

/// Per-milestone occurrence counters summed over trials.
///
/// Position `j` counts trials that reached `j + 1` decoded hops. Merging is a
/// plain sum, so partial counts from any split of the trials combine to the
/// same totals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneCounts {
    counts: Vec<u64>,
    trials: u64,
    stalled_trials: u64,
    total_packets: u64,
}

impl MilestoneCounts {
    pub fn new(hop_num: usize) -> Self {
        Self {
            counts: vec![0; hop_num],
            trials: 0,
            stalled_trials: 0,
            total_packets: 0,
        }
    }

    pub fn hop_num(&self) -> usize {
        self.counts.len()
    }

    pub fn record(&mut self, outcome: &TrialOutcome) {
        self.record_milestones(&outcome.milestones);
        self.trials += 1;
        self.total_packets += outcome.packets;
        if outcome.stalled {
            self.stalled_trials += 1;
        }
    }

    /// Counts a trial that never ran because no packet could resolve a hop.
    pub fn record_stalled(&mut self) {
        self.trials += 1;
        self.stalled_trials += 1;
    }

    fn record_milestones(&mut self, milestones: &MilestoneVector) {
        for decoded in milestones.iter() {
            if let Some(slot) = decoded.checked_sub(1).and_then(|j| self.counts.get_mut(j)) {
                *slot += 1;
            }
        }
    }

    pub fn merge(&mut self, other: &MilestoneCounts) {
        debug_assert_eq!(self.counts.len(), other.counts.len());
        for (a, b) in self.counts.iter_mut().zip(&other.counts) {
            *a += b;
        }
        self.trials += other.trials;
        self.stalled_trials += other.stalled_trials;
        self.total_packets += other.total_packets;
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    pub fn stalled_trials(&self) -> u64 {
        self.stalled_trials
    }

    pub fn total_packets(&self) -> u64 {
        self.total_packets
    }

    pub fn mean_packets(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.total_packets as f64 / self.trials as f64
    }

    /// Empirical probability of reaching each milestone.
    pub fn probabilities(&self) -> Vec<f64> {
        if self.trials == 0 {
            return vec![0.0; self.counts.len()];
        }
        let n = self.trials as f64;
        self.counts.iter().map(|&c| c as f64 / n).collect()
    }

    /// Wilson score interval per milestone, `z` standard deviations wide.
    pub fn confidence_intervals(&self, z: f64) -> Vec<(f64, f64)> {
        self.counts
            .iter()
            .map(|&reached| wilson_interval(reached, self.trials, z))
            .collect()
    }
}

/// Two-sided 95% normal quantile.
pub const Z_95: f64 = 1.96;

/// Wilson score interval for `successes` out of `trials`.
///
/// Stays inside `[0, 1]` and does not collapse when every or no trial
/// succeeds. An empty sample spans the whole range.
pub fn wilson_interval(successes: u64, trials: u64, z: f64) -> (f64, f64) {
    if trials == 0 {
        return (0.0, 1.0);
    }
    let n = trials as f64;
    let p = successes as f64 / n;
    let shrink = z * z / n;
    let center = p + shrink / 2.0;
    let half_width = z * (p * (1.0 - p) / n + shrink / (4.0 * n)).sqrt();
    let scale = 1.0 + shrink;
    (
        ((center - half_width) / scale).max(0.0),
        ((center + half_width) / scale).min(1.0),
    )
}
