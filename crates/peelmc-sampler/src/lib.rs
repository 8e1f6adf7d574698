use peelmc_core::{
    CascadeStrategy, MilestoneVector, NoiseSource, PacketGenerator, PeelingDecoder, Result,
    Universe,
};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub mod counts;
pub use counts::{wilson_interval, MilestoneCounts, Z_95};

/// Trial specification for a run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialSpec {
    pub trials: usize,
    /// Packets a trial may consume before it is abandoned as stalled.
    pub max_packets_per_trial: u64,
}

/// Result of a single trial
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrialOutcome {
    pub milestones: MilestoneVector,
    pub packets: u64,
    pub stalled: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// One random source shared by every trial, trials in order.
    #[default]
    Sequential,
    /// One random source per trial, trials spread over the rayon pool.
    Parallel,
}

/// Main sampler: feeds generated packets to a peeling decoder, trial by trial
#[derive(Clone, Debug)]
pub struct Sampler {
    pub generator: PacketGenerator,
    pub cascade: CascadeStrategy,
}

impl Sampler {
    pub fn new(generator: PacketGenerator, cascade: CascadeStrategy) -> Self {
        Self { generator, cascade }
    }

    pub fn universe(&self) -> &Universe {
        self.generator.universe()
    }

    pub fn decoder(&self) -> PeelingDecoder {
        PeelingDecoder::new(*self.universe(), self.cascade)
    }

    /// Whether any trial can make progress with this distribution.
    pub fn can_progress(&self) -> bool {
        self.universe().hop_num() == 0 || self.generator.degrees().can_resolve()
    }

    /// Run one trial until `path_length` hops are decoded or the packet
    /// budget runs out.
    pub fn run_trial<R: Rng + ?Sized>(
        &self,
        decoder: &mut PeelingDecoder,
        path_length: usize,
        spec: &TrialSpec,
        rng: &mut R,
    ) -> Result<TrialOutcome> {
        let target = self.universe().target_undecided(path_length)?;
        decoder.reset();

        let mut packets = 0;
        let mut stalled = false;
        while !decoder.is_done(target) {
            if packets >= spec.max_packets_per_trial {
                stalled = true;
                break;
            }
            let packet = self.generator.generate(rng)?;
            decoder.receive(packet);
            packets += 1;
        }

        Ok(TrialOutcome {
            milestones: decoder.milestones().clone(),
            packets,
            stalled,
        })
    }

    pub fn run(&self, spec: &TrialSpec, seed: u64, mode: RunMode) -> Result<MilestoneCounts> {
        match mode {
            RunMode::Sequential => {
                let mut rng = NoiseSource::new(seed).shared();
                self.run_sequential(spec, &mut rng)
            }
            RunMode::Parallel => self.run_parallel(spec, seed),
        }
    }

    /// Run every trial in order against one shared random source.
    pub fn run_sequential<R: Rng + ?Sized>(
        &self,
        spec: &TrialSpec,
        rng: &mut R,
    ) -> Result<MilestoneCounts> {
        let hop_num = self.universe().hop_num();
        if let Some(counts) = self.stalled_run(spec) {
            return Ok(counts);
        }
        info!(
            trials = spec.trials,
            hop_num,
            cascade = ?self.cascade,
            "running trials sequentially"
        );

        let mut counts = MilestoneCounts::new(hop_num);
        let mut decoder = self.decoder();
        for trial_id in 0..spec.trials {
            if trial_id > 0 && trial_id % 10_000 == 0 {
                debug!(trial_id, trials = spec.trials, "progress");
            }
            let outcome = self.run_trial(&mut decoder, hop_num, spec, rng)?;
            counts.record(&outcome);
        }
        Ok(counts)
    }

    /// Run trials on the rayon pool, each with its own source derived from
    /// `global_seed` and the trial id. Totals do not depend on the thread count.
    pub fn run_parallel(&self, spec: &TrialSpec, global_seed: u64) -> Result<MilestoneCounts> {
        let hop_num = self.universe().hop_num();
        if let Some(counts) = self.stalled_run(spec) {
            return Ok(counts);
        }
        info!(
            trials = spec.trials,
            hop_num,
            cascade = ?self.cascade,
            threads = rayon::current_num_threads(),
            "running trials in parallel"
        );

        let noise = NoiseSource::new(global_seed);
        (0..spec.trials as u64)
            .into_par_iter()
            .try_fold(
                || (MilestoneCounts::new(hop_num), self.decoder()),
                |(mut counts, mut decoder), trial_id| {
                    let mut rng = noise.for_trial(trial_id);
                    let outcome = self.run_trial(&mut decoder, hop_num, spec, &mut rng)?;
                    counts.record(&outcome);
                    Ok::<_, peelmc_core::Error>((counts, decoder))
                },
            )
            .map(|partial| partial.map(|(counts, _)| counts))
            .try_reduce(
                || MilestoneCounts::new(hop_num),
                |mut a, b| {
                    a.merge(&b);
                    Ok(a)
                },
            )
    }

    /// Every trial would spin through its whole packet budget without
    /// resolving a hop; report them as stalled without drawing packets.
    fn stalled_run(&self, spec: &TrialSpec) -> Option<MilestoneCounts> {
        if self.can_progress() {
            return None;
        }
        warn!(
            trials = spec.trials,
            "degree distribution has no weight on degree 1; no hop can ever be resolved"
        );
        let mut counts = MilestoneCounts::new(self.universe().hop_num());
        for _ in 0..spec.trials {
            counts.record_stalled();
        }
        Some(counts)
    }
}

impl TrialSpec {
    pub const DEFAULT_TRIALS: usize = 100_000;
    pub const DEFAULT_MAX_PACKETS: u64 = 1_000_000;

    pub fn new(trials: usize) -> Self {
        Self {
            trials,
            max_packets_per_trial: Self::DEFAULT_MAX_PACKETS,
        }
    }

    pub fn with_max_packets(mut self, max_packets: u64) -> Self {
        self.max_packets_per_trial = max_packets;
        self
    }
}

impl Default for TrialSpec {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TRIALS)
    }
}
