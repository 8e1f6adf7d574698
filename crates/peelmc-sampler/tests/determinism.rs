use peelmc_core::{CascadeStrategy, DegreeSampler, PacketGenerator, Universe};
use peelmc_sampler::{MilestoneCounts, RunMode, Sampler, TrialSpec};

fn sampler(cascade: CascadeStrategy) -> Sampler {
    let universe = Universe::new(16, 64).unwrap();
    let degrees = DegreeSampler::new(vec![0.05, 0.3, 0.35, 0.2, 0.1]).unwrap();
    Sampler::new(PacketGenerator::new(universe, degrees), cascade)
}

fn run_on_pool(threads: usize, sampler: &Sampler, spec: &TrialSpec, seed: u64) -> MilestoneCounts {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .unwrap();
    pool.install(|| sampler.run(spec, seed, RunMode::Parallel)).unwrap()
}

#[test]
fn sequential_runs_replay_with_the_same_seed() {
    let sampler = sampler(CascadeStrategy::Rescan);
    let spec = TrialSpec::new(300);
    let a = sampler.run(&spec, 42, RunMode::Sequential).unwrap();
    let b = sampler.run(&spec, 42, RunMode::Sequential).unwrap();
    let c = sampler.run(&spec, 43, RunMode::Sequential).unwrap();

    assert_eq!(a, b);
    assert_ne!(a.total_packets(), c.total_packets());
}

#[test]
fn parallel_totals_do_not_depend_on_thread_count() {
    let sampler = sampler(CascadeStrategy::Rescan);
    let spec = TrialSpec::new(400);

    let single = run_on_pool(1, &sampler, &spec, 1234);
    let many = run_on_pool(4, &sampler, &spec, 1234);

    println!(
        "Parallel determinism: {} trials, mean packets {:.2}",
        single.trials(),
        single.mean_packets()
    );
    assert_eq!(single, many);
    assert_eq!(single.trials(), 400);
}

#[test]
fn cascade_strategies_produce_identical_counts() {
    let spec = TrialSpec::new(300);
    let rescan = sampler(CascadeStrategy::Rescan)
        .run(&spec, 8, RunMode::Sequential)
        .unwrap();
    let queue = sampler(CascadeStrategy::WorkQueue)
        .run(&spec, 8, RunMode::Sequential)
        .unwrap();
    assert_eq!(rescan, queue);

    let rescan = sampler(CascadeStrategy::Rescan)
        .run(&spec, 8, RunMode::Parallel)
        .unwrap();
    let queue = sampler(CascadeStrategy::WorkQueue)
        .run(&spec, 8, RunMode::Parallel)
        .unwrap();
    assert_eq!(rescan, queue);
}
