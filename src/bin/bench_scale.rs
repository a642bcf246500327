#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use band_life::{BandLife, BandLifeConfig, Grid};
use rand::SeedableRng;
use std::time::Instant;

const SEED: u64 = 0x5EED_1234_ABCD_EF01;
const DENSITY: f64 = 0.42;
const THREAD_COUNTS: &[usize] = &[1, 2, 4, 8];

fn bench_band(size: usize, threads: usize, turns: u64) -> (f64, u64) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(SEED);
    let grid = Grid::random(size, size, DENSITY, &mut rng);
    let mut engine = BandLife::with_config(grid, BandLifeConfig::default().thread_count(threads));

    let start = Instant::now();
    if let Err(err) = engine.step_n(turns) {
        panic!("{size}x{size} with {threads} threads failed: {err}");
    }
    let duration = start.elapsed();

    (duration.as_secs_f64() * 1000.0, engine.population())
}

fn main() {
    let scales: &[(usize, u64)] = &[(128, 200), (512, 100), (1024, 50), (2048, 20)];

    println!(
        "{:<10} {:>8} {:>8} {:>12} {:>10} {:>10}",
        "Grid", "Threads", "Turns", "Total(ms)", "Avg(ms)", "Pop"
    );
    println!("{}", "-".repeat(63));

    for &(size, turns) in scales {
        let mut baseline = None;
        for &threads in THREAD_COUNTS {
            let (total_ms, pop) = bench_band(size, threads, turns);
            let baseline_pop = *baseline.get_or_insert(pop);
            let status = if pop == baseline_pop { "" } else { " MISMATCH" };
            println!(
                "{:<10} {:>8} {:>8} {:>12.1} {:>10.4} {:>10}{status}",
                format!("{}x{}", size, size),
                threads,
                turns,
                total_ms,
                total_ms / turns as f64,
                pop
            );
        }
    }
}
