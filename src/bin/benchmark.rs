//! Performance benchmark comparing serial and parallel stepping

use std::time::Instant;
use gol_engine::Grid;
use rand::{SeedableRng, rngs::StdRng};

fn seeded_grid(size: usize) -> Grid {
    let mut grid = Grid::new(size, 1);
    grid.seed(&mut StdRng::seed_from_u64(size as u64));
    grid
}

fn benchmark_serial(size: usize, iterations: u32) -> f64 {
    let mut grid = seeded_grid(size);

    let start = Instant::now();
    for _ in 0..iterations {
        grid.step();
    }
    start.elapsed().as_secs_f64() * 1000.0 / iterations as f64
}

fn benchmark_parallel(size: usize, iterations: u32) -> f64 {
    let mut grid = seeded_grid(size);

    let start = Instant::now();
    for _ in 0..iterations {
        grid.step_parallel();
    }
    start.elapsed().as_secs_f64() * 1000.0 / iterations as f64
}

fn main() {
    println!("=== Game of Life Step Benchmark ===\n");

    let sizes = [50, 100, 200, 500, 1000, 2000];
    let iterations = 20;

    println!("{:>10} {:>12} {:>12} {:>10}", "Size", "Serial", "Parallel", "Speedup");
    println!("{:-<48}", "");

    for size in sizes {
        let serial_ms = benchmark_serial(size, iterations);
        let parallel_ms = benchmark_parallel(size, iterations);

        println!(
            "{:>10} {:>12.3} {:>12.3} {:>9.1}x",
            format!("{}x{}", size, size),
            serial_ms,
            parallel_ms,
            serial_ms / parallel_ms
        );
    }

    let size = 2000;
    let cells = size * size;
    let parallel_ms = benchmark_parallel(size, iterations);
    println!(
        "\nParallel at {}x{}: {:.2} ms/gen, {:.1}M cells/sec",
        size,
        size,
        parallel_ms,
        (cells as f64) / (parallel_ms / 1000.0) / 1_000_000.0
    );
}
