// SPDX-License-Identifier: AGPL-3.0-only

//! Chunked dot-product benchmark — engine vs CPU f64 reference.
//!
//! Sweeps vector sizes through the 8-lane dot engine (software model by
//! default) and reports per-size throughput, chunk counts, and the Q16.16
//! error against the CPU reference.
//!
//! Usage:
//!   cargo run --bin bench_dot
//!   cargo run --bin bench_dot -- --iterations 500

use anyhow::Result;
use linreg_chip::DOT_LANES;
use linreg_driver::{DotAccel, SimBus};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const DEFAULT_ITERATIONS: usize = 200;
const SIZES: &[usize] = &[4, 8, 12, 64, 100, 512, 1000, 4096];

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let iterations = parse_arg(&args, "--iterations", DEFAULT_ITERATIONS);

    let mut accel = DotAccel::new(SimBus::new());
    accel.init();
    accel.self_test()?;
    println!("Dot engine self test passed ({DOT_LANES} lanes)");
    println!();

    println!("Chunked dot product ({iterations} iterations per size)");
    println!("------------------------------------------------------");
    println!(
        "  {:>7}  {:>7}  {:>12}  {:>12}  {:>12}",
        "size", "chunks", "µs/dot", "Mmac/s", "abs error"
    );

    for &size in SIZES {
        let x: Vec<f64> = (0..size).map(|i| (i as f64 * 0.37).sin()).collect();
        let w: Vec<f64> = (0..size).map(|i| (i as f64 * 0.11).cos()).collect();
        let reference: f64 = x.iter().zip(w.iter()).map(|(a, b)| a * b).sum();

        // Warmup
        for _ in 0..10 {
            let _ = accel.dot(&x, &w)?;
        }

        let t0 = Instant::now();
        let mut last = 0.0;
        for _ in 0..iterations {
            last = accel.dot(&x, &w)?;
        }
        let us_per = t0.elapsed().as_micros() as f64 / iterations as f64;

        println!(
            "  {:>7}  {:>7}  {:>12.2}  {:>12.1}  {:>12.2e}",
            size,
            size.div_ceil(DOT_LANES),
            us_per,
            size as f64 / us_per,
            (last - reference).abs()
        );
    }

    println!();
    println!("Error column is Q16.16 truncation vs CPU f64; grows linearly with size.");

    Ok(())
}

fn parse_arg(args: &[String], flag: &str, default: usize) -> usize {
    // 0 iterations would divide by zero in the stats; fall back
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .filter(|&n| n > 0)
        .unwrap_or(default)
}
