//! Wide-engine inference latency benchmark — percentiles and chunk throughput.
//!
//! Measures the full handshake (operand load, start, done poll, result
//! read) for single 64-lane inferences, then sweeps chunked dataset sizes.
//!
//! Usage:
//!   cargo run --bin bench_inference
//!   cargo run --bin bench_inference -- --iterations 2000

use anyhow::Result;
use linreg_chip::WIDE_LANES;
use linreg_driver::{SimBus, WideAccel};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const DEFAULT_ITERATIONS: usize = 1000;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let iterations = parse_arg(&args, "--iterations", DEFAULT_ITERATIONS);

    println!("Wide-engine inference benchmark");
    println!("===============================");
    println!("Engine     : {WIDE_LANES}-lane sequenced MAC");
    println!("Iterations : {iterations}");
    println!();

    let mut accel = WideAccel::new(SimBus::new());
    let inputs: Vec<u32> = (1..=WIDE_LANES as u32).collect();
    let weights: Vec<u32> = inputs.iter().map(|v| v * 2).collect();

    // Warmup
    for _ in 0..20 {
        let _ = accel.infer(&inputs, &weights, 0)?;
    }

    let mut latencies_us = Vec::with_capacity(iterations);
    for _ in 0..iterations {
        let outcome = accel.infer(&inputs, &weights, 0)?;
        latencies_us.push(outcome.latency_us());
    }

    latencies_us.sort_by(|a, b| a.partial_cmp(b).expect("latency is never NaN"));
    let mean = latencies_us.iter().sum::<f64>() / iterations as f64;
    let p = |q: f64| latencies_us[((iterations as f64 * q) as usize).min(iterations - 1)];

    println!("Single-inference latency (setup + handshake + result)");
    println!("-----------------------------------------------------");
    println!("  mean : {:.2} µs  ({:.0} Hz)", mean, 1e6 / mean);
    println!("  min  : {:.2} µs", latencies_us[0]);
    println!("  p50  : {:.2} µs", p(0.50));
    println!("  p95  : {:.2} µs", p(0.95));
    println!("  p99  : {:.2} µs", p(0.99));
    println!("  max  : {:.2} µs", latencies_us[iterations - 1]);
    println!();

    // Chunked dataset throughput
    println!("Chunked dataset throughput");
    println!("--------------------------");
    println!("  {:>8}  {:>7}  {:>12}  {:>12}", "elements", "chunks", "ms/pass", "Melem/s");

    for &size in &[64usize, 256, 1000, 4096, 16384] {
        let data: Vec<u32> = (0..size as u32).collect();
        let reps = 50;

        let t0 = Instant::now();
        let mut chunks = 0;
        for _ in 0..reps {
            let mut acc = 0u64;
            chunks = accel.process_chunks(&data, &data, &mut acc)?;
        }
        let ms_per = t0.elapsed().as_secs_f64() * 1e3 / reps as f64;

        println!(
            "  {:>8}  {:>7}  {:>12.3}  {:>12.2}",
            size,
            chunks,
            ms_per,
            size as f64 / ms_per / 1e3
        );
    }

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

#[cfg(test)]
mod tests {
    use super::parse_arg;

    #[test]
    fn zero_iterations_falls_back_to_default() {
        let a: Vec<String> = ["bench_inference", "--iterations", "0"]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(parse_arg(&a, "--iterations", 1000), 1000);
    }
}
