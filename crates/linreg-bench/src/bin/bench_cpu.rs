//! CPU inference benchmark — floating-point vs integer fast path.
//!
//! The original comparison this suite grew out of: the same single-feature
//! regression run 100 000 times through f64 arithmetic and through the
//! ×100 decimal integer path, to show what an FPU-less soft core pays.
//!
//! Usage:
//!   cargo run --bin bench_cpu
//!   cargo run --bin bench_cpu -- --iterations 1000000

use anyhow::Result;
use linreg_driver::model::zoo;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const DEFAULT_ITERATIONS: usize = 100_000;
const INPUT: f64 = 0.03; // BMI feature value

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let iterations = parse_arg(&args, "--iterations", DEFAULT_ITERATIONS);

    let model = zoo::diabetes();
    let quantized = model.quantized(100);

    println!("CPU inference benchmark");
    println!("=======================");
    println!("Model      : y = {:.4}·x + {:.4}", model.weight, model.bias);
    println!("Iterations : {iterations}");
    println!();

    // Floating-point path
    let t0 = Instant::now();
    let mut acc_f = 0.0f64;
    for _ in 0..iterations {
        acc_f += std::hint::black_box(model.predict(std::hint::black_box(INPUT)));
    }
    let float_ns = t0.elapsed().as_nanos();

    // Integer fast path
    let t0 = Instant::now();
    let mut acc_i = 0i64;
    for _ in 0..iterations {
        acc_i += std::hint::black_box(quantized.predict_raw(std::hint::black_box(INPUT)));
    }
    let int_ns = t0.elapsed().as_nanos();

    println!("  {:<14}  {:>12}  {:>14}", "path", "total", "ns/inference");
    println!(
        "  {:<14}  {:>9.3} ms  {:>14.1}",
        "f64",
        float_ns as f64 / 1e6,
        float_ns as f64 / iterations as f64
    );
    println!(
        "  {:<14}  {:>9.3} ms  {:>14.1}",
        "integer ×100",
        int_ns as f64 / 1e6,
        int_ns as f64 / iterations as f64
    );
    println!();

    println!("Prediction (f64)     : {:.6}", acc_f / iterations as f64);
    println!(
        "Prediction (integer) : {}",
        acc_i / iterations as i64 / 100
    );
    println!(
        "Speedup              : {:.2}×",
        float_ns as f64 / int_ns as f64
    );

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

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn zero_iterations_falls_back_to_default() {
        let a = args(&["bench_cpu", "--iterations", "0"]);
        assert_eq!(parse_arg(&a, "--iterations", 100), 100);
    }

    #[test]
    fn explicit_iterations_are_honored() {
        let a = args(&["bench_cpu", "--iterations", "42"]);
        assert_eq!(parse_arg(&a, "--iterations", 100), 42);
    }
}
