//! Integration tests: every engine against the CPU f64 reference
//!
//! All three engines run on the software model, so these pass without the
//! SoC. The `#[ignore]` tests repeat the same checks against a mapped
//! hardware window.

use linreg_driver::{
    fixed, model::zoo, DotAccel, LinregError, MmioBus, ScalarAccel, SimBus, WideAccel,
};
use std::time::Duration;

fn cpu_dot(x: &[f64], w: &[f64]) -> f64 {
    x.iter().zip(w.iter()).map(|(a, b)| a * b).sum()
}

#[test]
fn dot_engine_matches_cpu_across_sizes() {
    let mut accel = DotAccel::new(SimBus::new());
    accel.init();

    for size in [0usize, 1, 7, 8, 9, 16, 63, 64, 100, 1000] {
        let x: Vec<f64> = (0..size).map(|i| (i as f64).sin()).collect();
        let w: Vec<f64> = (0..size).map(|i| (i as f64 * 0.7).cos()).collect();

        let hw = accel.dot(&x, &w).expect("dot failed");
        let cpu = cpu_dot(&x, &w);

        // Q16.16 truncation: ~1.5e-5 per element, linear in size
        let tolerance = 1e-3 + size as f64 * 5e-5;
        assert!(
            (hw - cpu).abs() < tolerance,
            "size {size}: engine {hw} vs cpu {cpu}"
        );
    }
}

#[test]
fn wide_engine_matches_cpu_reference() {
    let mut accel = WideAccel::new(SimBus::new());

    let inputs: Vec<u32> = (1..=200).collect();
    let weights: Vec<u32> = (0..200).map(|i| i % 8 + 1).collect();
    let expected: u64 = inputs
        .iter()
        .zip(weights.iter())
        .map(|(&a, &b)| u64::from(a) * u64::from(b))
        .sum();

    let mut acc = 0u64;
    let chunks = accel.process_chunks(&inputs, &weights, &mut acc).unwrap();
    assert_eq!(chunks, 4); // 3 full 64-lane chunks + 8-element tail
    assert_eq!(acc, expected);
}

#[test]
fn scalar_engine_matches_linear_model() {
    let model = zoo::diabetes();
    let mut accel = ScalarAccel::new(SimBus::new());
    accel.set_params(model.weight, model.bias);

    for x in [-0.1, -0.01, 0.0, 0.03, 0.1] {
        let hw = accel.compute(x).expect("compute failed");
        let cpu = model.predict(x);
        assert!((hw - cpu).abs() < 0.05, "x={x}: engine {hw} vs cpu {cpu}");
    }
}

#[test]
fn dot_and_wide_agree_on_integer_data() {
    // Same integer payload through both generations: the Q16.16 dot engine
    // and the raw wide engine must agree exactly on small integers.
    let x: Vec<f64> = (1..=96).map(f64::from).collect();
    let w: Vec<f64> = (1..=96).map(|i| f64::from(i % 5)).collect();

    let mut dot_engine = DotAccel::new(SimBus::new());
    dot_engine.init();
    let dot_result = dot_engine.dot(&x, &w).unwrap();

    let xi: Vec<u32> = (1..=96).collect();
    let wi: Vec<u32> = (1..=96u32).map(|i| i % 5).collect();
    let mut wide_engine = WideAccel::new(SimBus::new());
    let wide_result = wide_engine.predict(&xi, &wi, 0).unwrap();

    assert!(
        (dot_result - wide_result as f64).abs() < 1e-6,
        "dot {dot_result} vs wide {wide_result}"
    );
}

#[test]
fn iris_classifier_agrees_between_cpu_and_engine() {
    let model = zoo::iris();
    let mut accel = DotAccel::new(SimBus::new());
    accel.init();

    let samples: [[f64; 4]; 4] = [
        [5.1, 3.5, 1.4, 0.2],
        [7.0, 3.2, 4.7, 1.4],
        [6.3, 3.3, 6.0, 2.5],
        [4.9, 3.0, 1.4, 0.2],
    ];

    for x in &samples {
        let cpu = model.decision(x);
        let hw = model.decision_accel(&mut accel, x).unwrap();
        assert!((cpu - hw).abs() < 1e-3);
        assert_eq!(cpu > 0.0, hw > 0.0, "class flip on {x:?}");
    }
}

#[test]
fn wedged_engine_reports_timeout_not_hang() {
    let mut accel = WideAccel::new(SimBus::stuck()).with_timeout(Duration::from_millis(5));
    let lanes = vec![1u32; 64];
    let err = accel.infer(&lanes, &lanes, 0).unwrap_err();
    assert!(matches!(err, LinregError::Timeout { duration_ms: 5 }));
}

#[test]
fn scaled_wide_prediction_tracks_f64() {
    let mut accel = WideAccel::new(SimBus::new());
    let x: Vec<f32> = (0..150).map(|i| i as f32 * 0.01).collect();
    let w: Vec<f32> = (0..150).map(|i| (i % 7) as f32 * 0.1).collect();
    let factor = 10_000;

    let raw = accel.predict_scaled(&x, &w, factor, 0).unwrap();
    let got = fixed::from_scaled_product(raw, factor);
    let expected: f64 = x
        .iter()
        .zip(w.iter())
        .map(|(&a, &b)| f64::from(a) * f64::from(b))
        .sum();
    assert!((got - expected).abs() < 0.05, "{got} vs {expected}");
}

/// Hardware counterpart of the sim parity tests. Needs a mapped window;
/// set `LINREG_CSR_DEV` and `LINREG_CSR_BASE` and drop the ignore.
#[test]
#[ignore] // Requires the SoC with the accelerator block
fn hardware_dot_self_test() {
    let dev = std::env::var("LINREG_CSR_DEV").unwrap_or_else(|_| "/dev/mem".into());
    let base = std::env::var("LINREG_CSR_BASE")
        .ok()
        .and_then(|s| u64::from_str_radix(s.trim_start_matches("0x"), 16).ok())
        .expect("LINREG_CSR_BASE required");

    let bus = MmioBus::map(dev, base).expect("map CSR window");
    let mut accel = DotAccel::new(bus);
    accel.init();
    accel.self_test().expect("hardware self test");
}
