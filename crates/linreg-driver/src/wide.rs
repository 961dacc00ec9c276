//! Driver for the 64-lane sequenced wide engine
//!
//! Unlike the dot engine this one has a real handshake: load operands,
//! pulse start, poll the done bit, read the result. The poll is bounded by
//! a configurable timeout so a wedged engine surfaces as an error instead
//! of a hang.
//!
//! The engine is raw-integer: `result = Σ aᵢ·bᵢ + bias` with wrapping
//! 32-bit arithmetic. Real-valued data goes through the decimal
//! scale-factor path ([`WideAccel::predict_scaled`]).

// Raw u32 register words and signed accumulator views interconvert freely
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

use crate::bus::CsrBus;
use crate::error::{LinregError, Result};
use crate::fixed;
use linreg_chip::regs::wide;
use linreg_chip::WIDE_LANES;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Default poll timeout for one computation.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// How long `reset` waits for an in-flight computation to drain.
const RESET_DRAIN: Duration = Duration::from_millis(100);

/// Driver for the sequenced wide engine.
#[derive(Debug)]
pub struct WideAccel<B: CsrBus> {
    bus: B,
    timeout: Duration,
}

impl<B: CsrBus> WideAccel<B> {
    /// Attach to the engine with the default 1 s poll timeout.
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the poll timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load the input operand registers. Exactly [`WIDE_LANES`] words.
    ///
    /// # Errors
    ///
    /// Returns [`LinregError::LaneMismatch`] on any other length.
    pub fn set_inputs(&mut self, inputs: &[u32]) -> Result<()> {
        check_lanes(inputs.len())?;
        self.bus.write_block(wide::INPUT_BASE, inputs);
        Ok(())
    }

    /// Load the weight operand registers. Exactly [`WIDE_LANES`] words.
    ///
    /// # Errors
    ///
    /// Returns [`LinregError::LaneMismatch`] on any other length.
    pub fn set_weights(&mut self, weights: &[u32]) -> Result<()> {
        check_lanes(weights.len())?;
        self.bus.write_block(wide::WEIGHT_BASE, weights);
        Ok(())
    }

    /// Load the bias register.
    pub fn set_bias(&mut self, bias: u32) {
        self.bus.write32(wide::BIAS, bias);
    }

    /// Start the MAC sequence.
    ///
    /// # Errors
    ///
    /// Returns [`LinregError::Busy`] if the previous computation has not
    /// signalled done yet.
    pub fn start(&mut self) -> Result<()> {
        if !self.is_done() {
            return Err(LinregError::Busy);
        }
        self.bus.write32(wide::START, 1);
        Ok(())
    }

    /// Check the done bit without blocking.
    pub fn is_done(&self) -> bool {
        self.bus.read32(wide::DONE) & 1 != 0
    }

    /// Poll the done bit until set or the timeout elapses.
    ///
    /// # Errors
    ///
    /// Returns [`LinregError::Timeout`] if the engine does not finish.
    pub fn wait_done(&self) -> Result<()> {
        let deadline = Instant::now() + self.timeout;
        while !self.is_done() {
            if Instant::now() >= deadline {
                return Err(LinregError::timeout(self.timeout));
            }
            std::hint::spin_loop();
        }
        Ok(())
    }

    /// Read the result register.
    pub fn result(&self) -> u32 {
        self.bus.read32(wide::RESULT)
    }

    /// Blocking single inference: operands in, start, wait, result out.
    ///
    /// # Errors
    ///
    /// Propagates lane mismatches, [`LinregError::Busy`], and
    /// [`LinregError::Timeout`].
    pub fn infer(&mut self, inputs: &[u32], weights: &[u32], bias: u32) -> Result<InferenceOutcome> {
        let t0 = Instant::now();

        self.set_inputs(inputs)?;
        self.set_weights(weights)?;
        self.set_bias(bias);
        let setup = t0.elapsed();

        let compute_start = Instant::now();
        self.start()?;
        self.wait_done()?;
        let result = self.result();
        let compute = compute_start.elapsed();

        let total = t0.elapsed();
        trace!("wide infer: result {result:#010x} in {total:?}");

        Ok(InferenceOutcome {
            result,
            setup,
            compute,
            total,
        })
    }

    /// Wait (bounded) for any in-flight computation to drain.
    ///
    /// The engine has no reset register; idle-with-done-set is its known
    /// state. A stuck engine is reported as a timeout.
    ///
    /// # Errors
    ///
    /// Returns [`LinregError::Timeout`] if the engine stays busy.
    pub fn reset(&mut self) -> Result<()> {
        let deadline = Instant::now() + RESET_DRAIN;
        while !self.is_done() {
            if Instant::now() >= deadline {
                return Err(LinregError::timeout(RESET_DRAIN));
            }
            std::hint::spin_loop();
        }
        debug!("wide engine idle on {} bus", self.bus.bus_type());
        Ok(())
    }

    /// Process arbitrary-length raw vectors in 64-lane chunks.
    ///
    /// Full chunks first, then one zero-padded partial chunk; each chunk
    /// result is added to `accumulator`. Returns the number of chunks
    /// (the partial chunk counts).
    ///
    /// # Errors
    ///
    /// Returns [`LinregError::LengthMismatch`] for unequal vectors and
    /// propagates handshake errors.
    pub fn process_chunks(
        &mut self,
        inputs: &[u32],
        weights: &[u32],
        accumulator: &mut u64,
    ) -> Result<usize> {
        if inputs.len() != weights.len() {
            return Err(LinregError::LengthMismatch {
                inputs: inputs.len(),
                weights: weights.len(),
            });
        }

        let mut chunks = 0;
        let mut processed = 0;

        while processed + WIDE_LANES <= inputs.len() {
            let outcome = self.infer(
                &inputs[processed..processed + WIDE_LANES],
                &weights[processed..processed + WIDE_LANES],
                0,
            )?;
            *accumulator += u64::from(outcome.result);
            chunks += 1;
            processed += WIDE_LANES;
        }

        if processed < inputs.len() {
            let mut tail_in = [0u32; WIDE_LANES];
            let mut tail_w = [0u32; WIDE_LANES];
            let remain = inputs.len() - processed;
            tail_in[..remain].copy_from_slice(&inputs[processed..]);
            tail_w[..remain].copy_from_slice(&weights[processed..]);

            let outcome = self.infer(&tail_in, &tail_w, 0)?;
            *accumulator += u64::from(outcome.result);
            chunks += 1;
        }

        debug!("wide: processed {} elements in {chunks} chunks", inputs.len());
        Ok(chunks)
    }

    /// Full prediction over an arbitrary-length raw dataset: chunked MAC
    /// plus a signed bias on the final accumulator.
    ///
    /// # Errors
    ///
    /// Propagates [`process_chunks`](Self::process_chunks) errors.
    pub fn predict(&mut self, inputs: &[u32], weights: &[u32], bias: i32) -> Result<i64> {
        let mut accumulator = 0u64;
        self.process_chunks(inputs, weights, &mut accumulator)?;
        Ok(accumulator as i64 + i64::from(bias))
    }

    /// Float variant of [`predict`](Self::predict): operands scaled by a
    /// decimal `factor`, result carrying `factor²` (see
    /// [`fixed::from_scaled_product`]). Operands must be non-negative;
    /// negative values saturate to 0 in the scaling.
    ///
    /// # Errors
    ///
    /// Propagates [`process_chunks`](Self::process_chunks) errors.
    pub fn predict_scaled(
        &mut self,
        inputs: &[f32],
        weights: &[f32],
        factor: u32,
        bias: i32,
    ) -> Result<i64> {
        let scaled_in: Vec<u32> = inputs.iter().map(|&v| fixed::to_scaled(v, factor)).collect();
        let scaled_w: Vec<u32> = weights.iter().map(|&v| fixed::to_scaled(v, factor)).collect();
        self.predict(&scaled_in, &scaled_w, bias)
    }

    /// Give the bus back.
    pub fn release(self) -> B {
        self.bus
    }
}

fn check_lanes(got: usize) -> Result<()> {
    if got == WIDE_LANES {
        Ok(())
    } else {
        Err(LinregError::LaneMismatch {
            got,
            expected: WIDE_LANES,
        })
    }
}

/// Result of one blocking inference, with transfer/compute timing.
#[derive(Debug, Clone, Copy)]
pub struct InferenceOutcome {
    /// Raw result register value
    pub result: u32,
    /// Operand load duration
    pub setup: Duration,
    /// Start-to-done duration (including the result read)
    pub compute: Duration,
    /// End-to-end duration
    pub total: Duration,
}

impl InferenceOutcome {
    /// End-to-end latency in microseconds.
    pub fn latency_us(&self) -> f64 {
        self.total.as_secs_f64() * 1_000_000.0
    }

    /// Inferences per second at this latency.
    pub fn throughput_ips(&self) -> f64 {
        if self.total.as_secs_f64() == 0.0 {
            return 0.0;
        }
        1.0 / self.total.as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimBus;

    fn ramp(n: usize) -> Vec<u32> {
        (1..=n as u32).collect()
    }

    #[test]
    fn blocking_infer_known_answer() {
        // Σ i·2i for i in 1..=64, plus bias
        let mut accel = WideAccel::new(SimBus::new());
        let inputs = ramp(WIDE_LANES);
        let weights: Vec<u32> = inputs.iter().map(|v| v * 2).collect();
        let expected: u32 = inputs.iter().map(|v| v * v * 2).sum::<u32>() + 7;

        let outcome = accel.infer(&inputs, &weights, 7).unwrap();
        assert_eq!(outcome.result, expected);
        assert!(outcome.total >= outcome.compute);
    }

    #[test]
    fn wrong_lane_count_is_rejected() {
        let mut accel = WideAccel::new(SimBus::new());
        let err = accel.set_inputs(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, LinregError::LaneMismatch { got: 3, expected: 64 }));
    }

    #[test]
    fn stuck_engine_times_out() {
        let mut accel =
            WideAccel::new(SimBus::stuck()).with_timeout(Duration::from_millis(10));
        let inputs = vec![1u32; WIDE_LANES];
        let err = accel.infer(&inputs, &inputs, 0).unwrap_err();
        assert!(matches!(err, LinregError::Timeout { .. }));
    }

    #[test]
    fn start_while_busy_is_rejected() {
        let mut accel = WideAccel::new(SimBus::with_done_latency(1000));
        accel.start().unwrap();
        assert!(matches!(accel.start().unwrap_err(), LinregError::Busy));
    }

    #[test]
    fn chunked_processing_matches_cpu() {
        // 100 elements: one full chunk + 36-element tail
        let mut accel = WideAccel::new(SimBus::new());
        let inputs = ramp(100);
        let weights: Vec<u32> = (0..100).map(|i| i % 10 + 1).collect();
        let expected: u64 = inputs
            .iter()
            .zip(weights.iter())
            .map(|(&a, &b)| u64::from(a) * u64::from(b))
            .sum();

        let mut acc = 0u64;
        let chunks = accel.process_chunks(&inputs, &weights, &mut acc).unwrap();
        assert_eq!(chunks, 2);
        assert_eq!(acc, expected);
    }

    #[test]
    fn exact_multiple_has_no_tail_chunk() {
        let mut accel = WideAccel::new(SimBus::new());
        let data = ramp(WIDE_LANES * 3);
        let mut acc = 0u64;
        let chunks = accel.process_chunks(&data, &data, &mut acc).unwrap();
        assert_eq!(chunks, 3);
    }

    #[test]
    fn predict_adds_signed_bias() {
        let mut accel = WideAccel::new(SimBus::new());
        let inputs = ramp(8);
        let ones = vec![1u32; 8];
        // Σ 1..=8 = 36
        assert_eq!(accel.predict(&inputs, &ones, -100).unwrap(), -64);
    }

    #[test]
    fn scaled_float_prediction() {
        let mut accel = WideAccel::new(SimBus::new());
        let inputs: Vec<f32> = (1..=10).map(|i| i as f32 * 0.1).collect();
        let weights = vec![0.5f32; 10];
        let factor = 1000;

        let raw = accel.predict_scaled(&inputs, &weights, factor, 0).unwrap();
        let got = fixed::from_scaled_product(raw, factor);
        let expected: f64 = inputs
            .iter()
            .zip(weights.iter())
            .map(|(&a, &b)| f64::from(a) * f64::from(b))
            .sum();
        assert!((got - expected).abs() < 1e-2, "{got} vs {expected}");
    }
}
