//! Chunked dot-product driver for the 8-lane combinational engine
//!
//! The engine computes one fixed-width Q16.16 dot product per operand
//! load; this driver turns that into arbitrary-length vector dot products:
//! full 8-lane chunks, then one zero-padded remainder chunk, partial sums
//! accumulated in i64 so long vectors cannot wrap the Q16.16 total.

// Operands cross the bus as u32 words but the engine arithmetic is i32
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

use crate::bus::CsrBus;
use crate::error::{LinregError, Result};
use crate::fixed;
use linreg_chip::regs::dot;
use linreg_chip::DOT_LANES;
use tracing::{debug, trace};

/// Driver for the combinational dot engine.
#[derive(Debug)]
pub struct DotAccel<B: CsrBus> {
    bus: B,
}

impl<B: CsrBus> DotAccel<B> {
    /// Attach to the engine. Does not touch the hardware; call
    /// [`init`](Self::init) to bring the registers to a known state.
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Clear all input and weight registers.
    pub fn init(&mut self) {
        let zeros = [0u32; DOT_LANES];
        self.bus.write_block(dot::INPUT_BASE, &zeros);
        self.bus.write_block(dot::WEIGHT_BASE, &zeros);
        debug!("dot engine initialized on {} bus", self.bus.bus_type());
    }

    /// Convert up to [`DOT_LANES`] values to Q16.16 and write the lane
    /// registers, zero-padding the rest.
    fn write_lanes(&mut self, base: usize, values: &[f64]) {
        let mut words = [0u32; DOT_LANES];
        for (word, &v) in words.iter_mut().zip(values.iter()) {
            *word = fixed::to_fixed(v) as u32;
        }
        self.bus.write_block(base, &words);
    }

    /// Load input operands (at most one chunk; extra elements are ignored).
    pub fn set_inputs(&mut self, inputs: &[f64]) {
        self.write_lanes(dot::INPUT_BASE, &inputs[..inputs.len().min(DOT_LANES)]);
    }

    /// Load weight operands (at most one chunk; extra elements are ignored).
    pub fn set_weights(&mut self, weights: &[f64]) {
        self.write_lanes(dot::WEIGHT_BASE, &weights[..weights.len().min(DOT_LANES)]);
    }

    /// Read the Q16.16 result register.
    pub fn result(&self) -> i32 {
        self.bus.read32(dot::RESULT) as i32
    }

    /// Compute one chunk of up to [`DOT_LANES`] elements.
    ///
    /// The result is valid immediately after the operand writes — the
    /// engine is combinational, there is no handshake to wait on.
    pub fn compute_chunk(&mut self, inputs: &[f64], weights: &[f64]) -> i32 {
        self.set_inputs(inputs);
        self.set_weights(weights);
        self.result()
    }

    /// Dot product of arbitrary-length vectors.
    ///
    /// Processes full 8-lane chunks, then one zero-padded remainder chunk,
    /// accumulating the Q16.16 partial sums in i64.
    ///
    /// # Errors
    ///
    /// Returns [`LinregError::LengthMismatch`] if the vectors differ in
    /// length. Empty vectors yield 0.0.
    pub fn dot(&mut self, inputs: &[f64], weights: &[f64]) -> Result<f64> {
        if inputs.len() != weights.len() {
            return Err(LinregError::LengthMismatch {
                inputs: inputs.len(),
                weights: weights.len(),
            });
        }

        let mut total = 0i64;
        let mut processed = 0;

        while processed + DOT_LANES <= inputs.len() {
            let chunk = self.compute_chunk(
                &inputs[processed..processed + DOT_LANES],
                &weights[processed..processed + DOT_LANES],
            );
            total += i64::from(chunk);
            processed += DOT_LANES;
        }

        // Remainder tail: the unwritten lanes are zero-padded by write_lanes
        if processed < inputs.len() {
            let chunk = self.compute_chunk(&inputs[processed..], &weights[processed..]);
            total += i64::from(chunk);
        }

        trace!(
            "dot: {} elements, {} chunks, raw total {total:#x}",
            inputs.len(),
            inputs.len().div_ceil(DOT_LANES)
        );
        Ok(fixed::from_fixed_wide(total))
    }

    /// Known-answer test: 1..=8 against all-ones must sum to 36, and a
    /// zero input vector must produce zero.
    ///
    /// # Errors
    ///
    /// Returns [`LinregError::SelfTest`] with the offending register value.
    pub fn self_test(&mut self) -> Result<()> {
        let inputs: Vec<f64> = (1..=DOT_LANES as u32).map(f64::from).collect();
        let ones = vec![1.0f64; DOT_LANES];

        let got = self.compute_chunk(&inputs, &ones);
        let expected = fixed::to_fixed(36.0);
        if got != expected {
            return Err(LinregError::SelfTest {
                expected: expected as u32,
                got: got as u32,
            });
        }

        let got = self.compute_chunk(&[0.0; DOT_LANES], &ones);
        if got != 0 {
            return Err(LinregError::SelfTest {
                expected: 0,
                got: got as u32,
            });
        }

        debug!("dot engine self test passed");
        Ok(())
    }

    /// Give the bus back (e.g. to attach a different engine driver).
    pub fn release(self) -> B {
        self.bus
    }
}
